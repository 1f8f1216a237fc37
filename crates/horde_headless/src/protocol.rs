//! JSON-lines control protocol.
//!
//! Every message is one JSON object on its own line.
//!
//! **stdin:** [`Command`]s from the controller
//! **stdout:** one [`Response`] per command
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","tick":0}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner outputs state after each `tick` (and on `query`)
//! 4. Input commands are held until changed, like held keys
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0}
//! -> {"cmd":"move","axis":"right","magnitude":1.0}
//! <- {"type":"ack","cmd":"move"}
//! -> {"cmd":"use_weapon","active":true}
//! <- {"type":"ack","cmd":"use_weapon"}
//! -> {"cmd":"tick","count":60}
//! <- {"type":"state","tick":60,"scene_time_ms":960,...}
//! -> {"cmd":"hash"}
//! <- {"type":"hash","tick":60,"hash":1234567890}
//! ```

use serde::{Deserialize, Serialize};

use horde_core::entity::{Entity, EntityKind, Team};
use horde_core::living::Living;
use horde_core::player::{Axis, Player, WeaponSlot};
use horde_core::simulation::Scene;

/// Protocol version reported in the `ready` response.
pub const PROTOCOL_VERSION: &str = "1.0";

/// A controller request, tagged by `cmd`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Step the scene `count` times (1 when omitted).
    Tick {
        /// Number of ticks.
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Report the state without stepping.
    Query,

    /// Set a movement axis magnitude in `[0, 1]`.
    Move {
        /// Axis to set.
        axis: Axis,
        /// Magnitude; 0 releases the axis.
        magnitude: f64,
    },

    /// Hold or release the fire action.
    UseWeapon {
        /// Whether the weapon is fired.
        active: bool,
    },

    /// Set the aim direction; `(0, 0)` aims where the player faces.
    Aim {
        /// X component.
        x: f64,
        /// Y component.
        y: f64,
    },

    /// Press or release the grab action.
    Grab {
        /// Whether grab is pressed.
        #[serde(default = "default_pressed")]
        pressed: bool,
    },

    /// Toggle the active weapon slot.
    SwitchWeapon,

    /// Report the current state hash (for determinism verification).
    Hash,

    /// Quit the session.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

fn default_pressed() -> bool {
    true
}

/// A runner reply, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// The session is open.
    Ready {
        /// Protocol version.
        version: String,
        /// Current tick.
        tick: u64,
    },

    /// The command was applied.
    Ack {
        /// Command name.
        cmd: String,
    },

    /// The line could not be parsed or the command could not be applied.
    Error {
        /// What went wrong.
        message: String,
        /// Command name, if the command parsed.
        cmd: Option<String>,
    },

    /// Current game state.
    State(Box<StateSnapshot>),

    /// Scene hash, comparable across replays.
    Hash {
        /// Current tick.
        tick: u64,
        /// Scene state hash.
        hash: u64,
    },
}

/// Full state report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Ticks simulated.
    pub tick: u64,
    /// Scene time in milliseconds.
    pub scene_time_ms: i64,
    /// Accumulated score.
    pub score: u64,
    /// Whether the player is still alive.
    pub game_status: GameStatus,
    /// The player, if one is in the scene.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerState>,
    /// Every entity in the scene.
    pub entities: Vec<EntityState>,
    /// Scene state hash.
    pub hash: u64,
}

impl StateSnapshot {
    /// Capture the state of `scene`.
    #[must_use]
    pub fn capture(scene: &Scene) -> Self {
        let player = scene.player().map(PlayerState::of);
        let game_status = match &player {
            Some(p) if p.health <= 0.0 => GameStatus::Defeat,
            _ => GameStatus::InProgress,
        };
        Self {
            tick: scene.tick(),
            scene_time_ms: scene.scene_time(),
            score: scene.score(),
            game_status,
            player,
            entities: scene.entities().iter().map(EntityState::of).collect(),
            hash: scene.state_hash(),
        }
    }
}

/// One entity in a [`StateSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityState {
    /// Entity id.
    pub id: u64,
    /// Kind name (`player`, `mob`, `ranged_mob`, `item`, ...).
    pub kind: String,
    /// Top-left x.
    pub x: f64,
    /// Top-left y.
    pub y: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Team.
    pub team: Team,
    /// Health of living entities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthState>,
    /// Item or weapon name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Chased entity of mobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u64>,
}

impl EntityState {
    /// Describe `entity`.
    #[must_use]
    pub fn of(entity: &Entity) -> Self {
        let size = entity.body.size();
        let name = match &entity.kind {
            EntityKind::Item(item) => Some(item.name().to_string()),
            _ => None,
        };
        Self {
            id: entity.id(),
            kind: entity.kind_name().to_string(),
            x: entity.body.position.x(),
            y: entity.body.position.y(),
            width: size.width(),
            height: size.height(),
            team: entity.body.team,
            health: entity.as_living().map(|l| HealthState {
                current: l.vitals().health(),
                max: l.vitals().max_health(),
            }),
            name,
            target: entity.target_id(),
        }
    }
}

/// Health state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthState {
    /// Current health.
    pub current: f64,
    /// Maximum health.
    pub max: f64,
}

/// Player-specific state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Current health.
    pub health: f64,
    /// Current energy.
    pub energy: f64,
    /// Gold carried.
    pub gold: u64,
    /// Active slot index (0 or 1).
    pub active_slot: u8,
    /// Weapon names per slot.
    pub weapons: [Option<String>; 2],
}

impl PlayerState {
    /// Describe `player`.
    #[must_use]
    pub fn of(player: &Player) -> Self {
        let weapon_name = |slot| player.weapon(slot).map(|w| w.name().to_string());
        Self {
            health: player.vitals().health(),
            energy: player.energy(),
            gold: player.gold(),
            active_slot: match player.active_slot() {
                WeaponSlot::First => 0,
                WeaponSlot::Second => 1,
            },
            weapons: [weapon_name(WeaponSlot::First), weapon_name(WeaponSlot::Second)],
        }
    }
}

/// Current game status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// The player is alive.
    InProgress,
    /// The player died.
    Defeat,
}

impl Response {
    /// Greeting sent before any command is read.
    pub fn ready(tick: u64) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            tick,
        }
    }

    /// `ack` naming the applied command.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// `error` with an optional command name.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Create a state response for `scene`.
    pub fn state(scene: &Scene) -> Self {
        Self::State(Box::new(StateSnapshot::capture(scene)))
    }

    /// Encode as one output line, newline included.
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({ "type": "error", "message": format!("cannot encode response: {e}") })
                .to_string()
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Decode one input line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Move { .. } => "move",
            Self::UseWeapon { .. } => "use_weapon",
            Self::Aim { .. } => "aim",
            Self::Grab { .. } => "grab",
            Self::SwitchWeapon => "switch_weapon",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}
