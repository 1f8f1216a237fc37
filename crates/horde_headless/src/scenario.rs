//! Scenario loading and configuration.
//!
//! Scenarios define the initial arena for headless runs: the player, the
//! items lying around, the wave schedule and simulation settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use horde_core::config::SimConfig;
use horde_core::data::SpawnerData;
use horde_core::math::Extent;

/// Name of the built-in scenario used when nothing else matches.
pub const DEFAULT_SCENARIO: &str = "arena";

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Simulation settings; the seed is overridden by batch runs.
    #[serde(default)]
    pub config: SimConfig,
    /// Ticks after which a surviving player wins.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// The player.
    #[serde(default)]
    pub player: PlayerSetup,
    /// Items placed at start.
    #[serde(default)]
    pub items: Vec<ItemPlacement>,
    /// Wave schedule; `None` uses the data directory's `spawner.ron`.
    #[serde(default)]
    pub spawner: Option<SpawnerData>,
    /// Drive the player with the built-in autopilot in `run`/`batch`.
    #[serde(default = "default_autopilot")]
    pub autopilot: bool,
}

const fn default_max_ticks() -> u64 {
    3600 // one minute at 60 tps
}

const fn default_autopilot() -> bool {
    true
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: DEFAULT_SCENARIO.to_string(),
            description: "Lone player with a pistol against the default waves".to_string(),
            config: SimConfig::default(),
            max_ticks: default_max_ticks(),
            player: PlayerSetup::default(),
            items: Vec::new(),
            spawner: None,
            autopilot: true,
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Find a scenario by file path or by name.
    ///
    /// A name is looked up as `<data_dir>/scenarios/<name>.ron`. The name
    /// [`DEFAULT_SCENARIO`] falls back to [`Scenario::default`] when no file
    /// provides it.
    pub fn resolve(name_or_path: &str, data_dir: Option<&Path>) -> Result<Self, ScenarioError> {
        let direct = PathBuf::from(name_or_path);
        if direct.is_file() {
            return Self::load(direct);
        }

        if let Some(dir) = data_dir {
            let named = dir.join("scenarios").join(format!("{name_or_path}.ron"));
            if named.is_file() {
                return Self::load(named);
            }
        }

        if name_or_path == DEFAULT_SCENARIO {
            tracing::debug!("Using built-in '{}' scenario", DEFAULT_SCENARIO);
            return Ok(Self::default());
        }

        Err(ScenarioError::FileNotFound(name_or_path.to_string()))
    }

    /// Simulation settings with `seed` applied.
    #[must_use]
    pub fn config_with_seed(&self, seed: u64) -> SimConfig {
        SimConfig {
            seed,
            ..self.config.clone()
        }
    }
}

/// Starting state of the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Top-left corner (x, y).
    #[serde(default)]
    pub position: (f64, f64),
    /// Collision box.
    #[serde(default = "default_player_size")]
    pub size: Extent,
    /// Starting and maximum health.
    #[serde(default = "default_player_health")]
    pub health: f64,
    /// Movement speed; defaults to the simulation config.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Maximum energy; defaults to the simulation config.
    #[serde(default)]
    pub energy: Option<f64>,
    /// Weapon template names, first slot first. At most two are used.
    #[serde(default = "default_player_weapons")]
    pub weapons: Vec<String>,
}

fn default_player_size() -> Extent {
    Extent::new(32.0, 32.0).unwrap_or_default()
}

const fn default_player_health() -> f64 {
    100.0
}

fn default_player_weapons() -> Vec<String> {
    vec!["pistol".to_string()]
}

impl Default for PlayerSetup {
    fn default() -> Self {
        Self {
            position: (0.0, 0.0),
            size: default_player_size(),
            health: default_player_health(),
            speed: None,
            energy: None,
            weapons: default_player_weapons(),
        }
    }
}

/// Placement of an item at scenario start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemPlacement {
    /// Item template name.
    pub item: String,
    /// Center (x, y).
    pub position: (f64, f64),
}

impl ItemPlacement {
    /// Create a new item placement.
    #[must_use]
    pub fn new(item: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            item: item.into(),
            position: (x, y),
        }
    }
}
