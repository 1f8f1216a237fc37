//! Spawn wave data.

use serde::{Deserialize, Serialize};

use super::GameData;

/// One schedule entry: `count` mobs named `mob` at `trigger_ms` into the
/// wave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveData {
    /// Time into the wave, in milliseconds.
    pub trigger_ms: i64,
    /// Mob template name.
    pub mob: String,
    /// Number of mobs.
    pub count: u32,
}

/// Repeating wave schedule.
///
/// # Example RON
///
/// ```ron
/// SpawnerData(
///     spawn_radius: 400.0,
///     waves: [
///         WaveData(trigger_ms: 1000, mob: "rat", count: 2),
///         WaveData(trigger_ms: 5000, mob: "rat", count: 1),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerData {
    /// Distance from the target at which mobs appear.
    pub spawn_radius: f64,
    /// Schedule entries, in any order.
    #[serde(default)]
    pub waves: Vec<WaveData>,
}

impl SpawnerData {
    /// Parse spawner data from a RON string.
    pub fn from_ron_str(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Check the schedule against the mobs defined in `game`.
    #[must_use]
    pub fn validate(&self, game: &GameData) -> Vec<String> {
        let mut problems = Vec::new();
        if self.spawn_radius < 0.0 {
            problems.push("spawner has a negative spawn radius".to_string());
        }
        for wave in &self.waves {
            if wave.trigger_ms < 0 {
                problems.push(format!("wave of '{}' triggers at negative time", wave.mob));
            }
            if !game.has_mob(&wave.mob) {
                problems.push(format!("wave refers to unknown mob '{}'", wave.mob));
            }
        }
        problems
    }
}
