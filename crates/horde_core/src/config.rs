//! Simulation tuning parameters and gameplay constants.

use serde::{Deserialize, Serialize};

/// Knockback force scale applied by repel zones.
pub const FORCE_FACTOR: f64 = 5000.0;

/// Minimum knockback displacement per collision.
pub const MIN_FORCE: f64 = 0.1;

/// Maximum knockback displacement per collision.
pub const MAX_FORCE: f64 = 10.0;

/// Duration a burning effect is (re)set to when applied, in milliseconds.
pub const BURNING_DURATION_MS: i64 = 3000;

/// Duration a poison effect is (re)set to when applied, in milliseconds.
pub const POISONED_DURATION_MS: i64 = 10_000;

/// Collision box edge of an item dropped by a player or a mob.
pub const DROPPED_ITEM_SIZE: f64 = 30.0;

/// Runtime configuration for a [`Scene`](crate::simulation::Scene).
///
/// # Example RON
///
/// ```ron
/// SimConfig(
///     tick_ms: 16,
///     player_speed: 0.05,
///     player_energy: 100.0,
///     energy_regen_per_ms: 0.01,
///     reference_frame_rate: 60.0,
///     seed: 42,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Fixed timestep used by runners, in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: i64,

    /// Player movement speed in pixels per millisecond.
    #[serde(default = "default_player_speed")]
    pub player_speed: f64,

    /// Player maximum (and starting) energy.
    #[serde(default = "default_player_energy")]
    pub player_energy: f64,

    /// Energy regenerated per millisecond.
    #[serde(default = "default_energy_regen")]
    pub energy_regen_per_ms: f64,

    /// Frame rate that per-frame contact damage values are expressed in.
    #[serde(default = "default_reference_frame_rate")]
    pub reference_frame_rate: f64,

    /// Seed for the simulation RNG (loot rolls, spawn directions).
    #[serde(default)]
    pub seed: u64,
}

const fn default_tick_ms() -> i64 {
    16
}

const fn default_player_speed() -> f64 {
    0.05
}

const fn default_player_energy() -> f64 {
    100.0
}

const fn default_energy_regen() -> f64 {
    0.01
}

const fn default_reference_frame_rate() -> f64 {
    60.0
}

impl SimConfig {
    /// Convert a per-frame contact damage into damage for `delta_ms`.
    #[must_use]
    pub fn per_frame_scaled(&self, per_frame: f64, delta_ms: i64) -> f64 {
        per_frame * delta_ms as f64 * self.reference_frame_rate / 1000.0
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            player_speed: default_player_speed(),
            player_energy: default_player_energy(),
            energy_regen_per_ms: default_energy_regen(),
            reference_frame_rate: default_reference_frame_rate(),
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_ron() {
        let config: SimConfig = ron::from_str("()").unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_per_frame_scaling() {
        let config = SimConfig::default();
        // 1000/60 ms is exactly one reference frame
        let dmg = config.per_frame_scaled(3.0, 1000);
        assert!((dmg - 180.0).abs() < 1e-9);
        assert!((config.per_frame_scaled(3.0, 0)).abs() < 1e-12);
    }
}
