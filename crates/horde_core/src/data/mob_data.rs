//! Mob template data.

use serde::{Deserialize, Serialize};

use crate::math::Extent;

use super::ProjectileData;

/// Ranged attack of a mob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangedData {
    /// Time between shots.
    pub fire_cooldown_ms: i64,
    /// Distance at which the mob stops approaching.
    pub min_range: f64,
    /// Distance beyond which the mob approaches again.
    pub max_range: f64,
    /// Fired projectile.
    pub projectile: ProjectileData,
}

/// Data-driven mob definition.
///
/// # Example RON
///
/// ```ron
/// MobData(
///     name: "spitter",
///     health: 15.0,
///     speed: 0.04,
///     melee_damage: 0.2,
///     size: (24.0, 24.0),
///     loot_table: "common_mob",
///     score: 5,
///     ranged: Some(RangedData(
///         fire_cooldown_ms: 1200,
///         min_range: 150.0,
///         max_range: 300.0,
///         projectile: ProjectileData(range: 400.0, damage: 4.0, speed: 0.15, size: (8.0, 8.0)),
///     )),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobData {
    /// Unique mob name, referenced by spawn waves.
    pub name: String,
    /// Starting and maximum health.
    pub health: f64,
    /// Movement speed in pixels per millisecond.
    pub speed: f64,
    /// Contact damage per reference frame.
    #[serde(default)]
    pub melee_damage: f64,
    /// Collision box.
    pub size: Extent,
    /// Loot table rolled on death; empty for none.
    #[serde(default)]
    pub loot_table: String,
    /// Score awarded when swept.
    #[serde(default)]
    pub score: u64,
    /// Ranged attack, absent for melee mobs.
    #[serde(default)]
    pub ranged: Option<RangedData>,
}
