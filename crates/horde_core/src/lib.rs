//! # Horde Core
//!
//! Deterministic 2D action-survival simulation core.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No global state
//! - Randomness only from the seeded RNG in [`context::SimContext`]
//!
//! This separation enables:
//! - Headless runs and batch balancing
//! - Replaying a session from its inputs
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`math`] - 2D vectors and sizes
//! - [`effect`] / [`living`] - Status effects, health and death
//! - [`entity`] - Entity kinds, collision shapes and dispatch
//! - [`player`] / [`mob`] - Controllable character and AI enemies
//! - [`weapon`] / [`projectile`] / [`effect_zone`] - Attack pipeline
//! - [`registry`] / [`loot`] / [`data`] - Templates, loot tables and game data
//! - [`spawner`] - Repeating mob waves
//! - [`simulation`] - Scene loop

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod context;
pub mod data;
pub mod effect;
pub mod effect_zone;
pub mod entity;
pub mod error;
pub mod item;
pub mod living;
pub mod loot;
pub mod math;
pub mod mob;
pub mod player;
pub mod projectile;
pub mod registry;
pub mod simulation;
pub mod spawner;
pub mod weapon;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::SimConfig;
    pub use crate::context::SimContext;
    pub use crate::data::{GameData, SpawnerData};
    pub use crate::effect::{Effect, EffectKind};
    pub use crate::effect_zone::EffectZone;
    pub use crate::entity::{Body, Entity, EntityId, EntityKind, TargetView, Team};
    pub use crate::error::{GameError, Result};
    pub use crate::item::{Item, ItemKind};
    pub use crate::living::{Living, Vitals};
    pub use crate::loot::LootTables;
    pub use crate::math::{Extent, Vec2};
    pub use crate::mob::{Mob, MobPhase, RangedMob};
    pub use crate::player::{Axis, Player, WeaponSlot};
    pub use crate::projectile::{Detonation, Missile, ProjectileSpec, Rocket};
    pub use crate::registry::Registry;
    pub use crate::simulation::{Scene, TickEvents};
    pub use crate::spawner::{MobSpawner, WaveTrigger};
    pub use crate::weapon::{Weapon, WeaponKind};
}
