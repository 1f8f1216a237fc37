//! Ranged weapons held by players.
//!
//! A weapon queues at most one projectile at a time; the holder harvests it
//! through its own spawn pipeline. Guns fire missiles, rocket launchers fire
//! rockets carrying a detonation.

use crate::entity::{Entity, Team};
use crate::math::{Extent, Vec2};
use crate::projectile::ProjectileSpec;

/// Weapon family, derived from the projectile template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    /// Fires missiles.
    Gun,
    /// Fires rockets.
    RocketLauncher,
}

/// A weapon and its firing state.
#[derive(Debug, Clone)]
pub struct Weapon {
    name: String,
    energy_cost: f64,
    use_delay_ms: i64,
    size: Extent,
    sprite: String,
    projectile: ProjectileSpec,
    cooldown_left: i64,
    pending: Option<Box<Entity>>,
}

impl Weapon {
    /// Create a weapon.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        energy_cost: f64,
        use_delay_ms: i64,
        size: Extent,
        projectile: ProjectileSpec,
    ) -> Self {
        Self {
            name: name.into(),
            energy_cost,
            use_delay_ms,
            size,
            sprite: String::new(),
            projectile,
            cooldown_left: 0,
            pending: None,
        }
    }

    /// Set the sprite key.
    #[must_use]
    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = sprite.into();
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sprite key.
    #[must_use]
    pub fn sprite(&self) -> &str {
        &self.sprite
    }

    /// Energy consumed per shot.
    #[must_use]
    pub const fn energy_cost(&self) -> f64 {
        self.energy_cost
    }

    /// Minimum time between shots.
    #[must_use]
    pub const fn use_delay_ms(&self) -> i64 {
        self.use_delay_ms
    }

    /// Held size.
    #[must_use]
    pub const fn size(&self) -> Extent {
        self.size
    }

    /// Projectile template.
    #[must_use]
    pub const fn projectile(&self) -> &ProjectileSpec {
        &self.projectile
    }

    /// Gun or rocket launcher.
    #[must_use]
    pub const fn kind(&self) -> WeaponKind {
        if self.projectile.detonation.is_some() {
            WeaponKind::RocketLauncher
        } else {
            WeaponKind::Gun
        }
    }

    /// Whether the use delay has elapsed.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.cooldown_left <= 0
    }

    /// Restart the use delay.
    pub fn start_cooldown(&mut self) {
        self.cooldown_left = self.use_delay_ms;
    }

    /// Count the use delay down.
    pub fn tick(&mut self, delta_ms: i64) {
        if self.cooldown_left > 0 {
            self.cooldown_left -= delta_ms;
        }
    }

    /// Queue a projectile fired from `position` towards `direction`.
    ///
    /// The projectile box is vertically centred on `position` and placed
    /// ahead of it on the side `direction` points to. Returns `false`
    /// without doing anything when a projectile is already queued.
    pub fn attack(&mut self, position: Vec2, direction: Vec2, team: Team) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let size = self.projectile.size;
        let x = if direction.x() >= 0.0 {
            position.x()
        } else {
            position.x() - size.width()
        };
        let top_left = Vec2::new(x, position.y() - size.height() / 2.0);
        self.pending = Some(Box::new(self.projectile.launch(top_left, direction, team)));
        true
    }

    /// Whether a projectile is queued.
    #[must_use]
    pub const fn wants_spawn(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand out the queued projectile.
    pub fn take_spawned(&mut self) -> Option<Entity> {
        self.pending.take().map(|e| *e)
    }

    /// Discard the queued projectile without firing it.
    pub fn destroy_spawned(&mut self) {
        self.pending = None;
    }
}
