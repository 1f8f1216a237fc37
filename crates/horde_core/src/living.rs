//! Health, death and status-effect resolution shared by all living entities.
//!
//! [`Vitals`] is the state; [`Living`] is the capability implemented by
//! players and mobs. The trait's provided methods route every damage source
//! through one path so that the death hook fires exactly once.

use serde::{Deserialize, Serialize};

use crate::config::{BURNING_DURATION_MS, POISONED_DURATION_MS};
use crate::context::SimContext;
use crate::effect::{Effect, EffectKind};
use crate::entity::Body;

/// Health, speed and the three persistent status-effect slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    health: f64,
    max_health: f64,
    base_speed: f64,
    dead: bool,
    looking_left: bool,
    burning: Effect,
    poisoned: Effect,
    frozen: Effect,
}

impl Vitals {
    /// Create vitals at full health. Non-positive health becomes 1.
    #[must_use]
    pub fn new(health: f64, base_speed: f64) -> Self {
        let health = if health > 0.0 { health } else { 1.0 };
        Self {
            health,
            max_health: health,
            base_speed,
            dead: false,
            looking_left: false,
            burning: Effect::inactive(EffectKind::Burning),
            poisoned: Effect::inactive(EffectKind::Poisoned),
            frozen: Effect::inactive(EffectKind::Frozen),
        }
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f64 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> f64 {
        self.max_health
    }

    /// Unmodified movement speed, in pixels per millisecond.
    #[must_use]
    pub const fn base_speed(&self) -> f64 {
        self.base_speed
    }

    /// Set the unmodified movement speed.
    pub fn set_base_speed(&mut self, speed: f64) {
        self.base_speed = speed;
    }

    /// Whether the entity has died.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Whether the entity is facing left.
    #[must_use]
    pub const fn looking_left(&self) -> bool {
        self.looking_left
    }

    /// Update facing.
    pub fn set_looking_left(&mut self, looking_left: bool) {
        self.looking_left = looking_left;
    }

    /// Burning slot.
    #[must_use]
    pub const fn burning(&self) -> &Effect {
        &self.burning
    }

    /// Poison slot.
    #[must_use]
    pub const fn poisoned(&self) -> &Effect {
        &self.poisoned
    }

    /// Freeze slot.
    #[must_use]
    pub const fn frozen(&self) -> &Effect {
        &self.frozen
    }

    /// Speed multiplier from the freeze slot, 1 when not frozen.
    #[must_use]
    pub fn speed_multiplier(&self) -> f64 {
        if self.frozen.has_expired() {
            1.0
        } else {
            self.frozen.strength()
        }
    }

    /// Effective speed this tick.
    #[must_use]
    pub fn current_speed(&self) -> f64 {
        self.base_speed * self.speed_multiplier()
    }

    /// Subtract `amount` from health.
    ///
    /// Returns `true` only on the call that kills; damage to an already dead
    /// entity and non-positive amounts are ignored.
    pub fn apply_damage(&mut self, amount: f64) -> bool {
        if self.dead || !(amount > 0.0) {
            return false;
        }
        if amount >= self.health {
            self.health = 0.0;
            self.dead = true;
            return true;
        }
        self.health -= amount;
        false
    }

    /// Overwrite health, clamped to the maximum. A non-positive value kills.
    ///
    /// Returns `true` when this call killed the entity.
    pub fn set_health(&mut self, value: f64) -> bool {
        if self.dead {
            return false;
        }
        if value <= 0.0 {
            self.health = 0.0;
            self.dead = true;
            return true;
        }
        self.health = value.min(self.max_health);
        false
    }

    /// Change the maximum health (non-positive becomes 1) and clamp health.
    pub fn set_max_health(&mut self, value: f64) {
        self.max_health = if value > 0.0 { value } else { 1.0 };
        self.health = self.health.min(self.max_health);
    }

    /// Restore health up to the maximum. Dead entities stay dead.
    pub fn heal(&mut self, amount: f64) {
        if self.dead || !(amount > 0.0) {
            return;
        }
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Merge an incoming effect into the matching slot.
    ///
    /// Burning and poison always reset to their fixed duration and only ever
    /// raise strength. Freeze keeps the longer duration and the stronger
    /// (smaller) multiplier. Boom is not stored: its strength is dealt as
    /// damage, and the return value reports whether that killed.
    pub fn receive_effect(&mut self, effect: &Effect) -> bool {
        if self.dead {
            return false;
        }
        match effect.kind() {
            EffectKind::Burning => {
                merge_damage_over_time(&mut self.burning, effect, BURNING_DURATION_MS);
                false
            }
            EffectKind::Poisoned => {
                merge_damage_over_time(&mut self.poisoned, effect, POISONED_DURATION_MS);
                false
            }
            EffectKind::Frozen => {
                if effect.duration_left() > self.frozen.duration_left() {
                    self.frozen.set_duration(effect.duration_left());
                }
                if effect.strength() < self.frozen.strength() {
                    self.frozen.set_strength(effect.strength());
                }
                false
            }
            EffectKind::Boom => self.apply_damage(effect.strength()),
            EffectKind::None | EffectKind::Repel => false,
        }
    }

    /// Advance the effect slots by `delta_ms`.
    ///
    /// Order is fixed: burning, then poison, then freeze. Returns `true` when
    /// damage over time killed the entity.
    pub fn tick_effects(&mut self, delta_ms: i64) -> bool {
        let dt = delta_ms as f64;
        let mut died = false;

        if !self.burning.has_expired() {
            died |= self.apply_damage(dt * self.burning.strength());
            self.burning.decrease_duration(delta_ms);
        }
        if self.burning.has_expired() {
            self.burning.set_strength(0.0);
        }

        if !self.poisoned.has_expired() {
            died |= self.apply_damage(dt * self.poisoned.strength());
            self.poisoned.decrease_duration(delta_ms);
        }
        if self.poisoned.has_expired() {
            self.poisoned.set_strength(0.0);
        }

        if self.frozen.has_expired() {
            self.frozen.set_strength(1.0);
        } else {
            self.frozen.decrease_duration(delta_ms);
        }

        died
    }
}

fn merge_damage_over_time(slot: &mut Effect, incoming: &Effect, duration_ms: i64) {
    slot.set_duration(duration_ms);
    if incoming.strength() > slot.strength() {
        slot.set_strength(incoming.strength());
    }
}

/// Capability of entities that have health and can die.
///
/// Implementors provide access to their [`Vitals`] and a death hook. The
/// provided methods are the only way gameplay code changes health, so the
/// hook runs exactly once per entity.
pub trait Living {
    /// Shared living state.
    fn vitals(&self) -> &Vitals;

    /// Mutable shared living state.
    fn vitals_mut(&mut self) -> &mut Vitals;

    /// Called once, on the transition from alive to dead.
    fn on_death(&mut self, body: &mut Body, ctx: &mut SimContext);

    /// Inflict damage, running the death hook if this kills.
    fn take_damage(&mut self, amount: f64, body: &mut Body, ctx: &mut SimContext) {
        if self.vitals_mut().apply_damage(amount) {
            self.on_death(body, ctx);
        }
    }

    /// Overwrite health, running the death hook if this kills.
    fn set_health(&mut self, value: f64, body: &mut Body, ctx: &mut SimContext) {
        if self.vitals_mut().set_health(value) {
            self.on_death(body, ctx);
        }
    }

    /// Apply a status effect.
    fn give_effect(&mut self, effect: &Effect, body: &mut Body, ctx: &mut SimContext) {
        if self.vitals_mut().receive_effect(effect) {
            self.on_death(body, ctx);
        }
    }

    /// Run one tick of damage over time and effect decay.
    fn resolve_effects(&mut self, delta_ms: i64, body: &mut Body, ctx: &mut SimContext) {
        if self.vitals_mut().tick_effects(delta_ms) {
            self.on_death(body, ctx);
        }
    }
}
