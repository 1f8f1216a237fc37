//! Circular areas that hand an effect to whatever overlaps them.

use crate::config::{FORCE_FACTOR, MAX_FORCE, MIN_FORCE};
use crate::context::SimContext;
use crate::effect::{Effect, EffectKind};
use crate::entity::{Body, Entity, EntityKind, Team};
use crate::error::Result;
use crate::math::{Extent, Vec2};

/// A circular effect area.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectZone {
    radius: f64,
    effect: Effect,
}

impl EffectZone {
    /// Create a zone state.
    #[must_use]
    pub fn new(effect: Effect, radius: f64) -> Self {
        Self { radius, effect }
    }

    /// Build a zone entity centred on `center`.
    pub fn spawn(center: Vec2, effect: Effect, radius: f64, team: Team) -> Result<Entity> {
        let size = Extent::around_circle(radius)?;
        let position = center - Vec2::new(radius, radius);
        Ok(Entity::new(
            EntityKind::EffectZone(Self::new(effect, radius)),
            Body::new(position, size, team),
        ))
    }

    /// Zone radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Carried effect.
    #[must_use]
    pub const fn effect(&self) -> &Effect {
        &self.effect
    }

    /// Knockback displacement for a body centred at `target_center`.
    ///
    /// The magnitude is `FORCE_FACTOR * strength / distance²` clamped to
    /// `[MIN_FORCE, MAX_FORCE]`; a target exactly at the zone center is not
    /// moved.
    #[must_use]
    pub fn knockback(&self, zone_center: Vec2, target_center: Vec2) -> Vec2 {
        let d = target_center - zone_center;
        let dist_sq = d.sqr_magnitude();
        if dist_sq == 0.0 {
            return Vec2::ZERO;
        }
        let force = (FORCE_FACTOR * self.effect.strength() / dist_sq).clamp(MIN_FORCE, MAX_FORCE);
        d.normalized() * force
    }

    /// Push `target` away from the zone center.
    pub fn repel(&self, body: &Body, target: &mut Body) {
        let push = self.knockback(body.center(), target.center());
        target.position = target.position + push;
    }

    pub(crate) fn collide(&self, body: &Body, other: &mut Entity, ctx: &mut SimContext) {
        let immune_to_knockback = other.is_projectile() || other.is_effect_zone();
        match self.effect.kind() {
            EffectKind::None => {}
            EffectKind::Repel => {
                if !immune_to_knockback {
                    self.repel(body, &mut other.body);
                }
            }
            EffectKind::Boom => {
                if !immune_to_knockback {
                    self.repel(body, &mut other.body);
                }
                other.give_effect(&self.effect, ctx);
            }
            EffectKind::Burning | EffectKind::Poisoned | EffectKind::Frozen => {
                other.give_effect(&self.effect, ctx);
            }
        }
    }

    pub(crate) fn update(&mut self, body: &mut Body, delta_ms: i64) {
        self.effect.decrease_duration(delta_ms);
        if self.effect.has_expired() {
            body.mark_for_deletion();
        }
    }
}
