//! Projectiles: straight-flying missiles and detonating rockets.
//!
//! # Rocket lifecycle
//!
//! A rocket flies until it hits an opposing living entity (unless it
//! pierces) or runs out of range. It then explodes: it is marked for
//! deletion and hands out one effect zone carrying its detonation effect.
//! A `Boom` detonation is two-phase: an instant one-tick `Boom` zone,
//! followed by a `Repel` zone with the rocket's strength and duration.

use serde::{Deserialize, Serialize};

use crate::context::SimContext;
use crate::effect::{Effect, EffectKind};
use crate::effect_zone::EffectZone;
use crate::entity::{Body, Entity, EntityKind, Team};
use crate::error::{GameError, Result};
use crate::math::{Extent, Vec2};

/// Effect and radius of a rocket's explosion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DetonationRepr", into = "DetonationRepr")]
pub struct Detonation {
    effect: Effect,
    radius: f64,
}

#[derive(Serialize, Deserialize)]
struct DetonationRepr {
    effect: Effect,
    radius: f64,
}

impl Detonation {
    /// Create a detonation. The radius must be non-negative.
    pub fn new(effect: Effect, radius: f64) -> Result<Self> {
        if !(radius >= 0.0) {
            return Err(GameError::NegativeDimensions {
                width: radius,
                height: radius,
            });
        }
        Ok(Self { effect, radius })
    }

    /// Effect handed out by the zone.
    #[must_use]
    pub const fn effect(&self) -> &Effect {
        &self.effect
    }

    /// Zone radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }
}

impl TryFrom<DetonationRepr> for Detonation {
    type Error = GameError;

    fn try_from(repr: DetonationRepr) -> Result<Self> {
        Self::new(repr.effect, repr.radius)
    }
}

impl From<Detonation> for DetonationRepr {
    fn from(d: Detonation) -> Self {
        Self {
            effect: d.effect,
            radius: d.radius,
        }
    }
}

/// Template for the projectiles a weapon or a ranged mob fires.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectileSpec {
    /// Distance travelled before expiring.
    pub range: f64,
    /// Damage per hit (missiles) or per reference frame of contact (rockets).
    pub damage: f64,
    /// Whether the projectile survives hits.
    pub pierces: bool,
    /// Speed in pixels per millisecond.
    pub speed: f64,
    /// Collision box.
    pub size: Extent,
    /// Present for rockets.
    pub detonation: Option<Detonation>,
}

impl ProjectileSpec {
    /// Build a projectile with its top-left corner at `position`, flying
    /// along `direction` at the template speed.
    #[must_use]
    pub fn launch(&self, position: Vec2, direction: Vec2, team: Team) -> Entity {
        let velocity = direction.normalized() * self.speed;
        let missile = Missile::new(velocity, self.range, self.damage, self.pierces);
        let kind = match self.detonation {
            Some(detonation) => EntityKind::Rocket(Rocket::new(missile, detonation)),
            None => EntityKind::Missile(missile),
        };
        Entity::new(kind, Body::new(position, self.size, team))
    }
}

/// A projectile flying in a straight line.
#[derive(Debug, Clone, PartialEq)]
pub struct Missile {
    velocity: Vec2,
    range_left: f64,
    damage: f64,
    pierces: bool,
}

impl Missile {
    /// Create a missile.
    #[must_use]
    pub fn new(velocity: Vec2, range: f64, damage: f64, pierces: bool) -> Self {
        Self {
            velocity,
            range_left: range,
            damage,
            pierces,
        }
    }

    /// Velocity in pixels per millisecond.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Distance left before expiring.
    #[must_use]
    pub const fn range_left(&self) -> f64 {
        self.range_left
    }

    /// Damage value.
    #[must_use]
    pub const fn damage(&self) -> f64 {
        self.damage
    }

    /// Whether the missile survives hits.
    #[must_use]
    pub const fn pierces(&self) -> bool {
        self.pierces
    }

    /// Move by `velocity * delta_ms`. Returns `true` once the range is spent.
    fn advance(&mut self, body: &mut Body, delta_ms: i64) -> bool {
        let step = self.velocity * delta_ms as f64;
        body.position = body.position + step;
        self.range_left -= step.magnitude();
        self.range_left <= 0.0
    }

    /// Fly, and mark for deletion once out of range.
    pub(crate) fn travel(&mut self, body: &mut Body, delta_ms: i64) {
        if self.advance(body, delta_ms) {
            body.mark_for_deletion();
        }
    }

    /// Whether `other` is something this projectile may hit.
    fn can_hit(body: &Body, other: &Entity) -> bool {
        body.team.opposes(other.body.team) && other.is_alive()
    }

    pub(crate) fn collide(&self, body: &mut Body, other: &mut Entity, ctx: &mut SimContext) {
        // A spent bullet must not hit a second overlapping target
        if !self.pierces && body.is_marked() {
            return;
        }
        if !Self::can_hit(body, other) {
            return;
        }
        other.take_damage(self.damage, ctx);
        if !self.pierces {
            body.mark_for_deletion();
        }
    }
}

/// A missile that explodes into an effect zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Rocket {
    missile: Missile,
    radius: f64,
    effect: Option<Effect>,
    exploded: bool,
}

impl Rocket {
    /// Create a rocket.
    #[must_use]
    pub fn new(missile: Missile, detonation: Detonation) -> Self {
        Self {
            missile,
            radius: detonation.radius,
            effect: Some(detonation.effect),
            exploded: false,
        }
    }

    /// Flight state.
    #[must_use]
    pub const fn missile(&self) -> &Missile {
        &self.missile
    }

    /// Whether the rocket has exploded.
    #[must_use]
    pub const fn has_exploded(&self) -> bool {
        self.exploded
    }

    /// Effect the next zone will carry, if any remains.
    #[must_use]
    pub const fn stored_effect(&self) -> Option<&Effect> {
        self.effect.as_ref()
    }

    fn explode(&mut self, body: &mut Body) {
        if self.exploded {
            return;
        }
        self.exploded = true;
        body.mark_for_deletion();
        tracing::debug!(center = %body.center(), radius = self.radius, "rocket exploded");
    }

    pub(crate) fn update(&mut self, body: &mut Body, delta_ms: i64) -> bool {
        if !self.exploded && self.missile.advance(body, delta_ms) {
            self.explode(body);
        }
        self.wants_spawn()
    }

    /// Whether a zone is ready to be harvested.
    #[must_use]
    pub fn wants_spawn(&self) -> bool {
        self.exploded && self.effect.is_some()
    }

    pub(crate) fn collide(
        &mut self,
        body: &mut Body,
        other: &mut Entity,
        delta_ms: i64,
        ctx: &mut SimContext,
    ) {
        if self.exploded || !Missile::can_hit(body, other) {
            return;
        }
        let damage = ctx.config.per_frame_scaled(self.missile.damage, delta_ms);
        other.take_damage(damage, ctx);
        if !self.missile.pierces {
            self.explode(body);
        }
    }

    pub(crate) fn next_spawn(&mut self, body: &Body) -> Option<Entity> {
        if !self.exploded {
            return None;
        }
        let effect = self.effect.take()?;
        let zone_effect = if effect.kind() == EffectKind::Boom {
            // Instant blast now, lingering knockback on the next harvest
            self.effect = Some(Effect::new(
                EffectKind::Repel,
                effect.strength(),
                effect.duration_left(),
            ));
            Effect::new(EffectKind::Boom, effect.strength(), 1)
        } else {
            effect
        };
        match EffectZone::spawn(body.center(), zone_effect, self.radius, body.team) {
            Ok(zone) => Some(zone),
            Err(err) => {
                tracing::warn!(%err, "rocket zone discarded");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(team: Team) -> Body {
        Body::new(Vec2::ZERO, Extent::new(10.0, 10.0).unwrap(), team)
    }

    fn rocket(kind: EffectKind, pierces: bool) -> Rocket {
        let detonation = Detonation::new(Effect::new(kind, 2.0, 500), 40.0).unwrap();
        Rocket::new(Missile::new(Vec2::new(0.1, 0.0), 100.0, 1.0, pierces), detonation)
    }

    #[test]
    fn test_detonation_rejects_negative_radius() {
        assert!(Detonation::new(Effect::default(), -1.0).is_err());
        assert!(ron::from_str::<Detonation>(
            "(effect: (kind: Burning, strength: 0.1, duration_left: 10), radius: -2.0)"
        )
        .is_err());
    }

    #[test]
    fn test_missile_range_consumed_by_distance() {
        let mut m = Missile::new(Vec2::new(0.3, 0.4), 10.0, 1.0, false);
        let mut b = body(Team::Player);
        m.travel(&mut b, 10);
        assert!((m.range_left() - 5.0).abs() < 1e-9);
        assert!(b.position.approx_eq(Vec2::new(3.0, 4.0)));
        assert!(!b.is_marked());
        m.travel(&mut b, 10);
        assert!(b.is_marked());
    }

    #[test]
    fn test_launch_builds_rocket_when_detonating() {
        let spec = ProjectileSpec {
            range: 100.0,
            speed: 0.5,
            detonation: Some(Detonation::new(Effect::default(), 5.0).unwrap()),
            ..ProjectileSpec::default()
        };
        let e = spec.launch(Vec2::ZERO, Vec2::new(0.0, 3.0), Team::Enemy);
        match e.kind {
            EntityKind::Rocket(r) => assert!(r.missile().velocity().approx_eq(Vec2::new(0.0, 0.5))),
            other => panic!("expected rocket, got {other:?}"),
        }
    }

    #[test]
    fn test_rocket_explodes_at_range_end() {
        let mut r = rocket(EffectKind::Burning, true);
        let mut b = body(Team::Player);
        assert!(!r.update(&mut b, 500));
        assert!(r.update(&mut b, 600));
        assert!(r.has_exploded());
        assert!(b.is_marked());
    }

    #[test]
    fn test_rocket_single_zone() {
        let mut r = rocket(EffectKind::Frozen, false);
        let mut b = body(Team::Player);
        assert!(r.next_spawn(&b).is_none());
        r.explode(&mut b);
        let zone = r.next_spawn(&b).expect("zone");
        assert!(zone.is_effect_zone());
        assert_eq!(zone.body.center(), b.center());
        assert!(r.next_spawn(&b).is_none());
        assert!(!r.wants_spawn());
    }

    #[test]
    fn test_boom_rocket_two_phase() {
        let mut r = rocket(EffectKind::Boom, false);
        let mut b = body(Team::Player);
        r.explode(&mut b);

        let first = r.next_spawn(&b).expect("boom zone");
        let EntityKind::EffectZone(zone) = &first.kind else {
            panic!("expected zone");
        };
        assert_eq!(zone.effect().kind(), EffectKind::Boom);
        assert_eq!(zone.effect().duration_left(), 1);

        let stored = r.stored_effect().copied().expect("repel stored");
        assert_eq!(stored.kind(), EffectKind::Repel);
        assert_eq!(stored.strength(), 2.0);
        assert_eq!(stored.duration_left(), 500);

        let second = r.next_spawn(&b).expect("repel zone");
        let EntityKind::EffectZone(zone) = &second.kind else {
            panic!("expected zone");
        };
        assert_eq!(zone.effect().kind(), EffectKind::Repel);
        assert!(r.next_spawn(&b).is_none());
    }
}
