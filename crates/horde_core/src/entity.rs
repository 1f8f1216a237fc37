//! Entities and the per-kind collision/update/spawn dispatch.
//!
//! Every simulated object is an [`Entity`]: a shared [`Body`] plus an
//! [`EntityKind`] variant holding the kind-specific state. The scene drives
//! entities only through the dispatch methods defined here.

use std::iter;

use serde::{Deserialize, Serialize};

use crate::context::SimContext;
use crate::effect::Effect;
use crate::effect_zone::EffectZone;
use crate::error::Result;
use crate::item::Item;
use crate::living::Living;
use crate::math::{Extent, Vec2};
use crate::mob::{Mob, RangedMob};
use crate::player::Player;
use crate::projectile::{Missile, Rocket};

/// Unique identifier for entities, assigned by the scene.
pub type EntityId = u64;

/// Faction tag deciding friend and foe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Team {
    /// Neutral (pickups, zones).
    #[default]
    None,
    /// The player's side.
    Player,
    /// Mobs.
    Enemy,
}

impl Team {
    /// Whether an attacker of this team may hurt a member of `other`.
    #[must_use]
    pub fn opposes(self, other: Self) -> bool {
        self != other
    }
}

/// Collision shape derived from an entity's box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle `[position, position + size]`.
    Rect,
    /// Circle inscribed in the box.
    Circle {
        /// Circle radius.
        radius: f64,
    },
}

/// Position, size, team and deletion request shared by all entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Top-left corner.
    pub position: Vec2,
    size: Extent,
    /// Faction.
    pub team: Team,
    marked_for_deletion: bool,
}

impl Body {
    /// Create a body.
    #[must_use]
    pub fn new(position: Vec2, size: Extent, team: Team) -> Self {
        Self {
            position,
            size,
            team,
            marked_for_deletion: false,
        }
    }

    /// Collision box size.
    #[must_use]
    pub const fn size(&self) -> Extent {
        self.size
    }

    /// Change the box size. Negative components are rejected.
    pub fn set_size(&mut self, size: Vec2) -> Result<()> {
        self.size = Extent::try_from(size)?;
        Ok(())
    }

    /// Change the box size to an already validated extent.
    pub fn set_extent(&mut self, size: Extent) {
        self.size = size;
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size.half()
    }

    /// Move the box so that its center lands on `center`.
    pub fn set_center(&mut self, center: Vec2) {
        self.position = center - self.size.half();
    }

    /// Bottom-right corner.
    #[must_use]
    pub fn far_corner(&self) -> Vec2 {
        self.position + self.size.as_vec2()
    }

    /// Request removal at the end of the tick.
    pub fn mark_for_deletion(&mut self) {
        self.marked_for_deletion = true;
    }

    /// Whether removal was requested.
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.marked_for_deletion
    }
}

/// Kind-specific state.
#[derive(Debug, Clone)]
pub enum EntityKind {
    /// Controllable character.
    Player(Box<Player>),
    /// Melee mob.
    Mob(Box<Mob>),
    /// Mob with a ranged attack.
    RangedMob(Box<RangedMob>),
    /// Pickup.
    Item(Box<Item>),
    /// Straight-flying projectile.
    Missile(Missile),
    /// Projectile that detonates into an effect zone.
    Rocket(Rocket),
    /// Circular area handing out an effect.
    EffectZone(EffectZone),
}

/// Read-only snapshot of a target, taken before the target's owner is
/// borrowed mutably.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    /// Target id.
    pub id: EntityId,
    /// Target top-left corner.
    pub position: Vec2,
    /// Target center.
    pub center: Vec2,
    /// Target team.
    pub team: Team,
    /// Whether the target is a living entity that has not died.
    pub alive: bool,
}

impl TargetView {
    /// Snapshot an entity.
    #[must_use]
    pub fn of(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            position: entity.body.position,
            center: entity.body.center(),
            team: entity.body.team,
            alive: entity.as_living().is_some_and(|l| !l.vitals().is_dead()),
        }
    }
}

/// A simulated object.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    /// Shared geometry and flags.
    pub body: Body,
    /// Kind-specific state.
    pub kind: EntityKind,
}

impl Entity {
    /// Create an entity. The id is assigned when it enters a scene.
    #[must_use]
    pub fn new(kind: EntityKind, body: Body) -> Self {
        Self { id: 0, body, kind }
    }

    /// Entity id (0 until added to a scene).
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    /// Short lowercase kind name.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            EntityKind::Player(_) => "player",
            EntityKind::Mob(_) => "mob",
            EntityKind::RangedMob(_) => "ranged_mob",
            EntityKind::Item(_) => "item",
            EntityKind::Missile(_) => "missile",
            EntityKind::Rocket(_) => "rocket",
            EntityKind::EffectZone(_) => "effect_zone",
        }
    }

    /// Collision shape.
    #[must_use]
    pub fn shape(&self) -> Shape {
        match &self.kind {
            EntityKind::EffectZone(zone) => Shape::Circle {
                radius: zone.radius(),
            },
            _ => Shape::Rect,
        }
    }

    /// Whether the collision shapes of two entities overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self.shape(), other.shape()) {
            (Shape::Rect, Shape::Rect) => rects_overlap(&self.body, &other.body),
            (Shape::Circle { radius }, Shape::Rect) => {
                circle_rect_overlap(self.body.center(), radius, &other.body)
            }
            (Shape::Rect, Shape::Circle { radius }) => {
                circle_rect_overlap(other.body.center(), radius, &self.body)
            }
            (Shape::Circle { radius: a }, Shape::Circle { radius: b }) => {
                self.body.center().distance_squared(other.body.center()) < (a + b) * (a + b)
            }
        }
    }

    /// Living capability, if this entity has one.
    #[must_use]
    pub fn as_living(&self) -> Option<&dyn Living> {
        let living: &dyn Living = match &self.kind {
            EntityKind::Player(p) => &**p,
            EntityKind::Mob(m) => &**m,
            EntityKind::RangedMob(m) => &**m,
            _ => return None,
        };
        Some(living)
    }

    /// Body and living capability, borrowed together.
    pub fn living_parts_mut(&mut self) -> Option<(&mut Body, &mut dyn Living)> {
        let Self { body, kind, .. } = self;
        let living: &mut dyn Living = match kind {
            EntityKind::Player(p) => &mut **p,
            EntityKind::Mob(m) => &mut **m,
            EntityKind::RangedMob(m) => &mut **m,
            _ => return None,
        };
        Some((body, living))
    }

    /// Whether this is a living entity that has not died.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.as_living().is_some_and(|l| !l.vitals().is_dead())
    }

    /// Missiles and rockets.
    #[must_use]
    pub fn is_projectile(&self) -> bool {
        matches!(self.kind, EntityKind::Missile(_) | EntityKind::Rocket(_))
    }

    /// Effect zones.
    #[must_use]
    pub fn is_effect_zone(&self) -> bool {
        matches!(self.kind, EntityKind::EffectZone(_))
    }

    /// Melee and ranged mobs.
    #[must_use]
    pub fn is_mob(&self) -> bool {
        matches!(self.kind, EntityKind::Mob(_) | EntityKind::RangedMob(_))
    }

    /// Player state.
    #[must_use]
    pub fn as_player(&self) -> Option<&Player> {
        match &self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    /// Mutable player state.
    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    /// Mob state, for melee and ranged mobs alike.
    #[must_use]
    pub fn as_mob(&self) -> Option<&Mob> {
        match &self.kind {
            EntityKind::Mob(m) => Some(m),
            EntityKind::RangedMob(r) => Some(r.mob()),
            _ => None,
        }
    }

    /// Mutable mob state, for melee and ranged mobs alike.
    pub fn as_mob_mut(&mut self) -> Option<&mut Mob> {
        match &mut self.kind {
            EntityKind::Mob(m) => Some(m),
            EntityKind::RangedMob(r) => Some(r.mob_mut()),
            _ => None,
        }
    }

    /// Entity this one is chasing, if any.
    #[must_use]
    pub fn target_id(&self) -> Option<EntityId> {
        self.as_mob().and_then(Mob::target)
    }

    /// Score awarded when this entity is swept.
    #[must_use]
    pub fn score_value(&self) -> u64 {
        self.as_mob().map_or(0, Mob::score)
    }

    /// Inflict damage. No-op for non-living entities.
    pub fn take_damage(&mut self, amount: f64, ctx: &mut SimContext) {
        if let Some((body, living)) = self.living_parts_mut() {
            living.take_damage(amount, body, ctx);
        }
    }

    /// Overwrite health. No-op for non-living entities.
    pub fn set_health(&mut self, value: f64, ctx: &mut SimContext) {
        if let Some((body, living)) = self.living_parts_mut() {
            living.set_health(value, body, ctx);
        }
    }

    /// Apply a status effect. No-op for non-living entities.
    pub fn give_effect(&mut self, effect: &Effect, ctx: &mut SimContext) {
        if let Some((body, living)) = self.living_parts_mut() {
            living.give_effect(effect, body, ctx);
        }
    }

    /// React to overlapping `other`. Called once per ordered overlapping
    /// pair, so `other` reacts to `self` in its own call.
    pub fn on_collide(&mut self, other: &mut Self, delta_ms: i64, ctx: &mut SimContext) {
        tracing::trace!(a = self.id, b = other.id, "collision");
        let Self { body, kind, .. } = self;
        match kind {
            EntityKind::Player(player) => player.collide(other),
            EntityKind::Mob(mob) => mob.collide(body, other, delta_ms, ctx),
            EntityKind::RangedMob(ranged) => ranged.mob_mut().collide(body, other, delta_ms, ctx),
            EntityKind::Item(_) => {}
            EntityKind::Missile(missile) => missile.collide(body, other, ctx),
            EntityKind::Rocket(rocket) => rocket.collide(body, other, delta_ms, ctx),
            EntityKind::EffectZone(zone) => zone.collide(body, other, ctx),
        }
    }

    /// Advance time-based state by `delta_ms`.
    ///
    /// `target` is a snapshot of the entity named by [`Self::target_id`],
    /// `None` when it no longer exists. Returns whether
    /// [`Self::get_spawned`] has something to hand out.
    pub fn on_update(
        &mut self,
        delta_ms: i64,
        target: Option<&TargetView>,
        ctx: &mut SimContext,
    ) -> bool {
        let Self { body, kind, .. } = self;
        match kind {
            EntityKind::Player(player) => player.update(body, delta_ms, ctx),
            EntityKind::Mob(mob) => mob.update(body, delta_ms, target, ctx),
            EntityKind::RangedMob(ranged) => ranged.update(body, delta_ms, target, ctx),
            EntityKind::Item(_) => false,
            EntityKind::Missile(missile) => {
                missile.travel(body, delta_ms);
                false
            }
            EntityKind::Rocket(rocket) => rocket.update(body, delta_ms),
            EntityKind::EffectZone(zone) => {
                zone.update(body, delta_ms);
                false
            }
        }
    }

    /// Pull one pending spawn, transferring ownership to the caller.
    pub fn get_spawned(&mut self) -> Option<Self> {
        let Self { body, kind, .. } = self;
        match kind {
            EntityKind::Player(player) => player.next_spawn(body),
            EntityKind::Mob(mob) => mob.take_loot(),
            EntityKind::RangedMob(ranged) => ranged.next_spawn(),
            EntityKind::Rocket(rocket) => rocket.next_spawn(body),
            EntityKind::Item(_) | EntityKind::Missile(_) | EntityKind::EffectZone(_) => None,
        }
    }

    /// Drain every pending spawn.
    pub fn spawned(&mut self) -> impl Iterator<Item = Self> + '_ {
        iter::from_fn(move || self.get_spawned())
    }

    /// Whether the entity should be swept. Mobs holding loot stay until it
    /// is harvested.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        match &self.kind {
            EntityKind::Mob(mob) => mob.is_deleted(&self.body),
            EntityKind::RangedMob(ranged) => ranged.mob().is_deleted(&self.body),
            _ => self.body.is_marked(),
        }
    }
}

fn rects_overlap(a: &Body, b: &Body) -> bool {
    let (a_min, a_max) = (a.position, a.far_corner());
    let (b_min, b_max) = (b.position, b.far_corner());
    a_min.x() < b_max.x() && b_min.x() < a_max.x() && a_min.y() < b_max.y() && b_min.y() < a_max.y()
}

fn circle_rect_overlap(center: Vec2, radius: f64, rect: &Body) -> bool {
    let closest = center.max(rect.position).min(rect.far_corner());
    center.distance_squared(closest) < radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Effect, EffectKind};
    use crate::item::{Item, ItemKind};

    fn item_at(x: f64, y: f64, w: f64, h: f64) -> Entity {
        Entity::new(
            EntityKind::Item(Box::new(Item::new(ItemKind::Gold, "coin", 1.0))),
            Body::new(Vec2::new(x, y), Extent::new(w, h).unwrap(), Team::None),
        )
    }

    fn zone_at(center: Vec2, radius: f64) -> Entity {
        EffectZone::spawn(center, Effect::new(EffectKind::Burning, 0.1, 100), radius, Team::None)
            .unwrap()
    }

    #[test]
    fn test_body_center_and_size() {
        let mut body = Body::new(Vec2::new(10.0, 20.0), Extent::new(4.0, 6.0).unwrap(), Team::None);
        assert_eq!(body.center(), Vec2::new(12.0, 23.0));
        assert!(body.set_size(Vec2::new(-1.0, 2.0)).is_err());
        assert_eq!(body.size(), Extent::new(4.0, 6.0).unwrap());
        body.set_center(Vec2::ZERO);
        assert_eq!(body.position, Vec2::new(-2.0, -3.0));
    }

    #[test]
    fn test_rect_overlap_requires_interior_intersection() {
        let a = item_at(0.0, 0.0, 10.0, 10.0);
        let b = item_at(5.0, 5.0, 10.0, 10.0);
        let touching = item_at(10.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&touching));
    }

    #[test]
    fn test_circle_rect_overlap() {
        let zone = zone_at(Vec2::ZERO, 10.0);
        // Box corner is inside the square hull but outside the circle
        let corner = item_at(8.0, 8.0, 5.0, 5.0);
        let edge = item_at(9.0, -1.0, 5.0, 2.0);
        assert!(!zone.overlaps(&corner));
        assert!(zone.overlaps(&edge));
        assert!(edge.overlaps(&zone));
    }

    #[test]
    fn test_circle_circle_overlap() {
        let a = zone_at(Vec2::ZERO, 5.0);
        let b = zone_at(Vec2::new(9.0, 0.0), 5.0);
        let c = zone_at(Vec2::new(11.0, 0.0), 5.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_team_opposition() {
        assert!(Team::Player.opposes(Team::Enemy));
        assert!(!Team::Enemy.opposes(Team::Enemy));
    }

    #[test]
    fn test_items_are_not_living() {
        let mut item = item_at(0.0, 0.0, 1.0, 1.0);
        assert!(item.as_living().is_none());
        assert!(!item.is_alive());
        let mut ctx = SimContext::default();
        item.take_damage(5.0, &mut ctx);
        assert!(!item.is_deleted());
        assert!(item.get_spawned().is_none());
    }
}
