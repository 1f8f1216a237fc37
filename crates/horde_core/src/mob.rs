//! AI-driven enemies.
//!
//! A [`Mob`] chases its target and hurts players on contact. On death it
//! rolls its loot table once; while that loot waits to be harvested the
//! mob stays in the scene ([`MobPhase::Dying`]) so the drop is never lost
//! to the cleanup sweep.
//!
//! A [`RangedMob`] adds a fire-control loop: approach until within
//! `min_range`, then hold and fire until the target leaves `max_range`.

use crate::context::SimContext;
use crate::entity::{Body, Entity, EntityId, EntityKind, TargetView};
use crate::living::{Living, Vitals};
use crate::math::Vec2;
use crate::projectile::ProjectileSpec;

/// Death and loot-harvest state of a mob.
#[derive(Debug, Clone)]
pub enum MobPhase {
    /// Not dead.
    Alive,
    /// Dead, loot not yet harvested.
    Dying {
        /// Item to drop.
        pending_loot: Box<Entity>,
    },
    /// Dead with nothing left to hand out.
    Dead,
}

/// Melee mob state.
#[derive(Debug, Clone)]
pub struct Mob {
    vitals: Vitals,
    melee_damage: f64,
    target: Option<EntityId>,
    loot_table: String,
    score: u64,
    phase: MobPhase,
}

impl Mob {
    /// Create a mob without loot or score.
    #[must_use]
    pub fn new(health: f64, speed: f64, melee_damage: f64) -> Self {
        Self {
            vitals: Vitals::new(health, speed),
            melee_damage,
            target: None,
            loot_table: String::new(),
            score: 0,
            phase: MobPhase::Alive,
        }
    }

    /// Set the loot table rolled on death.
    #[must_use]
    pub fn with_loot_table(mut self, table: impl Into<String>) -> Self {
        self.loot_table = table.into();
        self
    }

    /// Set the score awarded when swept.
    #[must_use]
    pub fn with_score(mut self, score: u64) -> Self {
        self.score = score;
        self
    }

    /// Contact damage per reference frame.
    #[must_use]
    pub const fn melee_damage(&self) -> f64 {
        self.melee_damage
    }

    /// Chased entity.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Change the chased entity.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    /// Loot table id.
    #[must_use]
    pub fn loot_table(&self) -> &str {
        &self.loot_table
    }

    /// Score value.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Death phase.
    #[must_use]
    pub const fn phase(&self) -> &MobPhase {
        &self.phase
    }

    /// Whether loot waits to be harvested.
    #[must_use]
    pub fn has_pending_loot(&self) -> bool {
        matches!(self.phase, MobPhase::Dying { .. })
    }

    /// Swept only once marked and no loot is pending.
    #[must_use]
    pub fn is_deleted(&self, body: &Body) -> bool {
        body.is_marked() && !self.has_pending_loot()
    }

    /// Hand out the death loot, once.
    pub fn take_loot(&mut self) -> Option<Entity> {
        match std::mem::replace(&mut self.phase, MobPhase::Dead) {
            MobPhase::Dying { pending_loot } => Some(*pending_loot),
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Forget a target that no longer exists.
    fn sync_target(&mut self, target: Option<&TargetView>) {
        if target.is_none() {
            self.target = None;
        }
    }

    fn move_toward(&mut self, body: &mut Body, destination: Vec2, delta_ms: i64) {
        let direction = (destination - body.position).normalized();
        let step = direction * (self.vitals.current_speed() * delta_ms as f64);
        body.position = body.position + step;
        if direction.x() != 0.0 {
            self.vitals.set_looking_left(direction.x() < 0.0);
        }
    }

    pub(crate) fn update(
        &mut self,
        body: &mut Body,
        delta_ms: i64,
        target: Option<&TargetView>,
        ctx: &mut SimContext,
    ) -> bool {
        self.sync_target(target);
        if let Some(target) = target {
            if !self.vitals.is_dead() {
                self.move_toward(body, target.position, delta_ms);
            }
        }
        self.resolve_effects(delta_ms, body, ctx);
        self.has_pending_loot()
    }

    pub(crate) fn collide(
        &mut self,
        body: &mut Body,
        other: &mut Entity,
        delta_ms: i64,
        ctx: &mut SimContext,
    ) {
        if !matches!(other.kind, EntityKind::Player(_)) {
            return;
        }
        self.target = Some(other.id());
        if self.vitals.is_dead() || !body.team.opposes(other.body.team) {
            return;
        }
        let damage = ctx.config.per_frame_scaled(self.melee_damage, delta_ms);
        other.take_damage(damage, ctx);
    }
}

impl Living for Mob {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn on_death(&mut self, body: &mut Body, ctx: &mut SimContext) {
        body.mark_for_deletion();
        self.phase = match ctx.roll_loot(&self.loot_table, body.center()) {
            Some(loot) => MobPhase::Dying {
                pending_loot: Box::new(loot),
            },
            None => MobPhase::Dead,
        };
        tracing::debug!(
            position = %body.position,
            loot = self.has_pending_loot(),
            "mob died"
        );
    }
}

/// Ranged mob state.
#[derive(Debug, Clone)]
pub struct RangedMob {
    mob: Mob,
    fire_cooldown_ms: i64,
    min_range: f64,
    max_range: f64,
    projectile: ProjectileSpec,
    pending: Option<Box<Entity>>,
    cooldown_remaining: i64,
    firing_stance: bool,
}

impl RangedMob {
    /// Create a ranged mob around melee state.
    #[must_use]
    pub fn new(
        mob: Mob,
        fire_cooldown_ms: i64,
        min_range: f64,
        max_range: f64,
        projectile: ProjectileSpec,
    ) -> Self {
        Self {
            mob,
            fire_cooldown_ms,
            min_range,
            max_range,
            projectile,
            pending: None,
            cooldown_remaining: 0,
            firing_stance: false,
        }
    }

    /// Melee state.
    #[must_use]
    pub const fn mob(&self) -> &Mob {
        &self.mob
    }

    /// Mutable melee state.
    pub fn mob_mut(&mut self) -> &mut Mob {
        &mut self.mob
    }

    /// Whether the mob holds position and fires.
    #[must_use]
    pub const fn in_firing_stance(&self) -> bool {
        self.firing_stance
    }

    /// Time until the next shot is allowed.
    #[must_use]
    pub const fn cooldown_remaining(&self) -> i64 {
        self.cooldown_remaining
    }

    /// Whether a projectile is queued.
    #[must_use]
    pub const fn has_pending_projectile(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn update(
        &mut self,
        body: &mut Body,
        delta_ms: i64,
        target: Option<&TargetView>,
        ctx: &mut SimContext,
    ) -> bool {
        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= delta_ms;
        }
        self.mob.sync_target(target);

        if let Some(target) = target {
            if !self.mob.vitals.is_dead() {
                self.engage(body, target, delta_ms);
            }
        }

        self.resolve_effects(delta_ms, body, ctx);
        self.pending.is_some() || self.mob.has_pending_loot()
    }

    fn engage(&mut self, body: &mut Body, target: &TargetView, delta_ms: i64) {
        let center = body.center();
        let distance = center.distance(target.center);

        if distance > self.max_range || (!self.firing_stance && distance > self.min_range) {
            self.firing_stance = false;
            self.mob.move_toward(body, target.position, delta_ms);
            return;
        }

        self.firing_stance = true;
        if self.pending.is_none() && self.cooldown_remaining <= 0 {
            self.cooldown_remaining = self.fire_cooldown_ms;
            let top_left = center - self.projectile.size.half();
            let direction = target.center - center;
            self.pending = Some(Box::new(self.projectile.launch(top_left, direction, body.team)));
            tracing::trace!(distance, "ranged mob fired");
        }
    }

    pub(crate) fn next_spawn(&mut self) -> Option<Entity> {
        self.mob.take_loot().or_else(|| self.pending.take().map(|e| *e))
    }
}

impl Living for RangedMob {
    fn vitals(&self) -> &Vitals {
        &self.mob.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.mob.vitals
    }

    fn on_death(&mut self, body: &mut Body, ctx: &mut SimContext) {
        self.pending = None;
        self.mob.on_death(body, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Team;
    use crate::item::{Item, ItemKind};
    use crate::loot::LootTables;
    use crate::math::Extent;
    use crate::player::Player;

    fn mob_body(x: f64, y: f64) -> Body {
        Body::new(Vec2::new(x, y), Extent::new(10.0, 10.0).unwrap(), Team::Enemy)
    }

    fn player_entity(x: f64, y: f64) -> Entity {
        let mut e = Entity::new(
            EntityKind::Player(Box::new(Player::new(100.0, 0.05, 100.0))),
            Body::new(Vec2::new(x, y), Extent::new(10.0, 10.0).unwrap(), Team::Player),
        );
        e.set_id(7);
        e
    }

    fn view(x: f64, y: f64) -> TargetView {
        TargetView::of(&player_entity(x, y))
    }

    fn ctx_with_coin_loot() -> SimContext {
        let mut ctx = SimContext::default();
        ctx.registry.register_item(
            "coin",
            Item::new(ItemKind::Gold, "coin", 5.0),
            Extent::new(8.0, 8.0).unwrap(),
        );
        ctx.loot = LootTables::default();
        ctx.loot.insert("common", &[("coin".to_string(), 1.0)]);
        ctx
    }

    fn ranged() -> RangedMob {
        RangedMob::new(
            Mob::new(20.0, 0.1, 1.0),
            500,
            100.0,
            200.0,
            ProjectileSpec {
                range: 300.0,
                damage: 3.0,
                speed: 0.3,
                size: Extent::new(4.0, 4.0).unwrap(),
                ..ProjectileSpec::default()
            },
        )
    }

    #[test]
    fn test_moves_toward_target_top_left() {
        let mut mob = Mob::new(10.0, 0.1, 1.0);
        mob.set_target(Some(7));
        let mut body = mob_body(0.0, 0.0);
        let mut ctx = SimContext::default();
        mob.update(&mut body, 100, Some(&view(100.0, 0.0)), &mut ctx);
        assert!(body.position.approx_eq(Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn test_missing_target_is_forgotten() {
        let mut mob = Mob::new(10.0, 0.1, 1.0);
        mob.set_target(Some(7));
        let mut body = mob_body(0.0, 0.0);
        let mut ctx = SimContext::default();
        mob.update(&mut body, 100, None, &mut ctx);
        assert_eq!(mob.target(), None);
        assert_eq!(body.position, Vec2::ZERO);
    }

    #[test]
    fn test_collide_retargets_and_hurts_player() {
        let mut mob = Mob::new(10.0, 0.1, 2.0);
        let mut body = mob_body(0.0, 0.0);
        let mut player = player_entity(0.0, 0.0);
        let mut ctx = SimContext::default();
        mob.collide(&mut body, &mut player, 100, &mut ctx);
        assert_eq!(mob.target(), Some(7));
        // 2 per frame over 6 frames
        let health = player.as_living().unwrap().vitals().health();
        assert!((health - 88.0).abs() < 1e-9);
    }

    #[test]
    fn test_deferred_deletion_until_loot_harvested() {
        let mut mob = Mob::new(10.0, 0.1, 1.0).with_loot_table("common");
        let mut body = mob_body(0.0, 0.0);
        let mut ctx = ctx_with_coin_loot();
        mob.take_damage(50.0, &mut body, &mut ctx);

        assert!(body.is_marked());
        assert!(mob.has_pending_loot());
        assert!(!mob.is_deleted(&body));

        let loot = mob.take_loot().expect("coin");
        assert_eq!(loot.body.center(), body.center());
        assert!(mob.is_deleted(&body));
        assert!(mob.take_loot().is_none());
    }

    #[test]
    fn test_death_without_loot_is_immediately_deleted() {
        let mut mob = Mob::new(10.0, 0.1, 1.0);
        let mut body = mob_body(0.0, 0.0);
        let mut ctx = SimContext::default();
        mob.take_damage(50.0, &mut body, &mut ctx);
        assert!(matches!(mob.phase(), MobPhase::Dead));
        assert!(mob.is_deleted(&body));
    }

    #[test]
    fn test_ranged_approaches_then_fires() {
        let mut mob = ranged();
        mob.mob_mut().set_target(Some(7));
        let mut body = mob_body(0.0, 0.0);
        let mut ctx = SimContext::default();

        // 150 away: within max range but not yet in stance, so approach
        let far = view(150.0, 0.0);
        assert!(!mob.update(&mut body, 100, Some(&far), &mut ctx));
        assert!(!mob.in_firing_stance());
        assert!(body.position.x() > 0.0);

        // Within min range: stance and fire
        let near = view(body.position.x() + 50.0, 0.0);
        assert!(mob.update(&mut body, 16, Some(&near), &mut ctx));
        assert!(mob.in_firing_stance());
        assert_eq!(mob.cooldown_remaining(), 500);
        let shot = mob.next_spawn().expect("projectile");
        assert!(shot.is_projectile());
        assert_eq!(shot.body.team, Team::Enemy);
        assert_eq!(shot.body.center(), body.center());
    }

    #[test]
    fn test_ranged_stance_hysteresis() {
        let mut mob = ranged();
        mob.mob_mut().set_target(Some(7));
        let mut body = mob_body(0.0, 0.0);
        let mut ctx = SimContext::default();

        mob.update(&mut body, 16, Some(&view(50.0, 0.0)), &mut ctx);
        assert!(mob.in_firing_stance());
        mob.next_spawn();

        // Between min and max range: hold position
        let before = body.position;
        mob.update(&mut body, 16, Some(&view(150.0, 0.0)), &mut ctx);
        assert!(mob.in_firing_stance());
        assert_eq!(body.position, before);
        assert!(!mob.has_pending_projectile());

        // Past max range: chase again
        mob.update(&mut body, 16, Some(&view(400.0, 0.0)), &mut ctx);
        assert!(!mob.in_firing_stance());
        assert!(body.position.x() > before.x());
    }

    #[test]
    fn test_dead_ranged_mob_does_not_fire() {
        let mut mob = ranged();
        let mut body = mob_body(0.0, 0.0);
        let mut ctx = SimContext::default();
        mob.take_damage(100.0, &mut body, &mut ctx);
        assert!(!mob.update(&mut body, 16, Some(&view(10.0, 0.0)), &mut ctx));
        assert!(mob.next_spawn().is_none());
    }
}
