//! Scene loop.
//!
//! The scene owns every live entity, the simulation context and the mob
//! spawner, and advances them one tick at a time.
//!
//! # Tick order
//!
//! 1. **Collision** - every ordered pair of overlapping entities, in id order
//! 2. **Update** - each entity present at the start of the tick updates once
//!    and hands over its pending spawns; spawned entities join next tick
//! 3. **Cleanup** - entities flagged deleted are swept, mobs award score
//! 4. **Spawner** - scene time advances and due mobs are drained
//!
//! # Determinism
//!
//! Entities are stored in id order and all randomness comes from the
//! context's seeded RNG, so the same inputs always produce the same
//! [`Scene::state_hash`].
//!
//! # Example
//!
//! ```
//! use horde_core::context::SimContext;
//! use horde_core::entity::{Body, Entity, EntityKind, Team};
//! use horde_core::math::{Extent, Vec2};
//! use horde_core::player::Player;
//! use horde_core::simulation::Scene;
//!
//! let mut scene = Scene::new(SimContext::default());
//! let player = Entity::new(
//!     EntityKind::Player(Box::new(Player::new(100.0, 0.05, 100.0))),
//!     Body::new(Vec2::ZERO, Extent::new(20.0, 20.0).unwrap(), Team::Player),
//! );
//! scene.add_entity(player);
//! scene.on_tick(16);
//! assert_eq!(scene.tick(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::context::SimContext;
use crate::entity::{Entity, EntityId, EntityKind, TargetView};
use crate::player::Player;
use crate::spawner::MobSpawner;

/// Live entities in ascending id order.
#[derive(Debug, Clone)]
pub struct EntityStorage {
    entities: Vec<Entity>,
    next_id: EntityId,
}

impl EntityStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Insert an entity and return its new id.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        entity.set_id(id);
        self.entities.push(entity);
        id
    }

    /// Remove an entity by id.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.index_of(id)?;
        Some(self.entities.remove(index))
    }

    /// Get an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    /// Get a mutable reference to an entity by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(|i| &mut self.entities[i])
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether there are no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(Entity::id).collect()
    }

    /// Iterate in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Iterate mutably in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, Entity::id).ok()
    }

    /// Two distinct entities by index.
    fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Entity, &mut Entity) {
        debug_assert_ne!(a, b);
        if a < b {
            let (left, right) = self.entities.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.entities.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }
}

impl Default for EntityStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// Entities handed out by other entities during the update pass.
    pub spawned: Vec<EntityId>,
    /// Entities swept in the cleanup pass.
    pub removed: Vec<EntityId>,
    /// Living entities among `removed`.
    pub deaths: Vec<EntityId>,
    /// Mobs produced by the spawner.
    pub mobs_spawned: Vec<EntityId>,
    /// Score awarded this tick.
    pub score_gained: u64,
}

/// The live entity set and everything needed to advance it.
#[derive(Debug, Clone)]
pub struct Scene {
    tick: u64,
    scene_time_ms: i64,
    entities: EntityStorage,
    ctx: SimContext,
    spawner: Option<MobSpawner>,
    player: Option<EntityId>,
    score: u64,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new(ctx: SimContext) -> Self {
        Self {
            tick: 0,
            scene_time_ms: 0,
            entities: EntityStorage::new(),
            ctx,
            spawner: None,
            player: None,
            score: 0,
        }
    }

    /// Attach a mob spawner.
    #[must_use]
    pub fn with_spawner(mut self, spawner: MobSpawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Take ownership of `entity` and return its id. The first player added
    /// becomes the spawner's target.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let is_player = matches!(entity.kind, EntityKind::Player(_));
        let id = self.entities.insert(entity);
        if is_player && self.player.is_none() {
            self.player = Some(id);
        }
        tracing::debug!(id, "entity added");
        id
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Elapsed scene time.
    #[must_use]
    pub const fn scene_time(&self) -> i64 {
        self.scene_time_ms
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Live entities.
    #[must_use]
    pub fn entities(&self) -> &EntityStorage {
        &self.entities
    }

    /// Mutable live entities.
    pub fn entities_mut(&mut self) -> &mut EntityStorage {
        &mut self.entities
    }

    /// Simulation context.
    #[must_use]
    pub fn ctx(&self) -> &SimContext {
        &self.ctx
    }

    /// Mutable simulation context.
    pub fn ctx_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    /// Mob spawner, if any.
    #[must_use]
    pub fn spawner(&self) -> Option<&MobSpawner> {
        self.spawner.as_ref()
    }

    /// Id of the player entity, if it is still in the scene.
    #[must_use]
    pub fn player_id(&self) -> Option<EntityId> {
        self.player.filter(|id| self.entities.contains(*id))
    }

    /// The player entity.
    #[must_use]
    pub fn player_entity(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.entities.get(id))
    }

    /// Player state.
    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        self.player_entity().and_then(Entity::as_player)
    }

    /// Mutable player state, for the input layer.
    pub fn player_mut(&mut self) -> Option<&mut Player> {
        let id = self.player?;
        self.entities.get_mut(id).and_then(Entity::as_player_mut)
    }

    /// Advance the scene by `delta_ms` milliseconds.
    pub fn on_tick(&mut self, delta_ms: i64) -> TickEvents {
        let mut events = TickEvents::default();

        self.run_collisions(delta_ms);
        events.spawned = self.run_updates(delta_ms);
        self.run_cleanup(&mut events);
        events.mobs_spawned = self.run_spawner(delta_ms);

        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Scene state hash");
        }

        events
    }

    fn run_collisions(&mut self, delta_ms: i64) {
        let count = self.entities.len();
        for i in 0..count {
            for j in 0..count {
                if i == j {
                    continue;
                }
                let (a, b) = self.entities.pair_mut(i, j);
                if a.overlaps(b) {
                    a.on_collide(b, delta_ms, &mut self.ctx);
                }
            }
        }
    }

    fn run_updates(&mut self, delta_ms: i64) -> Vec<EntityId> {
        let mut spawned_ids = Vec::new();
        let count = self.entities.len();
        let mut spawned = Vec::new();
        for i in 0..count {
            let target = self.entities.entities[i]
                .target_id()
                .and_then(|id| self.entities.get(id))
                .map(TargetView::of);

            let entity = &mut self.entities.entities[i];
            entity.on_update(delta_ms, target.as_ref(), &mut self.ctx);
            spawned.extend(entity.spawned());
        }
        for entity in spawned {
            tracing::debug!(kind = entity.kind_name(), "entity spawned");
            spawned_ids.push(self.entities.insert(entity));
        }
        spawned_ids
    }

    fn run_cleanup(&mut self, events: &mut TickEvents) {
        let mut gained = 0;
        self.entities.entities.retain(|entity| {
            if !entity.is_deleted() {
                return true;
            }
            gained += entity.score_value();
            events.removed.push(entity.id());
            if entity.as_living().is_some() {
                events.deaths.push(entity.id());
            }
            false
        });
        if gained > 0 {
            tracing::debug!(score = gained, "score awarded");
        }
        self.score += gained;
        events.score_gained = gained;
    }

    fn run_spawner(&mut self, delta_ms: i64) -> Vec<EntityId> {
        self.scene_time_ms += delta_ms;
        let Some(spawner) = self.spawner.as_mut() else {
            return Vec::new();
        };
        let target = self
            .player
            .and_then(|id| self.entities.get(id))
            .map(TargetView::of);

        let mut ids = Vec::new();
        while let Some(mob) = spawner.get_spawned(self.scene_time_ms, target.as_ref(), &mut self.ctx)
        {
            ids.push(self.entities.insert(mob));
        }
        ids
    }

    /// Hash of the scene state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.scene_time_ms.hash(&mut hasher);
        self.score.hash(&mut hasher);
        self.entities.len().hash(&mut hasher);

        for entity in self.entities.iter() {
            entity.id().hash(&mut hasher);
            entity.kind_name().hash(&mut hasher);
            entity.body.position.x().to_bits().hash(&mut hasher);
            entity.body.position.y().to_bits().hash(&mut hasher);
            entity.body.is_marked().hash(&mut hasher);

            if let Some(living) = entity.as_living() {
                let vitals = living.vitals();
                vitals.health().to_bits().hash(&mut hasher);
                vitals.is_dead().hash(&mut hasher);
                for effect in [vitals.burning(), vitals.poisoned(), vitals.frozen()] {
                    effect.strength().to_bits().hash(&mut hasher);
                    effect.duration_left().hash(&mut hasher);
                }
            }
            if let Some(player) = entity.as_player() {
                player.energy().to_bits().hash(&mut hasher);
                player.gold().hash(&mut hasher);
            }
        }

        if let Some(spawner) = &self.spawner {
            spawner.next_index().hash(&mut hasher);
            spawner.spawned_in_trigger().hash(&mut hasher);
            spawner.loop_offset_ms().hash(&mut hasher);
        }

        hasher.finish()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SimContext::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Effect, EffectKind};
    use crate::effect_zone::EffectZone;
    use crate::entity::{Body, Team};
    use crate::living::Living;
    use crate::math::{Extent, Vec2};
    use crate::mob::Mob;
    use crate::player::WeaponSlot;
    use crate::projectile::ProjectileSpec;
    use crate::spawner::WaveTrigger;
    use crate::weapon::Weapon;

    fn player_at(position: Vec2) -> Entity {
        Entity::new(
            EntityKind::Player(Box::new(Player::new(100.0, 0.05, 100.0))),
            Body::new(position, Extent::new(20.0, 20.0).unwrap(), Team::Player),
        )
    }

    fn mob_at(position: Vec2, health: f64) -> Entity {
        Entity::new(
            EntityKind::Mob(Box::new(Mob::new(health, 0.05, 1.0).with_score(7))),
            Body::new(position, Extent::new(20.0, 20.0).unwrap(), Team::Enemy),
        )
    }

    fn pistol() -> Weapon {
        Weapon::new(
            "pistol",
            1.0,
            100,
            Extent::new(10.0, 5.0).unwrap(),
            ProjectileSpec {
                range: 500.0,
                damage: 50.0,
                pierces: false,
                speed: 0.5,
                size: Extent::new(4.0, 4.0).unwrap(),
                detonation: None,
            },
        )
    }

    #[test]
    fn test_storage_ids_start_at_one() {
        let mut storage = EntityStorage::new();
        let a = storage.insert(mob_at(Vec2::ZERO, 1.0));
        let b = storage.insert(mob_at(Vec2::ZERO, 1.0));
        assert_eq!((a, b), (1, 2));
        assert!(storage.remove(a).is_some());
        assert!(!storage.contains(a));
        assert_eq!(storage.ids(), vec![b]);
    }

    #[test]
    fn test_tick_increments() {
        let mut scene = Scene::default();
        scene.on_tick(16);
        scene.on_tick(16);
        assert_eq!(scene.tick(), 2);
        assert_eq!(scene.scene_time(), 32);
    }

    #[test]
    fn test_first_player_is_tracked() {
        let mut scene = Scene::default();
        scene.add_entity(mob_at(Vec2::ZERO, 1.0));
        let id = scene.add_entity(player_at(Vec2::ZERO));
        scene.add_entity(player_at(Vec2::ZERO));
        assert_eq!(scene.player_id(), Some(id));
        assert!(scene.player_mut().is_some());
    }

    #[test]
    fn test_melee_mob_hurts_player() {
        let mut scene = Scene::default();
        scene.add_entity(player_at(Vec2::ZERO));
        let mob = scene.add_entity(mob_at(Vec2::new(5.0, 5.0), 10.0));
        scene.on_tick(100);
        let health = scene.player().unwrap().vitals().health();
        assert!(health < 100.0);
        let mob = scene.entities().get(mob).unwrap();
        assert_eq!(mob.target_id(), scene.player_id());
    }

    #[test]
    fn test_shot_spawns_next_tick_and_kills() {
        let mut scene = Scene::default();
        let player_id = scene.add_entity(player_at(Vec2::ZERO));
        scene.add_entity(mob_at(Vec2::new(60.0, 0.0), 40.0));
        {
            let player = scene.player_mut().unwrap();
            let mut slot = Some(pistol());
            assert!(player.grab_weapon(&mut slot, WeaponSlot::First));
            player.set_target_direction(Vec2::RIGHT);
            player.set_using_weapon(true);
        }

        let events = scene.on_tick(16);
        assert_eq!(events.spawned.len(), 1);
        let missile = events.spawned[0];
        assert!(missile > player_id);

        let mut total_score = 0;
        for _ in 0..20 {
            scene.player_mut().unwrap().set_using_weapon(false);
            total_score += scene.on_tick(16).score_gained;
        }
        assert_eq!(total_score, 7);
        assert_eq!(scene.score(), 7);
        assert!(!scene.entities().iter().any(Entity::is_mob));
    }

    #[test]
    fn test_spawned_entity_waits_for_next_tick() {
        let mut scene = Scene::default();
        scene.add_entity(player_at(Vec2::ZERO));
        let mob_id = scene.add_entity(mob_at(Vec2::new(22.0, 0.0), 40.0));
        {
            let player = scene.player_mut().unwrap();
            let mut slot = Some(pistol());
            assert!(player.grab_weapon(&mut slot, WeaponSlot::First));
            player.set_target_direction(Vec2::RIGHT);
            player.set_using_weapon(true);
        }

        let events = scene.on_tick(16);
        let missile = events.spawned[0];
        // Neither moved nor collided during the tick that created it.
        let body = &scene.entities().get(missile).unwrap().body;
        assert_eq!(body.position, Vec2::new(20.0, 8.0));
        let mob = scene.entities().get(mob_id).unwrap();
        assert_eq!(mob.as_living().unwrap().vitals().health(), 40.0);

        scene.player_mut().unwrap().set_using_weapon(false);
        let events = scene.on_tick(16);
        assert_eq!(events.deaths, vec![mob_id]);
        assert!(!scene.entities().contains(mob_id));
    }

    #[test]
    fn test_zone_expires_and_is_swept() {
        let mut scene = Scene::default();
        let zone = EffectZone::spawn(
            Vec2::ZERO,
            Effect::new(EffectKind::Burning, 0.1, 20),
            10.0,
            Team::None,
        )
        .unwrap();
        let id = scene.add_entity(zone);
        let events = scene.on_tick(16);
        assert!(events.removed.is_empty());
        let events = scene.on_tick(16);
        assert_eq!(events.removed, vec![id]);
        assert!(events.deaths.is_empty());
    }

    #[test]
    fn test_spawner_targets_player() {
        let ctx = {
            let mut ctx = SimContext::default();
            ctx.registry.register_mob(
                "rat",
                Mob::new(5.0, 0.0, 0.0),
                Extent::new(10.0, 10.0).unwrap(),
            );
            ctx
        };
        let mut scene = Scene::new(ctx)
            .with_spawner(MobSpawner::new(vec![WaveTrigger::new(32, "rat", 3)], 500.0));
        let player = scene.add_entity(player_at(Vec2::ZERO));

        assert!(scene.on_tick(16).mobs_spawned.is_empty());
        let events = scene.on_tick(16);
        assert_eq!(events.mobs_spawned.len(), 3);
        for id in events.mobs_spawned {
            assert_eq!(scene.entities().get(id).unwrap().target_id(), Some(player));
        }
    }

    #[test]
    fn test_deterministic_hash() {
        let build = || {
            let mut ctx = SimContext::default();
            ctx.registry.register_mob(
                "rat",
                Mob::new(5.0, 0.05, 0.5),
                Extent::new(10.0, 10.0).unwrap(),
            );
            let mut scene = Scene::new(ctx)
                .with_spawner(MobSpawner::new(vec![WaveTrigger::new(100, "rat", 4)], 80.0));
            scene.add_entity(player_at(Vec2::ZERO));
            scene
        };
        let mut a = build();
        let mut b = build();
        for _ in 0..50 {
            a.on_tick(16);
            b.on_tick(16);
        }
        assert_eq!(a.state_hash(), b.state_hash());

        b.on_tick(16);
        assert_ne!(a.state_hash(), b.state_hash());
    }
}
