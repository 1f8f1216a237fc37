//! Test fixtures and helpers.
//!
//! Pre-built entities, weapons and game data for consistent testing.

use horde_core::config::SimConfig;
use horde_core::context::SimContext;
use horde_core::data::{GameData, SpawnerData};
use horde_core::effect::{Effect, EffectKind};
use horde_core::entity::{Body, Entity, EntityKind, Team};
use horde_core::loot::LootTables;
use horde_core::math::{Extent, Vec2};
use horde_core::mob::{Mob, RangedMob};
use horde_core::player::{Player, WeaponSlot};
use horde_core::projectile::{Detonation, ProjectileSpec};
use horde_core::registry::Registry;
use horde_core::simulation::Scene;
use horde_core::spawner::MobSpawner;
use horde_core::weapon::Weapon;

/// Game data used across tests: a pistol, a bazooka, a rat, a spitter and
/// a loot table dropping gold and potions.
pub const SAMPLE_GAME_DATA: &str = r#"GameData(
    weapons: [
        WeaponData(
            name: "pistol",
            energy_cost: 2.0,
            use_delay_ms: 150,
            size: (20.0, 10.0),
            projectile: ProjectileData(range: 600.0, damage: 1.0, speed: 0.2, size: (15.0, 15.0)),
        ),
        WeaponData(
            name: "bazooka",
            energy_cost: 25.0,
            use_delay_ms: 900,
            size: (40.0, 16.0),
            projectile: ProjectileData(
                range: 400.0,
                damage: 0.0,
                speed: 0.1,
                size: (30.0, 30.0),
                detonation: Some(DetonationData(effect: Boom, strength: 15.0, duration_ms: 300, radius: 80.0)),
            ),
        ),
    ],
    items: [
        ItemData(name: "gold_coin", kind: Gold, strength: 5.0, size: (16.0, 16.0)),
        ItemData(name: "hp_potion", kind: HpPotion, strength: 25.0, size: (16.0, 16.0)),
        ItemData(name: "pistol", kind: Weapon, weapon: Some("pistol")),
    ],
    mobs: [
        MobData(
            name: "rat",
            health: 3.0,
            speed: 0.05,
            melee_damage: 0.5,
            size: (24.0, 24.0),
            loot_table: "common",
            score: 1,
        ),
        MobData(
            name: "spitter",
            health: 6.0,
            speed: 0.04,
            size: (24.0, 24.0),
            loot_table: "common",
            score: 3,
            ranged: Some(RangedData(
                fire_cooldown_ms: 1200,
                min_range: 150.0,
                max_range: 300.0,
                projectile: ProjectileData(range: 400.0, damage: 4.0, speed: 0.15, size: (8.0, 8.0)),
            )),
        ),
    ],
    loot_tables: [
        LootTableData(name: "common", entries: [
            LootEntry(item: "Nothing", weight: 2.0),
            LootEntry(item: "gold_coin", weight: 1.0),
            LootEntry(item: "hp_potion", weight: 1.0),
        ]),
    ],
)"#;

/// Spawner data matching [`SAMPLE_GAME_DATA`].
pub const SAMPLE_SPAWNER: &str = r#"SpawnerData(
    spawn_radius: 250.0,
    waves: [
        WaveData(trigger_ms: 500, mob: "rat", count: 3),
        WaveData(trigger_ms: 2000, mob: "spitter", count: 1),
        WaveData(trigger_ms: 4000, mob: "rat", count: 5),
    ],
)"#;

/// Size in pixels.
///
/// # Panics
///
/// Panics on negative dimensions.
#[must_use]
pub fn extent(width: f64, height: f64) -> Extent {
    Extent::new(width, height).expect("fixture sizes are non-negative")
}

/// Parsed [`SAMPLE_GAME_DATA`].
///
/// # Panics
///
/// Panics if the sample data fails to parse.
#[must_use]
pub fn sample_game_data() -> GameData {
    GameData::from_ron_str(SAMPLE_GAME_DATA).expect("sample game data parses")
}

/// Parsed [`SAMPLE_SPAWNER`].
///
/// # Panics
///
/// Panics if the sample spawner fails to parse.
#[must_use]
pub fn sample_spawner_data() -> SpawnerData {
    SpawnerData::from_ron_str(SAMPLE_SPAWNER).expect("sample spawner parses")
}

/// Context built from the sample data.
///
/// # Panics
///
/// Panics if the sample data does not build a registry.
#[must_use]
pub fn sample_context(seed: u64) -> SimContext {
    let data = sample_game_data();
    let registry = Registry::from_data(&data).expect("sample registry builds");
    let loot = LootTables::from_data(&data.loot_tables);
    SimContext::new(registry, loot, SimConfig { seed, ..SimConfig::default() })
}

/// Gun with flat damage per hit.
#[must_use]
pub fn pistol(damage: f64) -> Weapon {
    Weapon::new(
        "pistol",
        2.0,
        150,
        extent(20.0, 10.0),
        ProjectileSpec {
            range: 600.0,
            damage,
            pierces: false,
            speed: 0.2,
            size: extent(15.0, 15.0),
            detonation: None,
        },
    )
}

/// Rocket launcher whose rockets detonate into `effect`.
///
/// # Panics
///
/// Panics on a negative radius.
#[must_use]
pub fn launcher(effect: Effect, radius: f64) -> Weapon {
    Weapon::new(
        "launcher",
        25.0,
        900,
        extent(40.0, 16.0),
        ProjectileSpec {
            range: 400.0,
            damage: 0.0,
            pierces: false,
            speed: 0.1,
            size: extent(30.0, 30.0),
            detonation: Some(Detonation::new(effect, radius).expect("non-negative radius")),
        },
    )
}

/// Rocket launcher firing burning rockets.
#[must_use]
pub fn fire_launcher() -> Weapon {
    launcher(Effect::new(EffectKind::Burning, 0.05, 3000), 60.0)
}

/// Player entity, 20x20, optionally holding a weapon in the first slot.
#[must_use]
pub fn player_entity(position: Vec2, health: f64, weapon: Option<Weapon>) -> Entity {
    let mut player = Player::new(health, 0.05, 100.0);
    let mut slot = weapon;
    player.grab_weapon(&mut slot, WeaponSlot::First);
    Entity::new(
        EntityKind::Player(Box::new(player)),
        Body::new(position, extent(20.0, 20.0), Team::Player),
    )
}

/// Melee mob entity, 20x20.
#[must_use]
pub fn mob_entity(position: Vec2, health: f64, speed: f64, melee_damage: f64) -> Entity {
    Entity::new(
        EntityKind::Mob(Box::new(Mob::new(health, speed, melee_damage))),
        Body::new(position, extent(20.0, 20.0), Team::Enemy),
    )
}

/// Ranged mob entity, 20x20, firing 4x4 missiles.
#[must_use]
pub fn ranged_mob_entity(position: Vec2, min_range: f64, max_range: f64) -> Entity {
    let mob = RangedMob::new(
        Mob::new(10.0, 0.05, 0.0),
        500,
        min_range,
        max_range,
        ProjectileSpec {
            range: 1000.0,
            damage: 3.0,
            pierces: false,
            speed: 0.3,
            size: extent(4.0, 4.0),
            detonation: None,
        },
    );
    Entity::new(
        EntityKind::RangedMob(Box::new(mob)),
        Body::new(position, extent(20.0, 20.0), Team::Enemy),
    )
}

/// Arena from the sample data: a player holding a pistol at the origin and
/// the sample spawner.
#[must_use]
pub fn sample_arena(seed: u64) -> Scene {
    let ctx = sample_context(seed);
    let mut scene =
        Scene::new(ctx).with_spawner(MobSpawner::from_data(&sample_spawner_data()));
    scene.add_entity(player_entity(Vec2::ZERO, 100.0, Some(pistol(1.0))));
    scene
}

/// Arena with `mobs` melee mobs in a ring of radius `radius` around a
/// player at the origin.
#[must_use]
pub fn crowd_scene(mobs: usize, radius: f64, seed: u64) -> Scene {
    let mut scene = Scene::new(sample_context(seed));
    let player = scene.add_entity(player_entity(Vec2::ZERO, 1000.0, Some(pistol(1.0))));
    for i in 0..mobs {
        let angle = 360.0 * i as f64 / mobs.max(1) as f64;
        let position = Vec2::RIGHT.rotate(angle) * radius;
        let mut mob = mob_entity(position, 5.0, 0.05, 0.2);
        if let Some(m) = mob.as_mob_mut() {
            m.set_target(Some(player));
        }
        scene.add_entity(mob);
    }
    scene
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data_is_valid() {
        let data = sample_game_data();
        assert!(data.validate().is_empty(), "{:?}", data.validate());
        assert!(sample_spawner_data().validate(&data).is_empty());
    }

    #[test]
    fn test_player_fixture_holds_weapon() {
        let player = player_entity(Vec2::ZERO, 50.0, Some(pistol(1.0)));
        assert!(player.as_player().unwrap().active_weapon().is_some());
    }

    #[test]
    fn test_crowd_scene_targets_player() {
        let scene = crowd_scene(8, 200.0, 1);
        assert_eq!(scene.entities().len(), 9);
        let player = scene.player_id();
        assert!(scene
            .entities()
            .iter()
            .filter(|e| e.is_mob())
            .all(|e| e.target_id() == player));
    }
}
