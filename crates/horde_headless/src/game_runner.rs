//! Real game execution for headless testing.
//!
//! This module builds a [`Scene`] from game data and a [`Scenario`], drives
//! the player with an [`Autopilot`] and collects [`GameMetrics`].
//!
//! Every run is bounded by the scenario's `max_ticks`; a game ends early
//! when the player dies.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use horde_core::entity::{Body, Entity, EntityId, EntityKind, Team};
use horde_core::item::ItemKind;
use horde_core::living::Living;
use horde_core::math::Vec2;
use horde_core::player::{Axis, Player, WeaponSlot};
use horde_core::simulation::Scene;
use horde_core::spawner::MobSpawner;

use crate::data_loader::{build_context, DataLoadError, GameBundle};
use crate::metrics::{GameMetrics, MetricsCollector};
use crate::scenario::Scenario;

/// Progress logging interval (ticks).
const PROGRESS_LOG_INTERVAL: u64 = 3600;

/// Build the starting scene of `scenario`.
///
/// Unknown weapon and item names are logged and skipped. The scenario's
/// own spawner wins over the bundle's default one.
pub fn build_scene(
    scenario: &Scenario,
    bundle: &GameBundle,
    seed: u64,
) -> Result<Scene, DataLoadError> {
    let config = scenario.config_with_seed(seed);
    let ctx = build_context(&bundle.data, config.clone())?;

    let mut scene = Scene::new(ctx);
    if let Some(spawner) = scenario.spawner.as_ref().or(bundle.spawner.as_ref()) {
        for problem in spawner.validate(&bundle.data) {
            warn!("Scenario '{}': {}", scenario.name, problem);
        }
        scene = scene.with_spawner(MobSpawner::from_data(spawner));
    }

    let setup = &scenario.player;
    let mut player = Player::new(
        setup.health,
        setup.speed.unwrap_or(config.player_speed),
        setup.energy.unwrap_or(config.player_energy),
    );
    for (slot, name) in [WeaponSlot::First, WeaponSlot::Second]
        .into_iter()
        .zip(&setup.weapons)
    {
        match scene.ctx().registry.weapon(name) {
            Ok(weapon) => {
                player.grab_weapon(&mut Some(weapon), slot);
            }
            Err(e) => warn!("Scenario '{}': {}", scenario.name, e),
        }
    }
    if setup.weapons.len() > 2 {
        warn!(
            "Scenario '{}': only two weapon slots, ignoring {} weapons",
            scenario.name,
            setup.weapons.len() - 2
        );
    }
    let position = Vec2::new(setup.position.0, setup.position.1);
    scene.add_entity(Entity::new(
        EntityKind::Player(Box::new(player)),
        Body::new(position, setup.size, Team::Player),
    ));

    for placement in &scenario.items {
        match scene.ctx().registry.item(&placement.item) {
            Ok(mut item) => {
                item.body
                    .set_center(Vec2::new(placement.position.0, placement.position.1));
                scene.add_entity(item);
            }
            Err(e) => warn!("Scenario '{}': {}", scenario.name, e),
        }
    }

    debug!(
        scenario = %scenario.name,
        seed,
        entities = scene.entities().len(),
        "Scene built"
    );
    Ok(scene)
}

/// One tick's worth of player input chosen by the [`Autopilot`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Decision {
    /// Movement direction, at most unit length.
    pub movement: Vec2,
    /// Aim direction; zero aims where the player faces.
    pub aim: Vec2,
    /// Hold the fire action.
    pub fire: bool,
    /// Press grab.
    pub grab: bool,
    /// Toggle to the other weapon slot.
    pub switch_weapon: bool,
}

/// Simple survival strategy.
///
/// Aims at and fires on the nearest living enemy, backs away from enemies
/// closer than `kite_distance`, otherwise walks to the nearest pickup within
/// `pickup_range` and grabs pickups it stands on. Weapon pickups are left
/// alone. Switches slot when the active one is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Autopilot {
    /// Enemies closer than this are kited.
    pub kite_distance: f64,
    /// Pickups farther than this are ignored.
    pub pickup_range: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            kite_distance: 120.0,
            pickup_range: 400.0,
        }
    }
}

impl Autopilot {
    /// Choose the input for the next tick. `None` without a living player.
    #[must_use]
    pub fn decide(&self, scene: &Scene) -> Option<Decision> {
        let player_entity = scene.player_entity()?;
        let player = player_entity.as_player()?;
        if player.vitals().is_dead() {
            return None;
        }
        let center = player_entity.body.center();

        let nearest_enemy = scene
            .entities()
            .iter()
            .filter(|e| e.body.team == Team::Enemy && e.is_alive())
            .map(|e| e.body.center())
            .min_by(|a, b| a.distance(center).total_cmp(&b.distance(center)));

        let nearest_pickup = scene
            .entities()
            .iter()
            .filter(|e| is_pickup(e))
            .map(|e| e.body.center())
            .filter(|p| p.distance(center) <= self.pickup_range)
            .min_by(|a, b| a.distance(center).total_cmp(&b.distance(center)));

        let movement = match (nearest_enemy, nearest_pickup) {
            (Some(enemy), _) if enemy.distance(center) < self.kite_distance => {
                (center - enemy).normalized()
            }
            (_, Some(pickup)) => (pickup - center).normalized(),
            _ => Vec2::ZERO,
        };

        let active = player.active_slot();
        Some(Decision {
            movement,
            aim: nearest_enemy.map_or(Vec2::ZERO, |enemy| (enemy - center).normalized()),
            fire: nearest_enemy.is_some(),
            grab: scene
                .entities()
                .iter()
                .any(|e| is_pickup(e) && e.overlaps(player_entity)),
            switch_weapon: !player.has_weapon(active) && player.has_weapon(active.other()),
        })
    }

    /// Decide and apply the input to the scene's player.
    pub fn steer(&self, scene: &mut Scene) {
        let Some(decision) = self.decide(scene) else {
            return;
        };
        if let Some(player) = scene.player_mut() {
            apply_decision(player, &decision);
        }
    }
}

fn is_pickup(entity: &Entity) -> bool {
    !entity.body.is_marked()
        && matches!(&entity.kind, EntityKind::Item(item) if item.kind() != ItemKind::Weapon)
}

/// Translate a decision into held input actions.
pub fn apply_decision(player: &mut Player, decision: &Decision) {
    let m = decision.movement;
    player.set_movement(Axis::Right, m.x().max(0.0));
    player.set_movement(Axis::Left, (-m.x()).max(0.0));
    player.set_movement(Axis::Down, m.y().max(0.0));
    player.set_movement(Axis::Up, (-m.y()).max(0.0));
    player.set_target_direction(decision.aim);
    player.set_using_weapon(decision.fire);
    player.set_grab_pressed(decision.grab);
    if decision.switch_weapon {
        player.change_active_weapon();
    }
}

/// High-level game runner for headless testing.
///
/// Provides a convenient interface to run complete games with the
/// autopilot and metrics collection.
#[derive(Debug, Clone, Default)]
pub struct GameRunner {
    /// Default max ticks if not specified in config.
    pub default_max_ticks: u64,
}

impl GameRunner {
    /// Create a new game runner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_max_ticks: 3600,
        }
    }

    /// Run a game with the given configuration.
    pub fn run(&self, mut config: GameConfig) -> Result<GameResult, DataLoadError> {
        if config.max_ticks == 0 {
            config.max_ticks = self.default_max_ticks;
        }
        run_game(config)
    }
}

/// Configuration for a single game run.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Random seed for determinism.
    pub seed: u64,
    /// Maximum ticks before the player is declared a survivor.
    pub max_ticks: u64,
    /// Scenario to use.
    pub scenario: Scenario,
    /// Game data shared between parallel games.
    pub bundle: Arc<GameBundle>,
    /// Player strategy; `None` leaves the player idle.
    pub autopilot: Option<Autopilot>,
    /// Game ID for tracking.
    pub game_id: String,
}

impl GameConfig {
    /// Configuration taking ticks, seed and autopilot from `scenario`.
    #[must_use]
    pub fn from_scenario(scenario: Scenario, bundle: Arc<GameBundle>) -> Self {
        let seed = scenario.config.seed;
        Self {
            seed,
            max_ticks: scenario.max_ticks,
            autopilot: scenario.autopilot.then(Autopilot::default),
            game_id: format!("{}_{}", scenario.name, seed),
            scenario,
            bundle,
        }
    }

    /// Same configuration with another seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.game_id = format!("{}_{}", self.scenario.name, seed);
        self
    }
}

/// Outcome of a single game.
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Collected metrics.
    pub metrics: GameMetrics,
    /// Scene hash after the last tick.
    pub final_state_hash: u64,
}

/// Run a complete game.
pub fn run_game(config: GameConfig) -> Result<GameResult, DataLoadError> {
    let game_start = Instant::now();
    info!(
        game_id = %config.game_id,
        seed = config.seed,
        max_ticks = config.max_ticks,
        scenario = %config.scenario.name,
        "Starting game simulation"
    );

    let mut scene = build_scene(&config.scenario, &config.bundle, config.seed)?;
    let tick_ms = config.scenario.config.tick_ms;
    let mut collector = MetricsCollector::new(&config.game_id, &config.scenario.name, config.seed);

    for _ in 0..config.max_ticks {
        if let Some(autopilot) = &config.autopilot {
            autopilot.steer(&mut scene);
        }

        let kinds: BTreeMap<EntityId, &'static str> = scene
            .entities()
            .iter()
            .filter(|e| e.as_living().is_some())
            .map(|e| (e.id(), e.kind_name()))
            .collect();

        let events = scene.on_tick(tick_ms);

        let removed_kinds: Vec<&str> = events
            .deaths
            .iter()
            .filter_map(|id| kinds.get(id).copied())
            .collect();
        collector.on_tick(&scene, &events, &removed_kinds);

        if scene.tick() % PROGRESS_LOG_INTERVAL == 0 {
            debug!(
                game_id = %config.game_id,
                tick = scene.tick(),
                entities = scene.entities().len(),
                score = scene.score(),
                "Game progress"
            );
        }

        if !player_alive(&scene) {
            debug!(game_id = %config.game_id, tick = scene.tick(), "Player died");
            break;
        }
    }

    let metrics = collector.finalize(&scene);
    info!(
        game_id = %config.game_id,
        ticks = metrics.ticks_survived,
        survived = metrics.survived,
        kills = metrics.kills,
        score = metrics.score,
        elapsed_ms = game_start.elapsed().as_millis(),
        "Game finished"
    );

    Ok(GameResult {
        final_state_hash: metrics.final_state_hash,
        metrics,
    })
}

fn player_alive(scene: &Scene) -> bool {
    scene.player().is_some_and(|p| !p.vitals().is_dead())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ItemPlacement;
    use horde_test_utils::fixtures::{sample_game_data, sample_spawner_data};

    fn bundle() -> Arc<GameBundle> {
        Arc::new(GameBundle {
            data: sample_game_data(),
            spawner: Some(sample_spawner_data()),
        })
    }

    #[test]
    fn test_build_scene_places_player_and_items() {
        let mut scenario = Scenario::default();
        scenario.items.push(ItemPlacement::new("gold_coin", 100.0, 100.0));
        scenario.items.push(ItemPlacement::new("diamond", 0.0, 0.0));
        scenario.player.weapons = vec!["bazooka".into(), "laser".into()];

        let scene = build_scene(&scenario, &bundle(), 1).unwrap();
        assert_eq!(scene.entities().len(), 2);
        let player = scene.player().unwrap();
        assert_eq!(player.weapon(WeaponSlot::First).unwrap().name(), "bazooka");
        assert!(!player.has_weapon(WeaponSlot::Second));
        assert!(scene.spawner().is_some());

        let coin = scene
            .entities()
            .iter()
            .find(|e| matches!(e.kind, EntityKind::Item(_)))
            .unwrap();
        assert_eq!(coin.body.center(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_autopilot_kites_and_aims() {
        let scenario = Scenario {
            spawner: None,
            ..Scenario::default()
        };
        let bundle = GameBundle {
            data: sample_game_data(),
            spawner: None,
        };
        let mut scene = build_scene(&scenario, &bundle, 0).unwrap();
        let mut rat = scene.ctx().registry.mob("rat").unwrap();
        rat.body.set_center(Vec2::new(16.0 + 50.0, 16.0));
        scene.add_entity(rat);

        let decision = Autopilot::default().decide(&scene).unwrap();
        assert!(decision.fire);
        assert!(decision.aim.approx_eq(Vec2::RIGHT));
        assert!(decision.movement.approx_eq(Vec2::LEFT));
        assert!(!decision.grab);
    }

    #[test]
    fn test_autopilot_walks_to_pickup_and_grabs() {
        let mut scenario = Scenario::default();
        scenario.items.push(ItemPlacement::new("gold_coin", 16.0, 216.0));
        let bundle = GameBundle {
            data: sample_game_data(),
            spawner: None,
        };
        let mut scene = build_scene(&scenario, &bundle, 0).unwrap();

        let decision = Autopilot::default().decide(&scene).unwrap();
        assert!(!decision.fire);
        assert!(decision.movement.approx_eq(Vec2::new(0.0, 1.0)));

        let autopilot = Autopilot::default();
        for _ in 0..300 {
            autopilot.steer(&mut scene);
            scene.on_tick(16);
        }
        assert_eq!(scene.player().unwrap().gold(), 5);
    }

    #[test]
    fn test_apply_decision_maps_axes() {
        let mut player = Player::new(10.0, 0.05, 100.0);
        let decision = Decision {
            movement: Vec2::new(-0.6, 0.8),
            ..Decision::default()
        };
        apply_decision(&mut player, &decision);
        assert_eq!(player.input().movement(Axis::Left), 0.6);
        assert_eq!(player.input().movement(Axis::Right), 0.0);
        assert_eq!(player.input().movement(Axis::Down), 0.8);
        assert_eq!(player.input().movement(Axis::Up), 0.0);
    }

    #[test]
    fn test_run_game_is_bounded_and_deterministic() {
        let scenario = Scenario {
            max_ticks: 600,
            ..Scenario::default()
        };
        let config = GameConfig::from_scenario(scenario, bundle()).with_seed(11);

        let first = run_game(config.clone()).unwrap();
        let second = run_game(config).unwrap();

        assert!(first.metrics.ticks_survived <= 600);
        assert!(first.metrics.mobs_spawned > 0);
        assert_eq!(first.final_state_hash, second.final_state_hash);
        assert_eq!(first.metrics.kills, second.metrics.kills);
    }

    #[test]
    fn test_idle_player_without_waves_survives() {
        let scenario = Scenario {
            max_ticks: 120,
            autopilot: false,
            ..Scenario::default()
        };
        let bundle = Arc::new(GameBundle {
            data: sample_game_data(),
            spawner: None,
        });
        let result = GameRunner::new()
            .run(GameConfig::from_scenario(scenario, bundle))
            .unwrap();
        assert!(result.metrics.survived);
        assert_eq!(result.metrics.ticks_survived, 120);
        assert_eq!(result.metrics.health_over_time.len(), 2);
    }
}
