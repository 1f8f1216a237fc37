//! Game metrics collection for balance analysis.
//!
//! A [`MetricsCollector`] follows one game tick by tick; [`BatchSummary`]
//! aggregates the finished games of a batch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use horde_core::simulation::{Scene, TickEvents};

/// Ticks between two health samples.
pub const HEALTH_SAMPLE_INTERVAL: u64 = 60;

/// Complete metrics for a single game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique game identifier.
    pub game_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Random seed used.
    pub seed: u64,
    /// Ticks simulated before the player died or time ran out.
    pub ticks_survived: u64,
    /// Whether the player was alive at the end.
    pub survived: bool,
    /// Mobs removed from the scene.
    pub kills: u32,
    /// Kills by entity kind name.
    pub kills_by_kind: BTreeMap<String, u32>,
    /// Final score.
    pub score: u64,
    /// Gold carried at the end.
    pub gold: u64,
    /// Player health at the end.
    pub final_health: f64,
    /// Mobs produced by the spawner.
    pub mobs_spawned: u32,
    /// Entities spawned by other entities (projectiles, zones, loot).
    pub entities_spawned: u32,
    /// Largest number of entities alive at once.
    pub peak_entities: u32,
    /// Player health every [`HEALTH_SAMPLE_INTERVAL`] ticks (tick, health).
    pub health_over_time: Vec<(u64, f64)>,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Create a new game metrics instance.
    #[must_use]
    pub fn new(game_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            game_id: game_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Record a kill.
    pub fn record_kill(&mut self, kind: &str) {
        self.kills += 1;
        *self.kills_by_kind.entry(kind.to_string()).or_default() += 1;
    }

    /// Kills per simulated minute at `tick_ms`.
    #[must_use]
    pub fn kills_per_minute(&self, tick_ms: i64) -> f64 {
        let minutes = self.ticks_survived as f64 * tick_ms as f64 / 60_000.0;
        if minutes > 0.0 {
            f64::from(self.kills) / minutes
        } else {
            0.0
        }
    }
}

/// Summary statistics across multiple games.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total games played.
    pub total_games: u32,
    /// Games where the player survived.
    pub survivals: u32,
    /// Survivals divided by games.
    pub survival_rate: f64,
    /// Average ticks survived.
    pub avg_ticks_survived: f64,
    /// Shortest game.
    pub min_ticks_survived: u64,
    /// Longest game.
    pub max_ticks_survived: u64,
    /// Average kills per game.
    pub avg_kills: f64,
    /// Average score per game.
    pub avg_score: f64,
    /// Best score.
    pub max_score: u64,
    /// Average gold at the end of a game.
    pub avg_gold: f64,
    /// Average kills per game by entity kind.
    pub avg_kills_by_kind: BTreeMap<String, f64>,
}

impl BatchSummary {
    /// Calculate summary from a list of game metrics.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let count = games.len() as f64;
        let mut summary = Self {
            total_games: u32::try_from(games.len()).unwrap_or(u32::MAX),
            min_ticks_survived: u64::MAX,
            ..Default::default()
        };

        let mut ticks_sum = 0u64;
        let mut kills_sum = 0u64;
        let mut score_sum = 0u64;
        let mut gold_sum = 0u64;
        let mut kind_sums: BTreeMap<String, u64> = BTreeMap::new();

        for game in games {
            if game.survived {
                summary.survivals += 1;
            }
            ticks_sum += game.ticks_survived;
            summary.min_ticks_survived = summary.min_ticks_survived.min(game.ticks_survived);
            summary.max_ticks_survived = summary.max_ticks_survived.max(game.ticks_survived);
            kills_sum += u64::from(game.kills);
            score_sum += game.score;
            summary.max_score = summary.max_score.max(game.score);
            gold_sum += game.gold;
            for (kind, kills) in &game.kills_by_kind {
                *kind_sums.entry(kind.clone()).or_default() += u64::from(*kills);
            }
        }

        summary.survival_rate = f64::from(summary.survivals) / count;
        summary.avg_ticks_survived = ticks_sum as f64 / count;
        summary.avg_kills = kills_sum as f64 / count;
        summary.avg_score = score_sum as f64 / count;
        summary.avg_gold = gold_sum as f64 / count;
        summary.avg_kills_by_kind = kind_sums
            .into_iter()
            .map(|(kind, sum)| (kind, sum as f64 / count))
            .collect();

        summary
    }

    /// Whether the survival rate lies within `threshold` of `target`.
    #[must_use]
    pub fn is_balanced(&self, target: f64, threshold: f64) -> bool {
        (self.survival_rate - target).abs() <= threshold
    }
}

/// Metrics collector that tracks events during a game.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    /// Current game metrics.
    metrics: GameMetrics,
    /// Current tick.
    current_tick: u64,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    #[must_use]
    pub fn new(game_id: &str, scenario: &str, seed: u64) -> Self {
        Self {
            metrics: GameMetrics::new(game_id, scenario, seed),
            current_tick: 0,
        }
    }

    /// Record what happened during the tick that brought `scene` to its
    /// current state.
    ///
    /// `removed_kinds` holds the kind name of every entity swept during the
    /// tick, looked up before the tick ran.
    pub fn on_tick(&mut self, scene: &Scene, events: &TickEvents, removed_kinds: &[&str]) {
        self.current_tick = scene.tick();

        for kind in removed_kinds {
            if matches!(*kind, "mob" | "ranged_mob") {
                self.metrics.record_kill(kind);
            }
        }

        self.metrics.mobs_spawned += u32::try_from(events.mobs_spawned.len()).unwrap_or(u32::MAX);
        self.metrics.entities_spawned += u32::try_from(events.spawned.len()).unwrap_or(u32::MAX);
        let alive = u32::try_from(scene.entities().len()).unwrap_or(u32::MAX);
        self.metrics.peak_entities = self.metrics.peak_entities.max(alive);

        if self.current_tick % HEALTH_SAMPLE_INTERVAL == 0 {
            if let Some(health) = player_health(scene) {
                self.metrics.health_over_time.push((self.current_tick, health));
            }
        }
    }

    /// Finalize and return the metrics.
    #[must_use]
    pub fn finalize(mut self, scene: &Scene) -> GameMetrics {
        let health = player_health(scene).unwrap_or(0.0);
        self.metrics.ticks_survived = scene.tick();
        self.metrics.survived = health > 0.0;
        self.metrics.final_health = health;
        self.metrics.score = scene.score();
        self.metrics.gold = scene.player().map_or(0, horde_core::player::Player::gold);
        self.metrics.final_state_hash = scene.state_hash();
        self.metrics
    }

    /// Get current metrics (immutable).
    #[must_use]
    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }
}

fn player_health(scene: &Scene) -> Option<f64> {
    use horde_core::living::Living;

    scene.player().map(|p| p.vitals().health())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(ticks: u64, survived: bool, kills: u32, score: u64) -> GameMetrics {
        let mut metrics = GameMetrics::new("g", "arena", 0);
        metrics.ticks_survived = ticks;
        metrics.survived = survived;
        for _ in 0..kills {
            metrics.record_kill("mob");
        }
        metrics.score = score;
        metrics
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_games(&[]);
        assert_eq!(summary.total_games, 0);
        assert_eq!(summary.survival_rate, 0.0);
    }

    #[test]
    fn test_summary_aggregates() {
        let games = vec![game(100, true, 4, 10), game(50, false, 2, 4)];
        let summary = BatchSummary::from_games(&games);

        assert_eq!(summary.total_games, 2);
        assert_eq!(summary.survivals, 1);
        assert!((summary.survival_rate - 0.5).abs() < 1e-12);
        assert!((summary.avg_ticks_survived - 75.0).abs() < 1e-12);
        assert_eq!(summary.min_ticks_survived, 50);
        assert_eq!(summary.max_ticks_survived, 100);
        assert!((summary.avg_kills - 3.0).abs() < 1e-12);
        assert_eq!(summary.max_score, 10);
        assert!((summary.avg_kills_by_kind["mob"] - 3.0).abs() < 1e-12);
        assert!(summary.is_balanced(0.5, 0.1));
        assert!(!summary.is_balanced(0.9, 0.1));
    }

    #[test]
    fn test_kills_per_minute() {
        let metrics = game(3750, true, 10, 0);
        // 3750 ticks of 16ms is one minute
        assert!((metrics.kills_per_minute(16) - 10.0).abs() < 1e-9);
        assert_eq!(game(0, false, 0, 0).kills_per_minute(16), 0.0);
    }

    #[test]
    fn test_collector_counts_kills_and_spawns() {
        let scene = Scene::default();
        let mut collector = MetricsCollector::new("g", "arena", 1);
        let events = TickEvents {
            spawned: vec![7, 8],
            mobs_spawned: vec![9],
            ..TickEvents::default()
        };
        collector.on_tick(&scene, &events, &["mob", "missile", "ranged_mob"]);

        let metrics = collector.metrics();
        assert_eq!(metrics.kills, 2);
        assert_eq!(metrics.kills_by_kind["ranged_mob"], 1);
        assert_eq!(metrics.mobs_spawned, 1);
        assert_eq!(metrics.entities_spawned, 2);

        let final_metrics = collector.finalize(&scene);
        assert!(!final_metrics.survived);
        assert_eq!(final_metrics.final_state_hash, scene.state_hash());
    }
}
