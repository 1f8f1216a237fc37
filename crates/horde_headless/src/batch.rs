//! Parallel balance batches.
//!
//! A batch plays one scenario once per seed in `seed_start..seed_start +
//! game_count`, spread over a rayon pool, and folds the per-game metrics
//! into a [`BatchSummary`]. Every game is independent, so a batch result
//! for a seed always equals a single `run_game` with that seed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data_loader::{DataLoadError, GameBundle};
use crate::game_runner::{run_game, GameConfig};
use crate::metrics::{BatchSummary, GameMetrics};
use crate::scenario::{Scenario, DEFAULT_SCENARIO};

/// How often (in finished games) a progress line is logged at info level.
const REPORT_EVERY: u32 = 100;

/// What to play and where to write it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario name or RON path.
    pub scenario: String,
    /// Games to play, one seed each.
    pub game_count: u32,
    /// Worker threads; 0 lets rayon decide.
    pub parallel_games: u32,
    /// Directory receiving `batch.json`.
    pub output_dir: PathBuf,
    /// Seed of the first game.
    pub seed_start: u64,
    /// Per-game tick limit; 0 keeps the scenario's.
    pub max_ticks: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SCENARIO, 100)
    }
}

impl BatchConfig {
    /// `game_count` games of `scenario` starting at seed 0.
    pub fn new(scenario: &str, game_count: u32) -> Self {
        Self {
            scenario: scenario.to_owned(),
            game_count,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            max_ticks: 0,
        }
    }

    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn with_parallelism(mut self, threads: u32) -> Self {
        self.parallel_games = threads;
        self
    }

    /// Seeds in play order.
    pub fn seeds(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.game_count).map(|i| self.seed_start.wrapping_add(u64::from(i)))
    }
}

/// Everything a batch produced, as written to `batch.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    pub config: BatchConfig,
    /// Finished games, in seed order.
    pub games: Vec<GameMetrics>,
    pub summary: BatchSummary,
    /// Wall-clock time of the whole batch.
    pub duration_seconds: f64,
    /// Games that could not be set up.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Write as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let text = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, text)
    }

    /// Read results written by [`BatchResults::write_json`].
    pub fn read_json(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(io::Error::other)
    }
}

/// A game of the batch that failed before it could be played.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    pub game_index: u32,
    pub seed: u64,
    pub message: String,
}

/// Thread-safe counters shared by the workers of a batch.
#[derive(Debug)]
pub struct BatchProgress {
    pub total: u32,
    finished: AtomicU32,
    survivors: AtomicU32,
    started_at: Instant,
}

impl BatchProgress {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            finished: AtomicU32::new(0),
            survivors: AtomicU32::new(0),
            started_at: Instant::now(),
        }
    }

    /// Count a finished game and return how many are done so far.
    pub fn finish_game(&self, survived: bool) -> u32 {
        if survived {
            self.survivors.fetch_add(1, Ordering::Relaxed);
        }
        self.finished.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn finished(&self) -> u32 {
        self.finished.load(Ordering::Relaxed)
    }

    /// Done share in percent.
    pub fn percent_done(&self) -> f64 {
        100.0 * f64::from(self.finished()) / f64::from(self.total.max(1))
    }

    /// Share of finished games the player survived.
    pub fn survival_rate(&self) -> f64 {
        match self.finished() {
            0 => 0.0,
            n => f64::from(self.survivors.load(Ordering::Relaxed)) / f64::from(n),
        }
    }

    /// Linear extrapolation of the time still needed.
    pub fn time_left(&self) -> Duration {
        let finished = self.finished();
        if finished == 0 {
            return Duration::ZERO;
        }
        let per_game = self.started_at.elapsed().as_secs_f64() / f64::from(finished);
        Duration::from_secs_f64(per_game * f64::from(self.total.saturating_sub(finished)))
    }

    pub fn log(&self) {
        let left = self.time_left().as_secs();
        info!(
            finished = self.finished(),
            total = self.total,
            "Batch {:.1}% done, survival {:.1}%, about {}m {}s left",
            self.percent_done(),
            self.survival_rate() * 100.0,
            left / 60,
            left % 60
        );
    }
}

/// Play every seed of `config` and summarize the outcome.
pub fn run_batch(config: BatchConfig, scenario: &Scenario, bundle: Arc<GameBundle>) -> BatchResults {
    let started = Instant::now();
    info!(
        scenario = %scenario.name,
        games = config.game_count,
        seed_start = config.seed_start,
        "Batch started"
    );

    let mut template = GameConfig::from_scenario(scenario.clone(), bundle);
    if config.max_ticks > 0 {
        template.max_ticks = config.max_ticks;
    }
    let progress = BatchProgress::new(config.game_count);
    let seeds: Vec<(u32, u64)> = (0..config.game_count).zip(config.seeds()).collect();

    let play_all = || -> Vec<Result<GameMetrics, BatchError>> {
        seeds
            .par_iter()
            .map(|&(index, seed)| -> Result<GameMetrics, BatchError> {
                let result = run_game(template.clone().with_seed(seed)).map_err(|e| {
                    warn!(index, seed, error = %e, "Batch game failed");
                    BatchError {
                        game_index: index,
                        seed,
                        message: e.to_string(),
                    }
                })?;
                let done = progress.finish_game(result.metrics.survived);
                debug!(done, total = progress.total, "Batch game finished");
                if done % REPORT_EVERY == 0 {
                    progress.log();
                }
                Ok(result.metrics)
            })
            .collect()
    };

    let outcomes = match config.parallel_games {
        0 => play_all(),
        threads => match rayon::ThreadPoolBuilder::new()
            .num_threads(threads as usize)
            .build()
        {
            Ok(pool) => pool.install(play_all),
            Err(e) => {
                warn!(error = %e, "Could not size the worker pool, using rayon's global pool");
                play_all()
            }
        },
    };

    let mut games = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(metrics) => games.push(metrics),
            Err(error) => errors.push(error),
        }
    }

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = started.elapsed().as_secs_f64();
    info!(
        games = games.len(),
        errors = errors.len(),
        seconds = duration_seconds,
        survival_rate = summary.survival_rate,
        "Batch finished"
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Final state hashes of `runs` replays of one seed.
pub fn final_hashes(
    scenario: &Scenario,
    bundle: Arc<GameBundle>,
    seed: u64,
    runs: u32,
) -> Result<Vec<u64>, DataLoadError> {
    let config = GameConfig::from_scenario(scenario.clone(), bundle).with_seed(seed);
    (0..runs)
        .map(|_| run_game(config.clone()).map(|result| result.final_state_hash))
        .collect()
}

/// Whether `runs` replays of one seed all end in the same state.
pub fn verify_determinism(
    scenario: &Scenario,
    bundle: Arc<GameBundle>,
    seed: u64,
    runs: u32,
) -> Result<bool, DataLoadError> {
    let hashes = final_hashes(scenario, bundle, seed, runs)?;
    Ok(hashes.windows(2).all(|pair| pair[0] == pair[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_test_utils::fixtures::{sample_game_data, sample_spawner_data};

    fn bundle() -> Arc<GameBundle> {
        Arc::new(GameBundle {
            data: sample_game_data(),
            spawner: Some(sample_spawner_data()),
        })
    }

    fn short_scenario() -> Scenario {
        Scenario {
            max_ticks: 300,
            ..Scenario::default()
        }
    }

    #[test]
    fn test_config_builders() {
        let config = BatchConfig::new("siege", 4)
            .with_output(PathBuf::from("out"))
            .with_seed(u64::MAX - 1)
            .with_max_ticks(10)
            .with_parallelism(3);

        assert_eq!(config.scenario, "siege");
        assert_eq!(config.parallel_games, 3);
        assert_eq!(config.max_ticks, 10);
        let seeds: Vec<u64> = config.seeds().collect();
        assert_eq!(seeds, vec![u64::MAX - 1, u64::MAX, 0, 1]);

        let default = BatchConfig::default();
        assert_eq!(default.scenario, DEFAULT_SCENARIO);
        assert_eq!(default.game_count, 100);
    }

    #[test]
    fn test_progress_counts_survivors() {
        let progress = BatchProgress::new(4);
        assert_eq!(progress.time_left(), Duration::ZERO);
        assert_eq!(progress.survival_rate(), 0.0);

        assert_eq!(progress.finish_game(true), 1);
        assert_eq!(progress.finish_game(false), 2);

        assert_eq!(progress.finished(), 2);
        assert_eq!(progress.percent_done(), 50.0);
        assert_eq!(progress.survival_rate(), 0.5);
    }

    #[test]
    fn test_batch_plays_every_seed_in_order() {
        let config = BatchConfig::new("arena", 6).with_parallelism(2).with_seed(10);
        let results = run_batch(config, &short_scenario(), bundle());

        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_games, 6);
        let seeds: Vec<u64> = results.games.iter().map(|g| g.seed).collect();
        assert_eq!(seeds, (10..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_batch_tick_limit_overrides_scenario() {
        let config = BatchConfig::new("arena", 2).with_max_ticks(50);
        let results = run_batch(config, &short_scenario(), bundle());
        assert!(results.games.iter().all(|g| g.ticks_survived <= 50));
    }

    #[test]
    fn test_batch_game_equals_single_run() {
        let results = run_batch(BatchConfig::new("arena", 3).with_seed(40), &short_scenario(), bundle());
        for game in &results.games {
            let hashes = final_hashes(&short_scenario(), bundle(), game.seed, 1).unwrap();
            assert_eq!(hashes, vec![game.final_state_hash]);
        }
    }

    #[test]
    fn test_replays_are_deterministic() {
        assert!(verify_determinism(&short_scenario(), bundle(), 12345, 3).unwrap());
    }

    #[test]
    fn test_results_json_file() {
        let results = run_batch(BatchConfig::new("arena", 2), &short_scenario(), bundle());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("batch.json");

        results.write_json(&path).unwrap();
        let loaded = BatchResults::read_json(&path).unwrap();
        assert_eq!(loaded.games.len(), 2);
        assert_eq!(loaded.summary.total_games, 2);
    }
}
