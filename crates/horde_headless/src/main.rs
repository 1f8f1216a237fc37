//! Headless horde survival runner.
//!
//! This binary runs the game without graphics, either played by the built-in
//! autopilot or controlled via JSON on stdin/stdout.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p horde_headless
//!
//! # Run a single game with the autopilot
//! cargo run -p horde_headless -- run --scenario arena --seed 7
//!
//! # Run batch balance test
//! cargo run -p horde_headless -- batch --scenario arena --count 1000 --output results/
//!
//! # Check game data
//! cargo run -p horde_headless -- validate --data data/
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use horde_headless::{
    batch::{run_batch, BatchConfig},
    data_loader::{default_data_dir, DataLoadError, GameBundle},
    game_runner::{build_scene, run_game, GameConfig},
    runner::HeadlessRunner,
    scenario::{Scenario, DEFAULT_SCENARIO},
};

#[derive(Parser)]
#[command(name = "horde_headless")]
#[command(about = "Headless horde survival runner for AI testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Game data directory (default: $HORDE_DATA_DIR or ./data)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game with the autopilot and print its metrics
    Run {
        /// Scenario name or file
        #[arg(short, long, default_value = DEFAULT_SCENARIO)]
        scenario: String,

        /// Seed (default: the scenario's)
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum ticks (default: the scenario's)
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Scenario to test
        #[arg(short, long, default_value = DEFAULT_SCENARIO)]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Run batch of games for balance testing
    Batch {
        /// Scenario to run
        #[arg(short, long, default_value = DEFAULT_SCENARIO)]
        scenario: String,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum ticks per game (0 = the scenario's)
        #[arg(long, default_value = "0")]
        max_ticks: u64,
    },

    /// Load game data and report every problem found
    Validate,

    /// Control the player through JSON lines on stdin/stdout
    Interactive {
        /// Scenario name or file
        #[arg(short, long, default_value = DEFAULT_SCENARIO)]
        scenario: String,

        /// Seed (default: the scenario's)
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let data_dir = cli.data.or_else(default_data_dir);

    match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            max_ticks,
        }) => cmd_run(data_dir, &scenario, seed, max_ticks),
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => cmd_verify(data_dir, &scenario, seed, runs),
        Some(Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            max_ticks,
        }) => {
            let config = BatchConfig::new(&scenario, count)
                .with_output(output)
                .with_seed(seed)
                .with_max_ticks(max_ticks)
                .with_parallelism(parallel);
            cmd_batch(data_dir, config);
        }
        Some(Commands::Validate) => cmd_validate(data_dir),
        Some(Commands::Interactive { scenario, seed }) => {
            cmd_interactive(data_dir, &scenario, seed);
        }
        None => cmd_interactive(data_dir, DEFAULT_SCENARIO, None),
    }
}

/// Print an error and exit with status 1.
fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn load_bundle(data_dir: Option<&PathBuf>) -> Result<GameBundle, DataLoadError> {
    let dir = data_dir
        .ok_or_else(|| DataLoadError::DirectoryNotFound("game data directory".to_string()))?;
    GameBundle::load_from_directory(dir)
}

fn load_inputs(data_dir: Option<&PathBuf>, scenario: &str) -> (Arc<GameBundle>, Scenario) {
    let bundle = load_bundle(data_dir).unwrap_or_else(|e| fail(e));
    let scenario =
        Scenario::resolve(scenario, data_dir.map(PathBuf::as_path)).unwrap_or_else(|e| fail(e));
    (Arc::new(bundle), scenario)
}

/// Play one game with the autopilot
fn cmd_run(data_dir: Option<PathBuf>, scenario: &str, seed: Option<u64>, max_ticks: Option<u64>) {
    let (bundle, scenario) = load_inputs(data_dir.as_ref(), scenario);
    let seed = seed.unwrap_or(scenario.config.seed);

    let mut config = GameConfig::from_scenario(scenario, bundle).with_seed(seed);
    if let Some(max_ticks) = max_ticks {
        config.max_ticks = max_ticks;
    }

    let result = run_game(config).unwrap_or_else(|e| fail(e));
    match serde_json::to_string_pretty(&result.metrics) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(e),
    }
}

/// Verify determinism by running same seed multiple times
fn cmd_verify(data_dir: Option<PathBuf>, scenario: &str, seed: u64, runs: u32) {
    let (bundle, scenario) = load_inputs(data_dir.as_ref(), scenario);
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    let hashes = horde_headless::batch::final_hashes(&scenario, bundle, seed, runs)
        .unwrap_or_else(|e| fail(e));

    if hashes.windows(2).all(|w| w[0] == w[1]) {
        eprintln!("PASS: All {} runs produced identical results", runs);
        if let Some(hash) = hashes.first() {
            eprintln!("  Final hash: {:016x}", hash);
        }
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        for (i, hash) in hashes.iter().enumerate() {
            eprintln!("  Run {}: {:016x}", i, hash);
        }
        std::process::exit(1);
    }
}

/// Run batch of games for balance testing
fn cmd_batch(data_dir: Option<PathBuf>, config: BatchConfig) {
    let (bundle, scenario) = load_inputs(data_dir.as_ref(), &config.scenario);
    let output = config.output_dir.join("batch.json");

    let results = run_batch(config, &scenario, bundle);

    if let Err(e) = results.write_json(&output) {
        fail(format!("Failed to save results to {}: {}", output.display(), e));
    }

    let summary = &results.summary;
    eprintln!("Batch complete: {} games", summary.total_games);
    eprintln!("  Survival rate: {:.1}%", summary.survival_rate * 100.0);
    eprintln!("  Avg ticks:     {:.0}", summary.avg_ticks_survived);
    eprintln!("  Avg kills:     {:.1}", summary.avg_kills);
    eprintln!("  Avg score:     {:.1}", summary.avg_score);
    eprintln!("  Errors:        {}", results.errors.len());
    eprintln!("  Results:       {}", output.display());

    match serde_json::to_string(summary) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(e),
    }
}

/// Load game data and report every problem found
fn cmd_validate(data_dir: Option<PathBuf>) {
    let bundle = load_bundle(data_dir.as_ref()).unwrap_or_else(|e| fail(e));
    let mut problems = bundle.validate();

    if let Err(e) = bundle.build_context(Default::default()) {
        problems.push(e.to_string());
    }

    if let Some(dir) = &data_dir {
        let scenario_dir = dir.join("scenarios");
        if let Ok(entries) = std::fs::read_dir(&scenario_dir) {
            let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
            paths.sort();
            for path in paths.iter().filter(|p| p.extension().is_some_and(|e| e == "ron")) {
                match Scenario::load(path) {
                    Ok(scenario) => {
                        problems.extend(scenario_problems(&scenario, &bundle));
                    }
                    Err(e) => problems.push(format!("{}: {}", path.display(), e)),
                }
            }
        }
    }

    if problems.is_empty() {
        println!("OK: game data is valid");
    } else {
        for problem in &problems {
            println!("{problem}");
        }
        eprintln!("{} problem(s) found", problems.len());
        std::process::exit(1);
    }
}

fn scenario_problems(scenario: &Scenario, bundle: &GameBundle) -> Vec<String> {
    let prefix = format!("scenario '{}'", scenario.name);
    let mut problems = Vec::new();
    for weapon in &scenario.player.weapons {
        if !bundle.data.weapons.iter().any(|w| &w.name == weapon) {
            problems.push(format!("{prefix}: unknown weapon '{weapon}'"));
        }
    }
    for placement in &scenario.items {
        if !bundle.data.items.iter().any(|i| i.name == placement.item) {
            problems.push(format!("{prefix}: unknown item '{}'", placement.item));
        }
    }
    if let Some(spawner) = &scenario.spawner {
        problems.extend(
            spawner
                .validate(&bundle.data)
                .into_iter()
                .map(|p| format!("{prefix}: {p}")),
        );
    }
    problems
}

/// Control the player through JSON lines
fn cmd_interactive(data_dir: Option<PathBuf>, scenario: &str, seed: Option<u64>) {
    tracing::info!("Starting interactive session");

    let (bundle, scenario) = load_inputs(data_dir.as_ref(), scenario);
    let seed = seed.unwrap_or(scenario.config.seed);
    let scene = build_scene(&scenario, &bundle, seed).unwrap_or_else(|e| fail(e));

    let mut runner = HeadlessRunner::new(scene, scenario.config.tick_ms);
    if let Err(e) = runner.run() {
        fail(e);
    }
}
