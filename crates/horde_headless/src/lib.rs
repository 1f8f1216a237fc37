//! Headless game runner for balancing, AI testing and CI verification.
//!
//! This crate runs the horde simulation without graphics. It can be:
//!
//! - **Scripted**: the built-in autopilot plays scenarios for balance batches
//! - **Controlled**: an external agent plays through JSON lines on stdin
//! - **Verified**: the same seed is replayed and final state hashes compared
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from controller (tick, move, aim, etc.)
//! - **stdout**: State updates and responses (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See [`protocol`] module for every command and response.
//!
//! # Example
//!
//! ```bash
//! # Play interactively
//! echo '{"cmd":"tick","count":60}' | cargo run -p horde_headless -- interactive
//!
//! # Run a scenario with the autopilot
//! cargo run -p horde_headless -- run --scenario arena
//!
//! # Verify determinism
//! cargo run -p horde_headless -- verify --scenario arena --runs 5
//! ```

pub mod batch;
pub mod data_loader;
pub mod game_runner;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use data_loader::{default_data_dir, DataLoadError, GameBundle};
pub use game_runner::{Autopilot, GameConfig, GameRunner};
pub use metrics::{BatchSummary, GameMetrics, MetricsCollector};
pub use protocol::{Command, Response};
pub use runner::HeadlessRunner;
pub use scenario::{Scenario, ScenarioError};
