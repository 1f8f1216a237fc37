//! Game data loading from RON files.
//!
//! A data directory holds one file per template family plus an optional
//! default spawner:
//!
//! ```text
//! data/
//!   items.ron         [ItemData(..), ..]
//!   weapons.ron       [WeaponData(..), ..]
//!   mobs.ron          [MobData(..), ..]
//!   loot_tables.ron   [LootTableData(..), ..]
//!   spawner.ron       SpawnerData(..)        (optional)
//!   scenarios/        Scenario(..) files
//! ```
//!
//! A missing family file is logged and treated as empty.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use horde_core::config::SimConfig;
use horde_core::context::SimContext;
use horde_core::data::{GameData, SpawnerData};
use horde_core::error::GameError;
use horde_core::loot::LootTables;
use horde_core::registry::Registry;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "HORDE_DATA_DIR";

/// Errors that can occur while loading game data.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Failed to read a file.
    #[error("IO error reading '{path}': {source}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Failed to parse RON.
    #[error("Parse error in '{path}': {source}")]
    Parse {
        /// File that failed.
        path: String,
        /// Underlying error.
        source: ron::error::SpannedError,
    },
    /// Data directory not found.
    #[error("Data directory not found: {0}")]
    DirectoryNotFound(String),
    /// Templates could not be built from the data.
    #[error(transparent)]
    Build(#[from] GameError),
}

/// Everything loaded from a data directory.
#[derive(Debug, Clone, Default)]
pub struct GameBundle {
    /// Templates and loot tables.
    pub data: GameData,
    /// Default spawner, if `spawner.ron` exists.
    pub spawner: Option<SpawnerData>,
}

impl GameBundle {
    /// Load every data file in `dir`.
    pub fn load_from_directory(dir: &Path) -> Result<Self, DataLoadError> {
        if !dir.is_dir() {
            return Err(DataLoadError::DirectoryNotFound(dir.display().to_string()));
        }

        let data = GameData {
            items: load_list(&dir.join("items.ron"))?,
            weapons: load_list(&dir.join("weapons.ron"))?,
            mobs: load_list(&dir.join("mobs.ron"))?,
            loot_tables: load_list(&dir.join("loot_tables.ron"))?,
        };

        let spawner_path = dir.join("spawner.ron");
        let spawner = if spawner_path.exists() {
            Some(load_ron::<SpawnerData>(&spawner_path)?)
        } else {
            None
        };

        tracing::info!(
            dir = %dir.display(),
            items = data.items.len(),
            weapons = data.weapons.len(),
            mobs = data.mobs.len(),
            loot_tables = data.loot_tables.len(),
            spawner = spawner.is_some(),
            "Loaded game data"
        );

        Ok(Self { data, spawner })
    }

    /// Every validation finding for the data and the default spawner.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = self.data.validate();
        if let Some(spawner) = &self.spawner {
            problems.extend(
                spawner
                    .validate(&self.data)
                    .into_iter()
                    .map(|p| format!("spawner.ron: {p}")),
            );
        }
        problems
    }

    /// Build a simulation context from the loaded data.
    pub fn build_context(&self, config: SimConfig) -> Result<SimContext, DataLoadError> {
        build_context(&self.data, config)
    }
}

/// Build a simulation context (registry, loot tables, seeded RNG).
pub fn build_context(data: &GameData, config: SimConfig) -> Result<SimContext, DataLoadError> {
    let registry = Registry::from_data(data)?;
    let loot = LootTables::from_data(&data.loot_tables);
    Ok(SimContext::new(registry, loot, config))
}

fn load_ron<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let content = fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    ron::from_str(&content).map_err(|source| DataLoadError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn load_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataLoadError> {
    if !path.exists() {
        tracing::warn!("Data file {} missing, treating it as empty", path.display());
        return Ok(Vec::new());
    }
    load_ron(path)
}

/// Resolve the default data directory.
///
/// Looks for game data in standard locations:
/// 1. Environment variable `HORDE_DATA_DIR`
/// 2. `./data/` (repo root)
/// 3. `../../data/` (running from a crate directory)
pub fn default_data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        let path = PathBuf::from(dir);
        if path.is_dir() {
            return Some(path);
        }
    }

    let candidates = ["data", "../../data", "../data"];
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.join("mobs.ron").exists())
}

/// Load the bundle from the default directory.
pub fn load_default_bundle() -> Result<GameBundle, DataLoadError> {
    let dir = default_data_dir()
        .ok_or_else(|| DataLoadError::DirectoryNotFound("game data directory".to_string()))?;
    GameBundle::load_from_directory(&dir)
}
