//! Loot table data.

use serde::{Deserialize, Serialize};

/// One weighted entry of a loot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    /// Item name, or `"Nothing"` for no drop.
    pub item: String,
    /// Relative weight.
    pub weight: f64,
}

/// A named loot table.
///
/// # Example RON
///
/// ```ron
/// LootTableData(
///     name: "rare_mob",
///     entries: [
///         LootEntry(item: "rocket_launcher", weight: 1.0),
///         LootEntry(item: "gold_pile", weight: 4.0),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTableData {
    /// Table name, referenced by mobs.
    pub name: String,
    /// Weighted entries.
    #[serde(default)]
    pub entries: Vec<LootEntry>,
}
