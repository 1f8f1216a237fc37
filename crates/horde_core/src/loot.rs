//! Weighted loot tables.
//!
//! A table maps a name to weighted item names. Sampling an empty table id,
//! an unknown table or a table whose weights are unusable yields
//! [`NOTHING`], which drops no item.

use std::collections::BTreeMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::data::LootTableData;

/// Item name meaning "no drop".
pub const NOTHING: &str = "Nothing";

#[derive(Debug, Clone)]
struct LootTable {
    items: Vec<String>,
    weights: WeightedIndex<f64>,
}

impl LootTable {
    fn nothing() -> Option<Self> {
        let weights = WeightedIndex::new([1.0]).ok()?;
        Some(Self {
            items: vec![NOTHING.to_string()],
            weights,
        })
    }
}

/// All loot tables of a game.
#[derive(Debug, Clone, Default)]
pub struct LootTables {
    tables: BTreeMap<String, LootTable>,
}

impl LootTables {
    /// Build tables from game data.
    #[must_use]
    pub fn from_data(data: &[LootTableData]) -> Self {
        let mut tables = Self::default();
        for table in data {
            let entries: Vec<(String, f64)> = table
                .entries
                .iter()
                .map(|e| (e.item.clone(), e.weight))
                .collect();
            tables.insert(&table.name, &entries);
        }
        tables
    }

    /// Add or replace a table. Empty, negative or all-zero weights degrade
    /// the table to a single [`NOTHING`] entry.
    pub fn insert(&mut self, name: &str, entries: &[(String, f64)]) {
        let weights = entries.iter().map(|(_, w)| *w);
        let table = match WeightedIndex::new(weights) {
            Ok(weights) => Some(LootTable {
                items: entries.iter().map(|(item, _)| item.clone()).collect(),
                weights,
            }),
            Err(err) => {
                tracing::warn!(table = name, %err, "unusable loot weights, table drops nothing");
                LootTable::nothing()
            }
        };
        if let Some(table) = table {
            self.tables.insert(name.to_string(), table);
        }
    }

    /// Whether a table exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Draw an item name from `table`.
    pub fn sample<R: Rng + ?Sized>(&self, table: &str, rng: &mut R) -> &str {
        if table.is_empty() {
            return NOTHING;
        }
        match self.tables.get(table) {
            Some(t) => &t.items[t.weights.sample(rng)],
            None => {
                tracing::warn!(table, "unknown loot table");
                NOTHING
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_and_unknown_tables_drop_nothing() {
        let tables = LootTables::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(tables.sample("", &mut rng), NOTHING);
        assert_eq!(tables.sample("missing", &mut rng), NOTHING);
    }

    #[test]
    fn test_bad_weights_degrade() {
        let mut tables = LootTables::default();
        tables.insert("broken", &[("coin".to_string(), 0.0)]);
        tables.insert("empty", &[]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(tables.contains("broken"));
        assert_eq!(tables.sample("broken", &mut rng), NOTHING);
        assert_eq!(tables.sample("empty", &mut rng), NOTHING);
    }

    #[test]
    fn test_weighted_sampling() {
        let mut tables = LootTables::default();
        tables.insert(
            "common",
            &[("coin".to_string(), 3.0), ("potion".to_string(), 1.0), ("gem".to_string(), 0.0)],
        );
        let mut rng = StdRng::seed_from_u64(42);
        let mut coins = 0;
        for _ in 0..4000 {
            let item = tables.sample("common", &mut rng);
            assert_ne!(item, "gem");
            if item == "coin" {
                coins += 1;
            }
        }
        assert!((2700..3300).contains(&coins), "coins = {coins}");
    }

    #[test]
    fn test_same_seed_same_drops() {
        let mut tables = LootTables::default();
        tables.insert("t", &[("a".to_string(), 1.0), ("b".to_string(), 1.0)]);
        let mut r1 = StdRng::seed_from_u64(9);
        let mut r2 = StdRng::seed_from_u64(9);
        let a: Vec<String> = (0..32).map(|_| tables.sample("t", &mut r1).to_string()).collect();
        let b: Vec<String> = (0..32).map(|_| tables.sample("t", &mut r2).to_string()).collect();
        assert_eq!(a, b);
    }
}
