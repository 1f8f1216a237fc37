//! Data structures for game content.
//!
//! This module contains pure data structures describing items, weapons,
//! mobs, loot tables and spawn waves. All structs are designed to be
//! deserialized from RON files.
//!
//! **Note:** This module performs no file IO. Loading files is handled by
//! `horde_headless`.

mod item_data;
mod loot_data;
mod mob_data;
mod spawner_data;
mod weapon_data;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use item_data::ItemData;
pub use loot_data::{LootEntry, LootTableData};
pub use mob_data::{MobData, RangedData};
pub use spawner_data::{SpawnerData, WaveData};
pub use weapon_data::{DetonationData, ProjectileData, WeaponData};

use crate::loot::NOTHING;

/// Every template a game needs.
///
/// # Example RON
///
/// ```ron
/// GameData(
///     weapons: [],
///     items: [
///         ItemData(name: "coin", kind: Gold, strength: 5.0),
///     ],
///     mobs: [
///         MobData(name: "rat", health: 10.0, speed: 0.06, melee_damage: 0.5,
///                 size: (20.0, 20.0), loot_table: "common_mob", score: 1),
///     ],
///     loot_tables: [
///         LootTableData(name: "common_mob", entries: [
///             LootEntry(item: "coin", weight: 1.0),
///             LootEntry(item: "Nothing", weight: 3.0),
///         ]),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameData {
    /// Item templates.
    #[serde(default)]
    pub items: Vec<ItemData>,
    /// Weapon templates.
    #[serde(default)]
    pub weapons: Vec<WeaponData>,
    /// Mob templates.
    #[serde(default)]
    pub mobs: Vec<MobData>,
    /// Loot tables.
    #[serde(default)]
    pub loot_tables: Vec<LootTableData>,
}

impl GameData {
    /// Parse game data from a RON string.
    pub fn from_ron_str(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Check cross references and value ranges.
    ///
    /// Returns one human-readable message per problem; empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let weapons = unique_names(self.weapons.iter().map(|w| w.name.as_str()), "weapon", &mut problems);
        let items = unique_names(self.items.iter().map(|i| i.name.as_str()), "item", &mut problems);
        let tables = unique_names(
            self.loot_tables.iter().map(|t| t.name.as_str()),
            "loot table",
            &mut problems,
        );
        unique_names(self.mobs.iter().map(|m| m.name.as_str()), "mob", &mut problems);

        for weapon in &self.weapons {
            weapon.projectile.check(&format!("weapon '{}'", weapon.name), &mut problems);
            if weapon.energy_cost < 0.0 {
                problems.push(format!("weapon '{}' has a negative energy cost", weapon.name));
            }
        }

        for item in &self.items {
            if let Some(weapon) = &item.weapon {
                if !weapons.contains(weapon.as_str()) {
                    problems.push(format!("item '{}' refers to unknown weapon '{weapon}'", item.name));
                }
            }
        }

        for table in &self.loot_tables {
            for entry in &table.entries {
                if entry.item != NOTHING && !items.contains(entry.item.as_str()) {
                    problems.push(format!(
                        "loot table '{}' refers to unknown item '{}'",
                        table.name, entry.item
                    ));
                }
                if entry.weight.is_nan() || entry.weight < 0.0 {
                    problems.push(format!(
                        "loot table '{}' has an invalid weight for '{}'",
                        table.name, entry.item
                    ));
                }
            }
        }

        for mob in &self.mobs {
            if !mob.loot_table.is_empty() && !tables.contains(mob.loot_table.as_str()) {
                problems.push(format!(
                    "mob '{}' refers to unknown loot table '{}'",
                    mob.name, mob.loot_table
                ));
            }
            if mob.health <= 0.0 {
                problems.push(format!("mob '{}' has non-positive health", mob.name));
            }
            if let Some(ranged) = &mob.ranged {
                if ranged.min_range > ranged.max_range {
                    problems.push(format!("mob '{}' has min_range above max_range", mob.name));
                }
                ranged.projectile.check(&format!("mob '{}'", mob.name), &mut problems);
            }
        }

        problems
    }

    /// Whether a mob template with this name exists.
    #[must_use]
    pub fn has_mob(&self, name: &str) -> bool {
        self.mobs.iter().any(|m| m.name == name)
    }
}

fn unique_names<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: &str,
    problems: &mut Vec<String>,
) -> BTreeSet<&'a str> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            problems.push(format!("duplicate {kind} '{name}'"));
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        GameData(
            weapons: [
                WeaponData(
                    name: "pistol",
                    energy_cost: 2.0,
                    use_delay_ms: 200,
                    size: (20.0, 10.0),
                    projectile: ProjectileData(range: 600.0, damage: 1.0, speed: 0.2, size: (15.0, 15.0)),
                ),
            ],
            items: [
                ItemData(name: "coin", kind: Gold, strength: 5.0),
                ItemData(name: "pistol", kind: Weapon, weapon: Some("pistol")),
            ],
            mobs: [
                MobData(name: "rat", health: 10.0, speed: 0.06, size: (20.0, 20.0), loot_table: "common"),
            ],
            loot_tables: [
                LootTableData(name: "common", entries: [
                    LootEntry(item: "coin", weight: 1.0),
                    LootEntry(item: "Nothing", weight: 2.0),
                ]),
            ],
        )
    "#;

    #[test]
    fn test_parse_and_validate() {
        let data = GameData::from_ron_str(SAMPLE).unwrap();
        assert_eq!(data.items.len(), 2);
        assert!(data.has_mob("rat"));
        assert!(data.validate().is_empty(), "{:?}", data.validate());
    }

    #[test]
    fn test_validate_reports_dangling_references() {
        let mut data = GameData::from_ron_str(SAMPLE).unwrap();
        data.items[1].weapon = Some("laser".to_string());
        data.mobs[0].loot_table = "epic".to_string();
        data.loot_tables[0].entries[0].item = "gem".to_string();
        let problems = data.validate();
        assert_eq!(problems.len(), 3, "{problems:?}");
    }

    #[test]
    fn test_validate_reports_duplicates() {
        let mut data = GameData::from_ron_str(SAMPLE).unwrap();
        let rat = data.mobs[0].clone();
        data.mobs.push(rat);
        assert!(data.validate().iter().any(|p| p.contains("duplicate mob 'rat'")));
    }

    #[test]
    fn test_negative_size_rejected_at_parse() {
        let bad = r#"GameData(items: [ItemData(name: "x", kind: Gold, size: (-1.0, 2.0))])"#;
        assert!(GameData::from_ron_str(bad).is_err());
    }
}
