//! Item template data.

use serde::{Deserialize, Serialize};

use crate::config::DROPPED_ITEM_SIZE;
use crate::item::ItemKind;
use crate::math::Extent;

/// Data-driven item definition.
///
/// # Example RON
///
/// ```ron
/// ItemData(
///     name: "small_potion",
///     kind: HpPotion,
///     strength: 20.0,
///     size: (24.0, 24.0),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    /// Unique item name, referenced by loot tables.
    pub name: String,

    /// What gathering does.
    pub kind: ItemKind,

    /// Gold, heal or energy amount.
    #[serde(default)]
    pub strength: f64,

    /// Collision box.
    #[serde(default = "default_item_size")]
    pub size: Extent,

    /// Weapon template carried by a `Weapon` item.
    #[serde(default)]
    pub weapon: Option<String>,
}

fn default_item_size() -> Extent {
    Extent::new(DROPPED_ITEM_SIZE, DROPPED_ITEM_SIZE).unwrap_or_default()
}
