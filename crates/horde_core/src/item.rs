//! Pickups lying on the ground.

use serde::{Deserialize, Serialize};

use crate::config::DROPPED_ITEM_SIZE;
use crate::entity::{Body, Entity, EntityKind, Team};
use crate::math::{Extent, Vec2};
use crate::weapon::Weapon;

/// What gathering an item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemKind {
    /// Inert.
    #[default]
    None,
    /// Adds `strength` gold.
    Gold,
    /// Heals `strength` health.
    HpPotion,
    /// Restores `strength` energy.
    EnergyPotion,
    /// Carries a weapon that replaces the gatherer's active one.
    Weapon,
}

/// A pickup.
#[derive(Debug, Clone)]
pub struct Item {
    kind: ItemKind,
    name: String,
    strength: f64,
    weapon: Option<Weapon>,
}

impl Item {
    /// Create an item without a weapon.
    #[must_use]
    pub fn new(kind: ItemKind, name: impl Into<String>, strength: f64) -> Self {
        Self {
            kind,
            name: name.into(),
            strength,
            weapon: None,
        }
    }

    /// Create a weapon item carrying `weapon`.
    #[must_use]
    pub fn with_weapon(weapon: Weapon) -> Self {
        let mut item = Self::new(ItemKind::Weapon, weapon.name(), 0.0);
        item.weapon = Some(weapon);
        item
    }

    /// Wrap a dropped weapon in an item entity at `position`.
    #[must_use]
    pub fn dropped_weapon(weapon: Weapon, position: Vec2) -> Entity {
        let size = Extent::new(DROPPED_ITEM_SIZE, DROPPED_ITEM_SIZE).unwrap_or(Extent::ZERO);
        Entity::new(
            EntityKind::Item(Box::new(Self::with_weapon(weapon))),
            Body::new(position, size, Team::None),
        )
    }

    /// Item kind.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gold amount, heal amount or energy amount depending on the kind.
    #[must_use]
    pub const fn strength(&self) -> f64 {
        self.strength
    }

    /// Whether a weapon is carried.
    #[must_use]
    pub const fn has_weapon(&self) -> bool {
        self.weapon.is_some()
    }

    /// Carried weapon.
    #[must_use]
    pub const fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    /// Weapon slot, for handing the weapon over in place.
    pub fn weapon_slot(&mut self) -> &mut Option<Weapon> {
        &mut self.weapon
    }

    /// Remove and return the carried weapon.
    pub fn take_weapon(&mut self) -> Option<Weapon> {
        self.weapon.take()
    }

    /// Carry `weapon`, turning this into a weapon item.
    pub fn set_weapon(&mut self, weapon: Weapon) {
        self.kind = ItemKind::Weapon;
        self.weapon = Some(weapon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projectile::ProjectileSpec;

    fn pistol() -> Weapon {
        Weapon::new("pistol", 5.0, 200, Extent::new(20.0, 10.0).unwrap(), ProjectileSpec::default())
    }

    #[test]
    fn test_weapon_item() {
        let mut item = Item::with_weapon(pistol());
        assert_eq!(item.kind(), ItemKind::Weapon);
        assert_eq!(item.name(), "pistol");
        assert!(item.has_weapon());
        assert!(item.take_weapon().is_some());
        assert!(!item.has_weapon());
    }

    #[test]
    fn test_set_weapon_changes_kind() {
        let mut item = Item::new(ItemKind::None, "crate", 0.0);
        item.set_weapon(pistol());
        assert_eq!(item.kind(), ItemKind::Weapon);
    }

    #[test]
    fn test_dropped_weapon_entity() {
        let entity = Item::dropped_weapon(pistol(), Vec2::new(3.0, 4.0));
        assert_eq!(entity.body.position, Vec2::new(3.0, 4.0));
        assert_eq!(entity.body.size().width(), DROPPED_ITEM_SIZE);
        assert_eq!(entity.kind_name(), "item");
    }
}
