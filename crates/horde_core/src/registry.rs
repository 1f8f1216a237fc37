//! Read-only templates for items, weapons and mobs.
//!
//! The registry is owned by the simulation context. Every lookup hands out
//! a deep copy; templates are never shared mutably.

use std::collections::BTreeMap;

use crate::data::GameData;
use crate::entity::{Body, Entity, EntityKind, Team};
use crate::error::{GameError, Result};
use crate::item::Item;
use crate::math::{Extent, Vec2};
use crate::mob::{Mob, RangedMob};
use crate::weapon::Weapon;

/// Template store keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    items: BTreeMap<String, Entity>,
    weapons: BTreeMap<String, Weapon>,
    mobs: BTreeMap<String, Entity>,
}

impl Registry {
    /// Build every template described by `data`.
    ///
    /// A weapon item takes the collision box of its weapon. An item naming
    /// an unknown weapon is logged and registered without one. Fails on the
    /// first malformed detonation.
    pub fn from_data(data: &GameData) -> Result<Self> {
        let mut registry = Self::default();

        for weapon in &data.weapons {
            registry.register_weapon(weapon.to_weapon()?);
        }

        for item in &data.items {
            let mut template = Item::new(item.kind, item.name.clone(), item.strength);
            let mut size = item.size;
            if let Some(weapon_name) = &item.weapon {
                match registry.weapon(weapon_name) {
                    Ok(weapon) => {
                        size = weapon.size();
                        template.set_weapon(weapon);
                    }
                    Err(err) => {
                        tracing::warn!(item = %item.name, %err, "item registered without its weapon");
                    }
                }
            }
            registry.register_item(&item.name, template, size);
        }

        for mob in &data.mobs {
            let base = Mob::new(mob.health, mob.speed, mob.melee_damage)
                .with_loot_table(mob.loot_table.clone())
                .with_score(mob.score);
            match &mob.ranged {
                Some(ranged) => {
                    let ranged_mob = RangedMob::new(
                        base,
                        ranged.fire_cooldown_ms,
                        ranged.min_range,
                        ranged.max_range,
                        ranged.projectile.to_spec()?,
                    );
                    registry.register_ranged_mob(&mob.name, ranged_mob, mob.size);
                }
                None => registry.register_mob(&mob.name, base, mob.size),
            }
        }

        tracing::debug!(
            items = registry.items.len(),
            weapons = registry.weapons.len(),
            mobs = registry.mobs.len(),
            "registry built"
        );
        Ok(registry)
    }

    /// Add an item template.
    pub fn register_item(&mut self, name: &str, item: Item, size: Extent) {
        let entity = Entity::new(
            EntityKind::Item(Box::new(item)),
            Body::new(Vec2::ZERO, size, Team::None),
        );
        self.items.insert(name.to_string(), entity);
    }

    /// Add a weapon template under its own name.
    pub fn register_weapon(&mut self, weapon: Weapon) {
        self.weapons.insert(weapon.name().to_string(), weapon);
    }

    /// Add a melee mob template.
    pub fn register_mob(&mut self, name: &str, mob: Mob, size: Extent) {
        self.insert_mob(name, EntityKind::Mob(Box::new(mob)), size);
    }

    /// Add a ranged mob template.
    pub fn register_ranged_mob(&mut self, name: &str, mob: RangedMob, size: Extent) {
        self.insert_mob(name, EntityKind::RangedMob(Box::new(mob)), size);
    }

    fn insert_mob(&mut self, name: &str, kind: EntityKind, size: Extent) {
        let entity = Entity::new(kind, Body::new(Vec2::ZERO, size, Team::Enemy));
        self.mobs.insert(name.to_string(), entity);
    }

    /// Copy of an item template, positioned at the origin.
    pub fn item(&self, name: &str) -> Result<Entity> {
        lookup(&self.items, "item", name)
    }

    /// Copy of a weapon template.
    pub fn weapon(&self, name: &str) -> Result<Weapon> {
        lookup(&self.weapons, "weapon", name)
    }

    /// Copy of a mob template, positioned at the origin.
    pub fn mob(&self, name: &str) -> Result<Entity> {
        lookup(&self.mobs, "mob", name)
    }

    /// Registered mob names in sorted order.
    pub fn mob_names(&self) -> impl Iterator<Item = &str> {
        self.mobs.keys().map(String::as_str)
    }

    /// Whether an item template exists.
    #[must_use]
    pub fn has_item(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }
}

fn lookup<T: Clone>(map: &BTreeMap<String, T>, kind: &'static str, name: &str) -> Result<T> {
    map.get(name).cloned().ok_or_else(|| GameError::UnknownTemplate {
        kind,
        name: name.to_string(),
    })
}
