//! Services shared by every entity during a tick.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimConfig;
use crate::entity::Entity;
use crate::loot::{LootTables, NOTHING};
use crate::math::Vec2;
use crate::registry::Registry;

/// Templates, loot tables, the seeded RNG and configuration.
///
/// Owned by the scene and lent to entities while they collide and update.
#[derive(Debug, Clone)]
pub struct SimContext {
    /// Item, weapon and mob templates.
    pub registry: Registry,
    /// Loot tables.
    pub loot: LootTables,
    /// The only source of randomness in the simulation.
    pub rng: StdRng,
    /// Tuning parameters.
    pub config: SimConfig,
}

impl SimContext {
    /// Create a context; the RNG is seeded from `config.seed`.
    #[must_use]
    pub fn new(registry: Registry, loot: LootTables, config: SimConfig) -> Self {
        Self {
            registry,
            loot,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Roll `table` and build the dropped item centred on `center`.
    ///
    /// `None` for a "Nothing" roll or an item name with no template.
    pub fn roll_loot(&mut self, table: &str, center: Vec2) -> Option<Entity> {
        let name = self.loot.sample(table, &mut self.rng);
        if name == NOTHING {
            return None;
        }
        match self.registry.item(name) {
            Ok(mut item) => {
                item.body.set_center(center);
                Some(item)
            }
            Err(err) => {
                tracing::warn!(table, %err, "loot roll dropped nothing");
                None
            }
        }
    }

    /// Uniformly random unit vector.
    pub fn random_direction(&mut self) -> Vec2 {
        Vec2::RIGHT.rotate(self.rng.gen_range(0.0..360.0))
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new(Registry::default(), LootTables::default(), SimConfig::default())
    }
}
