//! Weapon and projectile template data.

use serde::{Deserialize, Serialize};

use crate::effect::{Effect, EffectKind};
use crate::error::Result;
use crate::math::Extent;
use crate::projectile::{Detonation, ProjectileSpec};
use crate::weapon::Weapon;

/// Explosion of a rocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetonationData {
    /// Effect handed out by the zone.
    pub effect: EffectKind,
    /// Effect strength.
    pub strength: f64,
    /// Zone lifetime in milliseconds.
    pub duration_ms: i64,
    /// Zone radius.
    pub radius: f64,
}

/// Projectile template.
///
/// A projectile with a `detonation` is a rocket, otherwise a missile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileData {
    /// Travel distance before expiring.
    pub range: f64,
    /// Damage per hit (missile) or per reference frame (rocket).
    pub damage: f64,
    /// Whether it survives hits.
    #[serde(default)]
    pub pierces: bool,
    /// Speed in pixels per millisecond.
    pub speed: f64,
    /// Collision box.
    pub size: Extent,
    /// Explosion, for rockets.
    #[serde(default)]
    pub detonation: Option<DetonationData>,
}

impl ProjectileData {
    /// Build the runtime template.
    pub fn to_spec(&self) -> Result<ProjectileSpec> {
        let detonation = match &self.detonation {
            Some(d) => Some(Detonation::new(
                Effect::new(d.effect, d.strength, d.duration_ms),
                d.radius,
            )?),
            None => None,
        };
        Ok(ProjectileSpec {
            range: self.range,
            damage: self.damage,
            pierces: self.pierces,
            speed: self.speed,
            size: self.size,
            detonation,
        })
    }

    pub(crate) fn check(&self, owner: &str, problems: &mut Vec<String>) {
        if self.speed <= 0.0 {
            problems.push(format!("{owner} fires projectiles with non-positive speed"));
        }
        if self.range <= 0.0 {
            problems.push(format!("{owner} fires projectiles with non-positive range"));
        }
        if let Some(d) = &self.detonation {
            if d.radius < 0.0 {
                problems.push(format!("{owner} has a negative detonation radius"));
            }
        }
    }
}

/// Data-driven weapon definition.
///
/// # Example RON
///
/// ```ron
/// WeaponData(
///     name: "bazooka",
///     energy_cost: 25.0,
///     use_delay_ms: 900,
///     size: (40.0, 16.0),
///     sprite: "bazooka.png",
///     projectile: ProjectileData(
///         range: 400.0,
///         damage: 0.0,
///         speed: 0.1,
///         size: (30.0, 30.0),
///         detonation: Some(DetonationData(
///             effect: Boom,
///             strength: 15.0,
///             duration_ms: 300,
///             radius: 80.0,
///         )),
///     ),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponData {
    /// Unique weapon name.
    pub name: String,
    /// Energy consumed per shot.
    #[serde(default)]
    pub energy_cost: f64,
    /// Minimum time between shots.
    #[serde(default)]
    pub use_delay_ms: i64,
    /// Held size.
    #[serde(default)]
    pub size: Extent,
    /// Sprite key.
    #[serde(default)]
    pub sprite: String,
    /// Fired projectile.
    pub projectile: ProjectileData,
}

impl WeaponData {
    /// Build the runtime weapon.
    pub fn to_weapon(&self) -> Result<Weapon> {
        Ok(Weapon::new(
            self.name.clone(),
            self.energy_cost,
            self.use_delay_ms,
            self.size,
            self.projectile.to_spec()?,
        )
        .with_sprite(self.sprite.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weapon::WeaponKind;

    #[test]
    fn test_rocket_launcher_from_ron() {
        let data: WeaponData = ron::from_str(
            r#"WeaponData(
                name: "bazooka",
                projectile: ProjectileData(
                    range: 400.0, damage: 0.0, speed: 0.1, size: (30.0, 30.0),
                    detonation: Some(DetonationData(effect: Boom, strength: 15.0, duration_ms: 300, radius: 80.0)),
                ),
            )"#,
        )
        .unwrap();
        let weapon = data.to_weapon().unwrap();
        assert_eq!(weapon.kind(), WeaponKind::RocketLauncher);
        assert_eq!(weapon.projectile().detonation.unwrap().radius(), 80.0);
    }

    #[test]
    fn test_negative_radius_rejected() {
        let data = ProjectileData {
            range: 1.0,
            damage: 1.0,
            pierces: false,
            speed: 1.0,
            size: Extent::ZERO,
            detonation: Some(DetonationData {
                effect: EffectKind::Burning,
                strength: 0.1,
                duration_ms: 100,
                radius: -3.0,
            }),
        };
        assert!(data.to_spec().is_err());
        let mut problems = Vec::new();
        data.check("test", &mut problems);
        assert_eq!(problems.len(), 1);
    }
}
