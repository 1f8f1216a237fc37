//! Timed status effects.
//!
//! An [`Effect`] is a typed modifier with a strength and a remaining
//! duration. Living entities hold one slot per persistent kind (burning,
//! poisoned, frozen); effect zones carry one to hand out on contact.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Kind of status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EffectKind {
    /// No effect.
    #[default]
    None,
    /// Damage over time, `strength` per millisecond.
    Burning,
    /// Damage over time, `strength` per millisecond.
    Poisoned,
    /// Speed multiplier in `[0, 1]`, smaller is slower.
    Frozen,
    /// Knockback away from the source.
    Repel,
    /// Instant damage equal to `strength`.
    Boom,
}

impl EffectKind {
    /// Whether this kind pushes entities away when delivered by a zone.
    #[must_use]
    pub const fn knocks_back(self) -> bool {
        matches!(self, Self::Repel | Self::Boom)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Burning => "Burning",
            Self::Poisoned => "Poisoned",
            Self::Frozen => "Frozen",
            Self::Repel => "Repel",
            Self::Boom => "Boom",
        };
        f.write_str(name)
    }
}

impl FromStr for EffectKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" | "" => Ok(Self::None),
            "Burning" => Ok(Self::Burning),
            "Poisoned" => Ok(Self::Poisoned),
            "Frozen" => Ok(Self::Frozen),
            "Repel" => Ok(Self::Repel),
            "Boom" => Ok(Self::Boom),
            other => Err(GameError::InvalidData(format!("unknown effect kind '{other}'"))),
        }
    }
}

/// A timed, typed status modifier.
///
/// # Example RON
///
/// ```ron
/// Effect(kind: Burning, strength: 0.02, duration_left: 3000)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Effect {
    kind: EffectKind,
    strength: f64,
    duration_left: i64,
}

impl Effect {
    /// Create an effect.
    ///
    /// Frozen strengths outside `[0, 1]` are replaced by `1` (no slow).
    #[must_use]
    pub fn new(kind: EffectKind, strength: f64, duration_left: i64) -> Self {
        let mut effect = Self {
            kind,
            strength: 0.0,
            duration_left,
        };
        if !effect.set_strength(strength) {
            effect.strength = 1.0;
        }
        effect
    }

    /// An inactive effect of the given kind.
    ///
    /// Frozen slots start at strength 1 so an inactive freeze never slows.
    #[must_use]
    pub fn inactive(kind: EffectKind) -> Self {
        let strength = if kind == EffectKind::Frozen { 1.0 } else { 0.0 };
        Self {
            kind,
            strength,
            duration_left: 0,
        }
    }

    /// Effect kind.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Effect strength.
    #[must_use]
    pub const fn strength(&self) -> f64 {
        self.strength
    }

    /// Remaining duration in milliseconds.
    #[must_use]
    pub const fn duration_left(&self) -> i64 {
        self.duration_left
    }

    /// True once no duration is left.
    #[must_use]
    pub const fn has_expired(&self) -> bool {
        self.duration_left <= 0
    }

    /// Overwrite the remaining duration.
    pub fn set_duration(&mut self, duration_ms: i64) {
        self.duration_left = duration_ms;
    }

    /// Overwrite the strength.
    ///
    /// Returns `false` (and leaves the strength untouched) when a frozen
    /// strength outside `[0, 1]` is requested.
    pub fn set_strength(&mut self, strength: f64) -> bool {
        if self.kind == EffectKind::Frozen && !(0.0..=1.0).contains(&strength) {
            return false;
        }
        self.strength = strength;
        true
    }

    /// Subtract `delta_ms` from the remaining duration. Non-positive deltas
    /// are ignored.
    pub fn decrease_duration(&mut self, delta_ms: i64) {
        if delta_ms > 0 {
            self.duration_left -= delta_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_expired_iff_no_duration() {
        let mut e = Effect::new(EffectKind::Burning, 1.0, 10);
        assert!(!e.has_expired());
        e.decrease_duration(10);
        assert!(e.has_expired());
        assert_eq!(e.duration_left(), 0);
    }

    #[test]
    fn test_frozen_strength_range() {
        let mut e = Effect::new(EffectKind::Frozen, 0.5, 100);
        assert!(!e.set_strength(1.5));
        assert!(!e.set_strength(-0.1));
        assert_eq!(e.strength(), 0.5);
        assert!(e.set_strength(0.0));
        assert_eq!(e.strength(), 0.0);
    }

    #[test]
    fn test_frozen_out_of_range_constructor_defaults_to_no_slow() {
        let e = Effect::new(EffectKind::Frozen, 4.0, 100);
        assert_eq!(e.strength(), 1.0);
    }

    #[test]
    fn test_other_kinds_accept_any_strength() {
        let mut e = Effect::new(EffectKind::Repel, 3.0, 100);
        assert!(e.set_strength(25.0));
        assert_eq!(e.strength(), 25.0);
    }

    #[test]
    fn test_inactive_frozen_does_not_slow() {
        let e = Effect::inactive(EffectKind::Frozen);
        assert!(e.has_expired());
        assert_eq!(e.strength(), 1.0);
        assert_eq!(Effect::inactive(EffectKind::Burning).strength(), 0.0);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Boom".parse::<EffectKind>().unwrap(), EffectKind::Boom);
        assert_eq!("".parse::<EffectKind>().unwrap(), EffectKind::None);
        assert!("Lava".parse::<EffectKind>().is_err());
        assert_eq!(EffectKind::Poisoned.to_string(), "Poisoned");
    }

    proptest! {
        #[test]
        fn prop_decrease_duration(start in 1i64..1_000_000, d in -1000i64..1000) {
            let mut e = Effect::new(EffectKind::Poisoned, 0.1, start);
            e.decrease_duration(d);
            if d > 0 {
                prop_assert_eq!(e.duration_left(), start - d);
            } else {
                prop_assert_eq!(e.duration_left(), start);
            }
        }
    }
}
