//! Error types for the game simulation.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
///
/// Only invariant violations and malformed data surface as errors. Expected
/// gameplay refusals (a second grab in one tick, dropping onto an occupied
/// slot) are plain `bool` returns on the relevant action.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    /// A size was given with a negative component.
    #[error("Dimensions cannot be negative: {width} x {height}")]
    NegativeDimensions {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },

    /// A vector was divided by zero.
    #[error("Division of a vector by zero")]
    DivisionByZero,

    /// A template lookup failed.
    #[error("Unknown {kind} template: {name}")]
    UnknownTemplate {
        /// Template family (item, weapon, mob).
        kind: &'static str,
        /// Requested name.
        name: String,
    },

    /// Game data failed validation.
    #[error("Invalid game data: {0}")]
    InvalidData(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Extent, Vec2};

    #[test]
    fn test_invariant_violations_are_errors() {
        assert_eq!(
            Extent::new(-1.0, 2.0).unwrap_err(),
            GameError::NegativeDimensions {
                width: -1.0,
                height: 2.0
            }
        );
        assert_eq!(
            Vec2::new(1.0, 1.0).checked_div(0.0).unwrap_err(),
            GameError::DivisionByZero
        );
    }

    #[test]
    fn test_messages_name_the_template() {
        let err = GameError::UnknownTemplate {
            kind: "weapon",
            name: "laser".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown weapon template: laser");
    }
}
