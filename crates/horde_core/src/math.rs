//! 2D vector math for the simulation.
//!
//! [`Vec2`] is an immutable value type: every operation returns a new
//! vector. [`Extent`] is a validated, non-negative size used for collision
//! boxes.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Tolerance used by [`Vec2::approx_eq`].
pub const EPSILON: f64 = 1e-9;

/// Immutable 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    x: f64,
    y: f64,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);
    /// Unit vector pointing up (positive y).
    pub const UP: Self = Self::new(0.0, 1.0);
    /// Unit vector pointing down (negative y).
    pub const DOWN: Self = Self::new(0.0, -1.0);
    /// Unit vector pointing right.
    pub const RIGHT: Self = Self::new(1.0, 0.0);
    /// Unit vector pointing left.
    pub const LEFT: Self = Self::new(-1.0, 0.0);

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Abscissa.
    #[must_use]
    pub const fn x(self) -> f64 {
        self.x
    }

    /// Ordinate.
    #[must_use]
    pub const fn y(self) -> f64 {
        self.y
    }

    /// Copy of this vector with a new abscissa.
    #[must_use]
    pub const fn with_x(self, x: f64) -> Self {
        Self::new(x, self.y)
    }

    /// Copy of this vector with a new ordinate.
    #[must_use]
    pub const fn with_y(self, y: f64) -> Self {
        Self::new(self.x, y)
    }

    /// Euclidean length.
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.sqr_magnitude().sqrt()
    }

    /// Squared length (avoids sqrt for comparisons).
    #[must_use]
    pub fn sqr_magnitude(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Unit vector with the same direction.
    ///
    /// A zero vector is returned unchanged.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            return self;
        }
        Self::new(self.x / mag, self.y / mag)
    }

    /// Whether both components are exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross product).
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).magnitude()
    }

    /// Squared distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        (other - self).sqr_magnitude()
    }

    /// Rotate counter-clockwise by `degrees`.
    #[must_use]
    pub fn rotate(self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Angle of this vector from the positive x axis, in degrees `(-180, 180]`.
    #[must_use]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }

    /// Projection of this vector onto `other`.
    ///
    /// Projecting onto the zero vector yields the zero vector.
    #[must_use]
    pub fn project_onto(self, other: Self) -> Self {
        let denom = other.sqr_magnitude();
        if denom == 0.0 {
            return Self::ZERO;
        }
        other * (self.dot(other) / denom)
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Divide by a scalar, failing on a zero divisor.
    pub fn checked_div(self, scalar: f64) -> Result<Self> {
        if scalar == 0.0 {
            return Err(GameError::DivisionByZero);
        }
        Ok(Self::new(self.x / scalar, self.y / scalar))
    }

    /// Equality within [`EPSILON`] on both components.
    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;

    /// # Panics
    ///
    /// Panics when `rhs` is zero. Use [`Vec2::checked_div`] for a fallible
    /// division.
    fn div(self, rhs: f64) -> Self::Output {
        match self.checked_div(rhs) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Non-negative width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Extent {
    width: f64,
    height: f64,
}

impl Extent {
    /// Zero-sized extent.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create an extent, rejecting negative components.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        // `!(x >= 0.0)` also rejects NaN.
        if !(width >= 0.0) || !(height >= 0.0) {
            return Err(GameError::NegativeDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Square extent enclosing a circle of `radius`.
    pub fn around_circle(radius: f64) -> Result<Self> {
        Self::new(2.0 * radius, 2.0 * radius)
    }

    /// Width.
    #[must_use]
    pub const fn width(self) -> f64 {
        self.width
    }

    /// Height.
    #[must_use]
    pub const fn height(self) -> f64 {
        self.height
    }

    /// The extent as a vector `(width, height)`.
    #[must_use]
    pub const fn as_vec2(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Half of the extent as a vector.
    #[must_use]
    pub fn half(self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl TryFrom<(f64, f64)> for Extent {
    type Error = GameError;

    fn try_from((width, height): (f64, f64)) -> Result<Self> {
        Self::new(width, height)
    }
}

impl TryFrom<Vec2> for Extent {
    type Error = GameError;

    fn try_from(v: Vec2) -> Result<Self> {
        Self::new(v.x, v.y)
    }
}

impl From<Extent> for (f64, f64) {
    fn from(e: Extent) -> Self {
        (e.width, e.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = Vec2::new(3.0, 4.0).normalized();
        assert!((v.magnitude() - 1.0).abs() < EPSILON);
        assert!(v.approx_eq(Vec2::new(0.6, 0.8)));
    }

    #[test]
    fn test_checked_div_by_zero() {
        assert_eq!(
            Vec2::new(1.0, 1.0).checked_div(0.0),
            Err(GameError::DivisionByZero)
        );
    }

    #[test]
    #[should_panic(expected = "Division of a vector by zero")]
    fn test_div_operator_panics_on_zero() {
        let _ = Vec2::new(1.0, 2.0) / 0.0;
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = Vec2::RIGHT.rotate(90.0);
        assert!(v.approx_eq(Vec2::UP));
    }

    #[test]
    fn test_angle() {
        assert!((Vec2::UP.angle() - 90.0).abs() < EPSILON);
        assert!((Vec2::LEFT.angle() - 180.0).abs() < EPSILON);
    }

    #[test]
    fn test_project_onto() {
        let p = Vec2::new(2.0, 3.0).project_onto(Vec2::new(5.0, 0.0));
        assert!(p.approx_eq(Vec2::new(2.0, 0.0)));
        assert_eq!(Vec2::new(2.0, 3.0).project_onto(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_min_max() {
        let a = Vec2::new(1.0, 5.0);
        let b = Vec2::new(3.0, 2.0);
        assert_eq!(a.min(b), Vec2::new(1.0, 2.0));
        assert_eq!(a.max(b), Vec2::new(3.0, 5.0));
    }

    #[test]
    fn test_extent_rejects_negative() {
        assert!(Extent::new(-1.0, 2.0).is_err());
        assert!(Extent::new(1.0, f64::NAN).is_err());
        assert!(Extent::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_extent_ron_validation() {
        let ok: Extent = ron::from_str("(3.0, 4.0)").unwrap();
        assert_eq!(ok.as_vec2(), Vec2::new(3.0, 4.0));
        assert!(ron::from_str::<Extent>("(-3.0, 4.0)").is_err());
    }

    proptest! {
        #[test]
        fn prop_rotation_preserves_length(
            x in -1000.0f64..1000.0,
            y in -1000.0f64..1000.0,
            angle in -720.0f64..720.0,
        ) {
            let v = Vec2::new(x, y);
            prop_assert!((v.rotate(angle).magnitude() - v.magnitude()).abs() < 1e-6);
        }

        #[test]
        fn prop_add_sub_inverse(
            ax in -1e6f64..1e6, ay in -1e6f64..1e6,
            bx in -1e6f64..1e6, by in -1e6f64..1e6,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            let back = (a + b) - b;
            prop_assert!((back.x() - a.x()).abs() < 1e-6);
            prop_assert!((back.y() - a.y()).abs() < 1e-6);
        }
    }
}
