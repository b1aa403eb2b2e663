//! Immutable 2D vector over the arbitrary-precision number type.

#[cfg(test)]
#[path = "vec2_test.rs"]
mod vec2_test;

use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::num::{self, Num};

/// A 2D point or vector in world space.
///
/// Value semantics: every operation returns a new instance and nothing
/// mutates in place. Equality is componentwise (numeric, so `5` equals
/// `5.0`). Components serialize as exact scientific-notation strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    /// Horizontal component.
    #[serde(with = "num::serde_num")]
    pub x: Num,
    /// Vertical component.
    #[serde(with = "num::serde_num")]
    pub y: Num,
}

impl Vector2 {
    #[must_use]
    pub fn new(x: Num, y: Num) -> Self {
        Self { x, y }
    }

    /// The origin.
    #[must_use]
    pub fn zero() -> Self {
        Self { x: Num::zero(), y: Num::zero() }
    }

    /// Build from machine floats (non-finite components map to zero).
    #[must_use]
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self { x: num::from_f64(x), y: num::from_f64(y) }
    }

    /// Componentwise sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self { x: &self.x + &other.x, y: &self.y + &other.y }
    }

    /// Componentwise difference.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        Self { x: &self.x - &other.x, y: &self.y - &other.y }
    }

    /// Scale by a scalar.
    #[must_use]
    pub fn mul(&self, scalar: &Num) -> Self {
        Self { x: &self.x * scalar, y: &self.y * scalar }
    }

    /// Divide by a scalar. Division by zero yields the zero vector rather
    /// than propagating an invalid value.
    #[must_use]
    pub fn div(&self, scalar: &Num) -> Self {
        if scalar.is_zero() {
            return Self::zero();
        }
        Self { x: &self.x / scalar, y: &self.y / scalar }
    }

    /// Euclidean length, `sqrt(x² + y²)`.
    ///
    /// The zero vector has magnitude exactly zero. This goes through the
    /// big-decimal square root, which is expensive relative to native
    /// floats; keep it out of per-pixel loops.
    #[must_use]
    pub fn magnitude(&self) -> Num {
        let sq = &self.x * &self.x + &self.y * &self.y;
        if sq.is_zero() {
            return Num::zero();
        }
        sq.sqrt().unwrap_or_else(Num::zero)
    }
}

impl std::ops::Add for &Vector2 {
    type Output = Vector2;

    fn add(self, other: Self) -> Self::Output {
        Vector2::add(self, other)
    }
}

impl std::ops::Sub for &Vector2 {
    type Output = Vector2;

    fn sub(self, other: Self) -> Self::Output {
        Vector2::sub(self, other)
    }
}
