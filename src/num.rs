//! Arbitrary-precision number plumbing.
//!
//! Every quantity that can span the full zoom envelope (positions, sizes,
//! the camera range) is a [`Num`], an arbitrary-precision decimal with an
//! `i64` exponent, which comfortably covers 1e±900000000. This module owns
//! the conversions at the boundary of that world: exact string encoding for
//! serialization, saturating conversion to `f64` for screen-space math, and
//! the log10/pow10 pair used for logarithmic zoom interpolation.

#[cfg(test)]
#[path = "num_test.rs"]
mod num_test;

use bigdecimal::BigDecimal;
use num_traits::{FromPrimitive, One, Zero};

use crate::consts::SCREEN_SATURATION_PX;

/// The arbitrary-precision number used throughout the core.
pub type Num = BigDecimal;

/// Error returned when a numeric string cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid number {0:?}")]
pub struct ParseNumError(pub String);

/// Convert an `f64` to a [`Num`]. Non-finite input maps to zero; the core
/// never lets NaN or infinity enter the arbitrary-precision domain.
#[must_use]
pub fn from_f64(v: f64) -> Num {
    if v.is_finite() {
        Num::from_f64(v).unwrap_or_else(Num::zero)
    } else {
        Num::zero()
    }
}

/// Encode a [`Num`] as a scientific-notation string that parses back to an
/// equal value with no precision loss. This is the wire format for every
/// serialized coordinate and size.
#[must_use]
pub fn to_compact_string(n: &Num) -> String {
    n.to_scientific_notation()
}

/// Parse a numeric string (plain or scientific notation).
///
/// # Errors
///
/// Returns [`ParseNumError`] if the string is not a valid decimal.
pub fn parse(s: &str) -> Result<Num, ParseNumError> {
    s.trim()
        .parse::<Num>()
        .map_err(|_| ParseNumError(s.to_owned()))
}

/// Exact power of ten, `10^e`, for any `i64` exponent.
#[must_use]
pub fn pow10_int(e: i64) -> Num {
    // "1e{e}" is always a valid decimal literal.
    format!("1e{e}").parse::<Num>().unwrap_or_else(|_| Num::one())
}

/// Mantissa (signed, in `[1, 10)` for nonzero values) and decimal exponent
/// of a [`Num`], both as machine numbers.
fn sci_parts(n: &Num) -> (f64, i64) {
    let s = n.to_scientific_notation();
    match s.split_once('e') {
        Some((mantissa, exponent)) => (
            mantissa.parse::<f64>().unwrap_or(0.0),
            exponent.parse::<i64>().unwrap_or(0),
        ),
        None => (s.parse::<f64>().unwrap_or(0.0), 0),
    }
}

/// Approximate base-10 logarithm. `None` for zero or negative input.
///
/// Accurate to f64 resolution of the full log value, which for exponents
/// near ±9e8 means roughly 1e-7 absolute, far finer than any perceptible
/// zoom step.
#[must_use]
pub fn log10(n: &Num) -> Option<f64> {
    if *n <= Num::zero() {
        return None;
    }
    let (m, e) = sci_parts(n);
    if m <= 0.0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let log = e as f64 + m.log10();
    Some(log)
}

/// Reconstruct `10^l` as a [`Num`] from a (possibly huge) f64 log value.
///
/// The integer part of `l` becomes the exact decimal exponent; only the
/// fractional part goes through floating point, so the result is accurate
/// to ~15 significant digits at any magnitude.
#[must_use]
pub fn pow10(l: f64) -> Num {
    let floor = l.floor();
    let frac = l - floor;
    #[allow(clippy::cast_possible_truncation)]
    let e = floor as i64;
    let mantissa = from_f64(10f64.powf(frac)).with_prec(15);
    mantissa * pow10_int(e)
}

/// Convert a [`Num`] to `f64`, saturating at ±[`SCREEN_SATURATION_PX`].
///
/// Used for screen-space math only: anything beyond the saturation bound is
/// equally far off-screen, and saturating keeps inf/NaN out of the
/// comparisons downstream.
#[must_use]
pub fn to_f64_clamped(n: &Num) -> f64 {
    let (m, e) = sci_parts(n);
    if m == 0.0 {
        return 0.0;
    }
    if e > 12 {
        return m.signum() * SCREEN_SATURATION_PX;
    }
    if e < -320 {
        return 0.0;
    }
    #[allow(clippy::cast_possible_truncation)]
    let v = m * 10f64.powi(e as i32);
    v.clamp(-SCREEN_SATURATION_PX, SCREEN_SATURATION_PX)
}

/// Clamp `n` into `[lo, hi]`.
#[must_use]
pub fn clamp(n: &Num, lo: &Num, hi: &Num) -> Num {
    if n < lo {
        lo.clone()
    } else if n > hi {
        hi.clone()
    } else {
        n.clone()
    }
}

/// Serde adapter: a [`Num`] field encoded as its exact scientific string.
pub mod serde_num {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Num;

    /// Serialize a [`Num`] as its compact scientific string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(n: &Num, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::to_compact_string(n))
    }

    /// Deserialize a [`Num`] from a numeric string.
    ///
    /// # Errors
    ///
    /// Fails if the string is not a valid decimal.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Num, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse(&raw).map_err(serde::de::Error::custom)
    }
}
