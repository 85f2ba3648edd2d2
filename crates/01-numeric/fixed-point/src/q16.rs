use crate::q48::Q48;
use crate::{FRAC_BITS, ONE_Q16};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed q16.16 fixed-point value.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Q16(i32);

impl Q16 {
    pub const ZERO: Q16 = Q16(0);
    pub const ONE: Q16 = Q16(ONE_Q16);
    pub const MAX: Q16 = Q16(i32::MAX);
    pub const MIN: Q16 = Q16(i32::MIN);

    /// Wraps a raw q16.16 bit pattern.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Q16(raw)
    }

    /// Returns the raw q16.16 bit pattern.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Converts an integer, saturating outside the representable range.
    pub fn from_int(value: i32) -> Self {
        Q16(saturate_i64(i64::from(value) << FRAC_BITS))
    }

    /// Integer part, rounded toward negative infinity.
    pub const fn to_int(self) -> i32 {
        self.0 >> FRAC_BITS
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, rhs: Q16) -> Q16 {
        Q16(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(self, rhs: Q16) -> Q16 {
        Q16(self.0.saturating_sub(rhs.0))
    }

    pub fn saturating_mul(self, rhs: Q16) -> Q16 {
        let wide = i64::from(self.0) * i64::from(rhs.0);
        Q16(saturate_i64(wide >> FRAC_BITS))
    }

    /// Divides, saturating on overflow. Division by zero saturates toward the
    /// sign of the numerator and `0 / 0` is zero.
    pub fn saturating_div(self, rhs: Q16) -> Q16 {
        if rhs.0 == 0 {
            return match self.0.signum() {
                1 => Q16::MAX,
                -1 => Q16::MIN,
                _ => Q16::ZERO,
            };
        }
        let wide = (i64::from(self.0) << FRAC_BITS) / i64::from(rhs.0);
        Q16(saturate_i64(wide))
    }

    /// Multiplies by a plain integer (e.g. a tick count).
    pub fn saturating_mul_int(self, rhs: u64) -> Q16 {
        let wide = i128::from(self.0) * i128::from(rhs);
        Q16(wide.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32)
    }

    /// Clamps into the unit interval `[0, ONE]`.
    pub fn clamp01(self) -> Q16 {
        Q16(self.0.clamp(0, ONE_Q16))
    }

    pub fn max(self, other: Q16) -> Q16 {
        Q16(self.0.max(other.0))
    }

    pub fn min(self, other: Q16) -> Q16 {
        Q16(self.0.min(other.0))
    }

    /// Lossless widening into q48.16.
    pub const fn widen(self) -> Q48 {
        Q48::from_raw(self.0 as i64)
    }

    /// `num / den` as a unit-interval ratio; zero when `den` is zero.
    pub fn ratio(num: u64, den: u64) -> Q16 {
        if den == 0 {
            return Q16::ZERO;
        }
        let raw = (u128::from(num) << FRAC_BITS) / u128::from(den);
        Q16(raw.min(ONE_Q16 as u128) as i32)
    }
}

pub(crate) fn saturate_i64(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl fmt::Display for Q16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::parse::write_decimal(f, i128::from(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_and_div_are_inverse_for_simple_values() {
        let half = Q16::from_raw(ONE_Q16 / 2);
        let three = Q16::from_int(3);
        assert_eq!(three.saturating_mul(half), Q16::from_raw(3 * ONE_Q16 / 2));
        assert_eq!(three.saturating_div(Q16::from_int(2)), Q16::from_raw(3 * ONE_Q16 / 2));
    }

    #[test]
    fn arithmetic_saturates() {
        assert_eq!(Q16::MAX.saturating_add(Q16::ONE), Q16::MAX);
        assert_eq!(Q16::MIN.saturating_sub(Q16::ONE), Q16::MIN);
        assert_eq!(Q16::from_int(30_000).saturating_mul(Q16::from_int(30_000)), Q16::MAX);
        assert_eq!(Q16::from_int(40_000), Q16::MAX);
    }

    #[test]
    fn division_by_zero_follows_numerator_sign() {
        assert_eq!(Q16::ONE.saturating_div(Q16::ZERO), Q16::MAX);
        assert_eq!(Q16::from_int(-1).saturating_div(Q16::ZERO), Q16::MIN);
        assert_eq!(Q16::ZERO.saturating_div(Q16::ZERO), Q16::ZERO);
    }

    #[test]
    fn ratio_is_clamped_and_zero_safe() {
        assert_eq!(Q16::ratio(1, 2), Q16::from_raw(ONE_Q16 / 2));
        assert_eq!(Q16::ratio(5, 0), Q16::ZERO);
        assert_eq!(Q16::ratio(150, 100), Q16::ONE);
    }

    #[test]
    fn clamp01_bounds_both_sides() {
        assert_eq!(Q16::from_int(-2).clamp01(), Q16::ZERO);
        assert_eq!(Q16::from_int(2).clamp01(), Q16::ONE);
        assert_eq!(Q16::from_raw(123).clamp01(), Q16::from_raw(123));
    }
}
