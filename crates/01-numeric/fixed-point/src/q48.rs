use crate::q16::{saturate_i64, Q16};
use crate::{isqrt_u128, FRAC_BITS, ONE_Q16};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed q48.16 fixed-point value used for wide accumulators.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Q48(i64);

impl Q48 {
    pub const ZERO: Q48 = Q48(0);
    pub const ONE: Q48 = Q48(ONE_Q16 as i64);
    pub const MAX: Q48 = Q48(i64::MAX);
    pub const MIN: Q48 = Q48(i64::MIN);

    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Q48(raw)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    pub fn from_int(value: i64) -> Self {
        Q48(saturate_i128(i128::from(value) << FRAC_BITS))
    }

    pub const fn to_int(self) -> i64 {
        self.0 >> FRAC_BITS
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, rhs: Q48) -> Q48 {
        Q48(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(self, rhs: Q48) -> Q48 {
        Q48(self.0.saturating_sub(rhs.0))
    }

    pub fn saturating_mul(self, rhs: Q48) -> Q48 {
        let wide = i128::from(self.0) * i128::from(rhs.0);
        Q48(saturate_i128(wide >> FRAC_BITS))
    }

    /// Divides with the same zero-divisor convention as [`Q16::saturating_div`].
    pub fn saturating_div(self, rhs: Q48) -> Q48 {
        if rhs.0 == 0 {
            return match self.0.signum() {
                1 => Q48::MAX,
                -1 => Q48::MIN,
                _ => Q48::ZERO,
            };
        }
        let wide = (i128::from(self.0) << FRAC_BITS) / i128::from(rhs.0);
        Q48(saturate_i128(wide))
    }

    pub fn saturating_mul_int(self, rhs: u64) -> Q48 {
        Q48(saturate_i128(i128::from(self.0) * i128::from(rhs)))
    }

    /// Divides by a plain integer count; a zero count yields zero.
    pub fn div_int(self, count: u64) -> Q48 {
        if count == 0 {
            return Q48::ZERO;
        }
        Q48(saturate_i128(i128::from(self.0) / i128::from(count)))
    }

    /// Square root rounded down; negative inputs yield zero.
    pub fn sqrt(self) -> Q48 {
        if self.0 <= 0 {
            return Q48::ZERO;
        }
        let root = isqrt_u128((self.0 as u128) << FRAC_BITS);
        Q48(root.min(i64::MAX as u128) as i64)
    }

    pub fn max(self, other: Q48) -> Q48 {
        Q48(self.0.max(other.0))
    }

    pub fn min(self, other: Q48) -> Q48 {
        Q48(self.0.min(other.0))
    }

    /// Narrows into q16.16, saturating.
    pub fn narrow(self) -> Q16 {
        Q16::from_raw(saturate_i64(self.0))
    }

    /// `used / ceiling` as a unit-interval ratio; zero when either side is
    /// non-positive.
    pub fn ratio_of(used: Q48, ceiling: Q48) -> Q16 {
        if ceiling.0 <= 0 || used.0 <= 0 {
            return Q16::ZERO;
        }
        Q16::ratio(used.0 as u64, ceiling.0 as u64)
    }
}

fn saturate_i128(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

impl From<Q16> for Q48 {
    fn from(value: Q16) -> Self {
        value.widen()
    }
}

impl fmt::Display for Q48 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::parse::write_decimal(f, i128::from(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_of_perfect_squares_is_exact() {
        assert_eq!(Q48::from_int(9).sqrt(), Q48::from_int(3));
        assert_eq!(Q48::from_int(1_000_000).sqrt(), Q48::from_int(1_000));
        assert_eq!(Q48::from_raw(ONE_Q16 as i64 / 4).sqrt(), Q48::from_raw(ONE_Q16 as i64 / 2));
    }

    #[test]
    fn sqrt_of_negative_is_zero() {
        assert_eq!(Q48::from_int(-4).sqrt(), Q48::ZERO);
    }

    #[test]
    fn narrow_saturates() {
        assert_eq!(Q48::from_int(1 << 20).narrow(), Q16::MAX);
        assert_eq!(Q48::from_int(-(1 << 20)).narrow(), Q16::MIN);
        assert_eq!(Q48::from_int(7).narrow(), Q16::from_int(7));
    }

    #[test]
    fn ratio_of_handles_missing_ceiling() {
        assert_eq!(Q48::ratio_of(Q48::from_int(50), Q48::from_int(100)), Q16::from_raw(ONE_Q16 / 2));
        assert_eq!(Q48::ratio_of(Q48::from_int(50), Q48::ZERO), Q16::ZERO);
        assert_eq!(Q48::ratio_of(Q48::from_int(500), Q48::from_int(100)), Q16::ONE);
    }

    #[test]
    fn div_int_truncates() {
        assert_eq!(Q48::from_int(7).div_int(2), Q48::from_raw(7 * ONE_Q16 as i64 / 2));
        assert_eq!(Q48::from_int(7).div_int(0), Q48::ZERO);
    }
}
