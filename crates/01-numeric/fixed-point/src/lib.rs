//! Deterministic fixed-point arithmetic for the world-domain engines.
//!
//! Two formats are provided: [`Q16`] (q16.16 in an `i32`) for ratios, rates and
//! coordinates, and [`Q48`] (q48.16 in an `i64`) for wide accumulators and
//! unbounded quantities. Every operation saturates instead of wrapping, and no
//! floating point is used anywhere, so results are bit-identical on every host.

mod parse;
mod q16;
mod q48;

pub use parse::ParseFixedError;
pub use q16::Q16;
pub use q48::Q48;

/// Number of fractional bits shared by both formats.
pub const FRAC_BITS: u32 = 16;

/// Raw value of `1.0` in either format.
pub const ONE_Q16: i32 = 1 << FRAC_BITS;

/// Integer square root (floor) of a 128-bit value.
pub(crate) fn isqrt_u128(value: u128) -> u128 {
    if value < 2 {
        return value;
    }
    let mut bit: u128 = 1 << ((127 - value.leading_zeros()) & !1);
    let mut rem = value;
    let mut root: u128 = 0;
    while bit != 0 {
        if rem >= root + bit {
            rem -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isqrt_matches_perfect_squares() {
        for n in [0u128, 1, 4, 9, 16, 65_536, 1 << 40, 12_345 * 12_345] {
            let root = isqrt_u128(n);
            assert_eq!(root * root, n);
        }
    }

    #[test]
    fn isqrt_floors_between_squares() {
        assert_eq!(isqrt_u128(2), 1);
        assert_eq!(isqrt_u128(8), 2);
        assert_eq!(isqrt_u128(99), 9);
        assert_eq!(isqrt_u128(u128::MAX), u64::MAX as u128);
    }
}
