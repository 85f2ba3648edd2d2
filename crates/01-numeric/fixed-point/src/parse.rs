//! Exact decimal text conversion for fixture files and reports.

use crate::{Q16, Q48, FRAC_BITS};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MAX_FRACTION_DIGITS: usize = 18;
const DISPLAY_DIGITS: u32 = 6;

/// Error returned when fixed-point text cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseFixedError {
    #[error("empty fixed-point literal")]
    Empty,
    #[error("invalid fixed-point literal '{0}'")]
    Invalid(String),
    #[error("fixed-point literal '{0}' out of range")]
    OutOfRange(String),
}

/// Parses `[-]int[.frac]` or `0x<raw>` into a raw value with 16 fractional bits.
fn parse_raw(text: &str) -> Result<i128, ParseFixedError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseFixedError::Empty);
    }
    let invalid = || ParseFixedError::Invalid(text.to_string());

    let (negative, body) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        let raw = i128::from_str_radix(hex, 16).map_err(|_| invalid())?;
        return Ok(if negative { -raw } else { raw });
    }

    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (body, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }

    let whole: i128 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse::<i128>()
            .map_err(|_| ParseFixedError::OutOfRange(text.to_string()))?
    };
    if whole > (i128::from(i64::MAX) >> FRAC_BITS) + 1 {
        return Err(ParseFixedError::OutOfRange(text.to_string()));
    }

    let digits = &frac_part[..frac_part.len().min(MAX_FRACTION_DIGITS)];
    let fraction = if digits.is_empty() {
        0
    } else {
        let numer: i128 = digits.parse().map_err(|_| invalid())?;
        let denom = 10i128.pow(digits.len() as u32);
        (numer << FRAC_BITS) / denom
    };

    let raw = (whole << FRAC_BITS) + fraction;
    Ok(if negative { -raw } else { raw })
}

impl FromStr for Q16 {
    type Err = ParseFixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = parse_raw(s)?;
        i32::try_from(raw)
            .map(Q16::from_raw)
            .map_err(|_| ParseFixedError::OutOfRange(s.trim().to_string()))
    }
}

impl FromStr for Q48 {
    type Err = ParseFixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = parse_raw(s)?;
        i64::try_from(raw)
            .map(Q48::from_raw)
            .map_err(|_| ParseFixedError::OutOfRange(s.trim().to_string()))
    }
}

/// Renders a raw value as a decimal with six truncated fractional digits.
pub(crate) fn write_decimal(f: &mut fmt::Formatter<'_>, raw: i128) -> fmt::Result {
    let sign = if raw < 0 { "-" } else { "" };
    let magnitude = raw.unsigned_abs();
    let whole = magnitude >> FRAC_BITS;
    let frac_raw = magnitude & ((1u128 << FRAC_BITS) - 1);
    let frac = (frac_raw * 10u128.pow(DISPLAY_DIGITS)) >> FRAC_BITS;
    write!(f, "{sign}{whole}.{frac:06}")
}
