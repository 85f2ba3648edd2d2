//! Typed value parsing for fixture entries.

use crate::error::{FixtureError, FixtureResult};
use crate::lines::Entry;
use autonomy::{PlanStatus, ProcessType};
use fixed_point::{Q16, Q48};
use hazard::{HazardClass, Point};
use log::debug;
use std::str::FromStr;

/// Names accepted for each enum, indexed by discriminant.
pub const PROCESS_NAMES: [(&str, ProcessType); 8] = [
    ("unset", ProcessType::Unset),
    ("plan", ProcessType::Plan),
    ("execute", ProcessType::Execute),
    ("revise", ProcessType::Revise),
    ("revoke", ProcessType::Revoke),
    ("expire", ProcessType::Expire),
    ("fail", ProcessType::Fail),
    ("complete", ProcessType::Complete),
];

pub const PLAN_STATUS_NAMES: [(&str, PlanStatus); 6] = [
    ("unset", PlanStatus::Unset),
    ("proposed", PlanStatus::Proposed),
    ("active", PlanStatus::Active),
    ("failed", PlanStatus::Failed),
    ("completed", PlanStatus::Completed),
    ("revoked", PlanStatus::Revoked),
];

pub const HAZARD_CLASS_NAMES: [(&str, HazardClass); 7] = [
    ("unset", HazardClass::Unset),
    ("fire", HazardClass::Fire),
    ("toxic", HazardClass::Toxic),
    ("radiation", HazardClass::Radiation),
    ("electrical", HazardClass::Electrical),
    ("biological", HazardClass::Biological),
    ("thermal", HazardClass::Thermal),
];

impl Entry<'_> {
    pub fn invalid(&self, reason: impl ToString) -> FixtureError {
        FixtureError::InvalidValue {
            line: self.line,
            key: self.key.to_owned(),
            value: self.value.to_owned(),
            reason: reason.to_string(),
        }
    }

    /// Unsigned integer in decimal or `0x` hex.
    pub fn uint<T: TryFrom<u64>>(&self) -> FixtureResult<T> {
        let parsed = match self.value.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => self.value.parse(),
        }
        .map_err(|err| self.invalid(err))?;
        T::try_from(parsed).map_err(|_| self.invalid("out of range"))
    }

    pub fn q16(&self) -> FixtureResult<Q16> {
        self.parsed()
    }

    pub fn q48(&self) -> FixtureResult<Q48> {
        self.parsed()
    }

    fn parsed<T>(&self) -> FixtureResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.value.parse().map_err(|err| self.invalid(err))
    }

    /// Enum value by case-insensitive name or by discriminant.
    pub fn named<T: Copy>(&self, names: &[(&str, T)]) -> FixtureResult<T> {
        lookup(self.value, names).ok_or_else(|| self.invalid("unknown name"))
    }

    /// Comma-separated process list, truncated to `N` entries.
    pub fn process_list<const N: usize>(&self) -> FixtureResult<([ProcessType; N], u32)> {
        let mut out = [ProcessType::Unset; N];
        let mut count = 0;
        let names = self.value.split(',').map(str::trim).filter(|s| !s.is_empty());
        for (idx, name) in names.enumerate() {
            let process = lookup(name, &PROCESS_NAMES)
                .ok_or_else(|| self.invalid(format!("unknown process `{name}`")))?;
            match out.get_mut(idx) {
                Some(slot) => {
                    *slot = process;
                    count += 1;
                }
                None => debug!("line {}: `{}` truncated to {N} entries", self.line, self.key),
            }
        }
        Ok((out, count))
    }

    /// `x,y,z` in decimal fixed point.
    pub fn point(&self) -> FixtureResult<Point> {
        let parts: Vec<&str> = self.value.split(',').map(str::trim).collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(self.invalid("expected `x,y,z`"));
        };
        let axis = |text: &str| text.parse::<Q16>().map_err(|err| self.invalid(err));
        Ok(Point::new(axis(*x)?, axis(*y)?, axis(*z)?))
    }
}

fn lookup<T: Copy>(text: &str, names: &[(&str, T)]) -> Option<T> {
    if let Ok(index) = text.parse::<usize>() {
        return names.get(index).map(|&(_, value)| value);
    }
    names
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(text))
        .map(|&(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixed_point::ONE_Q16;

    fn entry(value: &str) -> Entry<'_> {
        Entry {
            line: 3,
            key: "k",
            value,
        }
    }

    #[test]
    fn enums_by_name_or_number() {
        assert_eq!(entry("EXECUTE").named(&PROCESS_NAMES).unwrap(), ProcessType::Execute);
        assert_eq!(entry("7").named(&PROCESS_NAMES).unwrap(), ProcessType::Complete);
        assert_eq!(entry("thermal").named(&HAZARD_CLASS_NAMES).unwrap(), HazardClass::Thermal);
        assert!(entry("8").named(&PROCESS_NAMES).is_err());
        assert!(entry("nope").named(&PLAN_STATUS_NAMES).is_err());
    }

    #[test]
    fn integers_accept_hex_and_reject_overflow() {
        assert_eq!(entry("0x10").uint::<u32>().unwrap(), 16);
        assert_eq!(entry("42").uint::<u64>().unwrap(), 42);
        assert!(entry("4294967296").uint::<u32>().is_err());
        assert!(entry("-1").uint::<u32>().is_err());
    }

    #[test]
    fn process_lists_truncate() {
        let (list, count) = entry("plan, execute,complete").process_list::<2>().unwrap();
        assert_eq!(list, [ProcessType::Plan, ProcessType::Execute]);
        assert_eq!(count, 2);
        assert!(entry("plan,dance").process_list::<4>().is_err());
    }

    #[test]
    fn points_need_three_axes() {
        let point = entry("1.5, -2, 0").point().unwrap();
        assert_eq!(point.x, Q16::from_raw(ONE_Q16 + ONE_Q16 / 2));
        assert_eq!(point.y, Q16::from_int(-2));
        assert!(entry("1,2").point().is_err());
        assert!(entry("1,2,x").point().is_err());
    }

    #[test]
    fn invalid_values_keep_their_line() {
        let err = entry("abc").q16().unwrap_err();
        assert_eq!(err.line(), Some(3));
    }
}
