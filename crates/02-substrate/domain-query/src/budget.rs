use serde::{Deserialize, Serialize};

/// Consumable work budget threaded through query and resolve calls.
///
/// The caller owns the budget and decides when to reset it (typically once per
/// tick). A charge that does not fit is rejected whole.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Units consumed so far.
    pub used_units: u32,
    /// Ceiling that `used_units` may never exceed.
    pub max_units: u32,
}

impl Budget {
    /// Creates an unused budget with the given ceiling.
    pub const fn new(max_units: u32) -> Self {
        Self {
            used_units: 0,
            max_units,
        }
    }

    /// Charges `cost` units. Returns `false` and leaves the budget untouched
    /// when the charge would exceed the ceiling.
    pub fn consume(&mut self, cost: u32) -> bool {
        match self.used_units.checked_add(cost) {
            Some(next) if next <= self.max_units => {
                self.used_units = next;
                true
            }
            _ => false,
        }
    }

    /// Units still available.
    pub fn remaining(&self) -> u32 {
        self.max_units.saturating_sub(self.used_units)
    }

    /// Whether no further unit can be charged.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Clears usage, keeping the ceiling.
    pub fn reset(&mut self) {
        self.used_units = 0;
    }
}
