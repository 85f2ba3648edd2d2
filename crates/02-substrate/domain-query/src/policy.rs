use serde::{Deserialize, Serialize};

/// Named cost tier selected by a call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CostTier {
    /// Exact single-entity reads.
    Full,
    /// Base charge of region scans and resolve passes.
    Medium,
    /// Per-entity charge inside scans.
    Coarse,
    /// Answers served from aggregate capsules.
    Analytic,
}

/// Cost table charged against a [`crate::Budget`].
///
/// A tier configured as `0` costs one unit; every charge makes progress
/// toward exhausting the budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub cost_full: u32,
    pub cost_medium: u32,
    pub cost_coarse: u32,
    pub cost_analytic: u32,
}

impl Policy {
    /// Effective cost of `tier`.
    pub fn cost(&self, tier: CostTier) -> u32 {
        let raw = match tier {
            CostTier::Full => self.cost_full,
            CostTier::Medium => self.cost_medium,
            CostTier::Coarse => self.cost_coarse,
            CostTier::Analytic => self.cost_analytic,
        };
        raw.max(1)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            cost_full: 1,
            cost_medium: 1,
            cost_coarse: 1,
            cost_analytic: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tiers_cost_one_unit() {
        let policy = Policy {
            cost_full: 0,
            cost_medium: 4,
            cost_coarse: 0,
            cost_analytic: 2,
        };
        assert_eq!(policy.cost(CostTier::Full), 1);
        assert_eq!(policy.cost(CostTier::Medium), 4);
        assert_eq!(policy.cost(CostTier::Coarse), 1);
        assert_eq!(policy.cost(CostTier::Analytic), 2);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let policy: Policy = toml::from_str("cost_full = 8\n").expect("parse policy");
        assert_eq!(policy.cost_full, 8);
        assert_eq!(policy.cost_coarse, 1);
    }
}
