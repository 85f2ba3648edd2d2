//! Pure status-flag derivation, one function per entity kind.
//!
//! Sticky conditions (expiry, revocation, event settlement) survive; derived
//! conditions are rebuilt from the current fields. Visiting an entity clears
//! `UNRESOLVED`.

use crate::types::{flags, BudgetRow, Delegation, Event, Goal, Plan, PlanStatus};
use fixed_point::{Q16, Q48};

pub fn goal_flags(goal: &Goal, tick: u64) -> u32 {
    let mut out = goal.flags & flags::GOAL_EXPIRED;
    if goal.expiry_tick > 0 && tick >= goal.expiry_tick {
        out |= flags::GOAL_EXPIRED;
    }
    out
}

pub fn delegation_flags(delegation: &Delegation) -> u32 {
    delegation.flags & flags::DELEGATION_REVOKED
}

/// `EXHAUSTED` when any non-zero ceiling of the owning delegation is reached.
/// Rows without a resolvable delegation are never exhausted.
pub fn budget_flags(row: &BudgetRow, delegation: Option<&Delegation>) -> u32 {
    match delegation {
        Some(d) if is_exhausted(row, d) => flags::BUDGET_EXHAUSTED,
        _ => 0,
    }
}

fn is_exhausted(row: &BudgetRow, d: &Delegation) -> bool {
    let reached_q48 = |used: Q48, ceiling: Q48| ceiling > Q48::ZERO && used >= ceiling;
    let reached_q16 = |used: Q16, ceiling: Q16| ceiling > Q16::ZERO && used >= ceiling;
    reached_q48(row.time_used, d.time_budget)
        || reached_q48(row.energy_used, d.energy_budget)
        || reached_q16(row.risk_used, d.risk_budget)
        || (d.planning_budget > 0 && row.planning_used >= d.planning_budget)
}

/// `planning_used / planning_budget`, zero without a ceiling.
pub fn planning_utilization(row: &BudgetRow, delegation: Option<&Delegation>) -> Q16 {
    match delegation {
        Some(d) => Q16::ratio(u64::from(row.planning_used), u64::from(d.planning_budget)),
        None => Q16::ZERO,
    }
}

pub fn plan_flags(plan: &Plan) -> u32 {
    match plan.status {
        PlanStatus::Failed => flags::PLAN_FAILED,
        PlanStatus::Completed => flags::PLAN_COMPLETED,
        PlanStatus::Revoked => flags::PLAN_REVOKED,
        PlanStatus::Unset | PlanStatus::Proposed | PlanStatus::Active => 0,
    }
}

pub fn event_flags(event: &Event) -> u32 {
    event.flags & (flags::EVENT_APPLIED | flags::EVENT_FAILED)
}
