//! `DOMINIUM_AUTONOMY_FIXTURE_V1` rows.

use crate::error::FixtureResult;
use crate::lines::{Entry, Key};
use crate::value::{PLAN_STATUS_NAMES, PROCESS_NAMES};
use crate::{apply_common, declare, row};
use autonomy::AutonomySurfaceDesc;

pub(crate) fn apply(desc: &mut AutonomySurfaceDesc, entry: &Entry<'_>) -> FixtureResult<()> {
    let key = entry.parse_key()?;
    if apply_common(&mut desc.domain_id, &mut desc.world_seed, &mut desc.policy, entry, key)? {
        return Ok(());
    }
    match key {
        Key::Count("goal") => declare(&mut desc.goals, entry),
        Key::Count("delegation") => declare(&mut desc.delegations, entry),
        Key::Count("budget") => declare(&mut desc.budgets, entry),
        Key::Count("plan") => declare(&mut desc.plans, entry),
        Key::Count("event") => declare(&mut desc.events, entry),
        Key::Row { kind, index, field } => apply_row(desc, entry, kind, index, field),
        _ => Err(entry.unknown_key()),
    }
}

fn apply_row(
    desc: &mut AutonomySurfaceDesc,
    entry: &Entry<'_>,
    kind: &str,
    index: usize,
    field: &str,
) -> FixtureResult<()> {
    match kind {
        "goal" => {
            let goal = row(&mut desc.goals, entry, index)?;
            match field {
                "goal_id" => goal.goal_id = entry.uint()?,
                "objective_id" => goal.objective_id = entry.uint()?,
                "success_condition_id" => goal.success_condition_id = entry.uint()?,
                "constraint_id" => goal.constraint_id = entry.uint()?,
                "priority" => goal.priority = entry.q16()?,
                "expiry_tick" => goal.expiry_tick = entry.uint()?,
                "delegator_id" => goal.delegator_id = entry.uint()?,
                "provenance_id" => goal.provenance_id = entry.uint()?,
                "region_id" => goal.region_id = entry.uint()?,
                "flags" => goal.flags = entry.uint()?,
                _ => return Err(entry.unknown_key()),
            }
        }
        "delegation" => {
            let delegation = row(&mut desc.delegations, entry, index)?;
            match field {
                "delegation_id" => delegation.delegation_id = entry.uint()?,
                "delegator_id" => delegation.delegator_id = entry.uint()?,
                "delegate_id" => delegation.delegate_id = entry.uint()?,
                "allowed_processes" => {
                    (delegation.allowed_processes, delegation.allowed_count) = entry.process_list()?;
                }
                "time_budget" => delegation.time_budget = entry.q48()?,
                "energy_budget" => delegation.energy_budget = entry.q48()?,
                "risk_budget" => delegation.risk_budget = entry.q16()?,
                "planning_budget" => delegation.planning_budget = entry.uint()?,
                "oversight_policy_id" => delegation.oversight_policy_id = entry.uint()?,
                "revocation_policy_id" => delegation.revocation_policy_id = entry.uint()?,
                "provenance_id" => delegation.provenance_id = entry.uint()?,
                "region_id" => delegation.region_id = entry.uint()?,
                "flags" => delegation.flags = entry.uint()?,
                _ => return Err(entry.unknown_key()),
            }
        }
        "budget" => {
            let budget = row(&mut desc.budgets, entry, index)?;
            match field {
                "budget_id" => budget.budget_id = entry.uint()?,
                "delegation_id" => budget.delegation_id = entry.uint()?,
                "time_used" => budget.time_used = entry.q48()?,
                "energy_used" => budget.energy_used = entry.q48()?,
                "risk_used" => budget.risk_used = entry.q16()?,
                "planning_used" => budget.planning_used = entry.uint()?,
                "provenance_id" => budget.provenance_id = entry.uint()?,
                "region_id" => budget.region_id = entry.uint()?,
                "flags" => budget.flags = entry.uint()?,
                _ => return Err(entry.unknown_key()),
            }
        }
        "plan" => {
            let plan = row(&mut desc.plans, entry, index)?;
            match field {
                "plan_id" => plan.plan_id = entry.uint()?,
                "goal_id" => plan.goal_id = entry.uint()?,
                "delegation_id" => plan.delegation_id = entry.uint()?,
                "steps" => (plan.steps, plan.step_count) = entry.process_list()?,
                "success_score" => plan.success_score = entry.q16()?,
                "estimated_cost" => plan.estimated_cost = entry.q48()?,
                "status" => plan.status = entry.named(&PLAN_STATUS_NAMES)?,
                "provenance_id" => plan.provenance_id = entry.uint()?,
                "region_id" => plan.region_id = entry.uint()?,
                "flags" => plan.flags = entry.uint()?,
                _ => return Err(entry.unknown_key()),
            }
        }
        "event" => {
            let event = row(&mut desc.events, entry, index)?;
            match field {
                "event_id" => event.event_id = entry.uint()?,
                "process" | "process_type" => event.process = entry.named(&PROCESS_NAMES)?,
                "goal_id" => event.goal_id = entry.uint()?,
                "delegation_id" => event.delegation_id = entry.uint()?,
                "plan_id" => event.plan_id = entry.uint()?,
                "budget_id" => event.budget_id = entry.uint()?,
                "delta_priority" => event.delta_priority = entry.q16()?,
                "delta_success" => event.delta_success = entry.q16()?,
                "delta_time" => event.delta_time = entry.q48()?,
                "delta_energy" => event.delta_energy = entry.q48()?,
                "delta_risk" => event.delta_risk = entry.q16()?,
                "delta_planning" => event.delta_planning = entry.uint()?,
                "event_tick" => event.event_tick = entry.uint()?,
                "provenance_id" => event.provenance_id = entry.uint()?,
                "region_id" => event.region_id = entry.uint()?,
                "flags" => event.flags = entry.uint()?,
                _ => return Err(entry.unknown_key()),
            }
        }
        _ => return Err(entry.unknown_key()),
    }
    Ok(())
}
