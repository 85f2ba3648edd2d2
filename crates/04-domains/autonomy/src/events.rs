//! Event target resolution and the plan/goal state machine.
//!
//! Target lookup and mutation are kept apart: [`find_targets`] walks the
//! relation graph once per entity kind, [`AutonomyDomain::apply_event`]
//! performs a single match over the process type.

use crate::derive;
use crate::domain::AutonomyDomain;
use crate::types::{
    flags, BudgetRow, Delegation, Event, Goal, Plan, PlanStatus, ProcessType,
};
use domain_core::{id_ref, EntityId};
use log::trace;

/// Row indices an event acts on; `None` when nothing resolves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventTargets {
    pub goal: Option<usize>,
    pub delegation: Option<usize>,
    pub plan: Option<usize>,
    pub budget: Option<usize>,
}

/// Why an event could not be applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFailure {
    /// A non-zero target id names no live row.
    DanglingTarget,
    /// The process type needs an entity that did not resolve.
    MissingTarget,
    /// The delegation does not permit this process type.
    NotPermitted,
    /// The event carries no usable process type.
    UnknownProcess,
}

fn direct<T>(rows: &[T], id: EntityId, key: impl Fn(&T) -> EntityId) -> Result<Option<usize>, EventFailure> {
    id_ref(id)
        .map(|id| {
            rows.iter()
                .position(|row| key(row) == id)
                .ok_or(EventFailure::DanglingTarget)
        })
        .transpose()
}

fn by_id<T>(rows: &[T], id: EntityId, key: impl Fn(&T) -> EntityId) -> Option<usize> {
    id_ref(id).and_then(|id| rows.iter().position(|row| key(row) == id))
}

/// Resolves every target of `event`.
///
/// Named ids must exist. Unnamed targets fall back to relations:
/// plan via goal or delegation; goal via plan; delegation via plan, then
/// budget; budget via the resolved delegation.
pub fn find_targets(
    goals: &[Goal],
    delegations: &[Delegation],
    budgets: &[BudgetRow],
    plans: &[Plan],
    event: &Event,
) -> Result<EventTargets, EventFailure> {
    let mut targets = EventTargets {
        goal: direct(goals, event.goal_id, |g| g.goal_id)?,
        delegation: direct(delegations, event.delegation_id, |d| d.delegation_id)?,
        plan: direct(plans, event.plan_id, |p| p.plan_id)?,
        budget: direct(budgets, event.budget_id, |b| b.budget_id)?,
    };

    if targets.plan.is_none() {
        let via_budget = targets
            .budget
            .map(|idx| budgets[idx].delegation_id)
            .unwrap_or(0);
        targets.plan = plans.iter().position(|p| {
            (event.goal_id != 0 && p.goal_id == event.goal_id)
                || (event.delegation_id != 0 && p.delegation_id == event.delegation_id)
                || (via_budget != 0 && p.delegation_id == via_budget)
        });
    }

    let plan = targets.plan.map(|idx| plans[idx]);

    if targets.goal.is_none() {
        targets.goal = plan.and_then(|p| by_id(goals, p.goal_id, |g| g.goal_id));
    }

    if targets.delegation.is_none() {
        targets.delegation = plan
            .and_then(|p| by_id(delegations, p.delegation_id, |d| d.delegation_id))
            .or_else(|| {
                targets
                    .budget
                    .and_then(|idx| by_id(delegations, budgets[idx].delegation_id, |d| d.delegation_id))
            });
    }

    if targets.budget.is_none() {
        let delegation_id = targets
            .delegation
            .map(|idx| delegations[idx].delegation_id)
            .unwrap_or(0);
        targets.budget = by_id(budgets, delegation_id, |b| b.delegation_id);
    }

    Ok(targets)
}

impl AutonomyDomain {
    pub(crate) fn event_targets(&self, event: &Event) -> Result<EventTargets, EventFailure> {
        find_targets(
            self.goals.as_slice(),
            self.delegations.as_slice(),
            self.budgets.as_slice(),
            self.plans.as_slice(),
            event,
        )
    }

    /// Whether any resolved target lives in a collapsed region.
    pub(crate) fn targets_collapsed(&self, targets: &EventTargets) -> bool {
        let regions = [
            targets.goal.map(|idx| self.goals.as_slice()[idx].region_id),
            targets.delegation.map(|idx| self.delegations.as_slice()[idx].region_id),
            targets.plan.map(|idx| self.plans.as_slice()[idx].region_id),
            targets.budget.map(|idx| self.budgets.as_slice()[idx].region_id),
        ];
        regions
            .into_iter()
            .flatten()
            .any(|region| self.capsules.contains(region))
    }

    /// Applies `event` to its targets. On failure nothing is mutated.
    pub(crate) fn apply_event(
        &mut self,
        event: &Event,
        targets: EventTargets,
    ) -> Result<(), EventFailure> {
        let process = event.process;
        if process == ProcessType::Unset {
            return Err(EventFailure::UnknownProcess);
        }
        if process != ProcessType::Revoke {
            if let Some(idx) = targets.delegation {
                if !self.delegations.as_slice()[idx].allows(process) {
                    return Err(EventFailure::NotPermitted);
                }
            }
        }

        match process {
            ProcessType::Unset => return Err(EventFailure::UnknownProcess),
            ProcessType::Plan => {
                let plan_idx = targets.plan.ok_or(EventFailure::MissingTarget)?;
                if self.activate_plan(plan_idx) {
                    if let Some(budget_idx) = targets.budget {
                        let row = &mut self.budgets.as_mut_slice()[budget_idx];
                        row.planning_used = row.planning_used.saturating_add(event.delta_planning);
                    }
                }
            }
            ProcessType::Execute => {
                let plan_idx = targets.plan.ok_or(EventFailure::MissingTarget)?;
                if self.activate_plan(plan_idx) {
                    if let Some(budget_idx) = targets.budget {
                        let row = &mut self.budgets.as_mut_slice()[budget_idx];
                        row.time_used = row.time_used.saturating_add(event.delta_time);
                        row.energy_used = row.energy_used.saturating_add(event.delta_energy);
                        row.risk_used = row.risk_used.saturating_add(event.delta_risk);
                    }
                }
            }
            ProcessType::Revise => {
                if targets.goal.is_none() && targets.plan.is_none() {
                    return Err(EventFailure::MissingTarget);
                }
                if let Some(goal_idx) = targets.goal {
                    let goal = &mut self.goals.as_mut_slice()[goal_idx];
                    goal.priority = goal.priority.saturating_add(event.delta_priority).clamp01();
                }
                if let Some(plan_idx) = targets.plan {
                    let plan = &mut self.plans.as_mut_slice()[plan_idx];
                    plan.success_score = plan
                        .success_score
                        .saturating_add(event.delta_success)
                        .clamp01();
                }
            }
            ProcessType::Revoke => {
                let delegation_idx = targets.delegation.ok_or(EventFailure::MissingTarget)?;
                self.delegations.as_mut_slice()[delegation_idx].flags |= flags::DELEGATION_REVOKED;
                if let Some(plan_idx) = targets.plan {
                    self.finish_plan(plan_idx, PlanStatus::Revoked);
                }
            }
            ProcessType::Expire => {
                let goal_idx = targets.goal.ok_or(EventFailure::MissingTarget)?;
                self.goals.as_mut_slice()[goal_idx].flags |= flags::GOAL_EXPIRED;
            }
            ProcessType::Fail => {
                let plan_idx = targets.plan.ok_or(EventFailure::MissingTarget)?;
                self.finish_plan(plan_idx, PlanStatus::Failed);
            }
            ProcessType::Complete => {
                let plan_idx = targets.plan.ok_or(EventFailure::MissingTarget)?;
                self.finish_plan(plan_idx, PlanStatus::Completed);
            }
        }
        trace!(
            "autonomy domain {}: applied event {} ({process:?})",
            self.domain_id,
            event.event_id
        );
        Ok(())
    }

    /// Moves a live plan to `Active`. Returns `false` for terminal plans,
    /// which absorb the event without change.
    fn activate_plan(&mut self, plan_idx: usize) -> bool {
        let plan = &mut self.plans.as_mut_slice()[plan_idx];
        if plan.status.is_terminal() {
            return false;
        }
        plan.status = PlanStatus::Active;
        plan.flags = derive::plan_flags(plan);
        true
    }

    fn finish_plan(&mut self, plan_idx: usize, status: PlanStatus) {
        let plan = &mut self.plans.as_mut_slice()[plan_idx];
        if !plan.status.is_terminal() {
            plan.status = status;
        }
        plan.flags = derive::plan_flags(plan);
    }
}
