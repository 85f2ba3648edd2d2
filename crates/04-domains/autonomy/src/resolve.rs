//! Tick-driven resolve pass.

use crate::derive;
use crate::domain::AutonomyDomain;
use crate::lod::AutonomyCapsule;
use crate::types::{flags, resolve_flags, PlanStatus, PROCESS_BINS};
use domain_core::{EntityId, Histogram, RegionScope, ScanMeter, WideMean};
use domain_query::{Budget, Confidence, CostTier, QueryMeta, RefusalReason};
use fixed_point::Q16;
use log::trace;
use serde::Serialize;
use smallvec::SmallVec;

/// Aggregate outcome of one [`AutonomyDomain::resolve`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AutonomyResolveResult {
    pub region_id: EntityId,
    pub tick: u64,
    /// Normalised tick delta (never zero).
    pub tick_delta: u64,
    pub flags: u32,
    pub meta: QueryMeta,
    pub goal_count: u32,
    pub goal_expired_count: u32,
    pub delegation_count: u32,
    pub delegation_revoked_count: u32,
    pub budget_count: u32,
    pub budget_exhausted_count: u32,
    pub plan_count: u32,
    pub plan_active_count: u32,
    pub plan_failed_count: u32,
    pub plan_completed_count: u32,
    pub plan_revoked_count: u32,
    pub event_count: u32,
    pub event_applied_count: u32,
    pub event_failed_count: u32,
    pub priority_avg: Q16,
    pub success_avg: Q16,
    pub budget_utilization_avg: Q16,
    /// Events applied in this call, per process type.
    pub event_type_counts: Histogram<PROCESS_BINS>,
}

impl AutonomyResolveResult {
    fn refused(region_id: EntityId, tick: u64, reason: RefusalReason, budget: &Budget) -> Self {
        Self {
            region_id,
            tick,
            flags: flags::UNRESOLVED,
            meta: QueryMeta::refused(reason, budget),
            ..Self::default()
        }
    }

    fn from_capsule(capsule: &AutonomyCapsule) -> Self {
        Self {
            flags: resolve_flags::PARTIAL | resolve_flags::COLLAPSED,
            goal_count: capsule.goal_count,
            delegation_count: capsule.delegation_count,
            budget_count: capsule.budget_count,
            plan_count: capsule.plan_count,
            event_count: capsule.event_count,
            priority_avg: capsule.priority_avg,
            success_avg: capsule.success_avg,
            budget_utilization_avg: capsule.budget_utilization_avg,
            event_type_counts: capsule.event_type_counts,
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct Means {
    priority: WideMean,
    success: WideMean,
    utilization: WideMean,
    /// Plan rows tallied by the plan sub-scan of this call.
    plans_counted: SmallVec<[usize; 16]>,
}

impl AutonomyDomain {
    /// Advances `region_id` (or every live region when `0`) to `tick`.
    ///
    /// Each entity is charged before it is touched; when the budget runs out
    /// the current sub-scan stops, `PARTIAL` is set and the remaining entity
    /// kinds still get their turn. A collapsed region is answered from its
    /// capsule without scanning. Events whose targets sit in a collapsed
    /// region wait until it is expanded.
    pub fn resolve(
        &mut self,
        region_id: EntityId,
        tick: u64,
        tick_delta: u64,
        budget: &mut Budget,
    ) -> AutonomyResolveResult {
        if !self.is_active() {
            return AutonomyResolveResult::refused(
                region_id,
                tick,
                RefusalReason::DomainInactive,
                budget,
            );
        }

        if let Some(capsule) = self.capsules.get(region_id).copied() {
            let cost = self.policy.cost(CostTier::Analytic);
            if !budget.consume(cost) {
                return AutonomyResolveResult::refused(region_id, tick, RefusalReason::Budget, budget);
            }
            let mut result = AutonomyResolveResult::from_capsule(&capsule);
            result.region_id = region_id;
            result.tick = tick;
            result.tick_delta = tick_delta.max(1);
            result.meta = QueryMeta::ok(Confidence::Unknown, cost, budget);
            return result;
        }

        let base_cost = self.policy.cost(CostTier::Medium);
        if !budget.consume(base_cost) {
            return AutonomyResolveResult::refused(region_id, tick, RefusalReason::Budget, budget);
        }

        let mut result = AutonomyResolveResult {
            region_id,
            tick,
            tick_delta: tick_delta.max(1),
            ..AutonomyResolveResult::default()
        };
        let scope = RegionScope::from_raw(region_id);
        let entity_cost = self.policy.cost(CostTier::Coarse);
        let mut means = Means::default();

        let (spent, partial, refusal) = {
            let mut meter = ScanMeter::new(budget);
            self.resolve_goals(scope, tick, entity_cost, &mut meter, &mut result, &mut means);
            self.resolve_delegations(scope, entity_cost, &mut meter, &mut result);
            self.resolve_budgets(scope, entity_cost, &mut meter, &mut result, &mut means);
            self.resolve_plans(scope, entity_cost, &mut meter, &mut result, &mut means);
            self.resolve_events(scope, tick, entity_cost, &mut meter, &mut result, &means);
            (meter.spent(), meter.is_partial(), meter.refusal())
        };

        result.priority_avg = means.priority.mean();
        result.success_avg = means.success.mean();
        result.budget_utilization_avg = means.utilization.mean();
        if partial {
            result.flags |= resolve_flags::PARTIAL;
        }
        result.meta = QueryMeta::ok(Confidence::Exact, base_cost + spent, budget);
        result.meta.refusal_reason = refusal;
        result
    }

    /// Whether a row in `region` takes part in a scan of `scope`. Rows of
    /// collapsed regions are skipped and make the scan partial.
    pub(crate) fn visible(&self, scope: RegionScope, region: EntityId, meter: &mut ScanMeter<'_>) -> bool {
        if !scope.matches(region) {
            return false;
        }
        if self.capsules.contains(region) {
            meter.mark_skipped();
            return false;
        }
        true
    }

    fn resolve_goals(
        &mut self,
        scope: RegionScope,
        tick: u64,
        cost: u32,
        meter: &mut ScanMeter<'_>,
        result: &mut AutonomyResolveResult,
        means: &mut Means,
    ) {
        for idx in 0..self.goals.len() {
            let region = self.goals.as_slice()[idx].region_id;
            if !self.visible(scope, region, meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            let goal = &mut self.goals.as_mut_slice()[idx];
            goal.flags = derive::goal_flags(goal, tick);
            result.goal_count += 1;
            means.priority.push(goal.priority);
            if goal.flags & flags::GOAL_EXPIRED != 0 {
                result.goal_expired_count += 1;
                result.flags |= resolve_flags::GOAL_EXPIRED;
            }
        }
    }

    fn resolve_delegations(
        &mut self,
        scope: RegionScope,
        cost: u32,
        meter: &mut ScanMeter<'_>,
        result: &mut AutonomyResolveResult,
    ) {
        for idx in 0..self.delegations.len() {
            let region = self.delegations.as_slice()[idx].region_id;
            if !self.visible(scope, region, meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            let delegation = &mut self.delegations.as_mut_slice()[idx];
            delegation.flags = derive::delegation_flags(delegation);
            result.delegation_count += 1;
            if delegation.is_revoked() {
                result.delegation_revoked_count += 1;
                result.flags |= resolve_flags::DELEGATION_REVOKED;
            }
        }
    }

    fn resolve_budgets(
        &mut self,
        scope: RegionScope,
        cost: u32,
        meter: &mut ScanMeter<'_>,
        result: &mut AutonomyResolveResult,
        means: &mut Means,
    ) {
        for idx in 0..self.budgets.len() {
            let row = self.budgets.as_slice()[idx];
            if !self.visible(scope, row.region_id, meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            let delegation = self.delegation(row.delegation_id).copied();
            let row_flags = derive::budget_flags(&row, delegation.as_ref());
            self.budgets.as_mut_slice()[idx].flags = row_flags;
            result.budget_count += 1;
            means
                .utilization
                .push(derive::planning_utilization(&row, delegation.as_ref()));
            if row_flags & flags::BUDGET_EXHAUSTED != 0 {
                result.budget_exhausted_count += 1;
                result.flags |= resolve_flags::BUDGET_EXHAUSTED;
            }
        }
    }

    fn resolve_plans(
        &mut self,
        scope: RegionScope,
        cost: u32,
        meter: &mut ScanMeter<'_>,
        result: &mut AutonomyResolveResult,
        means: &mut Means,
    ) {
        for idx in 0..self.plans.len() {
            let region = self.plans.as_slice()[idx].region_id;
            if !self.visible(scope, region, meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            let plan = &mut self.plans.as_mut_slice()[idx];
            plan.flags = derive::plan_flags(plan);
            result.plan_count += 1;
            means.success.push(plan.success_score);
            means.plans_counted.push(idx);
            if let Some(count) = plan_status_count(result, plan.status) {
                *count += 1;
            }
            result.flags |= plan_status_flag(plan.status);
        }
    }

    fn resolve_events(
        &mut self,
        scope: RegionScope,
        tick: u64,
        cost: u32,
        meter: &mut ScanMeter<'_>,
        result: &mut AutonomyResolveResult,
        means: &Means,
    ) {
        for idx in 0..self.events.len() {
            let event = self.events.as_slice()[idx];
            if !self.visible(scope, event.region_id, meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            result.event_count += 1;
            if event.is_settled() || event.event_tick > tick {
                continue;
            }

            let targets = self.event_targets(&event);
            if let Ok(found) = &targets {
                if self.targets_collapsed(found) {
                    // Deferred until the target's region is expanded.
                    meter.mark_skipped();
                    continue;
                }
            }
            let prior = targets
                .ok()
                .and_then(|found| found.plan)
                .map(|plan| self.plans.as_slice()[plan].status);
            let outcome =
                targets.and_then(|targets| self.apply_event(&event, targets).map(|()| targets));
            let settled = match outcome {
                Ok(targets) => {
                    result.event_applied_count += 1;
                    result.flags |= resolve_flags::EVENT_APPLIED;
                    if let Some(bin) = event.process.bin() {
                        result.event_type_counts.record_index(bin);
                    }
                    self.refresh_targets(targets, tick, result);
                    if let (Some(plan), Some(prior)) = (targets.plan, prior) {
                        if means.plans_counted.contains(&plan) {
                            recount_plan(result, prior, self.plans.as_slice()[plan].status);
                        }
                    }
                    flags::EVENT_APPLIED
                }
                Err(failure) => {
                    trace!(
                        "autonomy domain {}: event {} failed: {failure:?}",
                        self.domain_id,
                        event.event_id
                    );
                    result.event_failed_count += 1;
                    result.flags |= resolve_flags::EVENT_FAILED;
                    flags::EVENT_FAILED
                }
            };
            let stored = &mut self.events.as_mut_slice()[idx];
            stored.flags = derive::event_flags(stored) | settled;
        }
    }

    /// Re-derives the flags of entities an applied event touched and folds
    /// their conditions into the aggregate flags.
    fn refresh_targets(
        &mut self,
        targets: crate::events::EventTargets,
        tick: u64,
        result: &mut AutonomyResolveResult,
    ) {
        if let Some(idx) = targets.goal {
            let goal = &mut self.goals.as_mut_slice()[idx];
            goal.flags = derive::goal_flags(goal, tick);
            if goal.flags & flags::GOAL_EXPIRED != 0 {
                result.flags |= resolve_flags::GOAL_EXPIRED;
            }
        }
        if let Some(idx) = targets.delegation {
            if self.delegations.as_slice()[idx].is_revoked() {
                result.flags |= resolve_flags::DELEGATION_REVOKED;
            }
        }
        if let Some(idx) = targets.plan {
            result.flags |= plan_status_flag(self.plans.as_slice()[idx].status);
        }
        if let Some(idx) = targets.budget {
            let row = self.budgets.as_slice()[idx];
            let delegation = self.delegation(row.delegation_id).copied();
            let row_flags = derive::budget_flags(&row, delegation.as_ref());
            self.budgets.as_mut_slice()[idx].flags = row_flags;
            if row_flags & flags::BUDGET_EXHAUSTED != 0 {
                result.flags |= resolve_flags::BUDGET_EXHAUSTED;
            }
        }
    }
}

/// Counter a plan in `status` is tallied under, if any.
fn plan_status_count(result: &mut AutonomyResolveResult, status: PlanStatus) -> Option<&mut u32> {
    match status {
        PlanStatus::Active => Some(&mut result.plan_active_count),
        PlanStatus::Failed => Some(&mut result.plan_failed_count),
        PlanStatus::Completed => Some(&mut result.plan_completed_count),
        PlanStatus::Revoked => Some(&mut result.plan_revoked_count),
        PlanStatus::Unset | PlanStatus::Proposed => None,
    }
}

/// Moves an already tallied plan from its `prior` counter to its current one.
fn recount_plan(result: &mut AutonomyResolveResult, prior: PlanStatus, current: PlanStatus) {
    if prior == current {
        return;
    }
    if let Some(count) = plan_status_count(result, prior) {
        *count = count.saturating_sub(1);
    }
    if let Some(count) = plan_status_count(result, current) {
        *count += 1;
    }
}

fn plan_status_flag(status: PlanStatus) -> u32 {
    match status {
        PlanStatus::Failed => resolve_flags::PLAN_FAILED,
        PlanStatus::Completed => resolve_flags::PLAN_COMPLETED,
        PlanStatus::Revoked => resolve_flags::PLAN_REVOKED,
        PlanStatus::Unset | PlanStatus::Proposed | PlanStatus::Active => 0,
    }
}
