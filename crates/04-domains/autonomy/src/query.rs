//! Read-only, budget-metered queries.

use crate::derive;
use crate::domain::AutonomyDomain;
use crate::types::{BudgetRow, Delegation, Event, Goal, Plan};
use domain_core::{flags, query_by_id, EntityId, RegionScope, Sample, ScanMeter, WideMean};
use domain_query::{Budget, Confidence, CostTier, QueryMeta, RefusalReason};
use fixed_point::Q16;
use log::trace;
use serde::Serialize;

/// Aggregate view of one region (or every live region for id `0`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AutonomyRegionSample {
    pub region_id: EntityId,
    pub goal_count: u32,
    pub delegation_count: u32,
    pub budget_count: u32,
    pub plan_count: u32,
    pub event_count: u32,
    pub priority_avg: Q16,
    pub success_avg: Q16,
    pub budget_utilization_avg: Q16,
    pub flags: u32,
    pub meta: QueryMeta,
}

impl AutonomyRegionSample {
    fn refused(region_id: EntityId, reason: RefusalReason, budget: &Budget) -> Self {
        trace!("autonomy region query {region_id} refused: {reason:?}");
        Self {
            region_id,
            flags: flags::UNRESOLVED,
            meta: QueryMeta::refused(reason, budget),
            ..Self::default()
        }
    }
}

impl AutonomyDomain {
    pub fn goal_query(&self, goal_id: EntityId, budget: &mut Budget) -> Sample<Goal> {
        self.with_query_context(|ctx| query_by_id(ctx, self.goals.as_slice(), goal_id, budget))
    }

    pub fn delegation_query(&self, delegation_id: EntityId, budget: &mut Budget) -> Sample<Delegation> {
        self.with_query_context(|ctx| {
            query_by_id(ctx, self.delegations.as_slice(), delegation_id, budget)
        })
    }

    pub fn budget_query(&self, budget_id: EntityId, budget: &mut Budget) -> Sample<BudgetRow> {
        self.with_query_context(|ctx| query_by_id(ctx, self.budgets.as_slice(), budget_id, budget))
    }

    pub fn plan_query(&self, plan_id: EntityId, budget: &mut Budget) -> Sample<Plan> {
        self.with_query_context(|ctx| query_by_id(ctx, self.plans.as_slice(), plan_id, budget))
    }

    pub fn event_query(&self, event_id: EntityId, budget: &mut Budget) -> Sample<Event> {
        self.with_query_context(|ctx| query_by_id(ctx, self.events.as_slice(), event_id, budget))
    }

    /// Counts and averages over the live rows of a region.
    ///
    /// A collapsed region is answered from its capsule at the analytic tier.
    /// Otherwise every visited row costs one coarse unit; running out of
    /// budget, or skipping a collapsed region during an all-region scan,
    /// marks the sample `PARTIAL`.
    pub fn region_query(&self, region_id: EntityId, budget: &mut Budget) -> AutonomyRegionSample {
        if !self.is_active() {
            return AutonomyRegionSample::refused(region_id, RefusalReason::DomainInactive, budget);
        }

        if let Some(capsule) = self.capsules.get(region_id) {
            let cost = self.policy.cost(CostTier::Analytic);
            if !budget.consume(cost) {
                return AutonomyRegionSample::refused(region_id, RefusalReason::Budget, budget);
            }
            return AutonomyRegionSample {
                region_id,
                goal_count: capsule.goal_count,
                delegation_count: capsule.delegation_count,
                budget_count: capsule.budget_count,
                plan_count: capsule.plan_count,
                event_count: capsule.event_count,
                priority_avg: capsule.priority_avg,
                success_avg: capsule.success_avg,
                budget_utilization_avg: capsule.budget_utilization_avg,
                flags: flags::COLLAPSED,
                meta: QueryMeta::ok(Confidence::Unknown, cost, budget),
            };
        }

        let base_cost = self.policy.cost(CostTier::Medium);
        if !budget.consume(base_cost) {
            return AutonomyRegionSample::refused(region_id, RefusalReason::Budget, budget);
        }

        let scope = RegionScope::from_raw(region_id);
        let cost = self.policy.cost(CostTier::Coarse);
        let mut out = AutonomyRegionSample {
            region_id,
            ..AutonomyRegionSample::default()
        };
        let mut priority = WideMean::default();
        let mut success = WideMean::default();
        let mut utilization = WideMean::default();

        let mut meter = ScanMeter::new(budget);
        for goal in self.goals.iter() {
            if !self.visible(scope, goal.region_id, &mut meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            out.goal_count += 1;
            priority.push(goal.priority);
        }
        for delegation in self.delegations.iter() {
            if !self.visible(scope, delegation.region_id, &mut meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            out.delegation_count += 1;
        }
        for row in self.budgets.iter() {
            if !self.visible(scope, row.region_id, &mut meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            out.budget_count += 1;
            let delegation = self.delegation(row.delegation_id);
            utilization.push(derive::planning_utilization(row, delegation));
        }
        for plan in self.plans.iter() {
            if !self.visible(scope, plan.region_id, &mut meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            out.plan_count += 1;
            success.push(plan.success_score);
        }
        for event in self.events.iter() {
            if !self.visible(scope, event.region_id, &mut meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            out.event_count += 1;
        }

        out.priority_avg = priority.mean();
        out.success_avg = success.mean();
        out.budget_utilization_avg = utilization.mean();
        if meter.is_partial() {
            out.flags |= flags::PARTIAL;
        }
        let spent = meter.spent();
        let refusal = meter.refusal();
        out.meta = QueryMeta::ok(Confidence::Exact, base_cost + spent, meter.budget());
        out.meta.refusal_reason = refusal;
        out
    }
}
