//! Collapse/expand of regions into macro capsules.

use crate::derive;
use crate::domain::AutonomyDomain;
use crate::types::PROCESS_BINS;
use domain_core::{
    flags, Capsule, EntityId, HashState, Histogram, LodError, LodOutcome, Sample, StateHasher,
    WideMean,
};
use domain_query::{Budget, Confidence, CostTier, QueryMeta, RefusalReason};
use fixed_point::Q16;
use log::debug;
use serde::Serialize;

/// Bins used for the priority and success ratio histograms.
pub const RATIO_BINS: usize = 4;

/// Lossy aggregate standing in for a collapsed region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AutonomyCapsule {
    /// Same as `region_id`.
    pub capsule_id: EntityId,
    pub region_id: EntityId,
    pub goal_count: u32,
    pub delegation_count: u32,
    pub budget_count: u32,
    pub plan_count: u32,
    pub event_count: u32,
    pub priority_avg: Q16,
    pub success_avg: Q16,
    pub budget_utilization_avg: Q16,
    pub priority_hist: Histogram<RATIO_BINS>,
    pub success_hist: Histogram<RATIO_BINS>,
    /// Events per process type, applied or not.
    pub event_type_counts: Histogram<PROCESS_BINS>,
}

impl Capsule for AutonomyCapsule {
    fn region_id(&self) -> EntityId {
        self.region_id
    }
}

impl HashState for AutonomyCapsule {
    fn hash_state(&self, h: &mut StateHasher) {
        h.write_u32(self.capsule_id);
        h.write_u32(self.region_id);
        h.write_u32(self.goal_count);
        h.write_u32(self.delegation_count);
        h.write_u32(self.budget_count);
        h.write_u32(self.plan_count);
        h.write_u32(self.event_count);
        h.write_q16(self.priority_avg);
        h.write_q16(self.success_avg);
        h.write_q16(self.budget_utilization_avg);
        self.priority_hist.hash_state(h);
        self.success_hist.hash_state(h);
        self.event_type_counts.hash_state(h);
    }
}

impl AutonomyDomain {
    /// Replaces the live detail of `region_id` with an aggregate capsule.
    ///
    /// Collapsing an already collapsed region is a no-op.
    pub fn collapse_region(&mut self, region_id: EntityId) -> Result<LodOutcome, LodError> {
        if region_id == 0 {
            return Err(LodError::InvalidRegion);
        }
        if self.capsules.contains(region_id) {
            return Ok(LodOutcome::AlreadyCollapsed);
        }
        let capsule = self.build_capsule(region_id);
        let outcome = self.capsules.insert(capsule)?;
        debug!(
            "autonomy domain {}: collapsed region {region_id} ({} goals, {} plans, {} events)",
            self.domain_id, capsule.goal_count, capsule.plan_count, capsule.event_count
        );
        Ok(outcome)
    }

    /// Drops the capsule of `region_id`; the live rows become visible again.
    pub fn expand_region(&mut self, region_id: EntityId) -> Result<LodOutcome, LodError> {
        self.capsules.remove(region_id)?;
        debug!(
            "autonomy domain {}: expanded region {region_id}",
            self.domain_id
        );
        Ok(LodOutcome::Expanded)
    }

    /// Returns the capsule of a collapsed region at the analytic cost tier.
    pub fn capsule_query(&self, region_id: EntityId, budget: &mut Budget) -> Sample<AutonomyCapsule> {
        if !self.is_active() {
            return Sample::refused(RefusalReason::DomainInactive, budget);
        }
        let cost = self.policy.cost(CostTier::Analytic);
        if !budget.consume(cost) {
            return Sample::refused(RefusalReason::Budget, budget);
        }
        match self.capsules.get(region_id) {
            Some(capsule) => Sample {
                record: *capsule,
                flags: flags::COLLAPSED,
                meta: QueryMeta::ok(Confidence::Exact, cost, budget),
            },
            None => {
                let mut sample = Sample::refused(RefusalReason::NoSource, budget);
                sample.meta.cost_units = cost;
                sample
            }
        }
    }

    pub(crate) fn build_capsule(&self, region_id: EntityId) -> AutonomyCapsule {
        let mut capsule = AutonomyCapsule {
            capsule_id: region_id,
            region_id,
            ..AutonomyCapsule::default()
        };
        let mut priority = WideMean::default();
        let mut success = WideMean::default();
        let mut utilization = WideMean::default();

        for goal in self.goals.iter().filter(|g| g.region_id == region_id) {
            capsule.goal_count += 1;
            priority.push(goal.priority);
            capsule.priority_hist.record_ratio(goal.priority);
        }
        capsule.delegation_count = self
            .delegations
            .iter()
            .filter(|d| d.region_id == region_id)
            .count() as u32;
        for row in self.budgets.iter().filter(|b| b.region_id == region_id) {
            capsule.budget_count += 1;
            let delegation = self.delegation(row.delegation_id);
            utilization.push(derive::planning_utilization(row, delegation));
        }
        for plan in self.plans.iter().filter(|p| p.region_id == region_id) {
            capsule.plan_count += 1;
            success.push(plan.success_score);
            capsule.success_hist.record_ratio(plan.success_score);
        }
        for event in self.events.iter().filter(|e| e.region_id == region_id) {
            capsule.event_count += 1;
            if let Some(bin) = event.process.bin() {
                capsule.event_type_counts.record_index(bin);
            }
        }

        capsule.priority_avg = priority.mean();
        capsule.success_avg = success.mean();
        capsule.budget_utilization_avg = utilization.mean();
        capsule
    }
}
