//! Read-only, budget-metered queries, including point sampling.

use crate::derive;
use crate::domain::HazardDomain;
use crate::geometry::{falloff, Point};
use crate::types::{Exposure, HazardField, HazardType};
use domain_core::{flags, query_by_id, EntityId, RegionScope, Sample, ScanMeter, WideMean};
use domain_query::{Budget, Confidence, CostTier, QueryMeta, RefusalReason};
use fixed_point::Q16;
use serde::Serialize;

/// Aggregate view of one region (or every live region for id `0`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HazardRegionSample {
    pub region_id: EntityId,
    pub field_count: u32,
    pub exposure_count: u32,
    pub intensity_avg: Q16,
    pub uncertainty_avg: Q16,
    pub exposure_ratio_avg: Q16,
    pub flags: u32,
    pub meta: QueryMeta,
}

/// Combined field intensity observed at a point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HazardPointSample {
    pub point: Point,
    pub region_id: EntityId,
    /// Sum of falloff-weighted intensities, saturating.
    pub intensity: Q16,
    /// Fields that reach the point.
    pub contributing: u32,
    pub flags: u32,
    pub meta: QueryMeta,
}

impl HazardRegionSample {
    fn refused(region_id: EntityId, reason: RefusalReason, budget: &Budget) -> Self {
        Self {
            region_id,
            flags: flags::UNRESOLVED,
            meta: QueryMeta::refused(reason, budget),
            ..Self::default()
        }
    }
}

impl HazardDomain {
    pub fn type_query(&self, type_id: EntityId, budget: &mut Budget) -> Sample<HazardType> {
        self.with_query_context(|ctx| query_by_id(ctx, self.types.as_slice(), type_id, budget))
    }

    pub fn field_query(&self, field_id: EntityId, budget: &mut Budget) -> Sample<HazardField> {
        self.with_query_context(|ctx| query_by_id(ctx, self.fields.as_slice(), field_id, budget))
    }

    pub fn exposure_query(&self, exposure_id: EntityId, budget: &mut Budget) -> Sample<Exposure> {
        self.with_query_context(|ctx| {
            query_by_id(ctx, self.exposures.as_slice(), exposure_id, budget)
        })
    }

    /// Counts and averages over the live fields and exposures of a region.
    /// Collapsed regions answer from their capsule.
    pub fn region_query(&self, region_id: EntityId, budget: &mut Budget) -> HazardRegionSample {
        if !self.is_active() {
            return HazardRegionSample::refused(region_id, RefusalReason::DomainInactive, budget);
        }

        if let Some(capsule) = self.capsules.get(region_id) {
            let cost = self.policy.cost(CostTier::Analytic);
            if !budget.consume(cost) {
                return HazardRegionSample::refused(region_id, RefusalReason::Budget, budget);
            }
            return HazardRegionSample {
                region_id,
                field_count: capsule.field_count,
                exposure_count: capsule.exposure_count,
                intensity_avg: capsule.intensity_avg,
                uncertainty_avg: capsule.uncertainty_avg,
                exposure_ratio_avg: capsule.exposure_ratio_avg,
                flags: flags::COLLAPSED,
                meta: QueryMeta::ok(Confidence::Unknown, cost, budget),
            };
        }

        let base_cost = self.policy.cost(CostTier::Medium);
        if !budget.consume(base_cost) {
            return HazardRegionSample::refused(region_id, RefusalReason::Budget, budget);
        }
        let scope = RegionScope::from_raw(region_id);
        let cost = self.policy.cost(CostTier::Coarse);
        let mut out = HazardRegionSample {
            region_id,
            ..HazardRegionSample::default()
        };
        let mut intensity = WideMean::default();
        let mut uncertainty = WideMean::default();
        let mut ratio = WideMean::default();

        let mut meter = ScanMeter::new(budget);
        for field in self.fields.iter() {
            if !self.visible(scope, field.region_id, &mut meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            out.field_count += 1;
            intensity.push(field.intensity);
            uncertainty.push(self.params_of(field).uncertainty);
        }
        for exposure in self.exposures.iter() {
            if !self.visible(scope, exposure.region_id, &mut meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            out.exposure_count += 1;
            ratio.push(derive::exposure_ratio(exposure));
        }

        out.intensity_avg = intensity.mean();
        out.uncertainty_avg = uncertainty.mean();
        out.exposure_ratio_avg = ratio.mean();
        if meter.is_partial() {
            out.flags |= flags::PARTIAL;
        }
        let spent = meter.spent();
        let refusal = meter.refusal();
        out.meta = QueryMeta::ok(Confidence::Exact, base_cost + spent, meter.budget());
        out.meta.refusal_reason = refusal;
        out
    }

    /// Sums the falloff-weighted intensity of every live field in scope at
    /// `point`. Each field inspected costs one coarse unit on top of the
    /// medium base charge.
    ///
    /// Collapsed regions keep no positions, so sampling inside one returns a
    /// zero intensity flagged `COLLAPSED` at unknown confidence.
    pub fn sample_at(&self, point: Point, region_id: EntityId, budget: &mut Budget) -> HazardPointSample {
        let mut out = HazardPointSample {
            point,
            region_id,
            flags: flags::UNRESOLVED,
            ..HazardPointSample::default()
        };
        if !self.is_active() {
            out.meta = QueryMeta::refused(RefusalReason::DomainInactive, budget);
            return out;
        }

        if self.capsules.contains(region_id) {
            let cost = self.policy.cost(CostTier::Analytic);
            if !budget.consume(cost) {
                out.meta = QueryMeta::refused(RefusalReason::Budget, budget);
                return out;
            }
            out.flags = flags::COLLAPSED;
            out.meta = QueryMeta::ok(Confidence::Unknown, cost, budget);
            return out;
        }

        let base_cost = self.policy.cost(CostTier::Medium);
        if !budget.consume(base_cost) {
            out.meta = QueryMeta::refused(RefusalReason::Budget, budget);
            return out;
        }
        out.flags = 0;
        let scope = RegionScope::from_raw(region_id);
        let cost = self.policy.cost(CostTier::Coarse);
        let mut meter = ScanMeter::new(budget);
        for field in self.fields.iter() {
            if !self.visible(scope, field.region_id, &mut meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            let reach = falloff(field.origin.distance(&point), field.radius);
            if reach.is_zero() || field.intensity <= Q16::ZERO {
                continue;
            }
            out.contributing += 1;
            out.intensity = out.intensity.saturating_add(field.intensity.saturating_mul(reach));
        }

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
