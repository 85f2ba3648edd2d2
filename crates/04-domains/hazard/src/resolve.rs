//! Tick-driven resolve: field decay, then dose accumulation.

use crate::derive::{self, FieldParams};
use crate::domain::HazardDomain;
use crate::geometry::falloff;
use crate::lod::HazardCapsule;
use crate::types::{flags, resolve_flags, Exposure, HazardField};
use domain_core::{EntityId, RegionScope, ScanMeter, WideMean};
use domain_query::{Budget, Confidence, CostTier, QueryMeta, RefusalReason};
use fixed_point::{Q16, Q48};
use log::trace;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HazardResolveResult {
    pub region_id: EntityId,
    pub tick: u64,
    pub tick_delta: u64,
    pub flags: u32,
    pub meta: QueryMeta,
    pub field_count: u32,
    pub field_depleted_count: u32,
    pub exposure_count: u32,
    pub exposure_over_limit_count: u32,
    pub intensity_avg: Q16,
    pub uncertainty_avg: Q16,
    pub exposure_ratio_avg: Q16,
    /// Dose added across all visited exposures in this call.
    pub dose_applied: Q48,
}

impl HazardResolveResult {
    fn refused(region_id: EntityId, tick: u64, reason: RefusalReason, budget: &Budget) -> Self {
        trace!("hazard resolve of region {region_id} refused: {reason:?}");
        Self {
            region_id,
            tick,
            flags: flags::UNRESOLVED,
            meta: QueryMeta::refused(reason, budget),
            ..Self::default()
        }
    }

    fn from_capsule(capsule: &HazardCapsule) -> Self {
        Self {
            flags: resolve_flags::PARTIAL | resolve_flags::COLLAPSED,
            field_count: capsule.field_count,
            exposure_count: capsule.exposure_count,
            intensity_avg: capsule.intensity_avg,
            uncertainty_avg: capsule.uncertainty_avg,
            exposure_ratio_avg: capsule.exposure_ratio_avg,
            ..Self::default()
        }
    }
}

impl HazardDomain {
    /// Advances `region_id` (or every live region when `0`) by `tick_delta`
    /// ticks ending at `tick`.
    ///
    /// Fields decay first so exposures see this tick's intensities. Each
    /// field and exposure is charged before it is touched; a budget cutoff
    /// ends that sub-scan only.
    pub fn resolve(
        &mut self,
        region_id: EntityId,
        tick: u64,
        tick_delta: u64,
        budget: &mut Budget,
    ) -> HazardResolveResult {
        if !self.is_active() {
            return HazardResolveResult::refused(region_id, tick, RefusalReason::DomainInactive, budget);
        }
        let tick_delta = tick_delta.max(1);

        if let Some(capsule) = self.capsules.get(region_id).copied() {
            let cost = self.policy.cost(CostTier::Analytic);
            if !budget.consume(cost) {
                return HazardResolveResult::refused(region_id, tick, RefusalReason::Budget, budget);
            }
            return HazardResolveResult {
                region_id,
                tick,
                tick_delta,
                meta: QueryMeta::ok(Confidence::Unknown, cost, budget),
                ..HazardResolveResult::from_capsule(&capsule)
            };
        }

        let base_cost = self.policy.cost(CostTier::Medium);
        if !budget.consume(base_cost) {
            return HazardResolveResult::refused(region_id, tick, RefusalReason::Budget, budget);
        }

        let mut result = HazardResolveResult {
            region_id,
            tick,
            tick_delta,
            ..HazardResolveResult::default()
        };
        let scope = RegionScope::from_raw(region_id);
        let cost = self.policy.cost(CostTier::Coarse);

        let (spent, partial, refusal) = {
            let mut meter = ScanMeter::new(budget);
            self.decay_fields(scope, tick_delta, cost, &mut meter, &mut result);
            self.accumulate_exposures(scope, tick_delta, cost, &mut meter, &mut result);
            (meter.spent(), meter.is_partial(), meter.refusal())
        };

        if partial {
            result.flags |= resolve_flags::PARTIAL;
        }
        result.meta = QueryMeta::ok(Confidence::Exact, base_cost + spent, budget);
        result.meta.refusal_reason = refusal;
        result
    }

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

    pub(crate) fn params_of(&self, field: &HazardField) -> FieldParams {
        derive::effective_params(field, self.hazard_type(field.type_id))
    }

    fn decay_fields(
        &mut self,
        scope: RegionScope,
        tick_delta: u64,
        cost: u32,
        meter: &mut ScanMeter<'_>,
        result: &mut HazardResolveResult,
    ) {
        let mut intensity = WideMean::default();
        let mut uncertainty = WideMean::default();
        for idx in 0..self.fields.len() {
            let field = self.fields.as_slice()[idx];
            if !self.visible(scope, field.region_id, meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            let params = self.params_of(&field);
            let stored = &mut self.fields.as_mut_slice()[idx];
            stored.intensity = derive::decayed(stored.intensity, params.decay_rate, tick_delta);
            stored.flags = derive::field_flags(stored, &params);

            result.field_count += 1;
            intensity.push(stored.intensity);
            uncertainty.push(params.uncertainty);
            if stored.flags & flags::FIELD_DEPLETED != 0 {
                result.field_depleted_count += 1;
                result.flags |= resolve_flags::FIELD_DEPLETED;
            }
            if stored.flags & flags::FIELD_DECAYING != 0 {
                result.flags |= resolve_flags::FIELD_DECAYING;
            }
        }
        result.intensity_avg = intensity.mean();
        result.uncertainty_avg = uncertainty.mean();
    }

    fn accumulate_exposures(
        &mut self,
        scope: RegionScope,
        tick_delta: u64,
        cost: u32,
        meter: &mut ScanMeter<'_>,
        result: &mut HazardResolveResult,
    ) {
        let mut ratio = WideMean::default();
        for idx in 0..self.exposures.len() {
            let exposure = self.exposures.as_slice()[idx];
            if !self.visible(scope, exposure.region_id, meter) {
                continue;
            }
            if !meter.charge(cost) {
                break;
            }
            let dose = self.incoming_dose(&exposure, tick_delta);
            let stored = &mut self.exposures.as_mut_slice()[idx];
            stored.accumulated = stored.accumulated.saturating_add(dose);
            stored.flags = derive::exposure_flags(stored);

            result.exposure_count += 1;
            result.dose_applied = result.dose_applied.saturating_add(dose);
            ratio.push(derive::exposure_ratio(stored));
            if stored.is_over_limit() {
                result.exposure_over_limit_count += 1;
                result.flags |= resolve_flags::EXPOSURE_OVER_LIMIT;
            }
        }
        result.exposure_ratio_avg = ratio.mean();
    }

    /// Dose reaching `exposure` from every live, matching field of its region.
    fn incoming_dose(&self, exposure: &Exposure, tick_delta: u64) -> Q48 {
        self.fields
            .iter()
            .filter(|f| f.region_id == exposure.region_id && exposure.senses(f.type_id))
            .filter(|f| f.flags & flags::FIELD_DEPLETED == 0 && f.intensity > Q16::ZERO)
            .fold(Q48::ZERO, |total, field| {
                let params = self.params_of(field);
                let reach = falloff(field.origin.distance(&exposure.location), field.radius);
                total.saturating_add(derive::dose(
                    field.intensity,
                    params.exposure_rate,
                    reach,
                    exposure.sensitivity,
                    tick_delta,
                ))
            })
    }
}
