//! Collapse/expand of hazard regions.

use crate::derive;
use crate::domain::HazardDomain;
use crate::types::CLASS_BINS;
use domain_core::{
    flags, Capsule, EntityId, HashState, Histogram, LodError, LodOutcome, Sample, StateHasher,
    WideMean,
};
use domain_query::{Budget, Confidence, CostTier, QueryMeta, RefusalReason};
use fixed_point::Q16;
use log::debug;
use serde::Serialize;

pub const RATIO_BINS: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HazardCapsule {
    pub capsule_id: EntityId,
    pub region_id: EntityId,
    pub field_count: u32,
    pub exposure_count: u32,
    pub intensity_avg: Q16,
    pub uncertainty_avg: Q16,
    pub exposure_ratio_avg: Q16,
    pub intensity_hist: Histogram<RATIO_BINS>,
    pub exposure_ratio_hist: Histogram<RATIO_BINS>,
    /// Fields per hazard class of their type.
    pub class_counts: Histogram<CLASS_BINS>,
}

impl Capsule for HazardCapsule {
    fn region_id(&self) -> EntityId {
        self.region_id
    }
}

impl HashState for HazardCapsule {
    fn hash_state(&self, h: &mut StateHasher) {
        h.write_u32(self.capsule_id);
        h.write_u32(self.region_id);
        h.write_u32(self.field_count);
        h.write_u32(self.exposure_count);
        h.write_q16(self.intensity_avg);
        h.write_q16(self.uncertainty_avg);
        h.write_q16(self.exposure_ratio_avg);
        self.intensity_hist.hash_state(h);
        self.exposure_ratio_hist.hash_state(h);
        self.class_counts.hash_state(h);
    }
}

impl HazardDomain {
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
            "hazard domain {}: collapsed region {region_id} ({} fields, {} exposures)",
            self.domain_id, capsule.field_count, capsule.exposure_count
        );
        Ok(outcome)
    }

    pub fn expand_region(&mut self, region_id: EntityId) -> Result<LodOutcome, LodError> {
        self.capsules.remove(region_id)?;
        debug!("hazard domain {}: expanded region {region_id}", self.domain_id);
        Ok(LodOutcome::Expanded)
    }

    pub fn capsule_query(&self, region_id: EntityId, budget: &mut Budget) -> Sample<HazardCapsule> {
        if !self.is_active() {
            return Sample::refused(RefusalReason::DomainInactive, budget);
        }
        let cost = self.policy.cost(CostTier::Analytic);
        if !budget.consume(cost) {
            return Sample::refused(RefusalReason::Budget, budget);
        }
        let Some(capsule) = self.capsules.get(region_id) else {
            let mut sample = Sample::refused(RefusalReason::NoSource, budget);
            sample.meta.cost_units = cost;
            return sample;
        };
        Sample {
            record: *capsule,
            flags: flags::COLLAPSED,
            meta: QueryMeta::ok(Confidence::Exact, cost, budget),
        }
    }

    fn build_capsule(&self, region_id: EntityId) -> HazardCapsule {
        let mut capsule = HazardCapsule {
            capsule_id: region_id,
            region_id,
            ..HazardCapsule::default()
        };
        let mut intensity = WideMean::default();
        let mut uncertainty = WideMean::default();
        let mut ratio = WideMean::default();

        for field in self.fields.iter().filter(|f| f.region_id == region_id) {
            capsule.field_count += 1;
            intensity.push(field.intensity);
            uncertainty.push(self.params_of(field).uncertainty);
            capsule.intensity_hist.record_ratio(field.intensity);
            let class = self
                .hazard_type(field.type_id)
                .map(|t| t.class)
                .unwrap_or_default();
            capsule.class_counts.record_index(class.bin());
        }
        for exposure in self.exposures.iter().filter(|e| e.region_id == region_id) {
            capsule.exposure_count += 1;
            let exposure_ratio = derive::exposure_ratio(exposure);
            ratio.push(exposure_ratio);
            capsule.exposure_ratio_hist.record_ratio(exposure_ratio);
        }

        capsule.intensity_avg = intensity.mean();
        capsule.uncertainty_avg = uncertainty.mean();
        capsule.exposure_ratio_avg = ratio.mean();
        capsule
    }
}
