//! Field decay, dose accumulation and point sampling.

mod common;

use common::*;
use domain_core::{ArchivalState, ExistenceState};
use domain_query::{Budget, Confidence, RefusalReason};
use fixed_point::{Q16, Q48, ONE_Q16};
use hazard::types::{flags, resolve_flags};
use hazard::{HazardDomain, HazardSurfaceDesc};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn one_tick_decays_fields_then_doses_exposures() {
    init_logging();
    let mut domain = HazardDomain::new(&scenario());
    let mut budget = Budget::new(100);
    let result = domain.resolve(0, 1, 1, &mut budget);

    assert_eq!(domain.field(1).map(|f| f.intensity), Some(q(ONE_Q16 * 3 / 4)));
    assert_eq!(domain.field(2).map(|f| f.intensity), Some(Q16::ONE));
    assert_eq!(domain.field(1).map(|f| f.flags), Some(flags::FIELD_DECAYING));
    assert_eq!(
        domain.exposure(1).map(|e| e.accumulated),
        Some(Q48::from_raw(i64::from(ONE_Q16) * 3 / 4))
    );
    assert_eq!(
        domain.exposure(3).map(|e| e.accumulated),
        Some(Q48::from_raw(i64::from(ONE_Q16) / 4))
    );

    assert_eq!(result.field_count, 2);
    assert_eq!(result.exposure_count, 3);
    assert_eq!(result.intensity_avg, q(ONE_Q16 * 7 / 8));
    assert_eq!(result.uncertainty_avg, q(ONE_Q16 / 16));
    assert_eq!(result.exposure_ratio_avg, q(ONE_Q16 / 8));
    assert_eq!(result.dose_applied, Q48::ONE);
    assert_eq!(result.flags, resolve_flags::FIELD_DECAYING);
    assert_eq!(result.meta.cost_units, 6);
    assert_eq!(result.meta.confidence, Confidence::Exact);
}

#[test]
fn exposure_on_the_rim_receives_nothing() {
    let mut domain = HazardDomain::new(&scenario());
    for tick in 1..=3 {
        domain.resolve(3, tick, 1, &mut Budget::new(100));
    }
    assert_eq!(domain.exposure(2).map(|e| e.accumulated), Some(Q48::ZERO));
}

#[test]
fn point_source_doses_only_its_own_location() {
    let desc = HazardSurfaceDesc {
        types: vec![toxic()],
        fields: vec![field(1, 2, at(5, 5), 0, 1)],
        exposures: vec![exposure(1, at(5, 5), 0, 1), exposure(2, at(5, 6), 0, 1)],
        ..HazardSurfaceDesc::default()
    };
    let mut domain = HazardDomain::new(&desc);
    domain.resolve(1, 1, 1, &mut Budget::new(100));
    assert_eq!(
        domain.exposure(1).map(|e| e.accumulated),
        Some(Q48::from_raw(i64::from(ONE_Q16) / 2))
    );
    assert_eq!(domain.exposure(2).map(|e| e.accumulated), Some(Q48::ZERO));
}

#[test]
fn dose_crossing_the_limit_flags_the_exposure() {
    let mut desc = scenario();
    desc.exposures[0].limit = Q48::ONE;
    let mut domain = HazardDomain::new(&desc);

    let first = domain.resolve(3, 1, 1, &mut Budget::new(100));
    assert_eq!(first.exposure_over_limit_count, 0);
    let second = domain.resolve(3, 2, 1, &mut Budget::new(100));
    assert_eq!(second.exposure_over_limit_count, 1);
    assert_ne!(second.flags & resolve_flags::EXPOSURE_OVER_LIMIT, 0);
    assert_eq!(
        domain.exposure(1).map(|e| e.flags),
        Some(flags::EXPOSURE_OVER_LIMIT)
    );
}

#[test]
fn unset_field_intensity_takes_the_type_default() {
    let mut desc = scenario();
    desc.fields[0].intensity = Q16::ZERO;
    desc.fields[1].intensity = Q16::ZERO;
    let domain = HazardDomain::new(&desc);
    assert_eq!(domain.field(1).map(|f| f.intensity), Some(Q16::ONE));
    // toxic carries no default intensity
    assert_eq!(domain.field(2).map(|f| f.intensity), Some(Q16::ZERO));
}

#[test]
fn depleted_fields_stop_emitting() {
    let mut domain = HazardDomain::new(&scenario());
    let result = domain.resolve(3, 4, 4, &mut Budget::new(100));
    assert_eq!(result.field_depleted_count, 1);
    assert_ne!(result.flags & resolve_flags::FIELD_DEPLETED, 0);
    assert_eq!(domain.field(1).map(|f| f.intensity), Some(Q16::ZERO));
    assert_eq!(result.dose_applied, Q48::ZERO);
}

#[test]
fn typed_receptors_ignore_other_hazards() {
    let mut desc = scenario();
    desc.exposures[0].type_id = 2;
    let mut domain = HazardDomain::new(&desc);
    domain.resolve(3, 1, 1, &mut Budget::new(100));
    assert_eq!(domain.exposure(1).map(|e| e.accumulated), Some(Q48::ZERO));
}

#[test]
fn budget_cutoff_marks_partial_with_budget_reason() {
    let mut domain = HazardDomain::new(&scenario());
    let mut budget = Budget::new(2);
    let result = domain.resolve(0, 1, 1, &mut budget);
    assert_eq!(result.field_count, 1);
    assert_eq!(result.exposure_count, 0);
    assert_ne!(result.flags & resolve_flags::PARTIAL, 0);
    assert_eq!(result.meta.refusal_reason, RefusalReason::Budget);
    assert_eq!(budget.used_units, 2);
}

#[test]
fn inactive_domain_refuses_everything() {
    let mut domain = HazardDomain::new(&scenario());
    domain.set_state(ExistenceState::Nonexistent, ArchivalState::Live);
    let mut budget = Budget::new(100);
    assert_eq!(
        domain.resolve(0, 1, 1, &mut budget).meta.refusal_reason,
        RefusalReason::DomainInactive
    );
    assert_eq!(
        domain.sample_at(at(0, 0), 0, &mut budget).meta.refusal_reason,
        RefusalReason::DomainInactive
    );
    assert_eq!(budget.used_units, 0);
}

#[test]
fn sample_at_weights_intensity_by_falloff() {
    let domain = HazardDomain::new(&scenario());
    let mut budget = Budget::new(100);
    let centre = domain.sample_at(at(0, 0), 3, &mut budget);
    assert_eq!(centre.intensity, Q16::ONE);
    assert_eq!(centre.contributing, 1);

    let halfway = domain.sample_at(at(5, 0), 0, &mut budget);
    assert_eq!(halfway.intensity, q(ONE_Q16 / 2));
    assert_eq!(halfway.contributing, 1);
    assert_eq!(halfway.meta.cost_units, 3);
    assert_eq!(halfway.flags, 0);
}

fn run(schedule: &[(u64, u64)], max: u32) -> (Vec<hazard::HazardResolveResult>, u64) {
    let mut domain = HazardDomain::new(&scenario());
    let results = schedule
        .iter()
        .map(|&(tick, delta)| domain.resolve(0, tick, delta, &mut Budget::new(max)))
        .collect();
    (results, domain.state_hash())
}

proptest! {
    #[test]
    fn replays_are_identical(
        schedule in proptest::collection::vec((0u64..50, 0u64..4), 1..8),
        max in 0u32..10,
    ) {
        prop_assert_eq!(run(&schedule, max), run(&schedule, max));
    }

    #[test]
    fn intensity_falls_and_dose_rises(deltas in proptest::collection::vec(0u64..3, 1..10)) {
        let mut domain = HazardDomain::new(&scenario());
        let mut previous = domain.clone();
        for (tick, delta) in deltas.into_iter().enumerate() {
            domain.resolve(0, tick as u64, delta, &mut Budget::new(100));
            for (now, before) in domain.fields().iter().zip(previous.fields()) {
                prop_assert!(now.intensity <= before.intensity);
                prop_assert!(now.intensity >= Q16::ZERO);
            }
            for (now, before) in domain.exposures().iter().zip(previous.exposures()) {
                prop_assert!(now.accumulated >= before.accumulated);
            }
            previous = domain.clone();
        }
    }
}
