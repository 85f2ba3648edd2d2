use crate::support::{hazard_fixture, init_logging};
use domain_core::{flags, LodError, LodOutcome};
use domain_query::Budget;
use fixed_point::{Q16, Q48};
use hazard::types::resolve_flags;
use hazard::{HazardDomain, HazardResolveResult, Point};
use pretty_assertions::assert_eq;

const FIXTURE: &str = "hazard_basic.txt";

fn quarter_steps(n: i64) -> Q48 {
    Q48::from_raw(n * Q48::ONE.raw() / 4)
}

fn step(domain: &mut HazardDomain, region: u32, tick: u64) -> HazardResolveResult {
    let mut budget = Budget::new(256);
    domain.resolve(region, tick, 1, &mut budget)
}

#[test]
fn fixture_loads_without_dangling_references() {
    let domain = HazardDomain::new(&hazard_fixture(FIXTURE));
    assert_eq!(domain.types().len(), 2);
    assert_eq!(domain.fields().len(), 2);
    assert_eq!(domain.exposures().len(), 3);
    assert_eq!(domain.dangling_references(), Vec::new());
}

#[test]
fn first_tick_decays_then_doses() {
    init_logging();
    let mut domain = HazardDomain::new(&hazard_fixture(FIXTURE));
    let result = step(&mut domain, 0, 1);

    assert_eq!(result.field_count, 2);
    assert_eq!(result.exposure_count, 3);
    assert_eq!(result.dose_applied, Q48::ONE);
    assert_ne!(result.flags & resolve_flags::FIELD_DECAYING, 0);
    assert_eq!(result.flags & resolve_flags::PARTIAL, 0);

    assert_eq!(domain.field(1).unwrap().intensity, Q16::from_raw(3 * Q16::ONE.raw() / 4));
    assert_eq!(domain.field(2).unwrap().intensity, Q16::ONE);
    assert_eq!(domain.exposure(1).unwrap().accumulated, quarter_steps(3));
    assert_eq!(domain.exposure(2).unwrap().accumulated, Q48::ZERO);
    assert_eq!(domain.exposure(3).unwrap().accumulated, quarter_steps(1));
}

#[test]
fn fire_burns_out_after_four_ticks() {
    let mut domain = HazardDomain::new(&hazard_fixture(FIXTURE));
    let results: Vec<_> = (1..=5).map(|tick| step(&mut domain, 3, tick)).collect();

    assert_eq!(results[3].field_depleted_count, 1);
    assert_ne!(results[3].flags & resolve_flags::FIELD_DEPLETED, 0);
    assert_eq!(domain.field(1).unwrap().intensity, Q16::ZERO);
    // 0.75 + 0.5 + 0.25 + 0 + 0
    assert_eq!(domain.exposure(1).unwrap().accumulated, quarter_steps(6));
    assert_eq!(results[4].dose_applied, Q48::ZERO);
    // region 5 was never resolved
    assert_eq!(domain.exposure(3).unwrap().accumulated, Q48::ZERO);
}

#[test]
fn replay_from_the_same_fixture_is_bit_identical() {
    let desc = hazard_fixture(FIXTURE);
    let mut first = HazardDomain::new(&desc);
    let mut second = HazardDomain::new(&desc);
    let a: Vec<_> = (1..=8).map(|tick| step(&mut first, 0, tick)).collect();
    let b: Vec<_> = (1..=8).map(|tick| step(&mut second, 0, tick)).collect();
    assert_eq!(a, b);
    assert_eq!(first.state_hash(), second.state_hash());
}

#[test]
fn collapse_expand_round_trip_is_lossless() {
    let mut domain = HazardDomain::new(&hazard_fixture(FIXTURE));
    step(&mut domain, 0, 1);
    let before = domain.state_hash();

    assert_eq!(domain.collapse_region(5), Ok(LodOutcome::Collapsed));
    assert_eq!(domain.collapse_region(5), Ok(LodOutcome::AlreadyCollapsed));
    assert_eq!(domain.collapse_region(0), Err(LodError::InvalidRegion));
    assert_eq!(domain.capsule_ids().as_slice(), &[5]);

    let mut budget = Budget::new(16);
    let capsule = domain.capsule_query(5, &mut budget);
    assert_eq!(capsule.flags, flags::COLLAPSED);
    assert_eq!(capsule.record.field_count, 1);
    assert_eq!(capsule.record.exposure_count, 1);

    let skipped = step(&mut domain, 0, 2);
    assert_ne!(skipped.flags & resolve_flags::PARTIAL, 0);
    assert_eq!(skipped.field_count, 1);

    assert_eq!(domain.expand_region(5), Ok(LodOutcome::Expanded));
    assert_eq!(
        domain.expand_region(5),
        Err(LodError::NotCollapsed { region_id: 5 })
    );
    assert_ne!(domain.state_hash(), before, "region 3 advanced while 5 was parked");
    assert_eq!(domain.exposure(3).unwrap().accumulated, quarter_steps(1));
}

#[test]
fn point_samples_follow_falloff() {
    let domain = HazardDomain::new(&hazard_fixture(FIXTURE));
    let mut budget = Budget::new(16);
    let halfway = Point::new(Q16::from_int(5), Q16::ZERO, Q16::ZERO);
    let sample = domain.sample_at(halfway, 3, &mut budget);
    assert!(!sample.meta.is_refused());
    assert_eq!(sample.contributing, 1);
    assert_eq!(sample.intensity, Q16::from_raw(Q16::ONE.raw() / 2));

    let outside = Point::new(Q16::from_int(50), Q16::ZERO, Q16::ZERO);
    let sample = domain.sample_at(outside, 0, &mut budget);
    assert_eq!(sample.contributing, 0);
    assert_eq!(sample.intensity, Q16::ZERO);
}
