use crate::support::{autonomy_fixture, init_logging};
use autonomy::types::flags;
use autonomy::{AutonomyDomain, AutonomyResolveResult, PlanStatus};
use domain_core::LodOutcome;
use domain_query::Budget;
use fixed_point::Q16;
use pretty_assertions::assert_eq;

const FIXTURE: &str = "autonomy_basic.txt";

fn run_ticks(domain: &mut AutonomyDomain, region: u32, ticks: std::ops::RangeInclusive<u64>) -> Vec<AutonomyResolveResult> {
    ticks
        .map(|tick| {
            let mut budget = Budget::new(1024);
            domain.resolve(region, tick, 1, &mut budget)
        })
        .collect()
}

#[test]
fn fixture_loads_without_dangling_references() {
    let desc = autonomy_fixture(FIXTURE);
    let domain = AutonomyDomain::new(&desc);
    assert_eq!(domain.goals().len(), 2);
    assert_eq!(domain.events().len(), 6);
    assert_eq!(domain.dangling_references(), Vec::new());
}

#[test]
fn scripted_lifecycle_reaches_expected_end_state() {
    init_logging();
    let mut domain = AutonomyDomain::new(&autonomy_fixture(FIXTURE));
    run_ticks(&mut domain, 0, 1..=4);

    let plan = |id| domain.plan(id).copied().unwrap();
    assert_eq!(plan(1).status, PlanStatus::Completed);
    assert_eq!(plan(2).status, PlanStatus::Revoked);
    assert!(domain.delegation(2).unwrap().is_revoked());
    assert!(!domain.delegation(1).unwrap().is_revoked());
    assert_eq!(domain.goal(2).unwrap().priority, Q16::from_raw(Q16::ONE.raw() / 2));

    let row = domain.budget(1).copied().unwrap();
    assert_eq!(row.planning_used, 2);
    assert_eq!(row.time_used, fixed_point::Q48::from_int(40));

    for id in 1..=5 {
        let event = domain.event(id).unwrap();
        assert_ne!(event.flags & flags::EVENT_APPLIED, 0, "event {id}");
    }
    let refused = domain.event(6).unwrap();
    assert_ne!(refused.flags & flags::EVENT_FAILED, 0);
    assert_eq!(refused.flags & flags::EVENT_APPLIED, 0);
}

#[test]
fn replay_from_the_same_fixture_is_bit_identical() {
    let desc = autonomy_fixture(FIXTURE);
    let mut first = AutonomyDomain::new(&desc);
    let mut second = AutonomyDomain::new(&desc);
    assert_eq!(first.state_hash(), second.state_hash());

    let a = run_ticks(&mut first, 0, 1..=6);
    let b = run_ticks(&mut second, 0, 1..=6);
    assert_eq!(a, b);
    assert_eq!(first.state_hash(), second.state_hash());
    assert_eq!(first, second);
}

#[test]
fn resolved_state_differs_from_initial_state() {
    let desc = autonomy_fixture(FIXTURE);
    let mut domain = AutonomyDomain::new(&desc);
    let initial = domain.state_hash();
    run_ticks(&mut domain, 0, 1..=1);
    assert_ne!(domain.state_hash(), initial);
}

#[test]
fn collapse_then_expand_restores_the_exact_state() {
    let mut domain = AutonomyDomain::new(&autonomy_fixture(FIXTURE));
    run_ticks(&mut domain, 0, 1..=2);
    let before = domain.state_hash();

    assert_eq!(domain.collapse_region(2), Ok(LodOutcome::Collapsed));
    assert_ne!(domain.state_hash(), before);
    assert_eq!(domain.expand_region(2), Ok(LodOutcome::Expanded));
    assert_eq!(domain.state_hash(), before);
}

#[test]
fn collapsed_region_defers_its_events_until_expanded() {
    let mut domain = AutonomyDomain::new(&autonomy_fixture(FIXTURE));
    domain.collapse_region(2).unwrap();
    let results = run_ticks(&mut domain, 0, 1..=4);

    assert!(results
        .iter()
        .all(|r| r.flags & autonomy::types::resolve_flags::PARTIAL != 0));
    assert_eq!(domain.plan(1).unwrap().status, PlanStatus::Completed);
    assert!(!domain.delegation(2).unwrap().is_revoked());
    assert_eq!(domain.event(5).unwrap().flags & flags::EVENT_APPLIED, 0);

    domain.expand_region(2).unwrap();
    run_ticks(&mut domain, 0, 5..=5);
    assert!(domain.delegation(2).unwrap().is_revoked());
    assert_eq!(domain.plan(2).unwrap().status, PlanStatus::Revoked);
}

#[test]
fn region_scoped_resolve_leaves_other_regions_untouched() {
    let mut domain = AutonomyDomain::new(&autonomy_fixture(FIXTURE));
    run_ticks(&mut domain, 1, 1..=4);
    assert_eq!(domain.plan(1).unwrap().status, PlanStatus::Completed);
    assert_eq!(domain.plan(2).unwrap().status, PlanStatus::Proposed);
    assert_eq!(domain.goal(2).unwrap().priority, Q16::from_raw(Q16::ONE.raw() / 4));
}
