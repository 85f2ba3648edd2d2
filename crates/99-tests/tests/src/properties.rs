use crate::support::{autonomy_fixture, hazard_fixture};
use autonomy::AutonomyDomain;
use domain_query::Budget;
use fixed_point::Q16;
use hazard::HazardDomain;
use proptest::prelude::*;

/// `(tick_delta, budget_max)` pairs; ticks advance by the delta.
fn schedule() -> impl Strategy<Value = Vec<(u64, u32)>> {
    proptest::collection::vec((1u64..4, 0u32..48), 1..12)
}

fn in_unit_range(value: Q16) -> bool {
    value >= Q16::ZERO && value <= Q16::ONE
}

fn replay_autonomy(schedule: &[(u64, u32)], collapsed: Option<u32>) -> (AutonomyDomain, Vec<autonomy::AutonomyResolveResult>) {
    let mut domain = AutonomyDomain::new(&autonomy_fixture("autonomy_basic.txt"));
    if let Some(region) = collapsed {
        domain.collapse_region(region).unwrap();
    }
    let mut tick = 0;
    let results = schedule
        .iter()
        .map(|&(delta, max)| {
            tick += delta;
            let mut budget = Budget::new(max);
            domain.resolve(0, tick, delta, &mut budget)
        })
        .collect();
    (domain, results)
}

fn replay_hazard(schedule: &[(u64, u32)]) -> (HazardDomain, Vec<hazard::HazardResolveResult>) {
    let mut domain = HazardDomain::new(&hazard_fixture("hazard_basic.txt"));
    let mut tick = 0;
    let results = schedule
        .iter()
        .map(|&(delta, max)| {
            tick += delta;
            let mut budget = Budget::new(max);
            domain.resolve(0, tick, delta, &mut budget)
        })
        .collect();
    (domain, results)
}

proptest! {
    #[test]
    fn autonomy_replays_match_under_any_schedule(plan in schedule(), collapse_two in any::<bool>()) {
        let collapsed = collapse_two.then_some(2);
        let (a, ra) = replay_autonomy(&plan, collapsed);
        let (b, rb) = replay_autonomy(&plan, collapsed);
        prop_assert_eq!(ra, rb);
        prop_assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn autonomy_results_respect_budget_and_ranges(plan in schedule()) {
        let (domain, results) = replay_autonomy(&plan, None);
        for (result, &(_, max)) in results.iter().zip(&plan) {
            prop_assert!(result.meta.budget_used <= max);
            prop_assert!(result.meta.cost_units <= max);
            prop_assert!(in_unit_range(result.priority_avg));
            prop_assert!(in_unit_range(result.success_avg));
            prop_assert!(in_unit_range(result.budget_utilization_avg));
        }
        prop_assert!(domain.goals().iter().all(|g| in_unit_range(g.priority)));
        prop_assert!(domain.plans().iter().all(|p| in_unit_range(p.success_score)));
        prop_assert!(domain.dangling_references().is_empty());
    }

    #[test]
    fn hazard_exposure_never_decreases(plan in schedule()) {
        let (domain, results) = replay_hazard(&plan);
        let (again, _) = replay_hazard(&plan);
        prop_assert_eq!(domain.state_hash(), again.state_hash());

        let mut fresh = HazardDomain::new(&hazard_fixture("hazard_basic.txt"));
        let mut tick = 0;
        for &(delta, max) in &plan {
            let before: Vec<_> = fresh.exposures().iter().map(|e| e.accumulated).collect();
            tick += delta;
            let mut budget = Budget::new(max);
            fresh.resolve(0, tick, delta, &mut budget);
            for (old, now) in before.iter().zip(fresh.exposures()) {
                prop_assert!(now.accumulated >= *old);
            }
        }
        for result in &results {
            prop_assert!(in_unit_range(result.intensity_avg));
            prop_assert!(in_unit_range(result.exposure_ratio_avg));
        }
    }

    #[test]
    fn collapse_expand_preserves_hash(ticks in 0u64..6, region in 1u32..4) {
        let mut domain = AutonomyDomain::new(&autonomy_fixture("autonomy_basic.txt"));
        for tick in 1..=ticks {
            domain.resolve(0, tick, 1, &mut Budget::new(1024));
        }
        let before = domain.state_hash();
        domain.collapse_region(region).unwrap();
        domain.expand_region(region).unwrap();
        prop_assert_eq!(domain.state_hash(), before);
    }
}
