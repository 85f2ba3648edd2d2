//! Shared builders for the autonomy integration tests.
#![allow(dead_code)]

use autonomy::{
    AutonomySurfaceDesc, BudgetRow, Delegation, Event, Goal, Plan, PlanStatus, ProcessType,
};
use domain_core::EntityId;
use fixed_point::{Q16, Q48};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn half() -> Q16 {
    Q16::from_raw(fixed_point::ONE_Q16 / 2)
}

pub fn goal(goal_id: EntityId, region_id: EntityId) -> Goal {
    Goal {
        goal_id,
        priority: half(),
        region_id,
        ..Goal::default()
    }
}

pub fn delegation(delegation_id: EntityId, region_id: EntityId) -> Delegation {
    Delegation {
        delegation_id,
        region_id,
        ..Delegation::default()
    }
}

pub fn budget_row(budget_id: EntityId, delegation_id: EntityId, region_id: EntityId) -> BudgetRow {
    BudgetRow {
        budget_id,
        delegation_id,
        region_id,
        ..BudgetRow::default()
    }
}

pub fn plan(plan_id: EntityId, goal_id: EntityId, delegation_id: EntityId, region_id: EntityId) -> Plan {
    Plan {
        plan_id,
        goal_id,
        delegation_id,
        status: PlanStatus::Proposed,
        success_score: half(),
        region_id,
        ..Plan::default()
    }
}

pub fn event(event_id: EntityId, process: ProcessType, plan_id: EntityId, region_id: EntityId) -> Event {
    Event {
        event_id,
        process,
        plan_id,
        region_id,
        ..Event::default()
    }
}

/// One delegation with a time ceiling of 100, its budget row, a proposed plan
/// and an `EXECUTE` event spending 150 time units at tick 0.
pub fn execute_scenario() -> AutonomySurfaceDesc {
    let mut execute = event(1, ProcessType::Execute, 1, 0);
    execute.delta_time = Q48::from_int(150);
    AutonomySurfaceDesc {
        domain_id: 1,
        world_seed: 42,
        delegations: vec![Delegation {
            time_budget: Q48::from_int(100),
            ..delegation(1, 0)
        }],
        budgets: vec![budget_row(1, 1, 0)],
        goals: vec![goal(1, 0)],
        plans: vec![plan(1, 1, 1, 0)],
        events: vec![execute],
        ..AutonomySurfaceDesc::default()
    }
}

/// Two populated regions, 7 and 9, each with a goal, delegation, budget row,
/// plan and a pending `PLAN` event.
pub fn two_regions() -> AutonomySurfaceDesc {
    let mut desc = AutonomySurfaceDesc {
        domain_id: 2,
        world_seed: 7,
        ..AutonomySurfaceDesc::default()
    };
    for (offset, region) in [(0, 7), (10, 9)] {
        desc.goals.push(goal(offset + 1, region));
        desc.delegations.push(Delegation {
            planning_budget: 4,
            ..delegation(offset + 1, region)
        });
        desc.budgets.push(budget_row(offset + 1, offset + 1, region));
        desc.plans.push(plan(offset + 1, offset + 1, offset + 1, region));
        let mut planning = event(offset + 1, ProcessType::Plan, offset + 1, region);
        planning.delta_planning = 2;
        desc.events.push(planning);
    }
    desc
}
