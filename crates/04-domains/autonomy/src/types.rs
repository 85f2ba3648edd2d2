//! Autonomy records: goals, delegations, budgets, plans and events.
//!
//! Every record is a plain value stored inline in the domain. Ids are non-zero;
//! a zero foreign key means "not set".

use domain_core::{Entity, EntityId, HashState, StateHasher};
use domain_query::Policy;
use fixed_point::{Q16, Q48};
use serde::Serialize;

pub const MAX_GOALS: usize = 128;
pub const MAX_DELEGATIONS: usize = 64;
pub const MAX_BUDGETS: usize = 64;
pub const MAX_PLANS: usize = 128;
pub const MAX_EVENTS: usize = 128;
pub const MAX_CAPSULES: usize = 64;
pub const MAX_ALLOWED_PROCESSES: usize = 8;
pub const MAX_PLAN_STEPS: usize = 16;

/// Number of histogram bins for process types (every type except `Unset`).
pub const PROCESS_BINS: usize = 7;

/// Kind of process an event applies, and the vocabulary of plan steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[repr(u32)]
pub enum ProcessType {
    #[default]
    Unset = 0,
    Plan = 1,
    Execute = 2,
    Revise = 3,
    Revoke = 4,
    Expire = 5,
    Fail = 6,
    Complete = 7,
}

impl ProcessType {
    pub const ALL: [ProcessType; PROCESS_BINS] = [
        ProcessType::Plan,
        ProcessType::Execute,
        ProcessType::Revise,
        ProcessType::Revoke,
        ProcessType::Expire,
        ProcessType::Fail,
        ProcessType::Complete,
    ];

    /// Decodes a raw discriminant; unknown values map to `Unset`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => ProcessType::Plan,
            2 => ProcessType::Execute,
            3 => ProcessType::Revise,
            4 => ProcessType::Revoke,
            5 => ProcessType::Expire,
            6 => ProcessType::Fail,
            7 => ProcessType::Complete,
            _ => ProcessType::Unset,
        }
    }

    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Histogram bin for this type; `Unset` has none.
    pub fn bin(self) -> Option<usize> {
        match self {
            ProcessType::Unset => None,
            other => Some(other as usize - 1),
        }
    }
}

/// Plan lifecycle. `Failed`, `Completed` and `Revoked` are absorbing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[repr(u32)]
pub enum PlanStatus {
    #[default]
    Unset = 0,
    Proposed = 1,
    Active = 2,
    Failed = 3,
    Completed = 4,
    Revoked = 5,
}

impl PlanStatus {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => PlanStatus::Proposed,
            2 => PlanStatus::Active,
            3 => PlanStatus::Failed,
            4 => PlanStatus::Completed,
            5 => PlanStatus::Revoked,
            _ => PlanStatus::Unset,
        }
    }

    pub const fn raw(self) -> u32 {
        self as u32
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PlanStatus::Failed | PlanStatus::Completed | PlanStatus::Revoked
        )
    }
}

/// Per-kind flag bits. Bits 0..=2 are shared (see [`domain_core::flags`]).
pub mod flags {
    pub use domain_core::flags::{COLLAPSED, PARTIAL, UNRESOLVED};

    pub const GOAL_EXPIRED: u32 = 1 << 4;

    pub const DELEGATION_REVOKED: u32 = 1 << 4;

    pub const BUDGET_EXHAUSTED: u32 = 1 << 4;

    pub const PLAN_FAILED: u32 = 1 << 4;
    pub const PLAN_COMPLETED: u32 = 1 << 5;
    pub const PLAN_REVOKED: u32 = 1 << 6;

    pub const EVENT_APPLIED: u32 = 1 << 4;
    pub const EVENT_FAILED: u32 = 1 << 5;
}

/// Aggregate flag bits reported by resolve passes.
pub mod resolve_flags {
    pub use domain_core::flags::{COLLAPSED, PARTIAL};

    pub const GOAL_EXPIRED: u32 = 1 << 4;
    pub const DELEGATION_REVOKED: u32 = 1 << 5;
    pub const BUDGET_EXHAUSTED: u32 = 1 << 6;
    pub const PLAN_FAILED: u32 = 1 << 7;
    pub const PLAN_COMPLETED: u32 = 1 << 8;
    pub const PLAN_REVOKED: u32 = 1 << 9;
    pub const EVENT_APPLIED: u32 = 1 << 10;
    pub const EVENT_FAILED: u32 = 1 << 11;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Goal {
    pub goal_id: EntityId,
    pub objective_id: u32,
    pub success_condition_id: u32,
    pub constraint_id: u32,
    /// Unit ratio.
    pub priority: Q16,
    /// Absolute tick at which the goal lapses; `0` never expires.
    pub expiry_tick: u64,
    pub delegator_id: u32,
    pub provenance_id: u32,
    pub region_id: EntityId,
    pub flags: u32,
}

/// Authority granted by a delegator to a delegate, with resource ceilings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Delegation {
    pub delegation_id: EntityId,
    pub delegator_id: u32,
    pub delegate_id: u32,
    pub allowed_processes: [ProcessType; MAX_ALLOWED_PROCESSES],
    pub allowed_count: u32,
    pub time_budget: Q48,
    pub energy_budget: Q48,
    pub risk_budget: Q16,
    pub planning_budget: u32,
    pub oversight_policy_id: u32,
    pub revocation_policy_id: u32,
    pub provenance_id: u32,
    pub region_id: EntityId,
    pub flags: u32,
}

impl Delegation {
    pub fn allowed(&self) -> &[ProcessType] {
        let count = (self.allowed_count as usize).min(MAX_ALLOWED_PROCESSES);
        &self.allowed_processes[..count]
    }

    /// An empty allow-list permits every process.
    pub fn allows(&self, process: ProcessType) -> bool {
        let allowed = self.allowed();
        allowed.is_empty() || allowed.contains(&process)
    }

    pub fn is_revoked(&self) -> bool {
        self.flags & flags::DELEGATION_REVOKED != 0
    }
}

/// Usage counters charged against a delegation's ceilings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BudgetRow {
    pub budget_id: EntityId,
    pub delegation_id: EntityId,
    pub time_used: Q48,
    pub energy_used: Q48,
    pub risk_used: Q16,
    pub planning_used: u32,
    pub provenance_id: u32,
    pub region_id: EntityId,
    pub flags: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub plan_id: EntityId,
    pub goal_id: EntityId,
    pub delegation_id: EntityId,
    pub steps: [ProcessType; MAX_PLAN_STEPS],
    pub step_count: u32,
    /// Unit ratio.
    pub success_score: Q16,
    pub estimated_cost: Q48,
    pub status: PlanStatus,
    pub provenance_id: u32,
    pub region_id: EntityId,
    pub flags: u32,
}

impl Plan {
    pub fn steps(&self) -> &[ProcessType] {
        let count = (self.step_count as usize).min(MAX_PLAN_STEPS);
        &self.steps[..count]
    }
}

/// The only record that causes mutation. Zero target ids are found through
/// the relation graph when the event is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Event {
    pub event_id: EntityId,
    pub process: ProcessType,
    pub goal_id: EntityId,
    pub delegation_id: EntityId,
    pub plan_id: EntityId,
    pub budget_id: EntityId,
    pub delta_priority: Q16,
    pub delta_success: Q16,
    pub delta_time: Q48,
    pub delta_energy: Q48,
    pub delta_risk: Q16,
    pub delta_planning: u32,
    /// The event is not eligible before this tick.
    pub event_tick: u64,
    pub provenance_id: u32,
    pub region_id: EntityId,
    pub flags: u32,
}

impl Event {
    pub fn is_settled(&self) -> bool {
        self.flags & (flags::EVENT_APPLIED | flags::EVENT_FAILED) != 0
    }
}

/// Caller-built description copied into a domain by `init`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutonomySurfaceDesc {
    pub domain_id: u64,
    pub world_seed: u64,
    pub policy: Policy,
    pub goals: Vec<Goal>,
    pub delegations: Vec<Delegation>,
    pub budgets: Vec<BudgetRow>,
    pub plans: Vec<Plan>,
    pub events: Vec<Event>,
}

macro_rules! impl_entity {
    ($ty:ty, $id:ident) => {
        impl Entity for $ty {
            fn id(&self) -> EntityId {
                self.$id
            }

            fn region_id(&self) -> EntityId {
                self.region_id
            }

            fn identity(&self) -> Self {
                Self {
                    $id: self.$id,
                    region_id: self.region_id,
                    ..Self::default()
                }
            }
        }
    };
}

impl_entity!(Goal, goal_id);
impl_entity!(Delegation, delegation_id);
impl_entity!(BudgetRow, budget_id);
impl_entity!(Plan, plan_id);
impl_entity!(Event, event_id);

impl HashState for Goal {
    fn hash_state(&self, h: &mut StateHasher) {
        h.write_u32(self.goal_id);
        h.write_u32(self.objective_id);
        h.write_u32(self.success_condition_id);
        h.write_u32(self.constraint_id);
        h.write_q16(self.priority);
        h.write_u64(self.expiry_tick);
        h.write_u32(self.delegator_id);
        h.write_u32(self.provenance_id);
        h.write_u32(self.region_id);
        h.write_u32(self.flags);
    }
}

impl HashState for Delegation {
    fn hash_state(&self, h: &mut StateHasher) {
        h.write_u32(self.delegation_id);
        h.write_u32(self.delegator_id);
        h.write_u32(self.delegate_id);
        h.write_u32(self.allowed_count);
        for process in self.allowed() {
            h.write_u32(process.raw());
        }
        h.write_q48(self.time_budget);
        h.write_q48(self.energy_budget);
        h.write_q16(self.risk_budget);
        h.write_u32(self.planning_budget);
        h.write_u32(self.oversight_policy_id);
        h.write_u32(self.revocation_policy_id);
        h.write_u32(self.provenance_id);
        h.write_u32(self.region_id);
        h.write_u32(self.flags);
    }
}

impl HashState for BudgetRow {
    fn hash_state(&self, h: &mut StateHasher) {
        h.write_u32(self.budget_id);
        h.write_u32(self.delegation_id);
        h.write_q48(self.time_used);
        h.write_q48(self.energy_used);
        h.write_q16(self.risk_used);
        h.write_u32(self.planning_used);
        h.write_u32(self.provenance_id);
        h.write_u32(self.region_id);
        h.write_u32(self.flags);
    }
}

impl HashState for Plan {
    fn hash_state(&self, h: &mut StateHasher) {
        h.write_u32(self.plan_id);
        h.write_u32(self.goal_id);
        h.write_u32(self.delegation_id);
        h.write_u32(self.step_count);
        for step in self.steps() {
            h.write_u32(step.raw());
        }
        h.write_q16(self.success_score);
        h.write_q48(self.estimated_cost);
        h.write_u32(self.status.raw());
        h.write_u32(self.provenance_id);
        h.write_u32(self.region_id);
        h.write_u32(self.flags);
    }
}

impl HashState for Event {
    fn hash_state(&self, h: &mut StateHasher) {
        h.write_u32(self.event_id);
        h.write_u32(self.process.raw());
        h.write_u32(self.goal_id);
        h.write_u32(self.delegation_id);
        h.write_u32(self.plan_id);
        h.write_u32(self.budget_id);
        h.write_q16(self.delta_priority);
        h.write_q16(self.delta_success);
        h.write_q48(self.delta_time);
        h.write_q48(self.delta_energy);
        h.write_q16(self.delta_risk);
        h.write_u32(self.delta_planning);
        h.write_u64(self.event_tick);
        h.write_u32(self.provenance_id);
        h.write_u32(self.region_id);
        h.write_u32(self.flags);
    }
}
