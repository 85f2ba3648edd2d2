//! Autonomy domain container and lifecycle.

use crate::lod::AutonomyCapsule;
use crate::types::{
    AutonomySurfaceDesc, BudgetRow, Delegation, Event, Goal, Plan, MAX_BUDGETS, MAX_CAPSULES,
    MAX_DELEGATIONS, MAX_EVENTS, MAX_GOALS, MAX_PLANS,
};
use domain_core::{
    ArchivalState, BoundedTable, CapsuleStore, DomainState, EntityId, ExistenceState, HashState,
    QueryContext, StateHasher,
};
use domain_query::Policy;
use log::debug;
use smallvec::SmallVec;

/// Bounded container for one autonomy instantiation.
#[derive(Clone, Debug, PartialEq)]
pub struct AutonomyDomain {
    pub domain_id: u64,
    pub world_seed: u64,
    pub policy: Policy,
    pub state: DomainState,
    pub(crate) goals: BoundedTable<Goal, MAX_GOALS>,
    pub(crate) delegations: BoundedTable<Delegation, MAX_DELEGATIONS>,
    pub(crate) budgets: BoundedTable<BudgetRow, MAX_BUDGETS>,
    pub(crate) plans: BoundedTable<Plan, MAX_PLANS>,
    pub(crate) events: BoundedTable<Event, MAX_EVENTS>,
    pub(crate) capsules: CapsuleStore<AutonomyCapsule, MAX_CAPSULES>,
}

impl AutonomyDomain {
    /// Builds a realized, live domain from `desc`.
    pub fn new(desc: &AutonomySurfaceDesc) -> Self {
        let mut domain = Self::empty();
        domain.init(desc);
        domain
    }

    fn empty() -> Self {
        Self {
            domain_id: 0,
            world_seed: 0,
            policy: Policy::default(),
            state: DomainState::default(),
            goals: BoundedTable::new(),
            delegations: BoundedTable::new(),
            budgets: BoundedTable::new(),
            plans: BoundedTable::new(),
            events: BoundedTable::new(),
            capsules: CapsuleStore::new(),
        }
    }

    /// Resets the domain and copies every table from `desc`, keeping at most
    /// the table capacity of each kind. Excess rows are dropped, not rejected.
    pub fn init(&mut self, desc: &AutonomySurfaceDesc) {
        *self = Self::empty();
        self.domain_id = desc.domain_id;
        self.world_seed = desc.world_seed;
        self.policy = desc.policy;
        self.state = DomainState::REALIZED_LIVE;

        let dropped = [
            ("goals", self.goals.load_truncating(&desc.goals)),
            ("delegations", self.delegations.load_truncating(&desc.delegations)),
            ("budgets", self.budgets.load_truncating(&desc.budgets)),
            ("plans", self.plans.load_truncating(&desc.plans)),
            ("events", self.events.load_truncating(&desc.events)),
        ];
        for (kind, count) in dropped {
            if count > 0 {
                debug!(
                    "autonomy domain {}: dropped {count} {kind} past capacity",
                    self.domain_id
                );
            }
        }

        for goal in self.goals.as_mut_slice() {
            goal.priority = goal.priority.clamp01();
        }
        for plan in self.plans.as_mut_slice() {
            plan.success_score = plan.success_score.clamp01();
        }
    }

    /// Drops every live row and capsule. Storage stays allocated.
    pub fn free(&mut self) {
        self.goals.clear();
        self.delegations.clear();
        self.budgets.clear();
        self.plans.clear();
        self.events.clear();
        self.capsules.clear();
    }

    pub fn set_state(&mut self, existence: ExistenceState, archival: ArchivalState) {
        debug!(
            "autonomy domain {}: state {:?}/{:?} -> {existence:?}/{archival:?}",
            self.domain_id, self.state.existence, self.state.archival
        );
        self.state = DomainState {
            existence,
            archival,
        };
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy;
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_collapsed(&self, region_id: EntityId) -> bool {
        self.capsules.contains(region_id)
    }

    pub fn goals(&self) -> &[Goal] {
        self.goals.as_slice()
    }

    pub fn delegations(&self) -> &[Delegation] {
        self.delegations.as_slice()
    }

    pub fn budgets(&self) -> &[BudgetRow] {
        self.budgets.as_slice()
    }

    pub fn plans(&self) -> &[Plan] {
        self.plans.as_slice()
    }

    pub fn events(&self) -> &[Event] {
        self.events.as_slice()
    }

    pub fn capsules(&self) -> &[AutonomyCapsule] {
        self.capsules.iter().as_slice()
    }

    pub fn goal(&self, id: EntityId) -> Option<&Goal> {
        self.goals.iter().find(|g| id != 0 && g.goal_id == id)
    }

    pub fn delegation(&self, id: EntityId) -> Option<&Delegation> {
        self.delegations
            .iter()
            .find(|d| id != 0 && d.delegation_id == id)
    }

    pub fn budget(&self, id: EntityId) -> Option<&BudgetRow> {
        self.budgets.iter().find(|b| id != 0 && b.budget_id == id)
    }

    pub fn plan(&self, id: EntityId) -> Option<&Plan> {
        self.plans.iter().find(|p| id != 0 && p.plan_id == id)
    }

    pub fn event(&self, id: EntityId) -> Option<&Event> {
        self.events.iter().find(|e| id != 0 && e.event_id == id)
    }

    /// Region ids that currently have a capsule, in store order.
    pub fn capsule_ids(&self) -> SmallVec<[EntityId; 16]> {
        self.capsules.iter().map(|c| c.region_id).collect()
    }

    /// Foreign keys that do not resolve to a live row, as
    /// `(kind, owning id, missing id)`.
    pub fn dangling_references(&self) -> Vec<(&'static str, EntityId, EntityId)> {
        let mut out = Vec::new();
        let mut check = |kind: &'static str, owner: EntityId, id: EntityId, found: bool| {
            if id != 0 && !found {
                out.push((kind, owner, id));
            }
        };
        for row in self.budgets.iter() {
            let found = self.delegation(row.delegation_id).is_some();
            check("budget.delegation", row.budget_id, row.delegation_id, found);
        }
        for plan in self.plans.iter() {
            check("plan.goal", plan.plan_id, plan.goal_id, self.goal(plan.goal_id).is_some());
            let found = self.delegation(plan.delegation_id).is_some();
            check("plan.delegation", plan.plan_id, plan.delegation_id, found);
        }
        for event in self.events.iter() {
            check("event.goal", event.event_id, event.goal_id, self.goal(event.goal_id).is_some());
            let found = self.delegation(event.delegation_id).is_some();
            check("event.delegation", event.event_id, event.delegation_id, found);
            check("event.plan", event.event_id, event.plan_id, self.plan(event.plan_id).is_some());
            let found = self.budget(event.budget_id).is_some();
            check("event.budget", event.event_id, event.budget_id, found);
        }
        out
    }

    /// FNV-1a hash over the complete domain state for replay comparison.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHasher::new();
        h.write_u64(self.domain_id);
        h.write_u64(self.world_seed);
        h.write_u8(self.state.existence as u8);
        h.write_u8(self.state.archival as u8);
        h.write_u32(self.goals.len() as u32);
        for goal in self.goals.iter() {
            goal.hash_state(&mut h);
        }
        h.write_u32(self.delegations.len() as u32);
        for delegation in self.delegations.iter() {
            delegation.hash_state(&mut h);
        }
        h.write_u32(self.budgets.len() as u32);
        for row in self.budgets.iter() {
            row.hash_state(&mut h);
        }
        h.write_u32(self.plans.len() as u32);
        for plan in self.plans.iter() {
            plan.hash_state(&mut h);
        }
        h.write_u32(self.events.len() as u32);
        for event in self.events.iter() {
            event.hash_state(&mut h);
        }
        h.write_u32(self.capsules.len() as u32);
        for capsule in self.capsules.iter() {
            capsule.hash_state(&mut h);
        }
        h.finish()
    }

    pub(crate) fn with_query_context<R>(&self, f: impl FnOnce(QueryContext<'_>) -> R) -> R {
        let is_collapsed = |region: EntityId| self.capsules.contains(region);
        f(QueryContext {
            active: self.is_active(),
            policy: &self.policy,
            is_collapsed: &is_collapsed,
        })
    }
}
