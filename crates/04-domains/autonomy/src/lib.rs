//! Autonomy world domain: goals, delegations, budgets, plans and events.
//!
//! An [`AutonomyDomain`] is built once from an [`AutonomySurfaceDesc`] and then
//! driven by the caller: queries never mutate, [`AutonomyDomain::resolve`]
//! advances the tables to a tick and applies due events, and
//! [`AutonomyDomain::collapse_region`] trades a region's live rows for an
//! aggregate capsule until it is expanded again.
//!
//! ```
//! use autonomy::{AutonomyDomain, AutonomySurfaceDesc};
//! use domain_query::Budget;
//!
//! let mut domain = AutonomyDomain::new(&AutonomySurfaceDesc::default());
//! let mut budget = Budget::new(64);
//! let result = domain.resolve(0, 1, 1, &mut budget);
//! assert!(!result.meta.is_refused());
//! ```

mod derive;
mod domain;
mod events;
mod lod;
mod query;
mod resolve;
pub mod types;

pub use derive::{budget_flags, goal_flags, planning_utilization, plan_flags};
pub use domain::AutonomyDomain;
pub use events::{find_targets, EventFailure, EventTargets};
pub use lod::{AutonomyCapsule, RATIO_BINS};
pub use query::AutonomyRegionSample;
pub use resolve::AutonomyResolveResult;
pub use types::{
    AutonomySurfaceDesc, BudgetRow, Delegation, Event, Goal, Plan, PlanStatus, ProcessType,
};
