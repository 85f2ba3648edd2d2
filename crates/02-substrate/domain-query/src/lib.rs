//! Shared query substrate for world-domain engines.
//!
//! Every read and resolve path charges a caller-owned [`Budget`] using the cost
//! tiers of a [`Policy`], and reports how it was answered through
//! [`QueryMeta`]. Refusals are ordinary values here, never errors.

mod budget;
mod meta;
mod policy;

pub use budget::Budget;
pub use meta::{Confidence, QueryMeta, QueryStatus, RefusalReason, Resolution};
pub use policy::{CostTier, Policy};
