//! Engine building blocks shared by every world-domain instantiation.
//!
//! Domains store their entities in inline [`BoundedTable`]s, discover regions
//! by scanning `region_id` fields, meter every visited entity through a
//! [`ScanMeter`], and park collapsed regions in a [`CapsuleStore`].

pub mod capsule;
pub mod hash;
pub mod meter;
pub mod query;
pub mod state;
pub mod stats;
pub mod table;

pub use capsule::{Capsule, CapsuleStore, LodError, LodOutcome};
pub use hash::{HashState, StateHasher};
pub use meter::ScanMeter;
pub use query::{query_by_id, Entity, QueryContext, Sample};
pub use state::{ArchivalState, DomainState, ExistenceState, RegionScope};
pub use stats::{hist_bin, Histogram, WideMean};
pub use table::BoundedTable;

/// Ids are plain integers; zero marks an absent reference.
pub type EntityId = u32;

/// Converts a zero-sentinel id into an explicit option.
#[inline]
pub fn id_ref(id: EntityId) -> Option<EntityId> {
    (id != 0).then_some(id)
}

/// Flag bits every entity kind shares.
pub mod flags {
    /// Entity has not been visited by a resolve pass, or a sample was refused.
    pub const UNRESOLVED: u32 = 1 << 0;
    /// Entity (or sample) belongs to a collapsed region.
    pub const COLLAPSED: u32 = 1 << 1;
    /// Result or aggregate is incomplete.
    pub const PARTIAL: u32 = 1 << 2;
}
