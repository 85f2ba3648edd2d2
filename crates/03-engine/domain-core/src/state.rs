//! Domain lifecycle state and region selection.

use crate::EntityId;
use serde::Serialize;

/// Whether a domain exists in the simulated world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ExistenceState {
    #[default]
    Nonexistent,
    Declared,
    Latent,
    Realized,
    Archived,
}

/// Storage tier a domain currently lives in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ArchivalState {
    #[default]
    Live,
    Frozen,
    Archived,
}

/// Existence and archival state of a domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DomainState {
    pub existence: ExistenceState,
    pub archival: ArchivalState,
}

impl DomainState {
    /// State installed by `init`.
    pub const REALIZED_LIVE: DomainState = DomainState {
        existence: ExistenceState::Realized,
        archival: ArchivalState::Live,
    };

    /// Inactive domains refuse every query and resolve call.
    pub fn is_active(&self) -> bool {
        !matches!(
            self.existence,
            ExistenceState::Nonexistent | ExistenceState::Declared
        )
    }
}

/// Region selector used by region queries and resolve passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionScope {
    /// Every region that is not collapsed.
    All,
    /// A single region.
    Region(EntityId),
}

impl RegionScope {
    /// Interprets a raw region id; `0` selects every region.
    pub fn from_raw(region_id: EntityId) -> Self {
        if region_id == 0 {
            RegionScope::All
        } else {
            RegionScope::Region(region_id)
        }
    }

    pub fn matches(&self, region_id: EntityId) -> bool {
        match *self {
            RegionScope::All => true,
            RegionScope::Region(target) => target == region_id,
        }
    }

    pub fn raw(&self) -> EntityId {
        match *self {
            RegionScope::All => 0,
            RegionScope::Region(id) => id,
        }
    }
}
