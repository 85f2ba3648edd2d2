//! Macro capsule storage for collapsed regions.

use crate::table::BoundedTable;
use crate::EntityId;
use thiserror::Error;

/// Aggregate snapshot that stands in for a collapsed region.
pub trait Capsule: Copy + Default {
    /// Region the capsule replaces; doubles as the capsule id.
    fn region_id(&self) -> EntityId;
}

/// Successful level-of-detail transitions. All map to status code `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LodOutcome {
    /// A capsule was built and stored.
    Collapsed,
    /// The region already had a capsule; nothing changed.
    AlreadyCollapsed,
    /// The capsule was dropped and the region is live again.
    Expanded,
}

impl LodOutcome {
    pub const fn code(self) -> i32 {
        0
    }
}

/// Level-of-detail transitions that could not be performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LodError {
    #[error("region 0 is the ungrouped sentinel and cannot change detail level")]
    InvalidRegion,
    #[error("capsule store is full ({capacity} capsules)")]
    CapsuleStoreFull { capacity: usize },
    #[error("region {region_id} is not collapsed")]
    NotCollapsed { region_id: EntityId },
}

impl LodError {
    /// Integer status code used at the fixture/CLI boundary.
    pub const fn code(&self) -> i32 {
        match self {
            LodError::InvalidRegion => -1,
            LodError::CapsuleStoreFull { .. } => -2,
            LodError::NotCollapsed { .. } => -3,
        }
    }
}

/// Fixed-capacity set of capsules keyed by region id.
///
/// Removal swaps the last capsule into the freed slot, so iteration order is
/// unspecified and must not be relied on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapsuleStore<C: Capsule, const N: usize> {
    capsules: BoundedTable<C, N>,
}

impl<C: Capsule, const N: usize> CapsuleStore<C, N> {
    pub fn new() -> Self {
        Self {
            capsules: BoundedTable::new(),
        }
    }

    pub fn find(&self, region_id: EntityId) -> Option<usize> {
        if region_id == 0 {
            return None;
        }
        self.capsules.position(|c| c.region_id() == region_id)
    }

    pub fn contains(&self, region_id: EntityId) -> bool {
        self.find(region_id).is_some()
    }

    pub fn get(&self, region_id: EntityId) -> Option<&C> {
        self.find(region_id).and_then(|idx| self.capsules.get(idx))
    }

    /// Stores a capsule for a region that has none yet.
    pub fn insert(&mut self, capsule: C) -> Result<LodOutcome, LodError> {
        let region_id = capsule.region_id();
        if region_id == 0 {
            return Err(LodError::InvalidRegion);
        }
        if self.contains(region_id) {
            return Ok(LodOutcome::AlreadyCollapsed);
        }
        if !self.capsules.push(capsule) {
            return Err(LodError::CapsuleStoreFull { capacity: N });
        }
        Ok(LodOutcome::Collapsed)
    }

    /// Drops the capsule for `region_id`.
    pub fn remove(&mut self, region_id: EntityId) -> Result<C, LodError> {
        if region_id == 0 {
            return Err(LodError::InvalidRegion);
        }
        self.find(region_id)
            .and_then(|idx| self.capsules.swap_remove(idx))
            .ok_or(LodError::NotCollapsed { region_id })
    }

    pub fn len(&self) -> usize {
        self.capsules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capsules.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capsules.is_full()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, C> {
        self.capsules.iter()
    }

    pub fn clear(&mut self) {
        self.capsules.clear();
    }
}

impl<C: Capsule, const N: usize> Default for CapsuleStore<C, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    struct Stub(EntityId);

    impl Capsule for Stub {
        fn region_id(&self) -> EntityId {
            self.0
        }
    }

    #[test]
    fn insert_is_idempotent_per_region() {
        let mut store = CapsuleStore::<Stub, 4>::new();
        assert_eq!(store.insert(Stub(7)), Ok(LodOutcome::Collapsed));
        assert_eq!(store.insert(Stub(7)), Ok(LodOutcome::AlreadyCollapsed));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn full_store_reports_capacity_error() {
        let mut store = CapsuleStore::<Stub, 2>::new();
        store.insert(Stub(1)).unwrap();
        store.insert(Stub(2)).unwrap();
        let err = store.insert(Stub(3)).unwrap_err();
        assert_eq!(err, LodError::CapsuleStoreFull { capacity: 2 });
        assert_eq!(err.code(), -2);
    }

    #[test]
    fn remove_unknown_region_is_an_error() {
        let mut store = CapsuleStore::<Stub, 2>::new();
        assert_eq!(store.remove(9), Err(LodError::NotCollapsed { region_id: 9 }));
        assert_eq!(store.remove(0), Err(LodError::InvalidRegion));
    }

    #[test]
    fn region_zero_is_never_stored() {
        let mut store = CapsuleStore::<Stub, 2>::new();
        assert_eq!(store.insert(Stub(0)), Err(LodError::InvalidRegion));
        assert!(!store.contains(0));
    }
}
