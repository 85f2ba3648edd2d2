//! Hazard domain container and lifecycle.

use crate::derive;
use crate::lod::HazardCapsule;
use crate::types::{
    Exposure, HazardField, HazardSurfaceDesc, HazardType, MAX_CAPSULES, MAX_EXPOSURES,
    MAX_FIELDS, MAX_TYPES,
};
use domain_core::{
    ArchivalState, BoundedTable, CapsuleStore, DomainState, EntityId, ExistenceState, HashState,
    QueryContext, StateHasher,
};
use domain_query::Policy;
use log::debug;
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq)]
pub struct HazardDomain {
    pub domain_id: u64,
    pub world_seed: u64,
    pub policy: Policy,
    pub state: DomainState,
    pub(crate) types: BoundedTable<HazardType, MAX_TYPES>,
    pub(crate) fields: BoundedTable<HazardField, MAX_FIELDS>,
    pub(crate) exposures: BoundedTable<Exposure, MAX_EXPOSURES>,
    pub(crate) capsules: CapsuleStore<HazardCapsule, MAX_CAPSULES>,
}

impl HazardDomain {
    pub fn new(desc: &HazardSurfaceDesc) -> Self {
        let mut domain = Self {
            domain_id: 0,
            world_seed: 0,
            policy: Policy::default(),
            state: DomainState::default(),
            types: BoundedTable::new(),
            fields: BoundedTable::new(),
            exposures: BoundedTable::new(),
            capsules: CapsuleStore::new(),
        };
        domain.init(desc);
        domain
    }

    /// Resets the domain and copies at most the table capacity of each kind
    /// from `desc`. Unit ratios are clamped on the way in.
    pub fn init(&mut self, desc: &HazardSurfaceDesc) {
        self.free();
        self.domain_id = desc.domain_id;
        self.world_seed = desc.world_seed;
        self.policy = desc.policy;
        self.state = DomainState::REALIZED_LIVE;

        let dropped = self.types.load_truncating(&desc.types)
            + self.fields.load_truncating(&desc.fields)
            + self.exposures.load_truncating(&desc.exposures);
        if dropped > 0 {
            debug!(
                "hazard domain {}: dropped {dropped} rows past capacity",
                self.domain_id
            );
        }

        for kind in self.types.as_mut_slice() {
            kind.default_intensity = kind.default_intensity.clamp01();
            kind.default_uncertainty = kind.default_uncertainty.clamp01();
        }
        let types = self.types.as_slice();
        for field in self.fields.as_mut_slice() {
            let kind = types.iter().find(|k| k.type_id == field.type_id);
            field.intensity =
                derive::inherit(field.intensity, kind.map(|k| k.default_intensity)).clamp01();
            field.uncertainty = field.uncertainty.clamp01();
        }
    }

    pub fn free(&mut self) {
        self.types.clear();
        self.fields.clear();
        self.exposures.clear();
        self.capsules.clear();
    }

    pub fn set_state(&mut self, existence: ExistenceState, archival: ArchivalState) {
        debug!(
            "hazard domain {}: state -> {existence:?}/{archival:?}",
            self.domain_id
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

    pub fn types(&self) -> &[HazardType] {
        self.types.as_slice()
    }

    pub fn fields(&self) -> &[HazardField] {
        self.fields.as_slice()
    }

    pub fn exposures(&self) -> &[Exposure] {
        self.exposures.as_slice()
    }

    pub fn capsules(&self) -> &[HazardCapsule] {
        self.capsules.iter().as_slice()
    }

    pub fn hazard_type(&self, id: EntityId) -> Option<&HazardType> {
        self.types.iter().find(|t| id != 0 && t.type_id == id)
    }

    pub fn field(&self, id: EntityId) -> Option<&HazardField> {
        self.fields.iter().find(|f| id != 0 && f.field_id == id)
    }

    pub fn exposure(&self, id: EntityId) -> Option<&Exposure> {
        self.exposures.iter().find(|e| id != 0 && e.exposure_id == id)
    }

    pub fn capsule_ids(&self) -> SmallVec<[EntityId; 16]> {
        self.capsules.iter().map(|c| c.region_id).collect()
    }

    /// Type references that do not resolve, as `(kind, owning id, missing id)`.
    pub fn dangling_references(&self) -> Vec<(&'static str, EntityId, EntityId)> {
        let fields = self
            .fields
            .iter()
            .filter(|f| f.type_id != 0 && self.hazard_type(f.type_id).is_none())
            .map(|f| ("field.type", f.field_id, f.type_id));
        let exposures = self
            .exposures
            .iter()
            .filter(|e| e.type_id != 0 && self.hazard_type(e.type_id).is_none())
            .map(|e| ("exposure.type", e.exposure_id, e.type_id));
        fields.chain(exposures).collect()
    }

    pub fn state_hash(&self) -> u64 {
        let mut h = StateHasher::new();
        h.write_u64(self.domain_id);
        h.write_u64(self.world_seed);
        h.write_u8(self.state.existence as u8);
        h.write_u8(self.state.archival as u8);
        h.write_u32(self.types.len() as u32);
        for kind in self.types.iter() {
            kind.hash_state(&mut h);
        }
        h.write_u32(self.fields.len() as u32);
        for field in self.fields.iter() {
            field.hash_state(&mut h);
        }
        h.write_u32(self.exposures.len() as u32);
        for exposure in self.exposures.iter() {
            exposure.hash_state(&mut h);
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
