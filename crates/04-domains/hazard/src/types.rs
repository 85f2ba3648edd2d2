//! Hazard records: types, positioned fields and exposure receptors.

use crate::geometry::Point;
use domain_core::{Entity, EntityId, HashState, StateHasher};
use domain_query::Policy;
use fixed_point::{Q16, Q48};
use serde::Serialize;

pub const MAX_TYPES: usize = 32;
pub const MAX_FIELDS: usize = 128;
pub const MAX_EXPOSURES: usize = 128;
pub const MAX_CAPSULES: usize = 64;

/// One histogram bin per [`HazardClass`], `Unset` included.
pub const CLASS_BINS: usize = 7;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[repr(u32)]
pub enum HazardClass {
    #[default]
    Unset = 0,
    Fire = 1,
    Toxic = 2,
    Radiation = 3,
    Electrical = 4,
    Biological = 5,
    Thermal = 6,
}

impl HazardClass {
    pub const ALL: [HazardClass; CLASS_BINS] = [
        HazardClass::Unset,
        HazardClass::Fire,
        HazardClass::Toxic,
        HazardClass::Radiation,
        HazardClass::Electrical,
        HazardClass::Biological,
        HazardClass::Thermal,
    ];

    /// Decodes a raw discriminant; unknown values map to `Unset`.
    pub fn from_raw(raw: u32) -> Self {
        Self::ALL
            .get(raw as usize)
            .copied()
            .unwrap_or(HazardClass::Unset)
    }

    pub const fn raw(self) -> u32 {
        self as u32
    }

    pub const fn bin(self) -> usize {
        self as usize
    }
}

/// Per-kind status bits. Bits 0..=2 are shared (see [`domain_core::flags`]).
pub mod flags {
    pub use domain_core::flags::*;

    /// Field intensity is still falling.
    pub const FIELD_DECAYING: u32 = 1 << 4;
    /// Field intensity reached zero; it no longer emits.
    pub const FIELD_DEPLETED: u32 = 1 << 5;
    /// Exposure dose reached its limit.
    pub const EXPOSURE_OVER_LIMIT: u32 = 1 << 4;
}

/// Aggregate flags of a resolve result.
pub mod resolve_flags {
    pub use domain_core::flags::{COLLAPSED, PARTIAL};

    pub const FIELD_DEPLETED: u32 = 1 << 4;
    pub const EXPOSURE_OVER_LIMIT: u32 = 1 << 5;
    pub const FIELD_DECAYING: u32 = 1 << 6;
}

/// Class defaults inherited by fields that leave a parameter at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HazardType {
    pub type_id: EntityId,
    pub class: HazardClass,
    pub default_intensity: Q16,
    pub default_exposure_rate: Q16,
    pub default_decay_rate: Q16,
    pub default_uncertainty: Q16,
    pub provenance_id: u32,
    pub flags: u32,
}

/// Radius-bounded emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HazardField {
    pub field_id: EntityId,
    pub type_id: EntityId,
    /// Unit ratio, clamped at init.
    pub intensity: Q16,
    pub exposure_rate: Q16,
    /// Intensity lost per tick.
    pub decay_rate: Q16,
    pub uncertainty: Q16,
    pub origin: Point,
    pub radius: Q16,
    pub provenance_id: u32,
    pub region_id: EntityId,
    pub flags: u32,
}

/// Positioned receptor accumulating dose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Exposure {
    pub exposure_id: EntityId,
    /// Hazard type this receptor is sensitive to; `0` means every type.
    pub type_id: EntityId,
    pub location: Point,
    pub accumulated: Q48,
    /// Dose ceiling; `0` means unlimited.
    pub limit: Q48,
    /// Dose multiplier; `0` is treated as one.
    pub sensitivity: Q16,
    pub provenance_id: u32,
    pub region_id: EntityId,
    pub flags: u32,
}

impl Exposure {
    pub fn is_over_limit(&self) -> bool {
        self.limit > Q48::ZERO && self.accumulated >= self.limit
    }

    pub fn senses(&self, type_id: EntityId) -> bool {
        self.type_id == 0 || self.type_id == type_id
    }
}

/// Caller-built description copied into a domain by `init`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HazardSurfaceDesc {
    pub domain_id: u64,
    pub world_seed: u64,
    pub policy: Policy,
    pub types: Vec<HazardType>,
    pub fields: Vec<HazardField>,
    pub exposures: Vec<Exposure>,
}

impl Entity for HazardType {
    fn id(&self) -> EntityId {
        self.type_id
    }

    /// Types are global.
    fn region_id(&self) -> EntityId {
        0
    }

    fn identity(&self) -> Self {
        Self {
            type_id: self.type_id,
            ..Self::default()
        }
    }
}

impl Entity for HazardField {
    fn id(&self) -> EntityId {
        self.field_id
    }

    fn region_id(&self) -> EntityId {
        self.region_id
    }

    fn identity(&self) -> Self {
        Self {
            field_id: self.field_id,
            region_id: self.region_id,
            ..Self::default()
        }
    }
}

impl Entity for Exposure {
    fn id(&self) -> EntityId {
        self.exposure_id
    }

    fn region_id(&self) -> EntityId {
        self.region_id
    }

    fn identity(&self) -> Self {
        Self {
            exposure_id: self.exposure_id,
            region_id: self.region_id,
            ..Self::default()
        }
    }
}

impl HashState for HazardType {
    fn hash_state(&self, h: &mut StateHasher) {
        h.write_u32(self.type_id);
        h.write_u32(self.class.raw());
        h.write_q16(self.default_intensity);
        h.write_q16(self.default_exposure_rate);
        h.write_q16(self.default_decay_rate);
        h.write_q16(self.default_uncertainty);
        h.write_u32(self.provenance_id);
        h.write_u32(self.flags);
    }
}

impl HashState for HazardField {
    fn hash_state(&self, h: &mut StateHasher) {
        h.write_u32(self.field_id);
        h.write_u32(self.type_id);
        h.write_q16(self.intensity);
        h.write_q16(self.exposure_rate);
        h.write_q16(self.decay_rate);
        h.write_q16(self.uncertainty);
        self.origin.hash_state(h);
        h.write_q16(self.radius);
        h.write_u32(self.provenance_id);
        h.write_u32(self.region_id);
        h.write_u32(self.flags);
    }
}

impl HashState for Exposure {
    fn hash_state(&self, h: &mut StateHasher) {
        h.write_u32(self.exposure_id);
        h.write_u32(self.type_id);
        self.location.hash_state(h);
        h.write_q48(self.accumulated);
        h.write_q48(self.limit);
        h.write_q16(self.sensitivity);
        h.write_u32(self.provenance_id);
        h.write_u32(self.region_id);
        h.write_u32(self.flags);
    }
}
