//! Shared builders for the hazard integration tests.
#![allow(dead_code)]

use domain_core::EntityId;
use fixed_point::{Q16, Q48, ONE_Q16};
use hazard::{Exposure, HazardClass, HazardField, HazardSurfaceDesc, HazardType, Point};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn q(raw: i32) -> Q16 {
    Q16::from_raw(raw)
}

pub fn at(x: i32, y: i32) -> Point {
    Point::new(Q16::from_int(x), Q16::from_int(y), Q16::ZERO)
}

pub fn fire() -> HazardType {
    HazardType {
        type_id: 1,
        class: HazardClass::Fire,
        default_intensity: Q16::ONE,
        default_exposure_rate: Q16::ONE,
        default_decay_rate: q(ONE_Q16 / 4),
        default_uncertainty: q(ONE_Q16 / 8),
        ..HazardType::default()
    }
}

pub fn toxic() -> HazardType {
    HazardType {
        type_id: 2,
        class: HazardClass::Toxic,
        default_exposure_rate: q(ONE_Q16 / 2),
        ..HazardType::default()
    }
}

pub fn field(field_id: EntityId, type_id: EntityId, origin: Point, radius: i32, region_id: EntityId) -> HazardField {
    HazardField {
        field_id,
        type_id,
        intensity: Q16::ONE,
        origin,
        radius: Q16::from_int(radius),
        region_id,
        ..HazardField::default()
    }
}

pub fn exposure(exposure_id: EntityId, location: Point, limit: i64, region_id: EntityId) -> Exposure {
    Exposure {
        exposure_id,
        location,
        limit: Q48::from_int(limit),
        region_id,
        ..Exposure::default()
    }
}

/// Region 3 holds a fire field of radius 10 at the origin and two receptors,
/// one at the centre and one exactly on the rim. Region 5 holds a toxic
/// field with no decay and one receptor.
pub fn scenario() -> HazardSurfaceDesc {
    HazardSurfaceDesc {
        domain_id: 9,
        world_seed: 1,
        types: vec![fire(), toxic()],
        fields: vec![
            field(1, 1, at(0, 0), 10, 3),
            field(2, 2, at(20, 0), 4, 5),
        ],
        exposures: vec![
            exposure(1, at(0, 0), 2, 3),
            exposure(2, at(10, 0), 2, 3),
            exposure(3, at(22, 0), 0, 5),
        ],
        ..HazardSurfaceDesc::default()
    }
}
