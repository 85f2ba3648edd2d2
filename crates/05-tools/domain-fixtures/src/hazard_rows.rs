//! `DOMINIUM_HAZARD_FIXTURE_V1` rows.

use crate::error::FixtureResult;
use crate::lines::{Entry, Key};
use crate::value::HAZARD_CLASS_NAMES;
use crate::{apply_common, declare, row};
use hazard::HazardSurfaceDesc;

pub(crate) fn apply(desc: &mut HazardSurfaceDesc, entry: &Entry<'_>) -> FixtureResult<()> {
    let key = entry.parse_key()?;
    if apply_common(&mut desc.domain_id, &mut desc.world_seed, &mut desc.policy, entry, key)? {
        return Ok(());
    }
    match key {
        Key::Count("type") => declare(&mut desc.types, entry),
        Key::Count("field") => declare(&mut desc.fields, entry),
        Key::Count("exposure") => declare(&mut desc.exposures, entry),
        Key::Row { kind, index, field } => apply_row(desc, entry, kind, index, field),
        _ => Err(entry.unknown_key()),
    }
}

fn apply_row(
    desc: &mut HazardSurfaceDesc,
    entry: &Entry<'_>,
    kind: &str,
    index: usize,
    field: &str,
) -> FixtureResult<()> {
    match kind {
        "type" => {
            let kind = row(&mut desc.types, entry, index)?;
            match field {
                "type_id" => kind.type_id = entry.uint()?,
                "class" => kind.class = entry.named(&HAZARD_CLASS_NAMES)?,
                "default_intensity" => kind.default_intensity = entry.q16()?,
                "default_exposure_rate" => kind.default_exposure_rate = entry.q16()?,
                "default_decay_rate" => kind.default_decay_rate = entry.q16()?,
                "default_uncertainty" => kind.default_uncertainty = entry.q16()?,
                "provenance_id" => kind.provenance_id = entry.uint()?,
                "flags" => kind.flags = entry.uint()?,
                _ => return Err(entry.unknown_key()),
            }
        }
        "field" => {
            let hazard = row(&mut desc.fields, entry, index)?;
            match field {
                "field_id" => hazard.field_id = entry.uint()?,
                "type_id" => hazard.type_id = entry.uint()?,
                "intensity" => hazard.intensity = entry.q16()?,
                "exposure_rate" => hazard.exposure_rate = entry.q16()?,
                "decay_rate" => hazard.decay_rate = entry.q16()?,
                "uncertainty" => hazard.uncertainty = entry.q16()?,
                "origin" => hazard.origin = entry.point()?,
                "radius" => hazard.radius = entry.q16()?,
                "provenance_id" => hazard.provenance_id = entry.uint()?,
                "region_id" => hazard.region_id = entry.uint()?,
                "flags" => hazard.flags = entry.uint()?,
                _ => return Err(entry.unknown_key()),
            }
        }
        "exposure" => {
            let exposure = row(&mut desc.exposures, entry, index)?;
            match field {
                "exposure_id" => exposure.exposure_id = entry.uint()?,
                "type_id" => exposure.type_id = entry.uint()?,
                "location" => exposure.location = entry.point()?,
                "accumulated" => exposure.accumulated = entry.q48()?,
                "limit" => exposure.limit = entry.q48()?,
                "sensitivity" => exposure.sensitivity = entry.q16()?,
                "provenance_id" => exposure.provenance_id = entry.uint()?,
                "region_id" => exposure.region_id = entry.uint()?,
                "flags" => exposure.flags = entry.uint()?,
                _ => return Err(entry.unknown_key()),
            }
        }
        _ => return Err(entry.unknown_key()),
    }
    Ok(())
}
