//! Hazard world domain: hazard types, radius-bounded fields and exposure
//! receptors that accumulate dose.
//!
//! Each resolve decays field intensity linearly and then adds to every
//! exposure the dose reaching it from the fields of its own region.

mod derive;
mod domain;
pub mod geometry;
mod lod;
mod query;
mod resolve;
pub mod types;

pub use derive::{decayed, dose, effective_params, exposure_ratio, FieldParams};
pub use domain::HazardDomain;
pub use geometry::{falloff, Point};
pub use lod::{HazardCapsule, RATIO_BINS};
pub use query::{HazardPointSample, HazardRegionSample};
pub use resolve::HazardResolveResult;
pub use types::{Exposure, HazardClass, HazardField, HazardSurfaceDesc, HazardType};
