//! Line-oriented fixture format for domain surface descriptions.
//!
//! A fixture starts with a header naming the domain, followed by
//! `key=value` lines. Counts (`goal_count=2`) size a table, rows are
//! addressed as `kind.index.field`:
//!
//! ```text
//! DOMINIUM_AUTONOMY_FIXTURE_V1
//! domain_id=1
//! policy.cost_medium=2
//! goal_count=1
//! goal.0.goal_id=1
//! goal.0.priority=0.5
//! ```
//!
//! Fixed-point values are decimal (`0.25`), enums take a name or their
//! discriminant, integers accept `0x` hex.

mod autonomy_rows;
mod error;
mod hazard_rows;
mod lines;
mod value;

use ::autonomy::AutonomySurfaceDesc;
use ::hazard::HazardSurfaceDesc;
use domain_query::Policy;
use lines::{Entry, Key, Lines};
use log::debug;
use std::path::Path;

pub use error::{FixtureError, FixtureResult};
pub use value::{HAZARD_CLASS_NAMES, PLAN_STATUS_NAMES, PROCESS_NAMES};

pub const AUTONOMY_HEADER: &str = "DOMINIUM_AUTONOMY_FIXTURE_V1";
pub const HAZARD_HEADER: &str = "DOMINIUM_HAZARD_FIXTURE_V1";

/// Largest `*_count` the loader will allocate. Domains truncate further.
pub const MAX_DECLARED_ROWS: usize = 4096;

/// A parsed fixture, tagged by its header.
#[derive(Clone, Debug, PartialEq)]
pub enum Fixture {
    Autonomy(AutonomySurfaceDesc),
    Hazard(HazardSurfaceDesc),
}

impl Fixture {
    pub fn kind(&self) -> &'static str {
        match self {
            Fixture::Autonomy(_) => "autonomy",
            Fixture::Hazard(_) => "hazard",
        }
    }
}

/// Parses fixture text of either kind.
pub fn parse(text: &str) -> FixtureResult<Fixture> {
    let mut lines = Lines::new(text);
    let (line, header) = lines.header()?;
    let fixture = match header {
        AUTONOMY_HEADER => {
            let mut desc = AutonomySurfaceDesc::default();
            for entry in lines {
                autonomy_rows::apply(&mut desc, &entry?)?;
            }
            Fixture::Autonomy(desc)
        }
        HAZARD_HEADER => {
            let mut desc = HazardSurfaceDesc::default();
            for entry in lines {
                hazard_rows::apply(&mut desc, &entry?)?;
            }
            Fixture::Hazard(desc)
        }
        other => {
            return Err(FixtureError::UnknownHeader {
                line,
                header: other.to_owned(),
            })
        }
    };
    debug!("parsed {} fixture", fixture.kind());
    Ok(fixture)
}

/// Reads and parses the fixture at `path`.
pub fn load(path: impl AsRef<Path>) -> FixtureResult<Fixture> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// Parses text that must be an autonomy fixture.
pub fn parse_autonomy(text: &str) -> FixtureResult<AutonomySurfaceDesc> {
    match parse(text)? {
        Fixture::Autonomy(desc) => Ok(desc),
        Fixture::Hazard(_) => Err(wrong_header(text)),
    }
}

/// Parses text that must be a hazard fixture.
pub fn parse_hazard(text: &str) -> FixtureResult<HazardSurfaceDesc> {
    match parse(text)? {
        Fixture::Hazard(desc) => Ok(desc),
        Fixture::Autonomy(_) => Err(wrong_header(text)),
    }
}

fn wrong_header(text: &str) -> FixtureError {
    match Lines::new(text).header() {
        Ok((line, header)) => FixtureError::UnknownHeader {
            line,
            header: header.to_owned(),
        },
        Err(err) => err,
    }
}

/// Keys shared by every domain. Returns `false` when `key` is not one.
pub(crate) fn apply_common(
    domain_id: &mut u64,
    world_seed: &mut u64,
    policy: &mut Policy,
    entry: &Entry<'_>,
    key: Key<'_>,
) -> FixtureResult<bool> {
    match key {
        Key::Scalar("domain_id") => *domain_id = entry.uint()?,
        Key::Scalar("world_seed") => *world_seed = entry.uint()?,
        Key::Section("policy", field) => match field {
            "cost_full" => policy.cost_full = entry.uint()?,
            "cost_medium" => policy.cost_medium = entry.uint()?,
            "cost_coarse" => policy.cost_coarse = entry.uint()?,
            "cost_analytic" => policy.cost_analytic = entry.uint()?,
            _ => return Err(entry.unknown_key()),
        },
        _ => return Ok(false),
    }
    Ok(true)
}

/// Sizes `rows` to the count in `entry`.
pub(crate) fn declare<T: Default + Clone>(rows: &mut Vec<T>, entry: &Entry<'_>) -> FixtureResult<()> {
    let count: usize = entry.uint()?;
    if count > MAX_DECLARED_ROWS {
        return Err(FixtureError::CountTooLarge {
            line: entry.line,
            count,
            limit: MAX_DECLARED_ROWS,
        });
    }
    rows.resize(count, T::default());
    Ok(())
}

pub(crate) fn row<'r, T>(rows: &'r mut [T], entry: &Entry<'_>, index: usize) -> FixtureResult<&'r mut T> {
    let count = rows.len();
    rows.get_mut(index).ok_or_else(|| FixtureError::IndexOutOfRange {
        line: entry.line,
        key: entry.key.to_owned(),
        index,
        count,
    })
}
