//! Optional TOML run configuration.

use anyhow::{Context, Result};
use domain_query::Policy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters for one `domctl` run. Command-line flags win over the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub budget_max: u32,
    pub tick: u64,
    pub tick_delta: u64,
    pub region: u32,
    /// Replaces the fixture's cost table when present.
    pub policy: Option<Policy>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            budget_max: 1024,
            tick: 1,
            tick_delta: 1,
            region: 0,
            policy: None,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read run config {path:?}"))?;
        toml::from_str(&text).with_context(|| format!("invalid run config {path:?}"))
    }
}
