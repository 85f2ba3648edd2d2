//! A loaded domain plus the report built from running commands against it.

use crate::config::RunConfig;
use autonomy::{AutonomyDomain, AutonomyRegionSample, AutonomyResolveResult};
use domain_core::{EntityId, LodError, LodOutcome};
use domain_fixtures::Fixture;
use domain_query::{Budget, Policy};
use hazard::{HazardDomain, HazardRegionSample, HazardResolveResult};
use log::debug;
use serde::Serialize;

pub enum Session {
    Autonomy(Box<AutonomyDomain>),
    Hazard(Box<HazardDomain>),
}

/// Collapse or expand request applied before the command runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LodOp {
    Collapse,
    Expand,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LodStep {
    pub op: LodOp,
    pub region_id: EntityId,
    pub code: i32,
    pub detail: String,
}

impl LodStep {
    fn new(op: LodOp, region_id: EntityId, result: Result<LodOutcome, LodError>) -> Self {
        let (code, detail) = match result {
            Ok(outcome) => (outcome.code(), outcome_name(outcome).to_owned()),
            Err(err) => (err.code(), err.to_string()),
        };
        Self {
            op,
            region_id,
            code,
            detail,
        }
    }
}

fn outcome_name(outcome: LodOutcome) -> &'static str {
    match outcome {
        LodOutcome::Collapsed => "collapsed",
        LodOutcome::AlreadyCollapsed => "already collapsed",
        LodOutcome::Expanded => "expanded",
    }
}

/// Row counts and integrity findings for `inspect`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub rows: Vec<(&'static str, usize)>,
    pub capsule_ids: Vec<EntityId>,
    /// `(relation, owner id, missing id)`
    pub dangling: Vec<(&'static str, EntityId, EntityId)>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    AutonomyResolve {
        result: AutonomyResolveResult,
    },
    HazardResolve {
        result: HazardResolveResult,
    },
    AutonomyInspect {
        inventory: Inventory,
        region: AutonomyRegionSample,
    },
    HazardInspect {
        inventory: Inventory,
        region: HazardRegionSample,
    },
    Hash,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub domain: &'static str,
    pub domain_id: u64,
    pub config: RunConfig,
    pub lod: Vec<LodStep>,
    pub outcome: Outcome,
    pub state_hash: u64,
}

impl Session {
    pub fn new(fixture: Fixture, policy: Option<Policy>) -> Self {
        let mut session = match fixture {
            Fixture::Autonomy(desc) => Session::Autonomy(Box::new(AutonomyDomain::new(&desc))),
            Fixture::Hazard(desc) => Session::Hazard(Box::new(HazardDomain::new(&desc))),
        };
        if let Some(policy) = policy {
            debug!("run config overrides the fixture policy: {policy:?}");
            match &mut session {
                Session::Autonomy(domain) => domain.set_policy(policy),
                Session::Hazard(domain) => domain.set_policy(policy),
            }
        }
        session
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Session::Autonomy(_) => "autonomy",
            Session::Hazard(_) => "hazard",
        }
    }

    pub fn domain_id(&self) -> u64 {
        match self {
            Session::Autonomy(domain) => domain.domain_id,
            Session::Hazard(domain) => domain.domain_id,
        }
    }

    pub fn state_hash(&self) -> u64 {
        match self {
            Session::Autonomy(domain) => domain.state_hash(),
            Session::Hazard(domain) => domain.state_hash(),
        }
    }

    pub fn collapse(&mut self, region_id: EntityId) -> LodStep {
        let result = match self {
            Session::Autonomy(domain) => domain.collapse_region(region_id),
            Session::Hazard(domain) => domain.collapse_region(region_id),
        };
        LodStep::new(LodOp::Collapse, region_id, result)
    }

    pub fn expand(&mut self, region_id: EntityId) -> LodStep {
        let result = match self {
            Session::Autonomy(domain) => domain.expand_region(region_id),
            Session::Hazard(domain) => domain.expand_region(region_id),
        };
        LodStep::new(LodOp::Expand, region_id, result)
    }

    pub fn resolve(&mut self, config: &RunConfig, budget: &mut Budget) -> Outcome {
        let RunConfig {
            region,
            tick,
            tick_delta,
            ..
        } = *config;
        match self {
            Session::Autonomy(domain) => Outcome::AutonomyResolve {
                result: domain.resolve(region, tick, tick_delta, budget),
            },
            Session::Hazard(domain) => Outcome::HazardResolve {
                result: domain.resolve(region, tick, tick_delta, budget),
            },
        }
    }

    pub fn inspect(&self, region_id: EntityId, budget: &mut Budget) -> Outcome {
        match self {
            Session::Autonomy(domain) => Outcome::AutonomyInspect {
                inventory: Inventory {
                    rows: vec![
                        ("goals", domain.goals().len()),
                        ("delegations", domain.delegations().len()),
                        ("budgets", domain.budgets().len()),
                        ("plans", domain.plans().len()),
                        ("events", domain.events().len()),
                    ],
                    capsule_ids: domain.capsule_ids().to_vec(),
                    dangling: domain.dangling_references(),
                },
                region: domain.region_query(region_id, budget),
            },
            Session::Hazard(domain) => Outcome::HazardInspect {
                inventory: Inventory {
                    rows: vec![
                        ("types", domain.types().len()),
                        ("fields", domain.fields().len()),
                        ("exposures", domain.exposures().len()),
                    ],
                    capsule_ids: domain.capsule_ids().to_vec(),
                    dangling: domain.dangling_references(),
                },
                region: domain.region_query(region_id, budget),
            },
        }
    }
}
