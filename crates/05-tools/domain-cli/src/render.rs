//! Deterministic text rendering of a [`Report`].

use crate::session::{Inventory, LodOp, LodStep, Outcome, Report};
use autonomy::{AutonomyRegionSample, AutonomyResolveResult};
use domain_query::QueryMeta;
use hazard::{HazardRegionSample, HazardResolveResult};
use std::fmt::Write;

pub fn report(report: &Report) -> String {
    let mut out = header(report);
    for step in &report.lod {
        out.push_str(&lod_step(step));
    }
    match &report.outcome {
        Outcome::AutonomyResolve { result } => out.push_str(&autonomy_resolve(result)),
        Outcome::HazardResolve { result } => out.push_str(&hazard_resolve(result)),
        Outcome::AutonomyInspect { inventory, region } => {
            out.push_str(&inventory_lines(inventory));
            out.push_str(&autonomy_region(region));
        }
        Outcome::HazardInspect { inventory, region } => {
            out.push_str(&inventory_lines(inventory));
            out.push_str(&hazard_region(region));
        }
        Outcome::Hash => {}
    }
    out.push_str(&state_hash(report.state_hash));
    out
}

fn header(report: &Report) -> String {
    let config = &report.config;
    format!(
        "domain={} domain_id={} region={} tick={} tick_delta={} budget_max={}\n",
        report.domain,
        report.domain_id,
        config.region,
        config.tick,
        config.tick_delta,
        config.budget_max
    )
}

pub fn lod_step(step: &LodStep) -> String {
    let op = match step.op {
        LodOp::Collapse => "collapse",
        LodOp::Expand => "expand",
    };
    format!(
        "{op} region={} code={} ({})\n",
        step.region_id, step.code, step.detail
    )
}

pub fn meta(meta: &QueryMeta) -> String {
    format!(
        "meta status={:?} confidence={:?} refusal={:?} cost={} budget={}/{}\n",
        meta.status,
        meta.confidence,
        meta.refusal_reason,
        meta.cost_units,
        meta.budget_used,
        meta.budget_max
    )
}

pub fn autonomy_resolve(result: &AutonomyResolveResult) -> String {
    let mut out = format!(
        "resolve region={} tick={} tick_delta={} flags=0x{:04x}\n",
        result.region_id, result.tick, result.tick_delta, result.flags
    );
    out.push_str(&meta(&result.meta));
    writeln!(
        out,
        "goals count={} expired={} priority_avg={}",
        result.goal_count, result.goal_expired_count, result.priority_avg
    )
    .expect("write goals");
    writeln!(
        out,
        "delegations count={} revoked={}",
        result.delegation_count, result.delegation_revoked_count
    )
    .expect("write delegations");
    writeln!(
        out,
        "budgets count={} exhausted={} utilization_avg={}",
        result.budget_count, result.budget_exhausted_count, result.budget_utilization_avg
    )
    .expect("write budgets");
    writeln!(
        out,
        "plans count={} active={} failed={} completed={} revoked={} success_avg={}",
        result.plan_count,
        result.plan_active_count,
        result.plan_failed_count,
        result.plan_completed_count,
        result.plan_revoked_count,
        result.success_avg
    )
    .expect("write plans");
    writeln!(
        out,
        "events count={} applied={} failed={} by_type={:?}",
        result.event_count,
        result.event_applied_count,
        result.event_failed_count,
        result.event_type_counts.counts()
    )
    .expect("write events");
    out
}

pub fn hazard_resolve(result: &HazardResolveResult) -> String {
    let mut out = format!(
        "resolve region={} tick={} tick_delta={} flags=0x{:04x}\n",
        result.region_id, result.tick, result.tick_delta, result.flags
    );
    out.push_str(&meta(&result.meta));
    writeln!(
        out,
        "fields count={} depleted={} intensity_avg={} uncertainty_avg={}",
        result.field_count,
        result.field_depleted_count,
        result.intensity_avg,
        result.uncertainty_avg
    )
    .expect("write fields");
    writeln!(
        out,
        "exposures count={} over_limit={} ratio_avg={} dose_applied={}",
        result.exposure_count,
        result.exposure_over_limit_count,
        result.exposure_ratio_avg,
        result.dose_applied
    )
    .expect("write exposures");
    out
}

fn inventory_lines(inventory: &Inventory) -> String {
    let mut out = String::from("rows");
    for (name, count) in &inventory.rows {
        write!(out, " {name}={count}").expect("write row count");
    }
    out.push('\n');
    writeln!(out, "capsules {:?}", inventory.capsule_ids).expect("write capsules");
    for (relation, owner, missing) in &inventory.dangling {
        writeln!(out, "dangling {relation} {owner} -> {missing}").expect("write dangling");
    }
    out
}

pub fn autonomy_region(sample: &AutonomyRegionSample) -> String {
    let mut out = format!(
        "region {} flags=0x{:04x}\n",
        sample.region_id, sample.flags
    );
    out.push_str(&meta(&sample.meta));
    writeln!(
        out,
        "goals={} delegations={} budgets={} plans={} events={}",
        sample.goal_count,
        sample.delegation_count,
        sample.budget_count,
        sample.plan_count,
        sample.event_count
    )
    .expect("write counts");
    writeln!(
        out,
        "priority_avg={} success_avg={} utilization_avg={}",
        sample.priority_avg, sample.success_avg, sample.budget_utilization_avg
    )
    .expect("write averages");
    out
}

pub fn hazard_region(sample: &HazardRegionSample) -> String {
    let mut out = format!(
        "region {} flags=0x{:04x}\n",
        sample.region_id, sample.flags
    );
    out.push_str(&meta(&sample.meta));
    writeln!(
        out,
        "fields={} exposures={} intensity_avg={} uncertainty_avg={} ratio_avg={}",
        sample.field_count,
        sample.exposure_count,
        sample.intensity_avg,
        sample.uncertainty_avg,
        sample.exposure_ratio_avg
    )
    .expect("write region");
    out
}

pub fn state_hash(hash: u64) -> String {
    format!("state_hash=0x{hash:016x}\n")
}
