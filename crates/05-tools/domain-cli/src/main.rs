//! `domctl`: load a domain fixture, drive it, and print a deterministic report.

mod config;
mod render;
mod session;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::RunConfig;
use domain_query::Budget;
use session::{Outcome, Report, Session};
use std::path::PathBuf;

/// Run resolve/inspect passes over autonomy and hazard fixtures.
#[derive(Parser, Debug)]
#[command(author, version, about = "Drive world-domain fixtures", long_about = None)]
struct Cli {
    /// Domain the fixture must describe.
    #[arg(value_enum)]
    domain: DomainArg,

    /// Path to the `key=value` fixture.
    #[arg(value_name = "FIXTURE")]
    fixture: PathBuf,

    /// TOML run config; flags below override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_parser = parse_u64)]
    tick: Option<u64>,

    #[arg(long, value_parser = parse_u64)]
    tick_delta: Option<u64>,

    /// Budget ceiling in cost units.
    #[arg(long, value_parser = parse_u32)]
    budget: Option<u32>,

    /// Region to resolve or inspect (0 = every live region).
    #[arg(long, value_parser = parse_u32)]
    region: Option<u32>,

    /// Collapse a region before the command runs (repeatable).
    #[arg(long, value_parser = parse_u32, value_name = "REGION")]
    collapse: Vec<u32>,

    /// Expand a region after collapsing (repeatable).
    #[arg(long, value_parser = parse_u32, value_name = "REGION")]
    expand: Vec<u32>,

    /// Emit the report as JSON instead of text.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Advance the domain one resolve step.
    Resolve,
    /// Print row counts, capsules, dangling references and a region sample.
    Inspect,
    /// Print only the state hash.
    Hash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DomainArg {
    Autonomy,
    Hazard,
}

impl DomainArg {
    fn name(self) -> &'static str {
        match self {
            DomainArg::Autonomy => "autonomy",
            DomainArg::Hazard => "hazard",
        }
    }
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        if let Some(tick) = self.tick {
            config.tick = tick;
        }
        if let Some(tick_delta) = self.tick_delta {
            config.tick_delta = tick_delta;
        }
        if let Some(budget) = self.budget {
            config.budget_max = budget;
        }
        if let Some(region) = self.region {
            config.region = region;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    print!("{}", run(&cli)?);
    Ok(())
}

fn run(cli: &Cli) -> Result<String> {
    let config = cli.run_config()?;
    let fixture = domain_fixtures::load(&cli.fixture)
        .with_context(|| format!("failed to load fixture {:?}", cli.fixture))?;
    if fixture.kind() != cli.domain.name() {
        bail!(
            "{:?} is a {} fixture, expected {}",
            cli.fixture,
            fixture.kind(),
            cli.domain.name()
        );
    }

    let mut session = Session::new(fixture, config.policy);
    let mut lod = Vec::with_capacity(cli.collapse.len() + cli.expand.len());
    for &region in &cli.collapse {
        lod.push(session.collapse(region));
    }
    for &region in &cli.expand {
        lod.push(session.expand(region));
    }

    let mut budget = Budget::new(config.budget_max);
    let outcome = match cli.command {
        Command::Resolve => session.resolve(&config, &mut budget),
        Command::Inspect => session.inspect(config.region, &mut budget),
        Command::Hash => Outcome::Hash,
    };
    let report = Report {
        domain: session.kind(),
        domain_id: session.domain_id(),
        config,
        lod,
        outcome,
        state_hash: session.state_hash(),
    };

    if cli.json {
        let mut text = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        text.push('\n');
        Ok(text)
    } else {
        Ok(render::report(&report))
    }
}

fn parse_u32(input: &str) -> Result<u32, String> {
    if let Some(stripped) = input.strip_prefix("0x") {
        u32::from_str_radix(stripped, 16).map_err(|_| format!("invalid hex value '{input}'"))
    } else {
        input
            .parse::<u32>()
            .map_err(|_| format!("invalid number '{input}'"))
    }
}

fn parse_u64(input: &str) -> Result<u64, String> {
    if let Some(stripped) = input.strip_prefix("0x") {
        u64::from_str_radix(stripped, 16).map_err(|_| format!("invalid hex value '{input}'"))
    } else {
        input
            .parse::<u64>()
            .map_err(|_| format!("invalid number '{input}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../99-tests/tests/fixtures")
            .join(name)
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("domctl").chain(args.iter().copied()))
            .expect("parse args")
    }

    #[test]
    fn flags_override_defaults() {
        let cli = cli(&[
            "hazard",
            "f.txt",
            "--tick",
            "0x10",
            "--budget",
            "7",
            "--collapse",
            "3",
            "--collapse",
            "5",
            "hash",
        ]);
        let config = cli.run_config().unwrap();
        assert_eq!(config.tick, 16);
        assert_eq!(config.budget_max, 7);
        assert_eq!(config.tick_delta, 1);
        assert_eq!(cli.collapse, vec![3, 5]);
        assert_eq!(cli.command, Command::Hash);
    }

    #[test]
    fn hash_report_is_stable_across_runs() {
        let path = fixture("autonomy_basic.txt");
        let args = ["autonomy", path.to_str().unwrap(), "resolve"];
        let first = run(&cli(&args)).unwrap();
        let second = run(&cli(&args)).unwrap();
        assert_eq!(first, second);
        assert!(first.lines().last().unwrap().starts_with("state_hash=0x"));
    }

    #[test]
    fn mismatched_domain_is_an_error() {
        let path = fixture("hazard_basic.txt");
        let err = run(&cli(&["autonomy", path.to_str().unwrap(), "hash"])).unwrap_err();
        assert!(err.to_string().contains("is a hazard fixture"));
    }

    #[test]
    fn config_file_policy_prices_the_resolve() {
        let path = fixture("hazard_basic.txt");
        let config = fixture("run.toml");
        let text = run(&cli(&[
            "hazard",
            path.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--tick",
            "3",
            "--json",
            "resolve",
        ]))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["config"]["tick"], 3);
        assert_eq!(value["config"]["budget_max"], 256);
        assert_eq!(value["config"]["policy"]["cost_medium"], 2);
        // medium base of 2 plus two fields and three exposures at 1 each
        assert_eq!(value["outcome"]["result"]["meta"]["cost_units"], 7);
    }

    #[test]
    fn json_report_carries_lod_codes() {
        let path = fixture("hazard_basic.txt");
        let text = run(&cli(&[
            "hazard",
            path.to_str().unwrap(),
            "--collapse",
            "0",
            "--json",
            "inspect",
        ]))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["domain"], "hazard");
        assert_eq!(value["lod"][0]["code"], -1);
        assert_eq!(value["outcome"]["kind"], "hazard_inspect");
    }
}
