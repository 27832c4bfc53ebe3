#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays scripted Spellbound scenarios headlessly.

mod scenario;
mod session;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use spellbound_world::WorldConfig;
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Runs a scripted cast against the headless host and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "spellbound", version, about)]
struct Args {
    /// TOML file overriding world capacities and spell tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Scenario to play back.
    #[arg(long, value_enum, default_value_t = Scenario::Fireball)]
    scenario: Scenario,
    /// Number of ticks to simulate after the opening casts.
    #[arg(long, default_value_t = 120)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 50)]
    step_ms: u64,
}

/// Entry point for the Spellbound command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    ensure!(args.ticks > 0, "--ticks must be at least 1");
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => WorldConfig::default(),
    };
    ensure!(config.slot_capacity > 0, "slot_capacity must be at least 1");

    let report = scenario::run(
        args.scenario,
        config,
        args.ticks,
        Duration::from_millis(args.step_ms),
    );
    println!("{report}");
    Ok(())
}

fn load_config(path: &Path) -> Result<WorldConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}
