// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # AURUM Simulation Node
//!
//! Entry point for the `aurum-node` binary. Parses CLI arguments,
//! initializes logging, and drives the vault engine through a configured
//! scenario against in-memory ledgers and oracles.
//!
//! The binary supports two subcommands:
//!
//! - `simulate` — run a scenario and print its JSON report to stdout
//! - `version`  — print build version information

mod cli;
mod logging;
mod scenario;

use anyhow::Result;
use clap::Parser;

use cli::{AurumNodeCli, Commands, SimulateArgs};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = AurumNodeCli::parse();

    match cli.command {
        Commands::Simulate(args) => simulate(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Runs a scenario end to end and prints its report to stdout. Logs go to
/// stderr so the report stays pipeable.
fn simulate(args: SimulateArgs) -> Result<()> {
    logging::init_logging(&args.log_level, LogFormat::from_str_lossy(&args.log_format));

    let config = match &args.config {
        Some(path) => scenario::ScenarioConfig::load(path)?,
        None => scenario::ScenarioConfig::builtin(),
    };

    tracing::info!(
        scenario = %config.name,
        reserves = config.reserves.len(),
        tax_rate_bps = config.tax_rate_bps,
        "starting simulation"
    );

    let report = scenario::run(&config)?;

    tracing::info!(
        run_id = %report.run_id,
        final_block = report.final_block,
        peg_total_supply = report.peg_total_supply,
        "simulation finished"
    );

    let rendered = if args.compact_report {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{rendered}");
    Ok(())
}

/// Prints version information for the binary and the engine crate.
fn print_version() {
    println!(
        "aurum-node {} (engine {})",
        env!("CARGO_PKG_VERSION"),
        aurum_protocol::config::ENGINE_VERSION
    );
}
