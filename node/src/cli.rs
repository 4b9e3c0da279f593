//! # CLI Interface
//!
//! Defines the command-line argument structure for `aurum-node` using
//! `clap` derive. Supports two subcommands: `simulate` and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AURUM vault simulation node.
///
/// Hosts the vault engine against in-memory ledgers and oracles, drives a
/// configured end-to-end scenario through it — bless, praise, vest, reprove,
/// withdraw — and prints a JSON report of everything that moved.
#[derive(Parser, Debug)]
#[command(
    name = "aurum-node",
    about = "AURUM vault simulation node",
    version,
    propagate_version = true
)]
pub struct AurumNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the AURUM node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a vault scenario and print its report.
    Simulate(SimulateArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `simulate` subcommand.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Path to a scenario configuration file (JSON).
    ///
    /// When omitted, a built-in two-reserve scenario is used.
    #[arg(long, short = 'c', env = "AURUM_SCENARIO")]
    pub config: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set.
    #[arg(long, env = "AURUM_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "AURUM_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Emit the scenario report as compact JSON instead of pretty-printing.
    #[arg(long)]
    pub compact_report: bool,
}
