//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Reconbase -- passive network observation ingestion.
///
/// Use `reconbase <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "reconbase", version, about, long_about = None)]
pub struct Cli {
    /// Path to the reconbase.toml configuration file.
    #[arg(short, long, default_value = "reconbase.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import passive sensor log files into the store.
    Import(ImportArgs),

    /// Manage ignore-rule files.
    Rules(RulesArgs),
}

// ---- import ----

/// Import one or more Zeek passiverecon log files.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Log files to import.
    #[arg(required = true)]
    pub logfiles: Vec<PathBuf>,

    /// Sensor name attached to every imported record.
    #[arg(short, long)]
    pub sensor: Option<String>,

    /// Path to an ignore-rules TOML file.
    #[arg(short, long)]
    pub ignore_rules: Option<PathBuf>,

    /// Commit in batches (default).
    #[arg(long, conflicts_with = "no_bulk")]
    pub bulk: bool,

    /// Commit record by record instead of in batches.
    #[arg(long)]
    pub no_bulk: bool,

    /// Batch size for bulk commits.
    #[arg(long)]
    pub batch_size: Option<usize>,
}

// ---- rules ----

/// Manage ignore-rule files.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// Validate an ignore-rules file without importing anything.
    Check {
        /// Path to the ignore-rules TOML file.
        path: PathBuf,
    },
}
