//! Reconbase CLI entry point.
//!
//! Loads the configuration, initializes logging, then dispatches to the
//! subcommand handlers. Errors are printed to stderr and mapped to process
//! exit codes via [`CliError::exit_code`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod signal;

use clap::Parser;
use tracing::debug;

use reconbase_core::config::ReconbaseConfig;
use reconbase_core::error::{ConfigError, ReconbaseError};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = load_config(&cli).await?;
    if let Some(ref level) = cli.log_level {
        config.general.log_level = level.clone();
    }
    config.validate()?;
    logging::init_tracing(&config.general)?;
    reconbase_core::metrics::describe_all();

    debug!(config = %cli.config.display(), "reconbase starting");

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Import(args) => commands::import::execute(args, &config, &writer).await,
        Commands::Rules(args) => commands::rules::execute(args, &writer).await,
    }
}

/// Load `reconbase.toml`, falling back to defaults when the default path
/// does not exist. An explicitly given `--config` path must exist.
async fn load_config(cli: &Cli) -> Result<ReconbaseConfig, CliError> {
    match ReconbaseConfig::load(&cli.config).await {
        Ok(config) => Ok(config),
        Err(ReconbaseError::Config(ConfigError::FileNotFound { .. }))
            if cli.config.as_os_str() == "reconbase.toml" =>
        {
            let mut config = ReconbaseConfig::default();
            config.apply_env_overrides();
            Ok(config)
        }
        Err(e) => Err(CliError::Core(e)),
    }
}
