//! `reconbase rules` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use reconbase_ingest::IgnoreRules;

use crate::cli::{RulesAction, RulesArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub async fn execute(args: RulesArgs, writer: &OutputWriter) -> Result<(), CliError> {
    match args.action {
        RulesAction::Check { path } => {
            info!(path = %path.display(), "checking ignore rules");

            let result = IgnoreRules::load(Some(&path)).await;
            let report = match &result {
                Ok(rules) => RulesCheckReport {
                    path: path.display().to_string(),
                    valid: true,
                    empty: rules.is_empty(),
                    error: None,
                },
                Err(e) => RulesCheckReport {
                    path: path.display().to_string(),
                    valid: false,
                    empty: false,
                    error: Some(e.to_string()),
                },
            };

            writer.render(&report)?;
            result.map(|_| ()).map_err(CliError::Core)
        }
    }
}

/// Result of validating an ignore-rules file.
#[derive(Debug, Serialize)]
struct RulesCheckReport {
    path: String,
    valid: bool,
    empty: bool,
    error: Option<String>,
}

impl Render for RulesCheckReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.valid {
            writeln!(w, "{} {}", "ok".green().bold(), self.path)?;
            if self.empty {
                writeln!(w, "  note: file contains no rules, nothing will be ignored")?;
            }
        } else if let Some(ref error) = self.error {
            writeln!(w, "{} {}", "invalid".red().bold(), self.path)?;
            writeln!(w, "  {error}")?;
        }
        Ok(())
    }
}
