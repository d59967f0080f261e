//! Check command handler.
//!
//! Implements the `check` subcommand: evaluate the configured policy rules
//! over the reconciled artifacts.

use super::load_artifacts;
use crate::config::AntennaConfig;
use crate::pipeline::{write_output, OutputTarget, PolicyEvaluator};
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// Report format of the check command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CheckFormat {
    /// One line per violation
    #[default]
    Summary,
    /// Machine-readable report
    Json,
}

/// Run the check command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
pub fn run_check(
    inputs: &[PathBuf],
    format: CheckFormat,
    output_file: Option<PathBuf>,
    config: &AntennaConfig,
    quiet: bool,
) -> Result<i32> {
    let artifacts = load_artifacts(inputs, config)?;

    let evaluator = PolicyEvaluator::from_config(&config.policy);
    if evaluator.rule_count() == 0 {
        tracing::warn!("No policy rules configured; every artifact passes");
    }
    let report = evaluator.evaluate(&artifacts);

    let content = match format {
        CheckFormat::Summary => report.to_summary(),
        CheckFormat::Json => report.to_json().context("Failed to serialize report")?,
    };
    write_output(&content, &OutputTarget::from_option(output_file), quiet)?;

    Ok(report.exit_code())
}
