//! Merge command handler.
//!
//! Implements the `merge` subcommand: reconcile CSV inputs and write the
//! result as one CSV.

use super::load_artifacts;
use crate::config::AntennaConfig;
use crate::csv_mapper::CsvArtifactMapper;
use crate::pipeline::{exit_codes, write_output, OutputTarget};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Run the merge command, returning the desired exit code.
pub fn run_merge(
    inputs: &[PathBuf],
    output_file: Option<PathBuf>,
    config: &AntennaConfig,
    quiet: bool,
) -> Result<i32> {
    let artifacts = load_artifacts(inputs, config)?;

    let mapper = CsvArtifactMapper::from_config(config)?;
    let mut buffer = Vec::new();
    mapper
        .write_to(&mut buffer, &artifacts)
        .context("Failed to render merged CSV")?;
    let content = String::from_utf8(buffer).context("Merged CSV is not valid UTF-8")?;

    write_output(&content, &OutputTarget::from_option(output_file), quiet)?;
    if !quiet {
        tracing::info!("Merged {} inputs into {} artifacts", inputs.len(), artifacts.len());
    }
    Ok(exit_codes::SUCCESS)
}
