//! CLI command handlers.
//!
//! Handlers are invoked by main.rs and return the process exit code, so
//! they can be tested without spawning the binary.

mod check;
mod merge;

pub use check::{run_check, CheckFormat};
pub use merge::run_merge;

use crate::config::AntennaConfig;
use crate::csv_mapper::CsvArtifactMapper;
use crate::model::Artifact;
use crate::pipeline::{apply_configuration, merge_sources};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Read every input CSV, reconcile them in order and apply the configured
/// removals, overrides, additions and flags.
pub fn load_artifacts(inputs: &[PathBuf], config: &AntennaConfig) -> Result<Vec<Artifact>> {
    let mapper = CsvArtifactMapper::from_config(config)?;
    let mut sources = Vec::with_capacity(inputs.len());
    for path in inputs {
        let artifacts = mapper
            .read_file(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        tracing::info!("Read {} artifacts from {}", artifacts.len(), path.display());
        sources.push(artifacts);
    }

    let (mut artifacts, _) = merge_sources(sources, config.merge.policy);
    apply_configuration(&mut artifacts, config).context("Failed to apply configuration")?;
    Ok(artifacts)
}
