//! **Artifact metadata model and reconciliation engine for license compliance.**
//!
//! `antenna` describes third-party artifacts as a set of package
//! [`Coordinate`]s plus typed facts: licenses, source locations, clearing
//! state, file hashes and more. Facts for the same artifact arrive from many
//! analyzers; the library folds them into one record per artifact following
//! per-fact merge rules.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: [`Artifact`], the fact taxonomy, the license algebra
//!   ([`LicenseInformation`]) and selectors used to find artifacts.
//! - **[`csv_mapper`]**: the [`CsvArtifactMapper`] that imports and exports
//!   artifact lists as CSV.
//! - **[`pipeline`]**: reconciliation of several sources, configuration
//!   handlers and policy evaluation.
//! - **[`config`]**: YAML configuration, presets and validation.
//!
//! ## Getting Started: Merging Two Exports
//!
//! ```no_run
//! use std::path::Path;
//! use antenna::{merge_sources, CsvArtifactMapper, MergePolicy};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mapper = CsvArtifactMapper::new();
//!     let scan = mapper.read_file(Path::new("scan.csv"))?;
//!     let curated = mapper.read_file(Path::new("curated.csv"))?;
//!
//!     let (merged, summary) = merge_sources([scan, curated], MergePolicy::Overwrite);
//!     println!("{} artifacts, {} records merged", merged.len(), summary.merged);
//!
//!     mapper.write_file(Path::new("merged.csv"), &merged)?;
//!     Ok(())
//! }
//! ```
//!
//! ### Building Artifacts Directly
//!
//! ```
//! use antenna::model::{
//!     Artifact, ArtifactClearingState, ArtifactSourceUrl, ClearingState, Coordinate,
//! };
//!
//! let mut artifact = Artifact::new("example");
//! artifact
//!     .add_coordinate(Coordinate::of("maven", "org.example", "lib", "1.0"))
//!     .add_fact(ArtifactSourceUrl::new("https://example.org/lib-1.0-sources.jar"))
//!     .add_fact(ArtifactClearingState::new(ClearingState::WorkInProgress));
//!
//! // Clearing state only moves forward
//! artifact.add_fact(ArtifactClearingState::new(ClearingState::Initial));
//! assert_eq!(
//!     artifact.ask_for_get::<ArtifactClearingState>(),
//!     Some(&ClearingState::WorkInProgress)
//! );
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! The `antenna` binary wraps the library with `merge`, `check` and
//! `schema` subcommands.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod cli;
pub mod config;
pub mod csv_mapper;
pub mod error;
pub mod model;
pub mod pipeline;

// Re-export main types for convenience
pub use config::{AntennaConfig, AntennaConfigBuilder, ConfigPreset};
pub use config::{ConfigError, Validatable};
pub use csv_mapper::CsvArtifactMapper;
pub use error::{AntennaError, ErrorContext, OptionContext, Result};
pub use model::{
    parse_license_expression, Artifact, ArtifactFact, ArtifactSelector, Coordinate, Fact,
    FactKind, License, LicenseInformation, LicenseStatement, MergePolicy, PackageType,
};
pub use pipeline::{
    apply_configuration, merge_sources, reconcile_into, EvaluationReport, PolicyEvaluator,
};
