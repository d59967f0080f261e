//! Configuration for antenna runs.
//!
//! - Typed configuration structures with YAML (de)serialization
//! - Validation of selectors, expressions and identifiers
//! - Named presets
//! - Config file discovery
//!
//! # Configuration File
//!
//! Place a `.antenna.yaml` file in your project root or `~/.config/antenna/`:
//!
//! ```yaml
//! merge:
//!   policy: strict
//! policy:
//!   minimum_clearing_state: PROJECT_APPROVED
//! removals:
//!   - filename: internal-tool.jar
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    ConfigPreset, CONFIGURATION_SOURCE, CSV_ANALYSIS_SOURCE, DEFAULT_CSV_DELIMITER,
};
pub use types::{
    AntennaConfig, AntennaConfigBuilder, ArtifactTemplate, CsvConfig, MergeConfig, OverrideRule,
    PolicyConfig, SelectorConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `AntennaConfig` configuration format.
///
/// Editors can use it to validate and complete `.antenna.yaml` files.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AntennaConfig);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
