//! Configuration file loading and discovery.

use super::types::AntennaConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".antenna.yaml",
    ".antenna.yml",
    "antenna.yaml",
    "antenna.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. User config directory (~/.config/antenna/)
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if let Some(path) = find_config_in_dir(&cwd) {
            return Some(path);
        }
    }

    dirs::config_dir().and_then(|config_dir| find_config_in_dir(&config_dir.join("antenna")))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load an `AntennaConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AntennaConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AntennaConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AntennaConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AntennaConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AntennaConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_example_config() -> String {
    r"# Antenna Configuration File
#
# Place it at .antenna.yaml in your project root or at
# ~/.config/antenna/antenna.yaml for a global config.

merge:
  # overwrite, keep-existing or strict
  policy: overwrite
  # Reject unknown coordinate types instead of treating them as generic
  strict_types: false

csv:
  delimiter: ','
  # base_dir: ./artifacts

policy:
  # minimum_clearing_state: PROJECT_APPROVED
  forbidden_licenses: []
  require_source_url: false

# overrides:
#   - selector:
#       coordinate: 'maven:org.example/*'
#     set:
#       overridden_license: 'EPL-2.0'
#
# additions:
#   - coordinates: ['pkg:maven/org.example/extra@1.0']
#     declared_license: 'MIT'
#
# removals:
#   - filename: 'internal-tool.jar'
#
# ignore_for_download:
#   - coordinate: 'npm:*'
"
    .to_string()
}
