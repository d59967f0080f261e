//! Default values and named presets.

use super::types::{AntennaConfig, MergeConfig, PolicyConfig};
use crate::model::{ClearingState, MergePolicy};

/// Default CSV field delimiter.
pub const DEFAULT_CSV_DELIMITER: char = ',';

/// Source label of artifacts read from CSV.
pub const CSV_ANALYSIS_SOURCE: &str = "CSV";

/// Source label of artifacts added by configuration.
pub const CONFIGURATION_SOURCE: &str = "Configuration";

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Overwrite merges, lenient coordinate types, no policy rules
    Default,
    /// Conflicts are reported, unknown types rejected, approval required
    Strict,
    /// First source wins; later sources only fill gaps
    FillGaps,
}

impl ConfigPreset {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Strict => "strict",
            Self::FillGaps => "fill-gaps",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "overwrite" => Some(Self::Default),
            "strict" => Some(Self::Strict),
            "fill-gaps" | "keep-existing" => Some(Self::FillGaps),
            _ => None,
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Later sources overwrite earlier ones",
            Self::Strict => "Report conflicting facts and require project approval",
            Self::FillGaps => "Keep the first value seen for every fact",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Strict, Self::FillGaps]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl AntennaConfig {
    /// Configuration for a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::Strict => Self {
                merge: MergeConfig {
                    policy: MergePolicy::Strict,
                    strict_types: true,
                },
                policy: PolicyConfig {
                    minimum_clearing_state: Some(ClearingState::ProjectApproved),
                    forbidden_licenses: Vec::new(),
                    require_source_url: true,
                },
                ..Self::default()
            },
            ConfigPreset::FillGaps => Self {
                merge: MergeConfig {
                    policy: MergePolicy::KeepExisting,
                    strict_types: false,
                },
                ..Self::default()
            },
        }
    }
}
