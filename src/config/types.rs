//! Configuration types for antenna runs.
//!
//! Plain data loaded from YAML. Conversion into model selectors and
//! artifacts happens where the values are used.

use crate::error::{ErrorContext, Result};
use crate::model::{
    ArtifactSelector, ChangeStatus, ClearingState, CoordinateSelector, MergePolicy,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Top-level configuration
// ============================================================================

/// Top-level configuration of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AntennaConfig {
    /// How incoming facts are reconciled with known ones
    pub merge: MergeConfig,
    /// CSV reading and writing
    pub csv: CsvConfig,
    /// Policy rules evaluated by `antenna check`
    pub policy: PolicyConfig,
    /// Facts forced onto matching artifacts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<OverrideRule>,
    /// Artifacts appended to every run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additions: Vec<ArtifactTemplate>,
    /// Artifacts dropped from every run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removals: Vec<SelectorConfig>,
    /// Artifacts whose sources are never downloaded
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_for_download: Vec<SelectorConfig>,
}

impl AntennaConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AntennaConfigBuilder {
        AntennaConfigBuilder::default()
    }
}

/// Fluent construction of an [`AntennaConfig`].
#[derive(Debug, Default)]
#[must_use]
pub struct AntennaConfigBuilder {
    config: AntennaConfig,
}

impl AntennaConfigBuilder {
    pub const fn merge_policy(mut self, policy: MergePolicy) -> Self {
        self.config.merge.policy = policy;
        self
    }

    pub const fn strict_types(mut self, strict: bool) -> Self {
        self.config.merge.strict_types = strict;
        self
    }

    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.config.csv.delimiter = delimiter;
        self
    }

    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.config.csv.base_dir = Some(base_dir.into());
        self
    }

    pub const fn minimum_clearing_state(mut self, state: ClearingState) -> Self {
        self.config.policy.minimum_clearing_state = Some(state);
        self
    }

    pub fn forbid_license(mut self, license_id: impl Into<String>) -> Self {
        self.config.policy.forbidden_licenses.push(license_id.into());
        self
    }

    pub const fn require_source_url(mut self, required: bool) -> Self {
        self.config.policy.require_source_url = required;
        self
    }

    pub fn override_rule(mut self, rule: OverrideRule) -> Self {
        self.config.overrides.push(rule);
        self
    }

    pub fn addition(mut self, artifact: ArtifactTemplate) -> Self {
        self.config.additions.push(artifact);
        self
    }

    pub fn removal(mut self, selector: SelectorConfig) -> Self {
        self.config.removals.push(selector);
        self
    }

    pub fn ignore_for_download(mut self, selector: SelectorConfig) -> Self {
        self.config.ignore_for_download.push(selector);
        self
    }

    #[must_use]
    pub fn build(self) -> AntennaConfig {
        self.config
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Merge behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MergeConfig {
    /// Scalar fact reconciliation: overwrite, keep-existing or strict
    pub policy: MergePolicy,
    /// Reject unknown coordinate types instead of treating them as generic
    pub strict_types: bool,
}

/// CSV reading and writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CsvConfig {
    /// Field delimiter
    pub delimiter: char,
    /// Directory relative file paths are resolved against; defaults to the
    /// directory of the CSV file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: super::DEFAULT_CSV_DELIMITER,
            base_dir: None,
        }
    }
}

/// Policy rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PolicyConfig {
    /// Artifacts below this clearing state are reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_clearing_state: Option<ClearingState>,
    /// License ids that must not appear in an effective license
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forbidden_licenses: Vec<String>,
    /// Non-proprietary artifacts must name a source URL
    pub require_source_url: bool,
}

impl PolicyConfig {
    /// True when no rule is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.minimum_clearing_state.is_none()
            && self.forbidden_licenses.is_empty()
            && !self.require_source_url
    }
}

// ============================================================================
// Selectors and artifact templates
// ============================================================================

/// Artifact selector as written in configuration.
///
/// `coordinate` uses the coordinate syntax with `*` wildcards, for example
/// `maven:org.example/*` or `pkg:npm/lodash@4.*`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl SelectorConfig {
    pub fn coordinate(pattern: impl Into<String>) -> Self {
        Self {
            coordinate: Some(pattern.into()),
            filename: None,
        }
    }

    pub fn filename(filename: impl Into<String>) -> Self {
        Self {
            coordinate: None,
            filename: Some(filename.into()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coordinate.as_deref().map_or(true, |c| c.trim().is_empty())
            && self.filename.as_deref().map_or(true, |f| f.trim().is_empty())
    }

    /// Build the model selector.
    pub fn to_selector(&self) -> Result<ArtifactSelector> {
        let mut selector = ArtifactSelector::new();
        if let Some(pattern) = self.coordinate.as_deref().filter(|c| !c.trim().is_empty()) {
            let coordinate = CoordinateSelector::parse(pattern)
                .with_context(|| format!("selector '{pattern}'"))?;
            selector = selector.with_coordinate(coordinate);
        }
        if let Some(filename) = self.filename.as_deref().filter(|f| !f.trim().is_empty()) {
            selector = selector.with_filename(filename.trim());
        }
        Ok(selector)
    }
}

/// An artifact described in configuration.
///
/// License fields take license expressions such as `MIT OR Apache-2.0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ArtifactTemplate {
    /// Coordinates in `pkg:` or `type:` form
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coordinates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overridden_license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configured_license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyrights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_tag_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_heritage_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearing_state: Option<ClearingState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_status: Option<ChangeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proprietary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_for_download: Option<bool>,
}

/// Facts forced onto every artifact matched by `selector`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OverrideRule {
    pub selector: SelectorConfig,
    pub set: ArtifactTemplate,
}
