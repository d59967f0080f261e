//! Configuration validation.

use super::types::{
    AntennaConfig, ArtifactTemplate, CsvConfig, OverrideRule, PolicyConfig, SelectorConfig,
};
use crate::model::{parse_license_expression, ArtifactSoftwareHeritageId, Coordinate};

// ============================================================================
// Configuration Error
// ============================================================================

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AntennaConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.csv.validate());
        errors.extend(self.policy.validate());

        for (i, rule) in self.overrides.iter().enumerate() {
            errors.extend(prefixed(&format!("overrides[{i}]"), rule.validate()));
        }
        for (i, artifact) in self.additions.iter().enumerate() {
            let mut found = prefixed(&format!("additions[{i}]"), artifact.validate());
            if artifact.coordinates.is_empty() && artifact.filename.is_none() {
                found.push(ConfigError::new(
                    format!("additions[{i}]"),
                    "An added artifact needs a coordinate or a file name",
                ));
            }
            errors.extend(found);
        }
        for (i, selector) in self.removals.iter().enumerate() {
            errors.extend(prefixed(&format!("removals[{i}]"), selector.validate()));
        }
        for (i, selector) in self.ignore_for_download.iter().enumerate() {
            errors.extend(prefixed(
                &format!("ignore_for_download[{i}]"),
                selector.validate(),
            ));
        }

        errors
    }
}

fn prefixed(prefix: &str, errors: Vec<ConfigError>) -> Vec<ConfigError> {
    errors
        .into_iter()
        .map(|e| ConfigError {
            field: format!("{prefix}.{}", e.field),
            message: e.message,
        })
        .collect()
}

impl Validatable for CsvConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            errors.push(ConfigError::new(
                "csv.delimiter",
                format!(
                    "Delimiter must be a single ASCII character other than a quote \
                     or newline, got {:?}",
                    self.delimiter
                ),
            ));
        }
        if let Some(ref base_dir) = self.base_dir {
            if !base_dir.is_dir() {
                errors.push(ConfigError::new(
                    "csv.base_dir",
                    format!("Directory does not exist: {}", base_dir.display()),
                ));
            }
        }
        errors
    }
}

impl Validatable for PolicyConfig {
    fn validate(&self) -> Vec<ConfigError> {
        self.forbidden_licenses
            .iter()
            .enumerate()
            .filter(|(_, id)| id.trim().is_empty())
            .map(|(i, _)| {
                ConfigError::new(
                    format!("policy.forbidden_licenses[{i}]"),
                    "License id must not be empty",
                )
            })
            .collect()
    }
}

impl Validatable for SelectorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        if self.is_empty() {
            return vec![ConfigError::new(
                "selector",
                "A selector needs a coordinate pattern or a file name",
            )];
        }
        match self.to_selector() {
            Ok(_) => Vec::new(),
            Err(e) => vec![ConfigError::new("selector.coordinate", e.to_string())],
        }
    }
}

impl Validatable for OverrideRule {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = self.selector.validate();
        errors.extend(prefixed("set", self.set.validate()));
        errors
    }
}

impl Validatable for ArtifactTemplate {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for (i, coordinate) in self.coordinates.iter().enumerate() {
            if let Err(e) = Coordinate::parse(coordinate) {
                errors.push(ConfigError::new(format!("coordinates[{i}]"), e.to_string()));
            }
        }

        let licenses = [
            ("declared_license", &self.declared_license),
            ("observed_license", &self.observed_license),
            ("overridden_license", &self.overridden_license),
            ("configured_license", &self.configured_license),
        ];
        for (field, expression) in licenses {
            if let Some(expression) = expression {
                if let Err(e) = parse_license_expression(expression) {
                    errors.push(ConfigError::new(field, e.to_string()));
                }
            }
        }

        if let Some(ref id) = self.software_heritage_id {
            if let Err(e) = ArtifactSoftwareHeritageId::new(id) {
                errors.push(ConfigError::new("software_heritage_id", e.to_string()));
            }
        }

        if let Some(ref cpe) = self.cpe {
            if crate::model::ArtifactCpe::parse(cpe).is_none() {
                errors.push(ConfigError::new(
                    "cpe",
                    format!("'{cpe}' does not start with 'cpe:2.3:' or 'cpe:/'"),
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AntennaConfig::default().is_valid());
    }

    #[test]
    fn test_delimiter_validation() {
        let valid = CsvConfig {
            delimiter: ';',
            base_dir: None,
        };
        assert!(valid.is_valid());

        let invalid = CsvConfig {
            delimiter: '"',
            base_dir: None,
        };
        assert!(!invalid.is_valid());

        let non_ascii = CsvConfig {
            delimiter: '§',
            base_dir: None,
        };
        assert!(!non_ascii.is_valid());
    }

    #[test]
    fn test_empty_selector_is_invalid() {
        assert!(!SelectorConfig::default().is_valid());
        assert!(SelectorConfig::filename("foo.jar").is_valid());
        assert!(SelectorConfig::coordinate("maven:org.foo/*").is_valid());
        assert!(!SelectorConfig::coordinate("nonsense").is_valid());
    }

    #[test]
    fn test_override_rule_field_paths() {
        let config = AntennaConfig::builder()
            .override_rule(OverrideRule {
                selector: SelectorConfig::filename("foo.jar"),
                set: ArtifactTemplate {
                    software_heritage_id: Some("swh:bogus".to_string()),
                    ..ArtifactTemplate::default()
                },
            })
            .build();

        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "overrides[0].set.software_heritage_id");
    }

    #[test]
    fn test_addition_needs_identity() {
        let config = AntennaConfig::builder()
            .addition(ArtifactTemplate {
                source_url: Some("https://example.org".to_string()),
                ..ArtifactTemplate::default()
            })
            .build();
        assert!(!config.is_valid());
    }

    #[test]
    fn test_license_expressions_are_checked() {
        let template = ArtifactTemplate {
            declared_license: Some("( MIT AND".to_string()),
            ..ArtifactTemplate::default()
        };
        let errors = template.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "declared_license");
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::new("csv.delimiter", "bad");
        assert_eq!(error.to_string(), "csv.delimiter: bad");
    }
}
