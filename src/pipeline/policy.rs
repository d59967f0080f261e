//! Policy evaluation over reconciled artifacts.
//!
//! Rules only read artifacts, so evaluation fans out over artifacts with
//! rayon and collects violations afterwards.

use super::report::{ArtifactResult, EvaluationReport};
use crate::config::PolicyConfig;
use crate::model::{
    Artifact, ArtifactClearingState, ArtifactSourceUrl, ClearingState, License,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Severity of a policy violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational finding
    Info,
    /// Should be fixed
    Warning,
    /// Fails the check
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A rule finding on one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyViolation {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
}

impl PolicyViolation {
    pub fn new(rule_id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
        }
    }
}

/// A check applied to each artifact independently.
pub trait PolicyRule: Send + Sync {
    /// Stable identifier used in reports.
    fn id(&self) -> &'static str;

    /// One-line description of what the rule enforces.
    fn description(&self) -> String;

    fn evaluate(&self, artifact: &Artifact) -> Option<PolicyViolation>;
}

// ============================================================================
// Built-in rules
// ============================================================================

/// Artifacts must reach a clearing state.
#[derive(Debug, Clone, Copy)]
pub struct MinimumClearingStateRule {
    minimum: ClearingState,
}

impl MinimumClearingStateRule {
    #[must_use]
    pub const fn new(minimum: ClearingState) -> Self {
        Self { minimum }
    }
}

impl PolicyRule for MinimumClearingStateRule {
    fn id(&self) -> &'static str {
        "minimum-clearing-state"
    }

    fn description(&self) -> String {
        format!("Clearing state must be at least {}", self.minimum)
    }

    fn evaluate(&self, artifact: &Artifact) -> Option<PolicyViolation> {
        match artifact.ask_for_get::<ArtifactClearingState>() {
            Some(state) if state.has_higher_or_equal_clearing_state_than(self.minimum) => None,
            Some(state) => Some(PolicyViolation::new(
                self.id(),
                Severity::Error,
                format!("{artifact} is {state}, below {}", self.minimum),
            )),
            None => Some(PolicyViolation::new(
                self.id(),
                Severity::Error,
                format!("{artifact} has no clearing state"),
            )),
        }
    }
}

/// Effective licenses must not contain listed license ids.
#[derive(Debug, Clone)]
pub struct ForbiddenLicenseRule {
    forbidden: BTreeSet<String>,
}

impl ForbiddenLicenseRule {
    pub fn new<I, S>(license_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            forbidden: license_ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl PolicyRule for ForbiddenLicenseRule {
    fn id(&self) -> &'static str {
        "forbidden-license"
    }

    fn description(&self) -> String {
        let ids: Vec<&str> = self.forbidden.iter().map(String::as_str).collect();
        format!("Effective license must not include {}", ids.join(", "))
    }

    fn evaluate(&self, artifact: &Artifact) -> Option<PolicyViolation> {
        let effective = artifact.effective_license()?;
        let hits: Vec<&str> = effective
            .licenses()
            .into_iter()
            .map(License::id)
            .filter(|id| self.forbidden.contains(*id))
            .collect();
        if hits.is_empty() {
            return None;
        }
        Some(PolicyViolation::new(
            self.id(),
            Severity::Error,
            format!(
                "{artifact} is licensed under {} which includes {}",
                effective.evaluate(),
                hits.join(", ")
            ),
        ))
    }
}

/// Non-proprietary artifacts must name where their sources live.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceUrlRequiredRule;

impl PolicyRule for SourceUrlRequiredRule {
    fn id(&self) -> &'static str {
        "source-url-required"
    }

    fn description(&self) -> String {
        "Non-proprietary artifacts must have a source URL".to_string()
    }

    fn evaluate(&self, artifact: &Artifact) -> Option<PolicyViolation> {
        if artifact.is_proprietary() || artifact.ask_for::<ArtifactSourceUrl>().is_some() {
            return None;
        }
        Some(PolicyViolation::new(
            self.id(),
            Severity::Warning,
            format!("{artifact} has no source URL"),
        ))
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// Runs a set of rules over an artifact list.
#[derive(Default)]
pub struct PolicyEvaluator {
    rules: Vec<Box<dyn PolicyRule>>,
}

impl PolicyEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluator with the rules enabled in `config`.
    #[must_use]
    pub fn from_config(config: &PolicyConfig) -> Self {
        let mut evaluator = Self::new();
        if let Some(minimum) = config.minimum_clearing_state {
            evaluator = evaluator.with_rule(MinimumClearingStateRule::new(minimum));
        }
        if !config.forbidden_licenses.is_empty() {
            evaluator = evaluator.with_rule(ForbiddenLicenseRule::new(
                config.forbidden_licenses.iter().map(|id| id.trim().to_string()),
            ));
        }
        if config.require_source_url {
            evaluator = evaluator.with_rule(SourceUrlRequiredRule);
        }
        evaluator
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl PolicyRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate every rule against every artifact.
    ///
    /// Results keep artifact order; artifacts without violations are omitted.
    #[must_use]
    pub fn evaluate(&self, artifacts: &[Artifact]) -> EvaluationReport {
        let results: Vec<ArtifactResult> = artifacts
            .par_iter()
            .enumerate()
            .filter_map(|(index, artifact)| {
                let violations: Vec<PolicyViolation> = self
                    .rules
                    .iter()
                    .filter_map(|rule| rule.evaluate(artifact))
                    .collect();
                if violations.is_empty() {
                    None
                } else {
                    Some(ArtifactResult {
                        index,
                        coordinate: artifact.main_coordinate().map(ToString::to_string),
                        violations,
                    })
                }
            })
            .collect();

        let rules = self
            .rules
            .iter()
            .map(|rule| (rule.id().to_string(), rule.description()))
            .collect();
        let report = EvaluationReport::new(artifacts.len(), rules, results);
        tracing::info!(
            "Evaluated {} rules over {} artifacts: {} violations",
            self.rules.len(),
            artifacts.len(),
            report.violation_count()
        );
        report
    }
}
