//! Policy evaluation reports.

use super::exit_codes;
use super::policy::{PolicyViolation, Severity};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Violations found on one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactResult {
    /// Position of the artifact in the evaluated list
    pub index: usize,
    /// Main coordinate in Package URL form, when the artifact has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<String>,
    pub violations: Vec<PolicyViolation>,
}

/// Outcome of a policy evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub generated_at: DateTime<Utc>,
    pub artifact_count: usize,
    /// Rule id to description, in evaluation order
    pub rules: IndexMap<String, String>,
    pub results: Vec<ArtifactResult>,
}

impl EvaluationReport {
    #[must_use]
    pub fn new(
        artifact_count: usize,
        rules: IndexMap<String, String>,
        results: Vec<ArtifactResult>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            artifact_count,
            rules,
            results,
        }
    }

    fn violations(&self) -> impl Iterator<Item = &PolicyViolation> {
        self.results.iter().flat_map(|result| result.violations.iter())
    }

    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violations().count()
    }

    /// Number of violations with the given severity.
    #[must_use]
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.violations().filter(|v| v.severity == severity).count()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations().any(|v| v.severity == Severity::Error)
    }

    /// Process exit code for CI use: policy failures only on errors.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.has_errors() {
            exit_codes::POLICY_FAILURES
        } else {
            exit_codes::SUCCESS
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text summary, one line per violation.
    #[must_use]
    pub fn to_summary(&self) -> String {
        let mut out = format!(
            "Checked {} artifacts against {} rules: {} errors, {} warnings\n",
            self.artifact_count,
            self.rules.len(),
            self.count_by_severity(Severity::Error),
            self.count_by_severity(Severity::Warning),
        );
        for result in &self.results {
            for violation in &result.violations {
                out.push_str(&format!(
                    "  [{}] {}: {}\n",
                    violation.severity, violation.rule_id, violation.message
                ));
            }
        }
        out
    }
}
