//! Reconciliation and evaluation pipeline.
//!
//! CSV and configuration inputs flow through these stages:
//!
//! 1. [`reconcile`]: fold records into artifacts by shared coordinates
//! 2. [`configuration`]: apply removals, overrides, additions and flags
//! 3. [`policy`]: evaluate rules in parallel into a [`report::EvaluationReport`]

pub mod configuration;
mod output;
pub mod policy;
pub mod reconcile;
pub mod report;

pub use configuration::{
    apply_configuration, handlers_from_config, AddHandler, ArtifactPatch, ConfigurationHandler,
    IgnoreForDownloadHandler, OverrideHandler, RemoveHandler,
};
pub use output::{write_output, OutputTarget};
pub use policy::{
    ForbiddenLicenseRule, MinimumClearingStateRule, PolicyEvaluator, PolicyRule, PolicyViolation,
    Severity, SourceUrlRequiredRule,
};
pub use reconcile::{
    merge_sources, reconcile_all, reconcile_into, ReconcileOutcome, ReconcileSummary,
};
pub use report::{ArtifactResult, EvaluationReport};

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success, or only non-error findings
    pub const SUCCESS: i32 = 0;
    /// At least one policy rule reported an error
    pub const POLICY_FAILURES: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::POLICY_FAILURES, 1);
        assert_eq!(exit_codes::ERROR, 3);
    }
}
