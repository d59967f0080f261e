//! Pipeline and CLI integration tests.
//!
//! Exercises CSV sources flowing through reconciliation, configuration
//! handlers and policy evaluation.

use antenna::cli::{load_artifacts, run_check, CheckFormat};
use antenna::config::{
    load_config_file, AntennaConfig, ArtifactTemplate, ConfigPreset, OverrideRule,
    SelectorConfig, Validatable,
};
use antenna::model::{
    ArtifactClearingState, ArtifactFlag, ArtifactSourceUrl, ClearingState, Coordinate,
    DeclaredLicenseInformation, LicenseInformation, MergePolicy,
};
use antenna::pipeline::{exit_codes, PolicyEvaluator, Severity};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str =
    "Artifact Id,Group Id,Version,Coordinate Type,Declared License,Source URL,Clearing State";

fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    path
}

fn two_sources(dir: &Path) -> Vec<PathBuf> {
    vec![
        write_csv(
            dir,
            "scan.csv",
            &[
                "commons-io,commons-io,2.11.0,maven,Apache-2.0,\
                 https://scan.example/commons-io,WORK_IN_PROGRESS",
                "lodash,,4.17.21,npm,MIT,,INITIAL",
            ],
        ),
        write_csv(
            dir,
            "curated.csv",
            &[
                "commons-io,commons-io,2.11.0,mvn,,\
                 https://curated.example/commons-io,PROJECT_APPROVED",
                "internal-tool,com.example,1.0,maven,,,",
            ],
        ),
    ]
}

// ============================================================================
// Reconciliation
// ============================================================================

mod reconciliation {
    use super::*;

    #[test]
    fn later_source_overwrites_by_default() {
        let tmp = TempDir::new().unwrap();
        let artifacts =
            load_artifacts(&two_sources(tmp.path()), &AntennaConfig::default()).unwrap();

        assert_eq!(artifacts.len(), 3);
        let commons = &artifacts[0];
        assert_eq!(
            commons.main_coordinate(),
            Some(&Coordinate::of("maven", "commons-io", "commons-io", "2.11.0"))
        );
        assert_eq!(
            commons.ask_for_get::<ArtifactSourceUrl>(),
            Some("https://curated.example/commons-io")
        );
        assert_eq!(
            commons.ask_for_get::<ArtifactClearingState>(),
            Some(&ClearingState::ProjectApproved)
        );
        // empty cells never erase facts
        assert_eq!(
            commons
                .ask_for_get::<DeclaredLicenseInformation>()
                .map(LicenseInformation::evaluate)
                .as_deref(),
            Some("Apache-2.0")
        );
    }

    #[test]
    fn fill_gaps_keeps_first_source() {
        let tmp = TempDir::new().unwrap();
        let config = AntennaConfig::from_preset(ConfigPreset::FillGaps);
        assert_eq!(config.merge.policy, MergePolicy::KeepExisting);

        let artifacts = load_artifacts(&two_sources(tmp.path()), &config).unwrap();
        assert_eq!(
            artifacts[0].ask_for_get::<ArtifactSourceUrl>(),
            Some("https://scan.example/commons-io")
        );
        // clearing state still only moves forward
        assert_eq!(
            artifacts[0].ask_for_get::<ArtifactClearingState>(),
            Some(&ClearingState::ProjectApproved)
        );
    }
}

// ============================================================================
// Configuration
// ============================================================================

mod configuration {
    use super::*;

    #[test]
    fn yaml_config_drives_handlers() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".antenna.yaml");
        std::fs::write(
            &config_path,
            r#"
removals:
  - coordinate: "maven:com.example/*"
overrides:
  - selector:
      coordinate: "npm:lodash@*"
    set:
      declared_license: "MIT OR Apache-2.0"
      clearing_state: OSM_APPROVED
additions:
  - coordinates: ["pkg:maven/org.example/extra@1.0"]
    source_url: "https://example.org/extra"
ignore_for_download:
  - coordinate: "npm:*"
"#,
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert!(config.validate().is_empty());

        let artifacts = load_artifacts(&two_sources(tmp.path()), &config).unwrap();
        let names: Vec<&str> = artifacts
            .iter()
            .filter_map(|a| a.main_coordinate())
            .map(Coordinate::name)
            .collect();
        assert_eq!(names, vec!["commons-io", "lodash", "extra"]);

        let lodash = &artifacts[1];
        assert_eq!(
            lodash
                .ask_for_get::<DeclaredLicenseInformation>()
                .map(LicenseInformation::evaluate)
                .as_deref(),
            Some("( MIT OR Apache-2.0 )")
        );
        assert_eq!(
            lodash.ask_for_get::<ArtifactClearingState>(),
            Some(&ClearingState::OsmApproved)
        );
        assert!(lodash.flag(ArtifactFlag::IgnoreForDownload));
        assert!(!artifacts[0].flag(ArtifactFlag::IgnoreForDownload));
    }

    #[test]
    fn invalid_override_is_reported_by_validation() {
        let config = AntennaConfig::builder()
            .override_rule(OverrideRule {
                selector: SelectorConfig::coordinate("maven:*"),
                set: ArtifactTemplate {
                    software_heritage_id: Some("swh:oops".to_string()),
                    ..ArtifactTemplate::default()
                },
            })
            .build();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("software_heritage_id"), "{}", errors[0]);

        let tmp = TempDir::new().unwrap();
        assert!(load_artifacts(&two_sources(tmp.path()), &config).is_err());
    }
}

// ============================================================================
// Policy evaluation
// ============================================================================

mod policy {
    use super::*;

    #[test]
    fn strict_preset_flags_unapproved_and_unsourced() {
        let tmp = TempDir::new().unwrap();
        let config = AntennaConfig::from_preset(ConfigPreset::Strict);
        let inputs = vec![two_sources(tmp.path()).remove(0)];

        let artifacts = load_artifacts(&inputs, &config).unwrap();
        let report = PolicyEvaluator::from_config(&config.policy).evaluate(&artifacts);

        assert_eq!(report.artifact_count, 2);
        assert!(report.has_errors());
        assert_eq!(report.count_by_severity(Severity::Error), 2);
        assert_eq!(report.count_by_severity(Severity::Warning), 1);
        assert_eq!(report.exit_code(), exit_codes::POLICY_FAILURES);
    }

    #[test]
    fn forbidden_license_via_check_command() {
        let tmp = TempDir::new().unwrap();
        let config = AntennaConfig::builder().forbid_license("MIT").build();
        let out = tmp.path().join("report.json");

        let code = run_check(
            &two_sources(tmp.path()),
            CheckFormat::Json,
            Some(out.clone()),
            &config,
            true,
        )
        .unwrap();
        assert_eq!(code, exit_codes::POLICY_FAILURES);

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(report["results"][0]["index"], 1);
        assert_eq!(report["results"][0]["coordinate"], "pkg:npm/lodash@4.17.21");
        assert_eq!(
            report["results"][0]["violations"][0]["rule_id"],
            "forbidden-license"
        );
    }
}
