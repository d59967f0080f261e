//! Behavioral tests for the artifact model.
//!
//! Covers fact merging, the license algebra and coordinate identity as seen
//! through the public API.

use antenna::model::{
    Artifact, ArtifactClearingState, ArtifactCoordinates, ArtifactFilename, ArtifactFlag,
    ArtifactMatcher, ArtifactSelector, ArtifactSoftwareHeritageId, ArtifactSourceUrl,
    ClearingState, Coordinate, CoordinateSelector, DeclaredLicenseInformation, FactKind, License,
    LicenseInformation, LicenseOperator, LicenseStatement, MergePolicy, ObservedLicenseInformation,
    PackageType,
};
use antenna::AntennaError;

fn maven(name: &str) -> Coordinate {
    Coordinate::of("maven", "org.foo", name, "1.0")
}

// ============================================================================
// Coordinates
// ============================================================================

mod coordinates {
    use super::*;

    #[test]
    fn type_alias_matches_canonical_type() {
        let canonical = Coordinate::of("maven", "org.foo", "bar", "1.0");
        let alias = Coordinate::of("mvn", "org.foo", "bar", "1.0");
        assert!(canonical.matches(&alias));
        assert_eq!(alias.type_str(), "maven");
    }

    #[test]
    fn unknown_type_is_generic_but_keeps_raw_string() {
        let coordinate = Coordinate::of("conan", "", "zlib", "1.3");
        assert_eq!(coordinate.package_type(), PackageType::Generic);
        assert_eq!(coordinate.type_str(), "conan");

        let strict = Coordinate::of_strict("conan", "", "zlib", "1.3");
        assert!(matches!(strict, Err(AntennaError::Parse { .. })));
    }

    #[test]
    fn parses_purl_and_short_form() {
        let purl = Coordinate::parse("pkg:maven/org.foo/bar@1.0").unwrap();
        let short = Coordinate::parse("mvn:org.foo/bar@1.0").unwrap();
        assert_eq!(purl, short);
        assert_eq!(purl.to_purl(), "pkg:maven/org.foo/bar@1.0");
    }
}

// ============================================================================
// Facts on artifacts
// ============================================================================

mod facts {
    use super::*;

    #[test]
    fn declared_license_overwrite_drops_old_value() {
        let mut artifact = Artifact::new("test");
        artifact.add_fact(DeclaredLicenseInformation::new(License::new("EPL-2.0")));
        artifact.add_fact(DeclaredLicenseInformation::new(License::new("MIT")));

        let declared = artifact
            .ask_for_get::<DeclaredLicenseInformation>()
            .map(LicenseInformation::evaluate);
        assert_eq!(declared.as_deref(), Some("MIT"));
        assert_eq!(artifact.facts_of(FactKind::DeclaredLicense).count(), 1);
    }

    #[test]
    fn license_kinds_are_independent() {
        let mut artifact = Artifact::new("test");
        artifact
            .add_fact(DeclaredLicenseInformation::new(License::new("EPL-2.0")))
            .add_fact(ObservedLicenseInformation::new(License::new("MIT")));

        assert_eq!(artifact.license_facts().len(), 2);
        assert_eq!(
            artifact.effective_license().map(|l| l.evaluate()).as_deref(),
            Some("( EPL-2.0 AND MIT )")
        );
    }

    #[test]
    fn distinct_filenames_all_survive() {
        let mut artifact = Artifact::new("test");
        artifact
            .add_fact(ArtifactFilename::new("bar-1.0.jar"))
            .add_fact(ArtifactFilename::new("bar-1.0-sources.jar"))
            .add_fact(ArtifactFilename::new("bar-1.0.jar"));

        let names: Vec<_> = artifact
            .ask_for_all::<ArtifactFilename>()
            .into_iter()
            .filter_map(ArtifactFilename::filename)
            .collect();
        assert_eq!(names, vec!["bar-1.0.jar", "bar-1.0-sources.jar"]);
    }

    #[test]
    fn clearing_state_ordering() {
        assert!(ClearingState::OsmApproved
            .has_higher_or_equal_clearing_state_than(ClearingState::Initial));
        assert!(!ClearingState::Initial
            .has_higher_or_equal_clearing_state_than(ClearingState::ProjectApproved));
        assert!(ClearingState::AutoExtract
            .has_higher_or_equal_clearing_state_than(ClearingState::AutoExtract));
    }

    #[test]
    fn clearing_state_never_moves_backwards() {
        let mut artifact = Artifact::new("test");
        artifact
            .add_fact(ArtifactClearingState::new(ClearingState::ProjectApproved))
            .add_fact(ArtifactClearingState::new(ClearingState::WorkInProgress));
        assert_eq!(
            artifact.ask_for_get::<ArtifactClearingState>(),
            Some(&ClearingState::ProjectApproved)
        );
    }

    #[test]
    fn malformed_swhid_fails_before_reaching_artifact() {
        let result = ArtifactSoftwareHeritageId::new("swh:1:cnt:not-hex");
        assert!(matches!(result, Err(AntennaError::InvalidFact { .. })));

        let valid = ArtifactSoftwareHeritageId::new(
            "swh:1:rel:22ece559cc7cc2364edc5e5593d63ae8bd229f9f",
        );
        assert!(valid.is_ok());
    }

    #[test]
    fn missing_facts_are_absent_not_errors() {
        let artifact = Artifact::new("test");
        assert!(artifact.ask_for::<ArtifactSourceUrl>().is_none());
        assert!(artifact.ask_for_all::<ArtifactFilename>().is_empty());
        assert!(!artifact.flag(ArtifactFlag::Proprietary));
        assert!(artifact.main_coordinate().is_none());
    }
}

// ============================================================================
// Artifact merging
// ============================================================================

mod merging {
    use super::*;

    fn with_url(url: &str) -> Artifact {
        let mut artifact = Artifact::new("test");
        artifact
            .add_coordinate(maven("bar"))
            .add_fact(ArtifactSourceUrl::new(url));
        artifact
    }

    #[test]
    fn last_writer_wins_in_both_orders() {
        let mut a = with_url("https://a.example");
        a.merge_with(with_url("https://b.example"));
        assert_eq!(a.ask_for_get::<ArtifactSourceUrl>(), Some("https://b.example"));

        let mut b = with_url("https://b.example");
        b.merge_with(with_url("https://a.example"));
        assert_eq!(b.ask_for_get::<ArtifactSourceUrl>(), Some("https://a.example"));
    }

    #[test]
    fn merge_unions_coordinates_and_flags() {
        let mut a = with_url("https://a.example");
        let mut b = Artifact::new("other");
        b.add_coordinate(Coordinate::of("p2", "", "org.foo.bar", "1.0.0"))
            .set_proprietary(true);

        a.merge_with(b);
        assert_eq!(a.coordinates().len(), 2);
        assert_eq!(a.main_coordinate(), Some(&maven("bar")));
        assert!(a.is_proprietary());
    }

    #[test]
    fn strict_policy_reports_conflict_and_keeps_value() {
        let mut artifact = with_url("https://a.example").with_merge_policy(MergePolicy::Strict);
        let conflict = artifact
            .try_add_fact(ArtifactSourceUrl::new("https://b.example"))
            .map(|_| ())
            .unwrap_err();
        assert_eq!(conflict.kind, FactKind::SourceUrl);
        assert_eq!(
            artifact.ask_for_get::<ArtifactSourceUrl>(),
            Some("https://a.example")
        );
    }
}

// ============================================================================
// License algebra
// ============================================================================

mod licenses {
    use super::*;

    #[test]
    fn empty_statement_renders_empty() {
        let statement = LicenseStatement::new();
        assert!(statement.is_empty());
        assert_eq!(statement.evaluate(), "");
        assert_eq!(statement.evaluate_long(), "");
        assert!(statement.op().is_none());
    }

    #[test]
    fn and_chain_collapses_empty_base() {
        let chain = LicenseStatement::fold(
            [License::new("EPL-2.0"), License::new("GPL-2.0")],
            LicenseOperator::And,
        );
        assert_eq!(chain.evaluate(), "( ( EPL-2.0 ) AND GPL-2.0 )");
    }

    #[test]
    fn licenses_are_idempotent_and_deduplicated() {
        let statement = LicenseStatement::with_licenses(
            vec![
                License::new("MIT").into(),
                LicenseStatement::with_licenses(
                    vec![License::new("MIT").into(), License::new("ISC").into()],
                    LicenseOperator::Or,
                )
                .into(),
            ],
            LicenseOperator::And,
        );
        let first: Vec<String> = statement.licenses().iter().map(|l| l.id().to_string()).collect();
        let second: Vec<String> = statement.licenses().iter().map(|l| l.id().to_string()).collect();
        assert_eq!(first, vec!["MIT", "ISC"]);
        assert_eq!(first, second);
        assert_eq!(statement.evaluate(), statement.evaluate());
    }

    #[test]
    fn equality_is_order_sensitive() {
        let ab = LicenseStatement::with_licenses(
            vec![License::new("MIT").into(), License::new("ISC").into()],
            LicenseOperator::Or,
        );
        let ba = LicenseStatement::with_licenses(
            vec![License::new("ISC").into(), License::new("MIT").into()],
            LicenseOperator::Or,
        );
        assert_ne!(ab, ba);
    }
}

// ============================================================================
// Selectors
// ============================================================================

mod selectors {
    use super::*;

    fn artifact() -> Artifact {
        let mut artifact = Artifact::new("test");
        artifact
            .add_coordinate(maven("bar"))
            .add_fact(ArtifactFilename::new("lib/bar-1.0.jar"));
        artifact
    }

    #[test]
    fn coordinate_set_matches_any_shared_coordinate() {
        let matcher = ArtifactCoordinates::new([
            Coordinate::of("npm", "", "unrelated", "1.0"),
            Coordinate::of("mvn", "org.foo", "bar", "1.0"),
        ]);
        assert!(matcher.matches(&artifact()));
        assert!(!ArtifactCoordinates::new([maven("baz")]).matches(&artifact()));
    }

    #[test]
    fn wildcard_selector_or_filename() {
        let by_coordinate = ArtifactSelector::new()
            .with_coordinate(CoordinateSelector::parse("maven:org.foo/*").unwrap());
        assert!(by_coordinate.matches(&artifact()));

        let by_filename = ArtifactSelector::new()
            .with_coordinate(CoordinateSelector::parse("npm:*").unwrap())
            .with_filename("bar-1.0.jar");
        assert!(by_filename.matches(&artifact()));

        assert!(!ArtifactSelector::new().matches(&artifact()));
    }
}
