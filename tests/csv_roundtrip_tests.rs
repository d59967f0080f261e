//! CSV import/export tests against real files.

use antenna::config::{AntennaConfig, CSV_ANALYSIS_SOURCE};
use antenna::csv_mapper::CSV_COLUMNS;
use antenna::model::{
    Artifact, ArtifactChangeStatus, ArtifactClearingDocument, ArtifactClearingState, ArtifactCpe,
    ArtifactFilename, ArtifactMatchingMetadata, ArtifactReleaseTagUrl, ArtifactSoftwareHeritageId,
    ArtifactSourceFile, ArtifactSourceUrl, ChangeStatus, ClearingState, Coordinate,
    CopyrightStatement, DeclaredLicenseInformation, License, LicenseOperator, LicenseStatement,
    MatchState, ObservedLicenseInformation, OverriddenLicenseInformation,
};
use antenna::CsvArtifactMapper;
use std::path::Path;
use tempfile::TempDir;

fn assert_same_artifacts(actual: &[Artifact], expected: &[Artifact]) {
    assert_eq!(actual.len(), expected.len(), "{actual:#?}");
    for artifact in expected {
        assert!(
            actual.contains(artifact),
            "missing after round trip:\n{}",
            artifact.pretty_print()
        );
    }
}

fn fully_populated(dir: &Path) -> Artifact {
    let source = dir.join("bar-1.0-sources.jar");
    std::fs::write(&source, b"sources").unwrap();
    let document = dir.join("bar-clearing.pdf");
    std::fs::write(&document, b"report").unwrap();

    let declared = LicenseStatement::with_licenses(
        vec![License::new("EPL-2.0").into(), License::new("MIT").into()],
        LicenseOperator::Or,
    );
    let mut artifact = Artifact::new("analyzer");
    artifact
        .add_coordinate(Coordinate::of("maven", "org.foo", "bar", "1.0"))
        .add_fact(ArtifactMatchingMetadata::new(MatchState::Exact))
        .add_fact(OverriddenLicenseInformation::new(License::new("EPL-2.0")))
        .add_fact(DeclaredLicenseInformation::new(declared))
        .add_fact(ObservedLicenseInformation::new(LicenseStatement::fold(
            [License::new("EPL-2.0"), License::new("GPL-2.0-only")],
            LicenseOperator::And,
        )))
        .add_fact(CopyrightStatement::new(
            "Copyright (c) 2019 Foo Inc.\nCopyright (c) 2020 Bar Ltd.",
        ))
        .add_fact(ArtifactFilename::hash_only("5d41402abc4b2a76b9719d911017c592"))
        .add_fact(ArtifactFilename::hash_only("7d793037a0760186574b0282f2f435e7"))
        .add_fact(ArtifactSourceUrl::new("https://github.com/foo/bar"))
        .add_fact(ArtifactReleaseTagUrl::new("https://github.com/foo/bar/releases/tag/v1.0"))
        .add_fact(
            ArtifactSoftwareHeritageId::new("swh:1:rel:22ece559cc7cc2364edc5e5593d63ae8bd229f9f")
                .unwrap(),
        )
        .add_fact(ArtifactClearingState::new(ClearingState::ProjectApproved))
        .add_fact(ArtifactClearingDocument::new(document))
        .add_fact(ArtifactChangeStatus::new(ChangeStatus::Changed))
        .add_fact(ArtifactCpe::parse("cpe:2.3:a:foo:bar:1.0:*:*:*:*:*:*:*").unwrap())
        .add_fact(ArtifactSourceFile::new(source));
    artifact
}

fn minimal(type_str: &str, namespace: &str, name: &str) -> Artifact {
    let mut artifact = Artifact::new("analyzer");
    artifact
        .add_coordinate(Coordinate::of(type_str, namespace, name, "2.0"))
        .add_fact(ArtifactMatchingMetadata::new(MatchState::Exact));
    artifact
}

#[test]
fn round_trip_preserves_representable_facts() {
    let tmp = TempDir::new().unwrap();
    let artifacts = vec![
        fully_populated(tmp.path()),
        minimal("npm", "@angular", "core"),
        minimal("nuget", "", "Newtonsoft.Json"),
        minimal("p2", "", "org.eclipse.core.runtime"),
        minimal("conan", "", "zlib"),
    ];

    let mapper = CsvArtifactMapper::new();
    let path = mapper
        .write_file(&tmp.path().join("artifacts.csv"), &artifacts)
        .unwrap();
    assert!(path.is_absolute());

    let read = mapper.read_file(&path).unwrap();
    assert_same_artifacts(&read, &artifacts);
    assert!(read.iter().all(|a| a.analysis_source() == CSV_ANALYSIS_SOURCE));
}

#[test]
fn one_row_per_hash_and_extra_coordinate() {
    let tmp = TempDir::new().unwrap();
    let mut artifact = fully_populated(tmp.path());
    artifact.add_coordinate(Coordinate::of("p2", "", "org.foo.bar", "1.0.0"));

    let mut out = Vec::new();
    CsvArtifactMapper::new().write_to(&mut out, &[artifact]).unwrap();

    let mut reader = csv::Reader::from_reader(out.as_slice());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_COLUMNS.to_vec());

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    // two hashes on the main coordinate, one bare row for the p2 coordinate
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[2][0], "org.foo.bar");
    assert_eq!(&rows[2][3], "p2");
    assert!(rows[2].iter().skip(4).all(str::is_empty));
}

#[test]
fn missing_source_file_is_dropped() {
    let tmp = TempDir::new().unwrap();
    let csv = "Artifact Id,Group Id,Version,Coordinate Type,File Name\n\
               bar,org.foo,1.0,maven,missing-sources.jar\n\
               baz,org.foo,1.0,maven,present-sources.jar\n";
    std::fs::write(tmp.path().join("present-sources.jar"), b"x").unwrap();
    let input = tmp.path().join("input.csv");
    std::fs::write(&input, csv).unwrap();

    let artifacts = CsvArtifactMapper::new().read_file(&input).unwrap();
    assert_eq!(artifacts.len(), 2);
    assert!(artifacts[0].ask_for::<ArtifactSourceFile>().is_none());
    assert_eq!(
        artifacts[1].ask_for_get::<ArtifactSourceFile>(),
        Some(tmp.path().join("present-sources.jar").as_path())
    );
}

#[test]
fn configured_delimiter_and_base_dir() {
    let tmp = TempDir::new().unwrap();
    let sources = tmp.path().join("sources");
    std::fs::create_dir(&sources).unwrap();
    std::fs::write(sources.join("lib.zip"), b"x").unwrap();

    let config = AntennaConfig::builder()
        .delimiter(';')
        .base_dir(&sources)
        .build();
    let mapper = CsvArtifactMapper::from_config(&config).unwrap();

    let csv = "Artifact Id;Version;Coordinate Type;File Name\nlib;1.0;golang;lib.zip\n";
    let artifacts = mapper.read_from(csv.as_bytes()).unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(
        artifacts[0].ask_for_get::<ArtifactSourceFile>(),
        Some(sources.join("lib.zip").as_path())
    );
}

#[test]
fn artifacts_without_coordinates_are_not_written() {
    let mut anonymous = Artifact::new("analyzer");
    anonymous.add_fact(ArtifactFilename::new("mystery.jar"));

    let mut out = Vec::new();
    CsvArtifactMapper::new()
        .write_to(&mut out, &[anonymous, minimal("npm", "", "left-pad")])
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
}

#[test]
fn unknown_ecosystems_with_same_name_stay_separate() {
    let artifacts = vec![minimal("conan", "", "zlib"), minimal("swift", "", "zlib")];

    let mut out = Vec::new();
    let mapper = CsvArtifactMapper::new();
    mapper.write_to(&mut out, &artifacts).unwrap();
    let read = mapper.read_from(out.as_slice()).unwrap();

    assert_same_artifacts(&read, &artifacts);
    let types: Vec<&str> = read
        .iter()
        .filter_map(Artifact::main_coordinate)
        .map(Coordinate::type_str)
        .collect();
    assert_eq!(types, vec!["conan", "swift"]);
}

#[test]
fn license_ids_with_spaces_survive_round_trip() {
    let mut artifact = minimal("npm", "", "spaced");
    artifact.add_fact(DeclaredLicenseInformation::new(LicenseStatement::with_licenses(
        vec![License::new("Foo Bar").into(), License::new("MIT").into()],
        LicenseOperator::Or,
    )));

    let mut out = Vec::new();
    let mapper = CsvArtifactMapper::new();
    mapper.write_to(&mut out, std::slice::from_ref(&artifact)).unwrap();
    let read = mapper.read_from(out.as_slice()).unwrap();

    assert_same_artifacts(&read, &[artifact]);
}
