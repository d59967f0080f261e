//! CSV import and export of artifact lists.
//!
//! One row is written per distinct hash of an artifact, all carrying the
//! main coordinate. Every further coordinate gets a bare row of its own.
//! Reading folds rows back together through coordinate matching, so rows
//! of the same artifact may appear anywhere in the file.
//!
//! Malformed cells are logged and skipped; only I/O and CSV syntax errors
//! abort a read.

use crate::config::{AntennaConfig, CSV_ANALYSIS_SOURCE, DEFAULT_CSV_DELIMITER};
use crate::error::{AntennaError, ErrorContext, Result};
use crate::model::{
    parse_license_expression, Artifact, ArtifactChangeStatus, ArtifactClearingDocument,
    ArtifactClearingState, ArtifactCpe, ArtifactFilename, ArtifactMatchingMetadata,
    ArtifactReleaseTagUrl, ArtifactSoftwareHeritageId, ArtifactSourceFile, ArtifactSourceUrl,
    ChangeStatus, ClearingState, Coordinate, CopyrightStatement, DeclaredLicenseInformation,
    License, LicenseInformation, MatchState, MergePolicy, ObservedLicenseInformation,
    OverriddenLicenseInformation,
};
use crate::pipeline::reconcile::reconcile_all;
use csv::StringRecord;
use indexmap::IndexSet;
use std::io;
use std::path::{Path, PathBuf};

const ARTIFACT_ID: &str = "Artifact Id";
const GROUP_ID: &str = "Group Id";
const VERSION: &str = "Version";
const COORDINATE_TYPE: &str = "Coordinate Type";
const EFFECTIVE_LICENSE: &str = "Effective License";
const DECLARED_LICENSE: &str = "Declared License";
const OBSERVED_LICENSE: &str = "Observed License";
const COPYRIGHTS: &str = "Copyrights";
const HASH: &str = "Hash";
const SOURCE_URL: &str = "Source URL";
const RELEASE_TAG_URL: &str = "Release Tag URL";
const SWH_ID: &str = "Software Heritage ID";
const CLEARING_STATE: &str = "Clearing State";
const CLEARING_DOCUMENT: &str = "Clearing Document";
const CHANGE_STATUS: &str = "Change Status";
const CPE: &str = "CPE";
const FILE_NAME: &str = "File Name";

/// Column header, in write order.
pub const CSV_COLUMNS: [&str; 17] = [
    ARTIFACT_ID,
    GROUP_ID,
    VERSION,
    COORDINATE_TYPE,
    EFFECTIVE_LICENSE,
    DECLARED_LICENSE,
    OBSERVED_LICENSE,
    COPYRIGHTS,
    HASH,
    SOURCE_URL,
    RELEASE_TAG_URL,
    SWH_ID,
    CLEARING_STATE,
    CLEARING_DOCUMENT,
    CHANGE_STATUS,
    CPE,
    FILE_NAME,
];

/// Reads and writes artifact lists as CSV.
#[derive(Debug, Clone)]
pub struct CsvArtifactMapper {
    delimiter: u8,
    base_dir: Option<PathBuf>,
    strict_types: bool,
    merge_policy: MergePolicy,
}

impl Default for CsvArtifactMapper {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_CSV_DELIMITER as u8,
            base_dir: None,
            strict_types: false,
            merge_policy: MergePolicy::default(),
        }
    }
}

impl CsvArtifactMapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper configured from the `csv` and `merge` sections.
    pub fn from_config(config: &AntennaConfig) -> Result<Self> {
        let delimiter = u8::try_from(config.csv.delimiter).map_err(|_| {
            AntennaError::config(format!(
                "CSV delimiter {:?} is not a single byte",
                config.csv.delimiter
            ))
        })?;
        Ok(Self {
            delimiter,
            base_dir: config.csv.base_dir.clone(),
            strict_types: config.merge.strict_types,
            merge_policy: config.merge.policy,
        })
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Directory relative file paths resolve against.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    #[must_use]
    pub const fn with_strict_types(mut self, strict: bool) -> Self {
        self.strict_types = strict;
        self
    }

    #[must_use]
    pub const fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Write artifacts to a CSV file, returning its absolute path.
    pub fn write_file(&self, path: &Path, artifacts: &[Artifact]) -> Result<PathBuf> {
        let file = std::fs::File::create(path).map_err(|e| AntennaError::io(path, e))?;
        self.write_to(file, artifacts)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(absolute(path))
    }

    /// Write artifacts as CSV. Artifacts without coordinates are skipped.
    pub fn write_to<W: io::Write>(&self, writer: W, artifacts: &[Artifact]) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);
        csv_writer
            .write_record(CSV_COLUMNS)
            .map_err(|e| AntennaError::csv("writing header", e))?;

        for artifact in artifacts {
            let rows = records_for(artifact);
            if rows.is_empty() {
                tracing::debug!("{artifact} has no coordinates and is not written");
            }
            for row in rows {
                csv_writer
                    .write_record(&row)
                    .map_err(|e| AntennaError::csv(format!("writing {artifact}"), e))?;
            }
        }
        csv_writer.flush()?;
        Ok(())
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Read a CSV file. Relative paths resolve against the configured base
    /// directory, or the directory containing the file.
    pub fn read_file(&self, path: &Path) -> Result<Vec<Artifact>> {
        let file = std::fs::File::open(path).map_err(|e| AntennaError::io(path, e))?;
        let base_dir = self.base_dir.clone().unwrap_or_else(|| {
            absolute(path)
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        });
        self.read_with_base_dir(file, &base_dir)
            .with_context(|| format!("reading {}", path.display()))
    }

    /// Read CSV data. Relative paths resolve against the configured base
    /// directory, or the current directory.
    pub fn read_from<R: io::Read>(&self, reader: R) -> Result<Vec<Artifact>> {
        let base_dir = self
            .base_dir
            .clone()
            .unwrap_or_else(|| absolute(Path::new(".")));
        self.read_with_base_dir(reader, &base_dir)
    }

    fn read_with_base_dir<R: io::Read>(&self, reader: R, base_dir: &Path) -> Result<Vec<Artifact>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|e| AntennaError::csv("reading header", e))?
            .clone();

        let mut incoming = Vec::new();
        for (idx, result) in csv_reader.records().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping row {}: {e}", idx + 1);
                    continue;
                }
            };
            let record = Row {
                headers: &headers,
                row: &row,
                number: idx + 1,
            };
            match self.artifact_from_row(&record, base_dir) {
                Some(artifact) => incoming.push(artifact),
                None => tracing::warn!("Skipping row {}: no usable coordinate", idx + 1),
            }
        }

        let rows = incoming.len();
        let mut artifacts = Vec::new();
        let summary = reconcile_all(&mut artifacts, incoming);
        tracing::info!(
            "Read {rows} CSV rows into {} artifacts ({} merged)",
            artifacts.len(),
            summary.merged
        );
        Ok(artifacts)
    }

    fn artifact_from_row(&self, row: &Row<'_>, base_dir: &Path) -> Option<Artifact> {
        let coordinate = self.coordinate_from_row(row)?;
        let mut artifact = Artifact::new(CSV_ANALYSIS_SOURCE).with_merge_policy(self.merge_policy);
        artifact
            .add_coordinate(coordinate)
            .add_fact(ArtifactMatchingMetadata::new(MatchState::Exact));

        if let Some(license) = row.license(EFFECTIVE_LICENSE) {
            artifact.add_fact(OverriddenLicenseInformation::new(license));
        }
        if let Some(license) = row.license(DECLARED_LICENSE) {
            artifact.add_fact(DeclaredLicenseInformation::new(license));
        }
        if let Some(license) = row.license(OBSERVED_LICENSE) {
            artifact.add_fact(ObservedLicenseInformation::new(license));
        }
        if let Some(copyrights) = row.get(COPYRIGHTS) {
            artifact.add_fact(CopyrightStatement::new(copyrights));
        }
        if let Some(hash) = row.get(HASH) {
            artifact.add_fact(ArtifactFilename::hash_only(hash));
        }
        if let Some(url) = row.get(SOURCE_URL) {
            artifact.add_fact(ArtifactSourceUrl::new(url));
        }
        if let Some(url) = row.get(RELEASE_TAG_URL) {
            artifact.add_fact(ArtifactReleaseTagUrl::new(url));
        }
        if let Some(id) = row.get(SWH_ID) {
            match ArtifactSoftwareHeritageId::new(id) {
                Ok(fact) => {
                    artifact.add_fact(fact);
                }
                Err(e) => tracing::warn!("Row {}: {e}", row.number),
            }
        }
        if let Some(state) = row.get(CLEARING_STATE) {
            match state.parse::<ClearingState>() {
                Ok(state) => {
                    artifact.add_fact(ArtifactClearingState::new(state));
                }
                Err(e) => tracing::warn!("Row {}: {e}", row.number),
            }
        }
        if let Some(document) = row.get(CLEARING_DOCUMENT) {
            if let Some(path) = existing_path(document, base_dir, &artifact) {
                artifact.add_fact(ArtifactClearingDocument::new(path));
            }
        }
        if let Some(status) = row.get(CHANGE_STATUS) {
            match status.parse::<ChangeStatus>() {
                Ok(status) => {
                    artifact.add_fact(ArtifactChangeStatus::new(status));
                }
                Err(e) => tracing::warn!("Row {}: {e}", row.number),
            }
        }
        if let Some(cpe) = row.get(CPE) {
            match ArtifactCpe::parse(cpe) {
                Some(fact) => {
                    artifact.add_fact(fact);
                }
                None => tracing::warn!("Row {}: '{cpe}' is not a CPE identifier", row.number),
            }
        }
        if let Some(file_name) = row.get(FILE_NAME) {
            if let Some(path) = existing_path(file_name, base_dir, &artifact) {
                artifact.add_fact(ArtifactSourceFile::new(path));
            }
        }

        Some(artifact)
    }

    // Ecosystems without namespaces drop the group column.
    fn coordinate_from_row(&self, row: &Row<'_>) -> Option<Coordinate> {
        let name = row.get(ARTIFACT_ID).unwrap_or_default();
        let version = row.get(VERSION).unwrap_or_default();
        let group = row.get(GROUP_ID).unwrap_or_default();
        let type_str = row.get(COORDINATE_TYPE).unwrap_or("generic");

        let namespace = match type_str.to_lowercase().as_str() {
            "nuget" | "dotnet" | "bundle" => "",
            _ => group,
        };

        if self.strict_types {
            match Coordinate::of_strict(type_str, namespace, name, version) {
                Ok(coordinate) => Some(coordinate),
                Err(e) => {
                    tracing::warn!("Row {}: {e}", row.number);
                    None
                }
            }
        } else {
            Some(Coordinate::of(type_str, namespace, name, version))
        }
    }
}

/// Column lookup by header name over one record.
struct Row<'a> {
    headers: &'a StringRecord,
    row: &'a StringRecord,
    number: usize,
}

impl Row<'_> {
    /// Trimmed, non-empty cell of a column. Missing columns read as empty.
    fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h.trim() == column)
            .and_then(|idx| self.row.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn license(&self, column: &str) -> Option<LicenseInformation> {
        let expression = self.get(column)?;
        match parse_license_expression(expression) {
            Ok(license) => Some(license),
            Err(e) => {
                tracing::warn!("Row {}: {e}; keeping '{expression}' as one license", self.number);
                Some(License::new(expression).into())
            }
        }
    }
}

fn records_for(artifact: &Artifact) -> Vec<Vec<String>> {
    let mut coordinates = artifact.coordinates().iter();
    let Some(main) = coordinates.next() else {
        return Vec::new();
    };

    let hashes: IndexSet<&str> = artifact
        .ask_for_all::<ArtifactFilename>()
        .into_iter()
        .filter_map(ArtifactFilename::hash)
        .collect();

    let mut rows = Vec::new();
    if hashes.is_empty() {
        rows.push(record_for(Some(artifact), main, ""));
    } else {
        for hash in hashes {
            rows.push(record_for(Some(artifact), main, hash));
        }
    }
    for coordinate in coordinates {
        rows.push(record_for(None, coordinate, ""));
    }
    rows
}

fn record_for(artifact: Option<&Artifact>, coordinate: &Coordinate, hash: &str) -> Vec<String> {
    let license = |evaluate: Option<&LicenseInformation>| {
        evaluate.map(LicenseInformation::evaluate).unwrap_or_default()
    };
    let text = |value: Option<&str>| value.unwrap_or_default().to_string();
    let path = |value: Option<&Path>| {
        value
            .map(|p| absolute(p).display().to_string())
            .unwrap_or_default()
    };

    let empty = Artifact::default();
    let artifact = artifact.unwrap_or(&empty);

    vec![
        coordinate.name().to_string(),
        coordinate.namespace().to_string(),
        coordinate.version().to_string(),
        coordinate.type_str().to_string(),
        license(artifact.ask_for_get::<OverriddenLicenseInformation>()),
        license(artifact.ask_for_get::<DeclaredLicenseInformation>()),
        license(artifact.ask_for_get::<ObservedLicenseInformation>()),
        artifact
            .ask_for::<CopyrightStatement>()
            .map(ToString::to_string)
            .unwrap_or_default(),
        hash.to_string(),
        text(artifact.ask_for_get::<ArtifactSourceUrl>()),
        text(artifact.ask_for_get::<ArtifactReleaseTagUrl>()),
        text(artifact.ask_for_get::<ArtifactSoftwareHeritageId>()),
        artifact
            .ask_for_get::<ArtifactClearingState>()
            .map(ToString::to_string)
            .unwrap_or_default(),
        path(artifact.ask_for_get::<ArtifactClearingDocument>()),
        artifact
            .ask_for_get::<ArtifactChangeStatus>()
            .map(ToString::to_string)
            .unwrap_or_default(),
        text(artifact.ask_for_get::<ArtifactCpe>()),
        path(artifact.ask_for_get::<ArtifactSourceFile>()),
    ]
}

fn existing_path(value: &str, base_dir: &Path, artifact: &Artifact) -> Option<PathBuf> {
    let path = Path::new(value);
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };
    if resolved.exists() {
        Some(resolved)
    } else {
        tracing::debug!(
            "The file {} for artifact {artifact} does not exist",
            resolved.display()
        );
        None
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}
