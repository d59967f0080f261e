//! Typed facts attached to artifacts.
//!
//! Every concrete fact belongs to exactly one [`FactKind`]. The kind is the
//! key of an artifact's fact store and carries the merge rule applied when
//! two facts of that kind meet. [`ArtifactFact`] is the closed sum of all
//! concrete facts; the [`Fact`] trait gives typed access to one variant.

use crate::error::{AntennaError, Result};
use crate::model::license::LicenseInformation;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

// ============================================================================
// Fact kinds and merge rules
// ============================================================================

/// Discriminator of a fact. At most one fact per kind lives on an artifact,
/// except for multi-valued kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    DeclaredLicense,
    ObservedLicense,
    OverriddenLicense,
    ConfiguredLicense,
    SourceUrl,
    ReleaseTagUrl,
    SoftwareHeritageId,
    ClearingState,
    ChangeStatus,
    Cpe,
    Filename,
    SourceFile,
    Copyright,
    MatchingMetadata,
    ClearingDocument,
}

impl FactKind {
    pub const ALL: &'static [Self] = &[
        Self::DeclaredLicense,
        Self::ObservedLicense,
        Self::OverriddenLicense,
        Self::ConfiguredLicense,
        Self::SourceUrl,
        Self::ReleaseTagUrl,
        Self::SoftwareHeritageId,
        Self::ClearingState,
        Self::ChangeStatus,
        Self::Cpe,
        Self::Filename,
        Self::SourceFile,
        Self::Copyright,
        Self::MatchingMetadata,
        Self::ClearingDocument,
    ];

    /// Human readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeclaredLicense => "Declared License",
            Self::ObservedLicense => "Observed License",
            Self::OverriddenLicense => "Overridden License",
            Self::ConfiguredLicense => "Configured License",
            Self::SourceUrl => "Source URL",
            Self::ReleaseTagUrl => "Release Tag URL",
            Self::SoftwareHeritageId => "Software Heritage ID",
            Self::ClearingState => "Clearing State",
            Self::ChangeStatus => "Change Status",
            Self::Cpe => "CPE",
            Self::Filename => "File Name",
            Self::SourceFile => "Source File",
            Self::Copyright => "Copyrights",
            Self::MatchingMetadata => "Matching Metadata",
            Self::ClearingDocument => "Clearing Document",
        }
    }

    /// What happens when a fact of this kind meets an existing one.
    #[must_use]
    pub const fn merge_rule(self) -> MergeRule {
        match self {
            Self::ClearingState => MergeRule::KeepHigher,
            Self::Copyright | Self::Filename => MergeRule::Union,
            _ => MergeRule::Overwrite,
        }
    }

    /// Multi-valued kinds accumulate distinct instances instead of merging.
    #[must_use]
    pub const fn is_multi_valued(self) -> bool {
        matches!(self, Self::Filename)
    }

    #[must_use]
    pub const fn is_license(self) -> bool {
        matches!(
            self,
            Self::DeclaredLicense
                | Self::ObservedLicense
                | Self::OverriddenLicense
                | Self::ConfiguredLicense
        )
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Merge behavior of a fact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRule {
    /// The incoming value replaces the existing one.
    Overwrite,
    /// The existing value stays; the incoming one only fills a gap.
    KeepExisting,
    /// Both values are combined.
    Union,
    /// The higher ordered value wins; ties go to the incoming value.
    KeepHigher,
    /// A differing incoming value is a conflict; the existing value stays.
    RejectOnConflict,
}

/// Result of merging an incoming fact into an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Store this fact in place of the existing one.
    Replace(ArtifactFact),
    /// Leave the existing fact untouched.
    Keep,
    /// The incoming fact was rejected.
    Conflict(ArtifactFact),
}

// ============================================================================
// Typed access
// ============================================================================

/// A concrete fact type, addressable through its [`FactKind`].
pub trait Fact: Into<ArtifactFact> {
    const KIND: FactKind;

    /// The value carried by the fact.
    type Payload: ?Sized;

    fn payload(&self) -> &Self::Payload;

    /// Downcast from the fact sum type.
    fn from_fact(fact: &ArtifactFact) -> Option<&Self>;
}

macro_rules! impl_fact {
    ($ty:ident, $kind:ident, $payload:ty, |$this:ident| $access:expr) => {
        impl Fact for $ty {
            const KIND: FactKind = FactKind::$kind;
            type Payload = $payload;

            fn payload(&self) -> &Self::Payload {
                let $this = self;
                $access
            }

            fn from_fact(fact: &ArtifactFact) -> Option<&Self> {
                match fact {
                    ArtifactFact::$kind(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for ArtifactFact {
            fn from(fact: $ty) -> Self {
                Self::$kind(fact)
            }
        }
    };
}

// ============================================================================
// License facts
// ============================================================================

macro_rules! license_fact {
    ($(#[$meta:meta])* $ty:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $ty(LicenseInformation);

        impl $ty {
            pub fn new(license: impl Into<LicenseInformation>) -> Self {
                Self(license.into())
            }

            #[must_use]
            pub fn license(&self) -> &LicenseInformation {
                &self.0
            }
        }

        impl_fact!($ty, $kind, LicenseInformation, |this| &this.0);
    };
}

license_fact!(
    /// Licenses the artifact claims for itself.
    DeclaredLicenseInformation,
    DeclaredLicense
);
license_fact!(
    /// Licenses found by scanning the artifact.
    ObservedLicenseInformation,
    ObservedLicense
);
license_fact!(
    /// Licenses set by a clearing decision; these beat everything else.
    OverriddenLicenseInformation,
    OverriddenLicense
);
license_fact!(ConfiguredLicenseInformation, ConfiguredLicense);

// ============================================================================
// URL and identifier facts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactSourceUrl(String);

impl ArtifactSourceUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }
}

impl_fact!(ArtifactSourceUrl, SourceUrl, str, |this| this.0.as_str());

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactReleaseTagUrl(String);

impl ArtifactReleaseTagUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }
}

impl_fact!(ArtifactReleaseTagUrl, ReleaseTagUrl, str, |this| this.0.as_str());

/// Software Heritage persistent identifier, `swh:<version>:<type>:<40 hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactSoftwareHeritageId(String);

fn swh_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^swh:\d+:(cnt|dir|rev|rel|snp):[0-9a-f]{40}$").expect("static regex")
    })
}

impl ArtifactSoftwareHeritageId {
    /// Validate and wrap an identifier.
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim();
        if swh_id_pattern().is_match(id) {
            Ok(Self(id.to_string()))
        } else {
            Err(AntennaError::invalid_format(
                FactKind::SoftwareHeritageId.name(),
                id,
                "swh:<version>:<cnt|dir|rev|rel|snp>:<40 hex digits>",
            ))
        }
    }
}

impl FromStr for ArtifactSoftwareHeritageId {
    type Err = AntennaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl_fact!(ArtifactSoftwareHeritageId, SoftwareHeritageId, str, |this| this.0.as_str());

/// Common Platform Enumeration identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactCpe(String);

impl ArtifactCpe {
    const PREFIXES: [&'static str; 2] = ["cpe:2.3:", "cpe:/"];

    /// Wrap a CPE, or `None` when the prefix is neither `cpe:2.3:` nor `cpe:/`.
    #[must_use]
    pub fn parse(cpe: &str) -> Option<Self> {
        let cpe = cpe.trim();
        Self::PREFIXES
            .iter()
            .any(|prefix| cpe.starts_with(prefix))
            .then(|| Self(cpe.to_string()))
    }
}

impl_fact!(ArtifactCpe, Cpe, str, |this| this.0.as_str());

// ============================================================================
// Workflow state facts
// ============================================================================

/// How thoroughly a component's licensing has been vetted, in increasing
/// order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClearingState {
    Initial,
    WorkInProgress,
    ExternalSource,
    AutoExtract,
    ProjectApproved,
    OsmApproved,
}

impl ClearingState {
    #[must_use]
    pub fn has_higher_or_equal_clearing_state_than(self, other: Self) -> bool {
        self >= other
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::WorkInProgress => "WORK_IN_PROGRESS",
            Self::ExternalSource => "EXTERNAL_SOURCE",
            Self::AutoExtract => "AUTO_EXTRACT",
            Self::ProjectApproved => "PROJECT_APPROVED",
            Self::OsmApproved => "OSM_APPROVED",
        }
    }
}

impl fmt::Display for ClearingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClearingState {
    type Err = AntennaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "INITIAL" => Ok(Self::Initial),
            "WORK_IN_PROGRESS" => Ok(Self::WorkInProgress),
            "EXTERNAL_SOURCE" => Ok(Self::ExternalSource),
            "AUTO_EXTRACT" => Ok(Self::AutoExtract),
            "PROJECT_APPROVED" => Ok(Self::ProjectApproved),
            "OSM_APPROVED" => Ok(Self::OsmApproved),
            _ => Err(AntennaError::invalid_enum_value("clearing state", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactClearingState(ClearingState);

impl ArtifactClearingState {
    pub const fn new(state: ClearingState) -> Self {
        Self(state)
    }
}

impl_fact!(ArtifactClearingState, ClearingState, ClearingState, |this| &this.0);

/// Whether the shipped artifact differs from the upstream release.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeStatus {
    AsIs,
    Changed,
}

impl ChangeStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AsIs => "AS_IS",
            Self::Changed => "CHANGED",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeStatus {
    type Err = AntennaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "AS_IS" => Ok(Self::AsIs),
            "CHANGED" => Ok(Self::Changed),
            _ => Err(AntennaError::invalid_enum_value("change status", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactChangeStatus(ChangeStatus);

impl ArtifactChangeStatus {
    pub const fn new(status: ChangeStatus) -> Self {
        Self(status)
    }
}

impl_fact!(ArtifactChangeStatus, ChangeStatus, ChangeStatus, |this| &this.0);

/// How confidently an artifact was identified.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchState {
    Exact,
    Similar,
    Unknown,
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "EXACT"),
            Self::Similar => write!(f, "SIMILAR"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactMatchingMetadata(MatchState);

impl ArtifactMatchingMetadata {
    pub const fn new(state: MatchState) -> Self {
        Self(state)
    }
}

impl_fact!(ArtifactMatchingMetadata, MatchingMetadata, MatchState, |this| &this.0);

// ============================================================================
// File facts
// ============================================================================

/// A file name with an optional content hash. Artifacts collect any number
/// of these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ArtifactFilename {
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
}

impl ArtifactFilename {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            hash: None,
        }
    }

    pub fn with_hash(filename: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            hash: Some(hash.into()),
        }
    }

    /// A hash without a known file name.
    pub fn hash_only(hash: impl Into<String>) -> Self {
        Self {
            filename: None,
            hash: Some(hash.into()),
        }
    }

    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Name comparison ignoring directories, so `lib/foo.jar` matches `foo.jar`.
    #[must_use]
    pub fn matches_filename(&self, filename: &str) -> bool {
        self.filename.as_deref().is_some_and(|own| {
            own == filename || base_name(own) == base_name(filename)
        })
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

impl fmt::Display for ArtifactFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.filename, &self.hash) {
            (Some(name), Some(hash)) => write!(f, "{name} ({hash})"),
            (Some(name), None) => f.write_str(name),
            (None, Some(hash)) => write!(f, "({hash})"),
            (None, None) => Ok(()),
        }
    }
}

impl_fact!(ArtifactFilename, Filename, ArtifactFilename, |this| this);

/// Location of the artifact's source archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactSourceFile(PathBuf);

impl ArtifactSourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl_fact!(ArtifactSourceFile, SourceFile, Path, |this| this.0.as_path());

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactClearingDocument(PathBuf);

impl ArtifactClearingDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl_fact!(ArtifactClearingDocument, ClearingDocument, Path, |this| this.0.as_path());

// ============================================================================
// Copyright
// ============================================================================

/// Copyright lines. Merging two statements keeps every distinct line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CopyrightStatement(Vec<String>);

impl CopyrightStatement {
    /// Split a multi-line statement into its non-blank lines.
    pub fn new(statement: &str) -> Self {
        let mut copyright = Self::default();
        for line in statement.lines() {
            copyright.push(line);
        }
        copyright
    }

    fn push(&mut self, line: &str) {
        let line = line.trim();
        if !line.is_empty() && !self.0.iter().any(|existing| existing == line) {
            self.0.push(line.to_string());
        }
    }

    /// Lines of `self` followed by the new lines of `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for line in &other.0 {
            merged.push(line);
        }
        merged
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CopyrightStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\n"))
    }
}

impl_fact!(CopyrightStatement, Copyright, [String], |this| this.0.as_slice());

// ============================================================================
// Fact sum type
// ============================================================================

/// Any fact that can live on an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArtifactFact {
    DeclaredLicense(DeclaredLicenseInformation),
    ObservedLicense(ObservedLicenseInformation),
    OverriddenLicense(OverriddenLicenseInformation),
    ConfiguredLicense(ConfiguredLicenseInformation),
    SourceUrl(ArtifactSourceUrl),
    ReleaseTagUrl(ArtifactReleaseTagUrl),
    SoftwareHeritageId(ArtifactSoftwareHeritageId),
    ClearingState(ArtifactClearingState),
    ChangeStatus(ArtifactChangeStatus),
    Cpe(ArtifactCpe),
    Filename(ArtifactFilename),
    SourceFile(ArtifactSourceFile),
    Copyright(CopyrightStatement),
    MatchingMetadata(ArtifactMatchingMetadata),
    ClearingDocument(ArtifactClearingDocument),
}

impl ArtifactFact {
    #[must_use]
    pub const fn kind(&self) -> FactKind {
        match self {
            Self::DeclaredLicense(_) => FactKind::DeclaredLicense,
            Self::ObservedLicense(_) => FactKind::ObservedLicense,
            Self::OverriddenLicense(_) => FactKind::OverriddenLicense,
            Self::ConfiguredLicense(_) => FactKind::ConfiguredLicense,
            Self::SourceUrl(_) => FactKind::SourceUrl,
            Self::ReleaseTagUrl(_) => FactKind::ReleaseTagUrl,
            Self::SoftwareHeritageId(_) => FactKind::SoftwareHeritageId,
            Self::ClearingState(_) => FactKind::ClearingState,
            Self::ChangeStatus(_) => FactKind::ChangeStatus,
            Self::Cpe(_) => FactKind::Cpe,
            Self::Filename(_) => FactKind::Filename,
            Self::SourceFile(_) => FactKind::SourceFile,
            Self::Copyright(_) => FactKind::Copyright,
            Self::MatchingMetadata(_) => FactKind::MatchingMetadata,
            Self::ClearingDocument(_) => FactKind::ClearingDocument,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// License payload of the four license kinds.
    #[must_use]
    pub fn license(&self) -> Option<&LicenseInformation> {
        match self {
            Self::DeclaredLicense(fact) => Some(fact.license()),
            Self::ObservedLicense(fact) => Some(fact.license()),
            Self::OverriddenLicense(fact) => Some(fact.license()),
            Self::ConfiguredLicense(fact) => Some(fact.license()),
            _ => None,
        }
    }

    /// Merge this incoming fact into an existing fact of the same kind.
    ///
    /// Facts of different kinds never merge; the incoming one replaces.
    #[must_use]
    pub fn merge_with(self, existing: &Self, rule: MergeRule) -> MergeOutcome {
        if self.kind() != existing.kind() {
            return MergeOutcome::Replace(self);
        }
        match rule {
            MergeRule::Overwrite => MergeOutcome::Replace(self),
            MergeRule::KeepExisting => MergeOutcome::Keep,
            MergeRule::RejectOnConflict if &self == existing => MergeOutcome::Keep,
            MergeRule::RejectOnConflict => MergeOutcome::Conflict(self),
            MergeRule::KeepHigher => match (&self, existing) {
                (Self::ClearingState(incoming), Self::ClearingState(current))
                    if !incoming.0.has_higher_or_equal_clearing_state_than(current.0) =>
                {
                    MergeOutcome::Keep
                }
                _ => MergeOutcome::Replace(self),
            },
            MergeRule::Union => match (&self, existing) {
                (Self::Copyright(incoming), Self::Copyright(current)) => {
                    MergeOutcome::Replace(Self::Copyright(current.union(incoming)))
                }
                _ => MergeOutcome::Replace(self),
            },
        }
    }
}

impl fmt::Display for ArtifactFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeclaredLicense(fact) => write!(f, "{}", fact.license()),
            Self::ObservedLicense(fact) => write!(f, "{}", fact.license()),
            Self::OverriddenLicense(fact) => write!(f, "{}", fact.license()),
            Self::ConfiguredLicense(fact) => write!(f, "{}", fact.license()),
            Self::SourceUrl(fact) => f.write_str(fact.payload()),
            Self::ReleaseTagUrl(fact) => f.write_str(fact.payload()),
            Self::SoftwareHeritageId(fact) => f.write_str(fact.payload()),
            Self::ClearingState(fact) => write!(f, "{}", fact.payload()),
            Self::ChangeStatus(fact) => write!(f, "{}", fact.payload()),
            Self::Cpe(fact) => f.write_str(fact.payload()),
            Self::Filename(fact) => write!(f, "{fact}"),
            Self::SourceFile(fact) => write!(f, "{}", fact.payload().display()),
            Self::Copyright(fact) => write!(f, "{fact}"),
            Self::MatchingMetadata(fact) => write!(f, "{}", fact.payload()),
            Self::ClearingDocument(fact) => write!(f, "{}", fact.payload().display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::license::License;

    const VALID_SWHID: &str = "swh:1:rel:1234567890123456789012345678901234567890";

    #[test]
    fn test_swh_id_accepts_valid() {
        let id = ArtifactSoftwareHeritageId::new(VALID_SWHID).expect("valid id");
        assert_eq!(id.payload(), VALID_SWHID);
    }

    #[test]
    fn test_swh_id_rejects_malformed() {
        for bad in [
            "",
            "swh:1:rel:123",
            "swh:1:xyz:1234567890123456789012345678901234567890",
            "swh:1:rel:123456789012345678901234567890123456789G",
            "swh:x:rel:1234567890123456789012345678901234567890",
        ] {
            assert!(
                matches!(
                    ArtifactSoftwareHeritageId::new(bad),
                    Err(AntennaError::InvalidFact { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_cpe_prefixes() {
        assert!(ArtifactCpe::parse("cpe:2.3:a:apache:commons:1.0:*:*:*:*:*:*:*").is_some());
        assert!(ArtifactCpe::parse("cpe:/a:apache:commons:1.0").is_some());
        assert!(ArtifactCpe::parse("apache:commons").is_none());
        assert!(ArtifactCpe::parse("").is_none());
    }

    #[test]
    fn test_clearing_state_order() {
        assert!(ClearingState::OsmApproved
            .has_higher_or_equal_clearing_state_than(ClearingState::Initial));
        assert!(!ClearingState::Initial
            .has_higher_or_equal_clearing_state_than(ClearingState::ProjectApproved));
        assert!(ClearingState::AutoExtract
            .has_higher_or_equal_clearing_state_than(ClearingState::AutoExtract));
    }

    #[test]
    fn test_clearing_state_from_str() {
        assert_eq!(
            "work_in_progress".parse::<ClearingState>().ok(),
            Some(ClearingState::WorkInProgress)
        );
        assert!("DONE".parse::<ClearingState>().is_err());
    }

    #[test]
    fn test_overwrite_replaces() {
        let old: ArtifactFact = DeclaredLicenseInformation::new(License::new("EPL-2.0")).into();
        let new: ArtifactFact = DeclaredLicenseInformation::new(License::new("MIT")).into();
        assert_eq!(
            new.clone().merge_with(&old, MergeRule::Overwrite),
            MergeOutcome::Replace(new)
        );
    }

    #[test]
    fn test_clearing_state_keeps_higher() {
        let approved: ArtifactFact = ArtifactClearingState::new(ClearingState::OsmApproved).into();
        let initial: ArtifactFact = ArtifactClearingState::new(ClearingState::Initial).into();
        let rule = FactKind::ClearingState.merge_rule();

        assert_eq!(initial.clone().merge_with(&approved, rule), MergeOutcome::Keep);
        assert_eq!(
            approved.clone().merge_with(&initial, rule),
            MergeOutcome::Replace(approved)
        );
    }

    #[test]
    fn test_copyright_union() {
        let first: ArtifactFact =
            CopyrightStatement::new("Copyright (c) A\nCopyright (c) B").into();
        let second: ArtifactFact =
            CopyrightStatement::new("Copyright (c) B\nCopyright (c) C").into();
        match second.merge_with(&first, FactKind::Copyright.merge_rule()) {
            MergeOutcome::Replace(merged) => {
                assert_eq!(merged.to_string(), "Copyright (c) A\nCopyright (c) B\nCopyright (c) C");
            }
            other => panic!("expected replace, got {other:?}"),
        }
    }

    #[test]
    fn test_reject_on_conflict() {
        let a: ArtifactFact = ArtifactSourceUrl::new("https://a.example").into();
        let b: ArtifactFact = ArtifactSourceUrl::new("https://b.example").into();
        assert_eq!(
            a.clone().merge_with(&a, MergeRule::RejectOnConflict),
            MergeOutcome::Keep
        );
        assert_eq!(
            b.clone().merge_with(&a, MergeRule::RejectOnConflict),
            MergeOutcome::Conflict(b)
        );
    }

    #[test]
    fn test_typed_downcast() {
        let fact: ArtifactFact = ArtifactSourceUrl::new("https://example.org").into();
        assert!(ArtifactSourceUrl::from_fact(&fact).is_some());
        assert!(ArtifactReleaseTagUrl::from_fact(&fact).is_none());
        assert_eq!(fact.kind(), ArtifactSourceUrl::KIND);
    }

    #[test]
    fn test_filename_matching_ignores_directories() {
        let fact = ArtifactFilename::with_hash("lib/foo-1.0.jar", "abc");
        assert!(fact.matches_filename("foo-1.0.jar"));
        assert!(!fact.matches_filename("bar.jar"));
        assert!(!ArtifactFilename::hash_only("abc").matches_filename("foo-1.0.jar"));
    }

    #[test]
    fn test_only_filename_is_multi_valued() {
        let multi: Vec<FactKind> = FactKind::ALL
            .iter()
            .copied()
            .filter(|kind| kind.is_multi_valued())
            .collect();
        assert_eq!(multi, vec![FactKind::Filename]);
    }
}
