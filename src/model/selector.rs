//! Deciding whether differently sourced records denote the same artifact.
//!
//! [`ArtifactCoordinates`] matches on shared coordinates and drives merge
//! target lookup. [`ArtifactSelector`] adds wildcard coordinate patterns and
//! file names for configuration targeting.

use crate::error::{AntennaError, ParseErrorKind, Result};
use crate::model::artifact::Artifact;
use crate::model::coordinate::{Coordinate, PackageType};
use crate::model::facts::ArtifactFilename;
use indexmap::IndexSet;
use std::fmt;

/// Predicate over artifacts.
pub trait ArtifactMatcher {
    fn matches(&self, artifact: &Artifact) -> bool;
}

/// First artifact accepted by the matcher. First match wins, not best match.
pub fn find_first_match<'a, M>(matcher: &M, artifacts: &'a [Artifact]) -> Option<&'a Artifact>
where
    M: ArtifactMatcher + ?Sized,
{
    artifacts.iter().find(|artifact| matcher.matches(artifact))
}

/// Mutable access to the first artifact accepted by the matcher, with its index.
pub fn find_first_match_mut<'a, M>(
    matcher: &M,
    artifacts: &'a mut [Artifact],
) -> Option<(usize, &'a mut Artifact)>
where
    M: ArtifactMatcher + ?Sized,
{
    artifacts
        .iter_mut()
        .enumerate()
        .find(|(_, artifact)| matcher.matches(artifact))
}

/// Index of the first artifact accepted by the matcher.
pub fn position_first_match<M>(matcher: &M, artifacts: &[Artifact]) -> Option<usize>
where
    M: ArtifactMatcher + ?Sized,
{
    artifacts.iter().position(|artifact| matcher.matches(artifact))
}

// ============================================================================
// Coordinate sets
// ============================================================================

/// The coordinate set of one record. Two records denote the same artifact
/// when they share at least one coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactCoordinates {
    coordinates: IndexSet<Coordinate>,
}

impl ArtifactCoordinates {
    pub fn new(coordinates: impl IntoIterator<Item = Coordinate>) -> Self {
        Self {
            coordinates: coordinates.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn from_artifact(artifact: &Artifact) -> Self {
        Self::new(artifact.coordinates().iter().cloned())
    }

    #[must_use]
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.coordinates.contains(coordinate)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coordinate> {
        self.coordinates.iter()
    }
}

impl ArtifactMatcher for ArtifactCoordinates {
    fn matches(&self, artifact: &Artifact) -> bool {
        artifact
            .coordinates()
            .iter()
            .any(|coordinate| self.contains(coordinate))
    }
}

// ============================================================================
// Wildcard patterns
// ============================================================================

/// Type part of a [`CoordinateSelector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSelector {
    /// Matches every package type. Never stored on a coordinate.
    Any,
    Exact(PackageType),
}

impl TypeSelector {
    /// `*` selects every type; anything else must be a known type or alias.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value == "*" {
            return Ok(Self::Any);
        }
        PackageType::from_type_str(value).map(Self::Exact).ok_or_else(|| {
            AntennaError::parse(
                "selector type",
                ParseErrorKind::UnknownPackageType(value.to_string()),
            )
        })
    }

    #[must_use]
    pub fn matches(&self, package_type: PackageType) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => *expected == package_type,
        }
    }
}

impl fmt::Display for TypeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Exact(package_type) => write!(f, "{package_type}"),
        }
    }
}

/// Pattern over one string field: `*`, `prefix*` or an exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPattern {
    Any,
    Exact(String),
    Prefix(String),
}

impl FieldPattern {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value == "*" {
            Self::Any
        } else if let Some(prefix) = value.strip_suffix('*') {
            Self::Prefix(prefix.to_string())
        } else {
            Self::Exact(value.to_string())
        }
    }

    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == value,
            Self::Prefix(prefix) => value.starts_with(prefix.as_str()),
        }
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Exact(value) => f.write_str(value),
            Self::Prefix(prefix) => write!(f, "{prefix}*"),
        }
    }
}

/// Coordinate pattern with optional wildcards per field.
///
/// Written like a coordinate: `maven:org.foo/*@*`, `pkg:npm/lodash@4.*` or
/// just `*`. A missing version selects every version; a missing namespace
/// selects the empty namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateSelector {
    package_type: TypeSelector,
    namespace: FieldPattern,
    name: FieldPattern,
    version: FieldPattern,
}

impl CoordinateSelector {
    /// Selector matching every coordinate.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            package_type: TypeSelector::Any,
            namespace: FieldPattern::Any,
            name: FieldPattern::Any,
            version: FieldPattern::Any,
        }
    }

    /// Selector matching exactly one coordinate.
    #[must_use]
    pub fn exact(coordinate: &Coordinate) -> Self {
        Self {
            package_type: TypeSelector::Exact(coordinate.package_type()),
            namespace: FieldPattern::Exact(coordinate.namespace().to_string()),
            name: FieldPattern::Exact(coordinate.name().to_string()),
            version: FieldPattern::Exact(coordinate.version().to_string()),
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed == "*" {
            return Ok(Self::any());
        }

        let body = trimmed.strip_prefix("pkg:").unwrap_or(trimmed);
        let split_at = body.find([':', '/']).ok_or_else(|| {
            AntennaError::parse(
                "selector",
                ParseErrorKind::InvalidCoordinate {
                    value: value.to_string(),
                    reason: "expected 'type:' or 'type/' prefix".to_string(),
                },
            )
        })?;
        let package_type = TypeSelector::parse(&body[..split_at])?;
        let rest = &body[split_at + 1..];

        let (path, version) = match rest.rsplit_once('@') {
            Some((path, version)) => (path, FieldPattern::parse(version)),
            None => (rest, FieldPattern::Any),
        };
        let (namespace, name) = match path.rsplit_once('/') {
            Some((namespace, name)) => (FieldPattern::parse(namespace), FieldPattern::parse(name)),
            None if path.trim() == "*" => (FieldPattern::Any, FieldPattern::Any),
            None => (FieldPattern::Exact(String::new()), FieldPattern::parse(path)),
        };

        if name == FieldPattern::Exact(String::new()) {
            return Err(AntennaError::parse(
                "selector",
                ParseErrorKind::InvalidCoordinate {
                    value: value.to_string(),
                    reason: "missing name".to_string(),
                },
            ));
        }

        Ok(Self {
            package_type,
            namespace,
            name,
            version,
        })
    }

    #[must_use]
    pub fn matches_coordinate(&self, coordinate: &Coordinate) -> bool {
        self.package_type.matches(coordinate.package_type())
            && self.namespace.matches(coordinate.namespace())
            && self.name.matches(coordinate.name())
            && self.version.matches(coordinate.version())
    }
}

impl ArtifactMatcher for CoordinateSelector {
    fn matches(&self, artifact: &Artifact) -> bool {
        artifact
            .coordinates()
            .iter()
            .any(|coordinate| self.matches_coordinate(coordinate))
    }
}

impl fmt::Display for CoordinateSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.package_type)?;
        if self.namespace != FieldPattern::Exact(String::new()) {
            write!(f, "{}/", self.namespace)?;
        }
        write!(f, "{}@{}", self.name, self.version)
    }
}

// ============================================================================
// Artifact selector
// ============================================================================

/// Coordinate patterns and/or a file name.
///
/// An artifact matches when any coordinate pattern matches one of its
/// coordinates, or when it carries a file name fact with the selected name.
/// Some sources can only identify artifacts by file name. An empty selector
/// matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSelector {
    coordinates: Vec<CoordinateSelector>,
    filename: Option<String>,
}

impl ArtifactSelector {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_coordinate(mut self, selector: CoordinateSelector) -> Self {
        self.coordinates.push(selector);
        self
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty() && self.filename.is_none()
    }

    fn matches_filename(&self, artifact: &Artifact) -> bool {
        self.filename.as_deref().is_some_and(|filename| {
            artifact
                .ask_for_all::<ArtifactFilename>()
                .iter()
                .any(|fact| fact.matches_filename(filename))
        })
    }
}

impl ArtifactMatcher for ArtifactSelector {
    fn matches(&self, artifact: &Artifact) -> bool {
        self.coordinates
            .iter()
            .any(|selector| selector.matches(artifact))
            || self.matches_filename(artifact)
    }
}

impl fmt::Display for ArtifactSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.coordinates.iter().map(ToString::to_string).collect();
        if let Some(filename) = &self.filename {
            parts.push(format!("file {filename}"));
        }
        write!(f, "[{}]", parts.join(" | "))
    }
}
