//! Package coordinates: the ecosystem identity of an artifact.
//!
//! A [`Coordinate`] is an immutable `(type, namespace, name, version)` tuple.
//! It can be built from explicit fields, from a Package URL
//! (`pkg:maven/org.foo/bar@1.0`) or from the short `maven:org.foo/bar@1.0`
//! form. Ecosystem aliases such as `mvn` or `dotnet` are folded into their
//! canonical [`PackageType`] at construction time.

use crate::error::{AntennaError, ParseErrorKind, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Package ecosystem of a coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Maven,
    Npm,
    Nuget,
    P2,
    Pypi,
    Golang,
    Cargo,
    Gem,
    Github,
    Generic,
}

impl PackageType {
    /// Every known package type.
    pub const ALL: &'static [Self] = &[
        Self::Maven,
        Self::Npm,
        Self::Nuget,
        Self::P2,
        Self::Pypi,
        Self::Golang,
        Self::Cargo,
        Self::Gem,
        Self::Github,
        Self::Generic,
    ];

    /// Resolve a type string, including ecosystem aliases.
    #[must_use]
    pub fn from_type_str(type_str: &str) -> Option<Self> {
        match type_str.trim().to_lowercase().as_str() {
            "maven" | "mvn" => Some(Self::Maven),
            "npm" | "javascript" => Some(Self::Npm),
            "nuget" | "dotnet" => Some(Self::Nuget),
            "p2" | "bundle" => Some(Self::P2),
            "pypi" | "python" => Some(Self::Pypi),
            "golang" | "go" => Some(Self::Golang),
            "cargo" => Some(Self::Cargo),
            "gem" => Some(Self::Gem),
            "github" => Some(Self::Github),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }

    /// The canonical Package URL type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::Npm => "npm",
            Self::Nuget => "nuget",
            Self::P2 => "p2",
            Self::Pypi => "pypi",
            Self::Golang => "golang",
            Self::Cargo => "cargo",
            Self::Gem => "gem",
            Self::Github => "github",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable package identity.
///
/// Equality and hashing cover the four identity fields. For unknown
/// ecosystems the raw type string (ignoring ASCII case) is part of the type,
/// so `conan` and `swift` packages stay distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    package_type: PackageType,
    /// Original type string when it was not a known ecosystem
    raw_type: Option<String>,
    namespace: String,
    name: String,
    version: String,
}

impl Coordinate {
    /// Create a coordinate from a known package type.
    pub fn new(
        package_type: PackageType,
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            package_type,
            raw_type: None,
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Create a coordinate from a type string.
    ///
    /// Unknown type strings fall back to [`PackageType::Generic`] and the raw
    /// string is retained for display.
    pub fn of(
        type_str: &str,
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let mut coordinate = Self::new(PackageType::Generic, namespace, name, version);
        match PackageType::from_type_str(type_str) {
            Some(package_type) => coordinate.package_type = package_type,
            None => {
                let raw = type_str.trim();
                if !raw.is_empty() {
                    coordinate.raw_type = Some(raw.to_string());
                }
            }
        }
        coordinate
    }

    /// Create a coordinate from a type string, rejecting unknown types.
    pub fn of_strict(
        type_str: &str,
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let package_type = PackageType::from_type_str(type_str).ok_or_else(|| {
            AntennaError::parse(
                "coordinate type",
                ParseErrorKind::UnknownPackageType(type_str.to_string()),
            )
        })?;
        Ok(Self::new(package_type, namespace, name, version))
    }

    /// Start building a coordinate field by field.
    pub fn builder() -> CoordinateBuilder {
        CoordinateBuilder::default()
    }

    /// Parse `pkg:type/namespace/name@version` or `type:namespace/name@version`.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let purl = if trimmed.starts_with("pkg:") {
            trimmed.to_string()
        } else {
            let (type_str, rest) = trimmed.split_once(':').ok_or_else(|| {
                invalid_coordinate(value, "expected 'pkg:' prefix or 'type:' prefix")
            })?;
            format!("pkg:{type_str}/{rest}")
        };

        let parsed = packageurl::PackageUrl::from_str(&purl)
            .map_err(|e| invalid_coordinate(value, &e.to_string()))?;

        Ok(Self::of(
            parsed.ty(),
            parsed.namespace().unwrap_or_default(),
            parsed.name(),
            parsed.version().unwrap_or_default(),
        ))
    }

    #[must_use]
    pub const fn package_type(&self) -> PackageType {
        self.package_type
    }

    /// The type string used for output: the raw string for unknown ecosystems.
    #[must_use]
    pub fn type_str(&self) -> &str {
        self.raw_type
            .as_deref()
            .unwrap_or_else(|| self.package_type.as_str())
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Field-wise identity comparison.
    ///
    /// Type aliases are already resolved, so `mvn` and `maven` match. An empty
    /// namespace and an absent one are the same thing.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self == other
    }

    /// Render as a Package URL.
    #[must_use]
    pub fn to_purl(&self) -> String {
        let mut purl = format!("pkg:{}/", self.type_str());
        if !self.namespace.is_empty() {
            purl.push_str(&self.namespace);
            purl.push('/');
        }
        purl.push_str(&self.name);
        if !self.version.is_empty() {
            purl.push('@');
            purl.push_str(&self.version);
        }
        purl
    }
}

fn invalid_coordinate(value: &str, reason: &str) -> AntennaError {
    AntennaError::parse(
        "coordinate",
        ParseErrorKind::InvalidCoordinate {
            value: value.to_string(),
            reason: reason.to_string(),
        },
    )
}

impl Coordinate {
    fn raw_type_key(&self) -> Option<String> {
        self.raw_type.as_deref().map(str::to_ascii_lowercase)
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.package_type == other.package_type
            && self.raw_type_key() == other.raw_type_key()
            && self.namespace == other.namespace
            && self.name == other.name
            && self.version == other.version
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.package_type.hash(state);
        self.raw_type_key().hash(state);
        self.namespace.hash(state);
        self.name.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_purl())
    }
}

impl FromStr for Coordinate {
    type Err = AntennaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Coordinate {
    type Error = AntennaError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Coordinate> for String {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.to_purl()
    }
}

/// Builder for [`Coordinate`].
#[derive(Debug, Default)]
#[must_use]
pub struct CoordinateBuilder {
    type_str: Option<String>,
    namespace: String,
    name: String,
    version: String,
}

impl CoordinateBuilder {
    pub fn with_type(mut self, type_str: impl Into<String>) -> Self {
        self.type_str = Some(type_str.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Build leniently; a missing type means `generic`.
    #[must_use]
    pub fn build(self) -> Coordinate {
        let type_str = self.type_str.unwrap_or_else(|| "generic".to_string());
        Coordinate::of(&type_str, self.namespace, self.name, self.version)
    }
}
