//! Unified error types for antenna.
//!
//! Model operations never fail for missing data (lookups return `Option`).
//! Errors surface only from validated constructors, string parsers, and the
//! I/O edges (CSV files, configuration files).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for antenna operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AntennaError {
    /// Errors while parsing coordinates, license expressions or enum values
    #[error("Failed to parse: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// A fact rejected its payload at construction time
    #[error("Invalid fact: {context}")]
    InvalidFact {
        context: String,
        #[source]
        source: FactErrorKind,
    },

    /// CSV reading or writing failed
    #[error("CSV error: {context}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Unknown package type '{0}'")]
    UnknownPackageType(String),

    #[error("Malformed coordinate '{value}': {reason}")]
    InvalidCoordinate { value: String, reason: String },

    #[error("Malformed license expression '{expression}': {reason}")]
    InvalidLicenseExpression { expression: String, reason: String },

    #[error("Invalid value '{value}' for {field}")]
    InvalidEnumValue { field: String, value: String },
}

/// Specific fact construction error kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FactErrorKind {
    #[error("'{value}' does not match the expected format {expected}")]
    InvalidFormat { value: String, expected: String },
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for antenna operations
pub type Result<T> = std::result::Result<T, AntennaError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl AntennaError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for an unrecognised enum value
    pub fn invalid_enum_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        Self::parse(
            field.clone(),
            ParseErrorKind::InvalidEnumValue {
                field,
                value: value.into(),
            },
        )
    }

    /// Create an invalid fact error for a payload that failed its format check
    pub fn invalid_format(
        fact: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidFact {
            context: fact.into(),
            source: FactErrorKind::InvalidFormat {
                value: value.into(),
                expected: expected.into(),
            },
        }
    }

    /// Create a CSV error with context
    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: Some(path.into()),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for AntennaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<csv::Error> for AntennaError {
    fn from(err: csv::Error) -> Self {
        Self::csv("", err)
    }
}

impl From<serde_json::Error> for AntennaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("JSON serialization: {err}"))
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain, outermost first:
///
/// ```ignore
/// use antenna::error::ErrorContext;
///
/// let coordinate = Coordinate::parse(raw).context("reading override selector")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<AntennaError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

fn add_context_to_error(err: AntennaError, new_ctx: &str) -> AntennaError {
    match err {
        AntennaError::Parse {
            context: existing,
            source,
        } => AntennaError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        AntennaError::InvalidFact {
            context: existing,
            source,
        } => AntennaError::InvalidFact {
            context: chain_context(new_ctx, &existing),
            source,
        },
        AntennaError::Csv {
            context: existing,
            source,
        } => AntennaError::Csv {
            context: chain_context(new_ctx, &existing),
            source,
        },
        AntennaError::Io {
            path,
            message,
            source,
        } => AntennaError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        AntennaError::Config(msg) => AntennaError::Config(chain_context(new_ctx, &msg)),
        AntennaError::Validation(msg) => AntennaError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| AntennaError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| AntennaError::Validation(f().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_format_display() {
        let err =
            AntennaError::invalid_format("Software Heritage ID", "swh:bogus", "swh:<v>:<t>:<hex>");
        let display = err.to_string();
        assert!(display.contains("Software Heritage ID"), "{display}");

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert!(source.is_some_and(|s| s.contains("swh:bogus")));
    }

    #[test]
    fn test_io_error_mentions_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = AntennaError::io("/path/to/artifacts.csv", io_err);

        assert!(err.to_string().contains("/path/to/artifacts.csv"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(AntennaError::parse(
                "base",
                ParseErrorKind::UnknownPackageType("foo".to_string()),
            ))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(AntennaError::Parse { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(AntennaError::validation("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_option_context() {
        let none_value: Option<i32> = None;
        match none_value.context_none("missing value") {
            Err(AntennaError::Validation(msg)) => assert_eq!(msg, "missing value"),
            other => panic!("Expected Validation error, got {other:?}"),
        }

        assert_eq!(Some(7).context_none("unused").ok(), Some(7));
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
