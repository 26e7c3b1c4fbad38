//! Unified error types for audit-tools.
//!
//! This module provides the error hierarchy for the library, with enough
//! context for debugging and user-facing messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for audit-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AuditError {
    /// Errors while reading or normalizing a catalog / answer sheet
    #[error("Failed to load catalog: {context}")]
    Catalog {
        context: String,
        #[source]
        source: CatalogErrorKind,
    },

    /// Errors raised by a response store
    #[error("Store operation failed: {context}")]
    Store {
        context: String,
        #[source]
        source: StoreErrorKind,
    },

    /// Errors during report generation
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
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

    /// Validation errors on required fields
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific catalog error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CatalogErrorKind {
    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: String },

    #[error("Invalid CSV: {0}")]
    Csv(String),

    #[error("Invalid YAML: {0}")]
    Yaml(String),

    #[error("Invalid JSON: {0}")]
    Json(String),
}

/// Specific store error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreErrorKind {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Corrupt store document: {0}")]
    Corrupt(String),

    #[error("Unsupported schema version {found} (newest known: {latest})")]
    UnsupportedVersion { found: u32, latest: u32 },

    #[error("Migration from v{from} failed: {message}")]
    Migration { from: u32, message: String },

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("JSON serialization failed: {0}")]
    JsonSerializationError(String),

    #[error("CSV generation failed: {0}")]
    CsvError(String),

    #[error("Output format not supported for this operation: {0}")]
    UnsupportedFormat(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for audit-tools operations
pub type Result<T> = std::result::Result<T, AuditError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl AuditError {
    /// Create a catalog error with context
    pub fn catalog(context: impl Into<String>, source: CatalogErrorKind) -> Self {
        Self::Catalog {
            context: context.into(),
            source,
        }
    }

    /// Create a catalog error for a row missing a required field
    pub fn missing_field(row: usize, field: impl Into<String>) -> Self {
        Self::catalog(
            "row rejected",
            CatalogErrorKind::MissingField {
                row,
                field: field.into(),
            },
        )
    }

    /// Create a store error with context
    pub fn store(context: impl Into<String>, source: StoreErrorKind) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }

    /// Create a report error with context
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
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

    /// Whether this error was caused by invalid input rather than the environment.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Catalog {
                    source: CatalogErrorKind::MissingField { .. },
                    ..
                }
        )
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::store("JSON document", StoreErrorKind::Serialization(err.to_string()))
    }
}

// ============================================================================
// Context extension
// ============================================================================

/// Extension trait for adding context to results
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> ErrorContext<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_prefix(context.into()))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| e.with_prefix(f().into()))
    }
}

impl AuditError {
    fn with_prefix(self, prefix: String) -> Self {
        match self {
            Self::Catalog { context, source } => Self::Catalog {
                context: format!("{prefix}: {context}"),
                source,
            },
            Self::Store { context, source } => Self::Store {
                context: format!("{prefix}: {context}"),
                source,
            },
            Self::Report { context, source } => Self::Report {
                context: format!("{prefix}: {context}"),
                source,
            },
            Self::Io {
                path,
                message,
                source,
            } => Self::Io {
                path,
                message: format!("{prefix}: {message}"),
                source,
            },
            Self::Config(msg) => Self::Config(format!("{prefix}: {msg}")),
            Self::Validation(msg) => Self::Validation(format!("{prefix}: {msg}")),
        }
    }
}
