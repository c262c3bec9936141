//! Error types for configuration resolution.

use std::path::PathBuf;

use ingress_model::PatternError;
use thiserror::Error;

/// Errors raised while resolving or inspecting pipeline configurations.
#[derive(Debug, Error)]
pub enum ConfigError {
    // === Resolution Errors ===
    /// No table entry matched the identifier.
    #[error("no configuration matches '{identifier}' (patterns: {})", patterns.join(", "))]
    NoMatchingConfiguration {
        identifier: String,
        patterns: Vec<String>,
    },

    /// A table pattern is not a valid regular expression.
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),

    // === Table Construction Errors ===
    /// A match table needs at least one entry.
    #[error("match table is empty")]
    EmptyTable,

    /// The final entry of a match table does not accept every identifier.
    #[error("last match table entry '{pattern}' is not a catch-all")]
    MissingCatchAll { pattern: String },

    /// A catch-all entry appears before the end and shadows later entries.
    #[error("catch-all pattern '{pattern}' at position {position} shadows {shadowed} later entries")]
    CatchAllNotLast {
        pattern: String,
        position: usize,
        shadowed: usize,
    },

    // === Configuration Field Errors ===
    /// The configuration layout version is not understood.
    #[error("config version {version} not recognised")]
    UnsupportedConfigVersion { version: u32 },

    /// A field needed by the caller is absent.
    #[error("'{field}' not found in configuration:\n{config}")]
    MissingConfigField {
        field: &'static str,
        /// Pretty JSON rendering of the whole configuration.
        config: String,
    },

    /// A `transform_kwargs` key that no transform accepts.
    #[error("unknown transform kwarg '{key}'")]
    UnknownTransformKwarg { key: String },

    // === Table File Errors ===
    /// Failed to read a table file.
    #[error("failed to read config table {path}: {source}")]
    TableRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a table file.
    #[error("failed to parse config table {path}: {source}")]
    TableParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
