//! Error types for submission file stores.

use std::path::PathBuf;

use ingress_model::PatternError;
use thiserror::Error;

/// Errors that can occur while reading a submission's files.
#[derive(Debug, Error)]
pub enum StoreError {
    // === File System Errors ===
    /// Directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy a file out of the store.
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Matching Errors ===
    /// A lookup pattern is not a valid regular expression.
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),

    /// A pattern did not resolve to exactly one file.
    #[error("expected exactly one file matching '{pattern}', found {}: [{}]", matched.len(), matched.join(", "))]
    NoLoneMatch {
        pattern: String,
        matched: Vec<String>,
    },

    // === JSON Errors ===
    /// Failed to read a JSON file.
    #[error("failed to read JSON file {path}: {source}")]
    JsonRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a JSON file.
    #[error("failed to parse JSON file {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON document is not an object.
    #[error("JSON file {path} does not contain an object")]
    NotAnObject { path: PathBuf },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
