//! Error types for submission orchestration.

use std::path::PathBuf;

use ingress_config::ConfigError;
use ingress_store::StoreError;
use ingress_transform::TransformError;
use thiserror::Error;

/// Errors that end a submission.
#[derive(Debug, Error)]
pub enum IngressError {
    // === File Presence ===
    /// A required file is absent, or matched the wrong number of times.
    #[error(
        "required file matching '{pattern}' not found in {location}: expected {expected}, matched [{}]; files present: [{}]",
        matched.join(", "),
        listing.join(", ")
    )]
    MissingRequiredFile {
        pattern: String,
        expected: usize,
        matched: Vec<String>,
        location: String,
        listing: Vec<String>,
    },

    /// A supplementary distribution is absent under the abort policy.
    #[error(
        "supplementary distribution matching '{pattern}' not found in {location}: expected {expected}, matched [{}]; files present: [{}]",
        matched.join(", "),
        listing.join(", ")
    )]
    MissingSupplementaryDistribution {
        pattern: String,
        expected: usize,
        matched: Vec<String>,
        location: String,
        listing: Vec<String>,
    },

    /// A pass-through file has an extension no upload route accepts.
    #[error("uploading file type '{extension}' is not supported: {path}")]
    UnsupportedFileType { path: PathBuf, extension: String },

    /// The transform reported an output that is not on disk.
    #[error("expected output file missing: {path}")]
    OutputMissing { path: PathBuf },

    // === Settings ===
    /// A process setting has a value that cannot be parsed.
    #[error("invalid value '{value}' for {name}")]
    InvalidSetting { name: &'static str, value: String },

    // === Upload ===
    /// Failed to hand a file to the uploader.
    #[error("failed to upload {path}: {source}")]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Wrapped Errors ===
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Result type for orchestration.
pub type Result<T> = std::result::Result<T, IngressError>;
