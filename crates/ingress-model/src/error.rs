//! Error types for the configuration model.

use thiserror::Error;

/// A configured regular expression failed to compile.
#[derive(Debug, Error)]
#[error("invalid pattern '{pattern}': {source}")]
pub struct PatternError {
    /// The pattern as written in the configuration.
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}
