//! Error types for the transform engine.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while flattening a nested header into scalar fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    /// Two distinct elements flattened to the same key.
    #[error("header key '{key}' produced more than once")]
    DuplicateKey { key: String },

    /// Nesting exceeded the supported depth.
    #[error("header nesting deeper than {limit} levels at '{key}'")]
    TooDeep { key: String, limit: usize },
}

/// Errors raised by transforms and sanity checks.
#[derive(Debug, Error)]
pub enum TransformError {
    // === Input Errors ===
    /// The input is unreadable or is not the kind of file expected.
    #[error("invalid input file {path}: {reason}")]
    InvalidInputFile { path: PathBuf, reason: String },

    /// The transform was given the wrong number of inputs.
    #[error("{transform} expects {expected} input(s), got {found}")]
    InputCount {
        transform: &'static str,
        expected: &'static str,
        found: usize,
    },

    /// The document is well-formed XML but not the expected SDMX message.
    #[error("{path} is not an SDMX {expected} message (top-level elements: [{}])", found.join(", "))]
    UnrecognisedXmlDialect {
        path: PathBuf,
        expected: &'static str,
        found: Vec<String>,
    },

    /// The XML could not be parsed.
    #[error("XML syntax error in {path}: {message}")]
    XmlSyntax { path: PathBuf, message: String },

    /// A mandatory element is absent.
    #[error("element '{element}' not found in {path}")]
    MissingElement {
        path: PathBuf,
        element: &'static str,
    },

    // === Structural Checks ===
    /// The header element set differs from the dialect's field list.
    #[error("{dialect} header fields do not match: unexpected [{}], missing [{}]", unexpected.join(", "), missing.join(", "))]
    HeaderFieldMismatch {
        dialect: &'static str,
        unexpected: Vec<String>,
        missing: Vec<String>,
    },

    /// The header could not be reduced to scalar fields.
    #[error("header is not fully unpacked: {source}")]
    HeaderUnpackedCheckFailed {
        #[source]
        source: FlattenError,
    },

    /// No observation marker was found in the raw text.
    #[error("could not count any observations in {path} (marker '{marker}')")]
    NoObservations { path: PathBuf, marker: String },

    /// A table does not have the row count derived from the raw XML.
    #[error("{stage} has {actual} rows, expected {expected}")]
    ExpectedObsCountMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A column name occurs in two tables, or twice in the final table.
    #[error("column '{column}' is duplicated in {first} and {second}")]
    ColumnUniquenessViolation {
        column: String,
        first: &'static str,
        second: &'static str,
    },

    /// An observation record does not share the first record's keys.
    #[error("observation {index} keys [{}] differ from the first observation's [{}]", found.join(", "), expected.join(", "))]
    ObsDictsHomogeneityViolation {
        index: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A final column name still carries an XML serialization marker.
    #[error("'{marker}' found in tidy data column name '{column}'")]
    TidyColumnViolation { column: String, marker: &'static str },

    // === CSV Join Errors ===
    /// An input CSV header differs from the first input's.
    #[error("header of {path} does not match the first input: expected [{}], found [{}]", expected.join(", "), found.join(", "))]
    CsvHeaderMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Failed to read a CSV file.
    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // === Option Errors ===
    /// A transform keyword argument no transform accepts.
    #[error("unknown transform kwarg '{key}'")]
    UnknownKwarg { key: String },

    /// A transform keyword argument with an unusable value.
    #[error("invalid value '{value}' for transform kwarg '{key}'")]
    InvalidKwarg { key: String, value: String },

    /// The configuration names no transform.
    #[error("configuration has no transform to run")]
    NoTransform,

    // === Output Errors ===
    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A staged output could not be moved into place.
    #[error("failed to move {temp_path} to {target_path}: {source}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The metadata template is not a JSON object.
    #[error("invalid metadata template {path}: {message}")]
    MetadataTemplate { path: PathBuf, message: String },

    /// Failed to serialize the metadata document.
    #[error("failed to serialize metadata: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {0}")]
    DataFrame(#[from] polars::prelude::PolarsError),
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;
