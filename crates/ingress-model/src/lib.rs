//! Pipeline configuration data model.
//!
//! This crate holds the plain, serializable values that describe how one
//! submission is processed: which files must be present, which transform runs
//! over which inputs, and which ingress entry point drives the run.
//!
//! Nothing in here performs I/O. Transforms and sanity checks are referenced by
//! tag ([`TransformKind`], [`SanityCheck`]) and dispatched elsewhere, so a
//! [`Configuration`] can be cloned, compared, printed and round-tripped through
//! TOML or JSON.
//!
//! # Example
//!
//! ```
//! use ingress_model::{Configuration, Pattern, SanityCheck, TransformKind};
//!
//! let config = Configuration::dataset_ingress(TransformKind::SdmxCompact20)
//!     .with_transform_input("^data.xml$", SanityCheck::SdmxXml)
//!     .with_required_file(Pattern::new("^data.xml$"))
//!     .with_supplementary_distribution(Pattern::new("^data.xml$"));
//!
//! assert_eq!(config.config_version, 1);
//! assert!(config.required_files.is_some());
//! ```

mod config;
mod error;
mod flag;
mod pattern;

// === Error Types ===
pub use error::PatternError;

// === Configuration ===
pub use config::{
    CURRENT_CONFIG_VERSION, Configuration, IngressKind, SanityCheck, SupplementaryPolicy,
    TransformInput, TransformKind,
};

// === Flags ===
pub use flag::parse_flag;

// === Patterns ===
pub use pattern::{Pattern, compile_prefix_regex};
