//! Pipeline configuration resolution.
//!
//! Maps an inbound dataset or source identifier to the [`Configuration`] that
//! governs its submission, and exposes the version-checked pattern lists and
//! transform details the orchestrator needs.
//!
//! Tables are scanned in insertion order and the first pattern that matches
//! from the start of the identifier wins:
//!
//! ```
//! use ingress_config::{ConfigTable, MatchTable};
//! use ingress_model::{Configuration, TransformKind};
//!
//! let table = ConfigTable::new()
//!     .with_entry("^cpih$", Configuration::dataset_ingress(TransformKind::SdmxCompact20))
//!     .with_entry("^.*$", Configuration::generic_file_ingress());
//! let table = MatchTable::new(table).unwrap();
//!
//! assert_eq!(table.resolve("cpih").unwrap().transform, TransformKind::SdmxCompact20);
//! assert!(table.resolve("other-dataset").unwrap().is_pass_through());
//! ```
//!
//! [`Configuration`]: ingress_model::Configuration

mod defaults;
mod error;
mod extract;
mod loader;
mod table;

// === Error Types ===
pub use error::{ConfigError, Result};

// === Tables ===
pub use table::{ConfigEntry, ConfigTable, MatchTable, is_catch_all, resolve};

// === Field Extraction ===
pub use extract::{
    KNOWN_TRANSFORM_KWARGS, TransformDetails, required_file_patterns,
    supplementary_distribution_patterns, transform_details,
};

// === Built-in and File Tables ===
pub use defaults::{default_config_table, default_match_table};
pub use loader::{load_config_table, parse_config_table};
