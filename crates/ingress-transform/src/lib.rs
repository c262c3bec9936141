//! SDMX tabular transform engine.
//!
//! Turns SDMX-ML data messages (Compact 2.0 and Generic 2.1) into a tidy CSV,
//! one row per observation, plus a metadata JSON document beside it. Every
//! transform checks its own structural invariants as it goes: the expected row
//! count is read off the raw XML before parsing, and each intermediate table is
//! checked against it.
//!
//! Transforms are selected by [`TransformKind`](ingress_model::TransformKind)
//! through [`run_transform`]; the per-dialect functions are public for direct
//! use.

mod checks;
mod columns;
mod compact20;
mod count;
mod csv_join;
mod error;
mod flatten;
mod generic21;
mod metadata;
mod options;
mod output;
mod registry;
mod sanity;
mod structure;
mod table;
mod xml;

// === Error Types ===
pub use error::{FlattenError, Result, TransformError};

// === Transforms ===
pub use compact20::{
    COMPACT20_FORBIDDEN_MARKERS, COMPACT20_WRAPPER, tabulate_compact20, transform_compact20,
};
pub use csv_join::{CSV_JOIN_FORBIDDEN_MARKERS, tabulate_csv_join, transform_csv_join};
pub use generic21::{
    GENERIC21_FORBIDDEN_MARKERS, GENERIC21_WRAPPER, OBS_DIMENSION_KEY, OBS_VALUE_KEY,
    tabulate_generic21, transform_generic21,
};
pub use registry::{TransformFn, run_transform, transform_for};

// === Options and Outputs ===
pub use options::TransformOptions;
pub use output::{CSV_FILE_NAME, JOINED_CSV_FILE_NAME, METADATA_FILE_NAME, TransformOutput};
pub use table::TidyTable;

// === Sanity Checks ===
pub use sanity::{check_csv, check_sdmx_xml, run_sanity_check};

// === Invariant Checks ===
pub use checks::{
    COMPACT20_HEADER_FIELDS, GENERIC21_HEADER_FIELDS, canonical_column_name,
    check_columns_disjoint, check_header_fields, check_obs_dicts_have_same_keys,
    check_row_count, check_tidy_data_columns, check_unique_names,
};
pub use columns::ColumnSet;
pub use count::{count_markers, marker};

// === XML and Headers ===
pub use flatten::{FlatMap, STRIPPED_PREFIXES, flatten_header, strip_namespace};
pub use xml::{Descendants, MAX_XML_DEPTH, XmlDocument, XmlElement, local_part, parse_document};

// === Metadata ===
pub use metadata::{
    DATASETS_BASE_URL, OPEN_GOVERNMENT_LICENCE, generate_versions_metadata, pathify,
    to_utc_timestamp, write_metadata,
};
pub use structure::{StructureDefinition, read_structure};
