//! Loading configuration tables from TOML.

use std::path::Path;

use tracing::info;

use crate::error::{ConfigError, Result};
use crate::table::ConfigTable;

/// Parse a table from TOML text.
///
/// The document is a list of `[[entries]]`, each with a `pattern` and a
/// `config` table. Entry order in the file is resolution order.
pub fn parse_config_table(source: &str, origin: &Path) -> Result<ConfigTable> {
    toml::from_str(source).map_err(|source| ConfigError::TableParse {
        path: origin.to_path_buf(),
        source,
    })
}

/// Read and parse a table file.
pub fn load_config_table(path: &Path) -> Result<ConfigTable> {
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::TableRead {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_config_table(&source, path)?;
    info!(path = %path.display(), entries = table.len(), "loaded config table");
    Ok(table)
}
