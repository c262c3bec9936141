//! Built-in configuration table.

use ingress_model::{Configuration, SanityCheck, TransformKind};

use crate::error::Result;
use crate::table::{ConfigTable, MatchTable};

fn sdmx_compact_data_xml() -> Configuration {
    Configuration::dataset_ingress(TransformKind::SdmxCompact20)
        .with_transform_input("^data.xml$", SanityCheck::SdmxXml)
        .with_required_file("^data.xml$")
        .with_supplementary_distribution("^data.xml$")
}

/// The table used when no table file is supplied.
///
/// Specific identifiers come first; `^.*$` is the catch-all and stays last.
pub fn default_config_table() -> ConfigTable {
    ConfigTable::new()
        .with_entry("^cpih$", sdmx_compact_data_xml())
        .with_entry("^.*$", sdmx_compact_data_xml())
}

/// [`default_config_table`] checked as a [`MatchTable`].
pub fn default_match_table() -> Result<MatchTable> {
    MatchTable::new(default_config_table())
}
