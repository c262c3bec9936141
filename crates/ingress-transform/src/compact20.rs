//! SDMX-ML Compact 2.0 data messages to tidy CSV.
//!
//! A Compact message carries dimensions and attributes as XML attributes: each
//! `Series` element holds the series key, each nested `Obs` element holds the
//! time period, value and observation attributes. One output row is produced
//! per `Obs`, joined with its series attributes and the flattened header.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, info_span};

use crate::checks::{
    COMPACT20_HEADER_FIELDS, check_columns_disjoint, check_header_fields, check_xml_type,
    read_xml_text,
};
use crate::columns::ColumnSet;
use crate::count::{count_markers, marker};
use crate::error::{Result, TransformError};
use crate::flatten::flatten_header;
use crate::options::TransformOptions;
use crate::output::{CSV_FILE_NAME, TransformOutput, canonicalize, write_outputs};
use crate::structure::read_structure;
use crate::table::TidyTable;
use crate::xml::{XmlElement, parse_document};

/// Root element of a Compact 2.0 message.
pub const COMPACT20_WRAPPER: &str = "CompactData";

/// Markers that must not survive in Compact 2.0 output column names.
pub const COMPACT20_FORBIDDEN_MARKERS: &[&str] = &["@", "na:"];

const DEFAULT_PREFIX: &str = "na_";

fn attribute_pairs(element: &XmlElement) -> impl Iterator<Item = (&str, &str)> {
    element
        .attributes
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
}

/// Parse and validate a Compact 2.0 message into a tidy table.
pub fn tabulate_compact20(path: &Path, options: &TransformOptions) -> Result<TidyTable> {
    let text = read_xml_text(path)?;
    let doc = parse_document(&text, path)?;
    let root = check_xml_type(&doc, COMPACT20_WRAPPER, path)?;

    let header = root.child("Header").ok_or_else(|| TransformError::MissingElement {
        path: path.to_path_buf(),
        element: "Header",
    })?;
    if options.strict_header {
        check_header_fields(header, COMPACT20_HEADER_FIELDS, "Compact 2.0")?;
    }
    let header_fields = flatten_header(header)
        .map_err(|source| TransformError::HeaderUnpackedCheckFailed { source })?;

    let prefix = root
        .descendants()
        .find(|e| e.local_name() == "Obs")
        .map_or(Some(DEFAULT_PREFIX), XmlElement::prefix);
    let expected = count_markers(&text, prefix, "Obs");
    if expected == 0 {
        return Err(TransformError::NoObservations {
            path: path.to_path_buf(),
            marker: marker(prefix, "Obs"),
        });
    }
    debug!(expected, "counted observation markers");

    let mut series_columns = ColumnSet::new();
    let mut obs_columns = ColumnSet::new();
    for series in root.descendants().filter(|e| e.local_name() == "Series") {
        for obs in series.descendants().filter(|e| e.local_name() == "Obs") {
            series_columns.push_record(attribute_pairs(series));
            obs_columns.push_record(attribute_pairs(obs));
        }
    }
    series_columns.check_length("series table", expected)?;
    obs_columns.check_length("observation table", expected)?;

    let header_columns = ColumnSet::replicated(&header_fields, expected);
    header_columns.check_length("header table", expected)?;

    check_columns_disjoint(&[
        ("header table", header_columns.names().collect()),
        ("series table", series_columns.names().collect()),
        ("observation table", obs_columns.names().collect()),
    ])?;

    let mut columns = header_columns.into_columns();
    columns.extend(series_columns.into_columns());
    columns.extend(obs_columns.into_columns());
    let mut table = TidyTable::from_columns(columns)?;
    canonicalize(&mut table, &[], COMPACT20_FORBIDDEN_MARKERS, expected)?;
    Ok(table)
}

/// Transform a Compact 2.0 message, optionally enriched by a structure message.
pub fn transform_compact20(
    xml_path: &Path,
    structure_path: Option<&Path>,
    options: &TransformOptions,
) -> Result<TransformOutput> {
    let span = info_span!("sdmx_compact_2_0", path = %xml_path.display());
    let _guard = span.enter();
    let started = Instant::now();

    let table = tabulate_compact20(xml_path, options)?;
    let structure = structure_path.map(read_structure).transpose()?;
    let output = write_outputs(&table, xml_path, CSV_FILE_NAME, structure.as_ref(), options)?;

    info!(
        row_count = output.row_count,
        duration_ms = started.elapsed().as_millis(),
        "compact 2.0 transform complete"
    );
    Ok(output)
}

/// Registry adapter: the message first, an optional structure message second.
pub(crate) fn run(inputs: &[PathBuf], options: &TransformOptions) -> Result<TransformOutput> {
    match inputs {
        [xml] => transform_compact20(xml, None, options),
        [xml, structure] => transform_compact20(xml, Some(structure.as_path()), options),
        _ => Err(TransformError::InputCount {
            transform: "sdmx_compact_2_0",
            expected: "1 or 2",
            found: inputs.len(),
        }),
    }
}
