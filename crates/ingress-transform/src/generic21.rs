//! SDMX-ML Generic 2.1 data messages to tidy CSV.
//!
//! Generic messages spell every component out as an element. A `Series` holds
//! a `SeriesKey` and `Attributes`, each a list of `Value id=.. value=..`, and
//! then its `Obs` elements. Each `Obs` is merged with its owning series values
//! into one record, so every record becomes one output row directly.

use std::path::{Path, PathBuf};
use std::time::Instant;

use indexmap::IndexMap;
use tracing::{debug, info, info_span};

use crate::checks::{
    GENERIC21_HEADER_FIELDS, check_columns_disjoint, check_header_fields,
    check_obs_dicts_have_same_keys, check_xml_type, read_xml_text,
};
use crate::columns::ColumnSet;
use crate::count::{count_markers, marker};
use crate::error::{Result, TransformError};
use crate::flatten::flatten_header;
use crate::options::TransformOptions;
use crate::output::{CSV_FILE_NAME, TransformOutput, canonicalize, write_outputs};
use crate::table::TidyTable;
use crate::xml::{XmlElement, parse_document};

/// Root element of a Generic 2.1 message.
pub const GENERIC21_WRAPPER: &str = "GenericData";

/// Markers that must not survive in Generic 2.1 output column names.
pub const GENERIC21_FORBIDDEN_MARKERS: &[&str] = &["@", "#", "generic:"];

/// Record key holding the observation dimension value.
pub const OBS_DIMENSION_KEY: &str = "generic:ObsDimension";
/// Record key holding the observation value.
pub const OBS_VALUE_KEY: &str = "generic:ObsValue";

const DEFAULT_PREFIX: &str = "generic";

type Record = IndexMap<String, String>;

/// Add the `id`/`value` pairs of every `Value` under `element` to `record`.
fn collect_values(element: &XmlElement, record: &mut Record) {
    for value in element.children_named("Value") {
        if let Some(id) = value.attr("id") {
            let text = value.attr("value").unwrap_or_default();
            record.insert(id.to_string(), text.to_string());
        }
    }
}

/// The single value carried by an `ObsDimension` or `ObsValue` element.
fn component_value(element: &XmlElement) -> String {
    element
        .attr("value")
        .or_else(|| element.attributes.values().next().map(String::as_str))
        .unwrap_or(&element.text)
        .to_string()
}

/// One record per `Obs`, in document order.
fn observation_records(data_set: &XmlElement) -> Vec<Record> {
    let mut records = Vec::new();
    for series in data_set.children_named("Series") {
        let mut series_values = Record::new();
        for part in &series.children {
            match part.local_name() {
                "SeriesKey" | "Attributes" => collect_values(part, &mut series_values),
                _ => {}
            }
        }
        for obs in series.children_named("Obs") {
            let mut record = series_values.clone();
            for part in &obs.children {
                match part.local_name() {
                    "Attributes" => collect_values(part, &mut record),
                    "ObsDimension" => {
                        record.insert(OBS_DIMENSION_KEY.to_string(), component_value(part));
                    }
                    "ObsValue" => {
                        record.insert(OBS_VALUE_KEY.to_string(), component_value(part));
                    }
                    _ => {}
                }
            }
            records.push(record);
        }
    }
    records
}

/// Parse and validate a Generic 2.1 message into a tidy table.
pub fn tabulate_generic21(path: &Path) -> Result<TidyTable> {
    let text = read_xml_text(path)?;
    let doc = parse_document(&text, path)?;
    let root = check_xml_type(&doc, GENERIC21_WRAPPER, path)?;

    let header = root
        .child("Header")
        .ok_or_else(|| TransformError::MissingElement {
            path: path.to_path_buf(),
            element: "Header",
        })?;
    check_header_fields(header, GENERIC21_HEADER_FIELDS, "Generic 2.1")?;

    let prefix = root
        .descendants()
        .find(|e| e.local_name() == "ObsValue")
        .map_or(Some(DEFAULT_PREFIX), XmlElement::prefix);
    let expected = count_markers(&text, prefix, "ObsValue");
    if expected == 0 {
        return Err(TransformError::NoObservations {
            path: path.to_path_buf(),
            marker: marker(prefix, "ObsValue"),
        });
    }
    debug!(expected, "counted observation value markers");

    let data_set = root
        .child("DataSet")
        .ok_or_else(|| TransformError::MissingElement {
            path: path.to_path_buf(),
            element: "DataSet",
        })?;
    let records = observation_records(data_set);
    check_obs_dicts_have_same_keys(&records)?;

    let mut obs_columns = ColumnSet::new();
    for record in &records {
        obs_columns.push_record(record.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    obs_columns.check_length("observation table", expected)?;

    let header_fields = flatten_header(header)
        .map_err(|source| TransformError::HeaderUnpackedCheckFailed { source })?;
    let header_columns = ColumnSet::replicated(&header_fields, expected);
    header_columns.check_length("header table", expected)?;

    check_columns_disjoint(&[
        ("header table", header_columns.names().collect()),
        ("observation table", obs_columns.names().collect()),
    ])?;

    let mut columns = header_columns.into_columns();
    columns.extend(obs_columns.into_columns());
    let mut table = TidyTable::from_columns(columns)?;
    canonicalize(
        &mut table,
        &[(OBS_DIMENSION_KEY, "TIME_PERIOD"), (OBS_VALUE_KEY, "OBS_VALUE")],
        GENERIC21_FORBIDDEN_MARKERS,
        expected,
    )?;
    Ok(table)
}

/// Transform a Generic 2.1 message.
pub fn transform_generic21(xml_path: &Path, options: &TransformOptions) -> Result<TransformOutput> {
    let span = info_span!("sdmx_generic_2_1", path = %xml_path.display());
    let _guard = span.enter();
    let started = Instant::now();

    let table = tabulate_generic21(xml_path)?;
    let output = write_outputs(&table, xml_path, CSV_FILE_NAME, None, options)?;

    info!(
        row_count = output.row_count,
        duration_ms = started.elapsed().as_millis(),
        "generic 2.1 transform complete"
    );
    Ok(output)
}

pub(crate) fn run(inputs: &[PathBuf], options: &TransformOptions) -> Result<TransformOutput> {
    match inputs {
        [xml] => transform_generic21(xml, options),
        _ => Err(TransformError::InputCount {
            transform: "sdmx_generic_2_1",
            expected: "1",
            found: inputs.len(),
        }),
    }
}
