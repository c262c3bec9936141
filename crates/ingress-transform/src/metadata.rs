//! Dataset version metadata derived from the tidy table.
//!
//! Only a handful of fields can be inferred from the data. Everything else is
//! written as an empty string (or a list of them) so downstream consumers see
//! the full document shape.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::{Result, TransformError};
use crate::structure::StructureDefinition;
use crate::table::TidyTable;

/// Licence applied to every published version.
pub const OPEN_GOVERNMENT_LICENCE: &str =
    "http://www.nationalarchives.gov.uk/doc/open-government-licence/version/3/";

/// Base of the dataset editions URL.
pub const DATASETS_BASE_URL: &str = "https://staging.idpd.uk/datasets/";

#[derive(Debug, Clone, Default, Serialize)]
struct Contact {
    email: String,
    name: String,
    telephone: String,
}

#[derive(Debug, Clone, Serialize)]
struct ColumnSchema {
    component_type: String,
    datatype: String,
    name: String,
    titles: String,
    property_url: String,
    value_url: String,
    codelist_url: String,
    sub_property_of: String,
}

#[derive(Debug, Clone, Serialize)]
struct TableSchema {
    about_url: String,
    column: Vec<ColumnSchema>,
}

#[derive(Debug, Clone, Serialize)]
struct Distribution {
    checksum: String,
    #[serde(rename = "@id")]
    id: String,
    byte_size: u64,
    media_type: String,
    download_url: String,
    described_by: String,
    table_schema: TableSchema,
}

#[derive(Debug, Clone, Default, Serialize)]
struct BasedOn {
    id: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Clone, Serialize)]
struct Embedded {
    code_list: String,
    identifier: String,
    label: String,
    name: String,
}

impl Default for Embedded {
    fn default() -> Self {
        let placeholder = || "string".to_string();
        Self {
            code_list: placeholder(),
            identifier: placeholder(),
            label: placeholder(),
            name: placeholder(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct VersionsMetadata {
    title: String,
    description: String,
    summary: String,
    identifier: String,
    issued: String,
    license: String,
    modified: String,
    next_release: String,
    publisher: Contact,
    frequency: String,
    spatial_coverage: String,
    spatial_resolution: Vec<String>,
    temporal_coverage: String,
    temporal_resolution: String,
    contact_point: Contact,
    keywords: Vec<String>,
    themes: Vec<String>,
    distributions: Vec<Distribution>,
    version_notes: Vec<String>,
    #[serde(rename = "@context")]
    context: String,
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    kind: String,
    etag: String,
    is_based_on: BasedOn,
    #[serde(rename = "_embedded")]
    embedded: Embedded,
    #[serde(rename = "type")]
    version_type: String,
    state: String,
}

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_/]").expect("Invalid non-word regex"));
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("Invalid dash regex"));

/// Turn a label into an ASCII URL path segment.
///
/// Accented letters lose their diacritics; any other non-ASCII character
/// becomes a dash.
pub fn pathify(label: &str) -> String {
    let folded: String = label
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let dashed = NON_WORD.replace_all(&folded, "-");
    let collapsed = DASHES.replace_all(&dashed, "-");
    collapsed
        .strip_suffix('-')
        .unwrap_or(&collapsed)
        .to_string()
}

/// Normalize an SDMX timestamp to `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Offsets are converted to UTC and fractional seconds dropped. Values that do
/// not parse fall back to their text before any `+` or `.`, with `Z` appended.
pub fn to_utc_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    let stem = raw.split(['+', '.']).next().unwrap_or(raw);
    format!("{stem}Z")
}

fn unique_in_order(values: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

fn temporal_coverage(table: &TidyTable) -> String {
    let Some(periods) = table.column_values("TIME_PERIOD") else {
        return String::new();
    };
    match (periods.iter().min(), periods.iter().max()) {
        (Some(start), Some(end)) => format!("start: {start}, end: {end}"),
        _ => String::new(),
    }
}

fn column_schema(name: &str, structure: Option<&StructureDefinition>) -> ColumnSchema {
    let titles = structure
        .and_then(|s| s.title(name))
        .map_or_else(|| name.to_lowercase(), str::to_string);
    let datatype = structure
        .and_then(|s| s.datatype(name))
        .unwrap_or("string")
        .to_string();
    ColumnSchema {
        component_type: String::new(),
        datatype,
        name: name.to_string(),
        titles,
        property_url: String::new(),
        value_url: String::new(),
        codelist_url: String::new(),
        sub_property_of: String::new(),
    }
}

/// Checksum and size of a written file.
fn file_digest(path: &Path) -> Result<(String, u64)> {
    let bytes = std::fs::read(path).map_err(|e| TransformError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let checksum = hex::encode(Sha256::digest(&bytes));
    Ok((checksum, bytes.len() as u64))
}

fn read_template(path: &Path) -> Result<Map<String, Value>> {
    let text = std::fs::read_to_string(path).map_err(|e| TransformError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    match serde_json::from_str(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(TransformError::MetadataTemplate {
            path: path.to_path_buf(),
            message: "template is not a JSON object".to_string(),
        }),
        Err(e) => Err(TransformError::MetadataTemplate {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// Build the metadata document for `table`, already written to `csv_path`.
///
/// Populated fields overwrite keys of the same name in `template`.
pub fn generate_versions_metadata(
    table: &TidyTable,
    csv_path: &Path,
    structure: Option<&StructureDefinition>,
    template: Option<&Path>,
) -> Result<Value> {
    let title = table.first_value("TITLE").unwrap_or_default();
    let (checksum, byte_size) = file_digest(csv_path)?;

    let columns = table
        .column_names()
        .iter()
        .map(|name| column_schema(name, structure))
        .collect();

    let metadata = VersionsMetadata {
        identifier: format!("{DATASETS_BASE_URL}{}/editions", pathify(&title)),
        title,
        description: String::new(),
        summary: String::new(),
        issued: structure
            .and_then(|s| s.prepared.as_deref())
            .map(to_utc_timestamp)
            .unwrap_or_default(),
        license: OPEN_GOVERNMENT_LICENCE.to_string(),
        modified: table
            .first_value("Extracted")
            .map(|raw| to_utc_timestamp(&raw))
            .unwrap_or_default(),
        next_release: String::new(),
        publisher: Contact::default(),
        frequency: String::new(),
        spatial_coverage: table.first_value("REF_AREA").unwrap_or_default(),
        spatial_resolution: table
            .column_values("COUNTERPART_AREA")
            .map(unique_in_order)
            .unwrap_or_default(),
        temporal_coverage: temporal_coverage(table),
        temporal_resolution: table.first_value("TIME_FORMAT").unwrap_or_default(),
        contact_point: Contact::default(),
        keywords: vec![String::new(); 2],
        themes: vec![String::new(); 2],
        distributions: vec![Distribution {
            checksum,
            id: String::new(),
            byte_size,
            media_type: "text/csv".to_string(),
            download_url: String::new(),
            described_by: String::new(),
            table_schema: TableSchema {
                about_url: String::new(),
                column: columns,
            },
        }],
        version_notes: vec![String::new()],
        context: String::new(),
        id: String::new(),
        kind: "dcat:dataset".to_string(),
        etag: String::new(),
        is_based_on: BasedOn::default(),
        embedded: Embedded::default(),
        version_type: String::new(),
        state: String::new(),
    };

    let mut document = match template {
        Some(path) => read_template(path)?,
        None => Map::new(),
    };
    if let Value::Object(populated) = serde_json::to_value(&metadata)? {
        document.extend(populated);
    }
    Ok(Value::Object(document))
}

/// Write the metadata document as pretty JSON.
pub fn write_metadata(document: &Value, path: &Path) -> Result<()> {
    let mut text = serde_json::to_string_pretty(document)?;
    text.push('\n');
    std::fs::write(path, text).map_err(|e| TransformError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
