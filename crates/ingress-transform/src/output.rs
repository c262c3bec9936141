//! Writing transform results next to the primary input.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::checks::{canonical_column_name, check_row_count, check_tidy_data_columns, check_unique_names};
use crate::error::{Result, TransformError};
use crate::metadata::{generate_versions_metadata, write_metadata};
use crate::options::TransformOptions;
use crate::structure::StructureDefinition;
use crate::table::TidyTable;

/// File name of the tidy CSV written by the SDMX transforms.
pub const CSV_FILE_NAME: &str = "data.csv";
/// File name of the tidy CSV written by the CSV join.
pub const JOINED_CSV_FILE_NAME: &str = "joined.csv";
/// File name of the metadata document.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Paths produced by a successful transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub csv_path: PathBuf,
    pub metadata_path: PathBuf,
    pub row_count: usize,
}

/// Strip serialization markers from column names, apply `renames`, then check
/// the result: names are unique, free of `forbidden` markers, and the table
/// still has `expected_rows` rows.
pub(crate) fn canonicalize(
    table: &mut TidyTable,
    renames: &[(&str, &str)],
    forbidden: &[&'static str],
    expected_rows: usize,
) -> Result<()> {
    let rename = |name: &str| {
        renames
            .iter()
            .find(|(from, _)| *from == name)
            .map_or_else(|| canonical_column_name(name), |(_, to)| (*to).to_string())
    };
    let names: Vec<String> = table.column_names().iter().map(|n| rename(n)).collect();
    check_unique_names(&names, "tidy table")?;
    table.rename_columns(rename)?;

    check_row_count("tidy table", table.height(), expected_rows)?;
    check_tidy_data_columns(&names, forbidden)
}

/// Write `table` and its metadata beside `primary_input`.
///
/// Both files are written under `.tmp` names and renamed into place only once
/// both exist. On any error neither output is left behind.
pub(crate) fn write_outputs(
    table: &TidyTable,
    primary_input: &Path,
    csv_name: &str,
    structure: Option<&StructureDefinition>,
    options: &TransformOptions,
) -> Result<TransformOutput> {
    let started = Instant::now();
    let dir = primary_input.parent().unwrap_or_else(|| Path::new("."));
    let csv_path = dir.join(csv_name);
    let metadata_path = dir.join(METADATA_FILE_NAME);
    let csv_temp = csv_path.with_extension("csv.tmp");
    let metadata_temp = metadata_path.with_extension("json.tmp");

    let written = stage_outputs(table, &csv_temp, &metadata_temp, structure, options)
        .and_then(|()| commit(&csv_temp, &csv_path))
        .and_then(|()| {
            commit(&metadata_temp, &metadata_path).inspect_err(|_| remove_partial(&csv_path))
        });
    if let Err(err) = written {
        remove_partial(&csv_temp);
        remove_partial(&metadata_temp);
        return Err(err);
    }

    info!(
        csv = %csv_path.display(),
        metadata = %metadata_path.display(),
        row_count = table.height(),
        duration_ms = started.elapsed().as_millis(),
        "transform outputs written"
    );
    Ok(TransformOutput {
        csv_path,
        metadata_path,
        row_count: table.height(),
    })
}

fn stage_outputs(
    table: &TidyTable,
    csv_temp: &Path,
    metadata_temp: &Path,
    structure: Option<&StructureDefinition>,
    options: &TransformOptions,
) -> Result<()> {
    table.write_csv(csv_temp)?;
    let document = generate_versions_metadata(
        table,
        csv_temp,
        structure,
        options.metadata_template.as_deref(),
    )?;
    write_metadata(&document, metadata_temp)
}

fn commit(temp_path: &Path, target_path: &Path) -> Result<()> {
    std::fs::rename(temp_path, target_path).map_err(|e| TransformError::AtomicWriteFailed {
        temp_path: temp_path.to_path_buf(),
        target_path: target_path.to_path_buf(),
        source: e,
    })
}

fn remove_partial(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "could not remove partial output");
    }
}
