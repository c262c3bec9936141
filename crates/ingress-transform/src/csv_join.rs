//! Concatenation of CSV files that share one header.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, info_span};

use crate::checks::check_row_count;
use crate::columns::ColumnSet;
use crate::error::{Result, TransformError};
use crate::options::TransformOptions;
use crate::output::{JOINED_CSV_FILE_NAME, TransformOutput, canonicalize, write_outputs};
use crate::table::TidyTable;

/// Markers that must not survive in joined output column names.
pub const CSV_JOIN_FORBIDDEN_MARKERS: &[&str] = &["@", "na:"];

/// Header and rows of one CSV input.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CsvInput {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn read_csv(path: &Path) -> Result<CsvInput> {
    let csv_error = |source| TransformError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error)?;
    let header: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(CsvInput { header, rows })
}

/// Stack `inputs` into one table. Every header must equal the first.
pub fn tabulate_csv_join(inputs: &[PathBuf]) -> Result<TidyTable> {
    if inputs.len() < 2 {
        return Err(TransformError::InputCount {
            transform: "csv_join",
            expected: "2 or more",
            found: inputs.len(),
        });
    }

    let mut header: Option<Vec<String>> = None;
    let mut columns = ColumnSet::new();
    let mut expected = 0;
    for path in inputs {
        let input = read_csv(path)?;
        let first = header.get_or_insert_with(|| input.header.clone());
        if *first != input.header {
            return Err(TransformError::CsvHeaderMismatch {
                path: path.clone(),
                expected: first.clone(),
                found: input.header,
            });
        }
        debug!(path = %path.display(), rows = input.rows.len(), "read CSV input");
        expected += input.rows.len();
        for row in &input.rows {
            columns.push_record(
                input
                    .header
                    .iter()
                    .map(String::as_str)
                    .zip(row.iter().map(String::as_str)),
            );
        }
    }
    check_row_count("joined table", columns.row_count(), expected)?;

    let mut table = TidyTable::from_columns(columns.into_columns())?;
    canonicalize(&mut table, &[], CSV_JOIN_FORBIDDEN_MARKERS, expected)?;
    Ok(table)
}

/// Join `inputs`, writing `joined.csv` and its metadata beside the first input.
pub fn transform_csv_join(inputs: &[PathBuf], options: &TransformOptions) -> Result<TransformOutput> {
    let span = info_span!("csv_join", inputs = inputs.len());
    let _guard = span.enter();
    let started = Instant::now();

    let table = tabulate_csv_join(inputs)?;
    let primary = inputs.first().ok_or(TransformError::InputCount {
        transform: "csv_join",
        expected: "2 or more",
        found: 0,
    })?;
    let output = write_outputs(&table, primary, JOINED_CSV_FILE_NAME, None, options)?;

    info!(
        row_count = output.row_count,
        duration_ms = started.elapsed().as_millis(),
        "csv join complete"
    );
    Ok(output)
}

pub(crate) fn run(inputs: &[PathBuf], options: &TransformOptions) -> Result<TransformOutput> {
    transform_csv_join(inputs, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn stacks_rows_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", "GEO,OBS_VALUE\nUK,1\n");
        let b = write(dir.path(), "b.csv", "GEO,OBS_VALUE\nFR,2\nDE,3\n");
        let table = tabulate_csv_join(&[a, b]).unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(
            table.column_values("GEO"),
            Some(vec!["UK".to_string(), "FR".to_string(), "DE".to_string()])
        );
    }

    #[test]
    fn single_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", "GEO\nUK\n");
        assert!(matches!(
            tabulate_csv_join(&[a]),
            Err(TransformError::InputCount { found: 1, .. })
        ));
    }
}
