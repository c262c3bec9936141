//! Column-oriented accumulation of records.

use indexmap::IndexMap;

use crate::error::{Result, TransformError};
use crate::flatten::FlatMap;

/// Parallel string columns that always have the same length.
///
/// Records are appended one at a time. A key first seen in a later record is
/// back-filled with empty strings, and a key missing from a record gets an
/// empty string for that row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: IndexMap<String, Vec<String>>,
    rows: usize,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record.
    pub fn push_record<'a, I>(&mut self, record: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let rows = self.rows;
        for (key, value) in record {
            let column = self
                .columns
                .entry(key.to_string())
                .or_insert_with(|| vec![String::new(); rows]);
            if column.len() > rows {
                // Repeated key within one record: last value wins.
                column[rows] = value.to_string();
            } else {
                column.push(value.to_string());
            }
        }
        self.rows += 1;
        for column in self.columns.values_mut() {
            column.resize(self.rows, String::new());
        }
    }

    /// A single record repeated `rows` times.
    pub fn replicated(record: &FlatMap, rows: usize) -> Self {
        Self {
            columns: record
                .iter()
                .map(|(key, value)| (key.clone(), vec![value.clone(); rows]))
                .collect(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Fail unless every column holds `expected` values.
    pub fn check_length(&self, stage: &'static str, expected: usize) -> Result<()> {
        let mismatch = std::iter::once(self.rows)
            .chain(self.columns.values().map(Vec::len))
            .find(|len| *len != expected);
        match mismatch {
            Some(actual) => Err(TransformError::ExpectedObsCountMismatch {
                stage,
                expected,
                actual,
            }),
            None => Ok(()),
        }
    }

    pub fn into_columns(self) -> Vec<(String, Vec<String>)> {
        self.columns.into_iter().collect()
    }
}
