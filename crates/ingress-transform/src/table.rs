//! The tidy output table.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::error::{Result, TransformError};

/// One row per observation, every column a string column.
#[derive(Debug, Clone)]
pub struct TidyTable {
    frame: DataFrame,
}

impl TidyTable {
    /// Build from named columns of equal length.
    pub fn from_columns(columns: Vec<(String, Vec<String>)>) -> Result<Self> {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| Column::new(name.into(), values))
            .collect();
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names_owned()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Values of a column, or `None` when the table has no such column.
    pub fn column_values(&self, name: &str) -> Option<Vec<String>> {
        let values = self.frame.column(name).ok()?.str().ok()?;
        Some(
            values
                .into_iter()
                .map(|value| value.unwrap_or_default().to_string())
                .collect(),
        )
    }

    /// First value of a column.
    pub fn first_value(&self, name: &str) -> Option<String> {
        let values = self.frame.column(name).ok()?.str().ok()?;
        values.get(0).map(str::to_string)
    }

    /// Rename every column through `rename`, keeping order.
    pub fn rename_columns(&mut self, rename: impl Fn(&str) -> String) -> Result<()> {
        let columns: Vec<Column> = self
            .frame
            .get_columns()
            .iter()
            .map(|col| {
                let renamed = rename(col.name().as_str());
                col.clone().with_name(renamed.into())
            })
            .collect();
        self.frame = DataFrame::new(columns)?;
        Ok(())
    }

    /// Write as UTF-8 CSV with a header row and no index column.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path).map_err(|e| TransformError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut frame = self.frame.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)?;
        Ok(())
    }
}
