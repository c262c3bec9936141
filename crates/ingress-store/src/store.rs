//! The file store collaborator seen by the orchestrator.

use std::path::{Path, PathBuf};

use ingress_model::compile_prefix_regex;
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

/// A submission's files, addressed by name.
///
/// Lookups take a regular expression matched from the start of each file name.
/// A "lone" match means exactly one file name matches.
pub trait FileStore {
    /// Human-readable location used in diagnostics.
    fn location(&self) -> String;

    /// All file names in the store, sorted.
    fn list_file_names(&self) -> Result<Vec<String>>;

    /// Make the lone file matching `pattern` available as a local path.
    ///
    /// With `dest_dir` the file is copied there; otherwise the store may return
    /// a path it already owns.
    fn save_lone_file_matching(&self, pattern: &str, dest_dir: Option<&Path>) -> Result<PathBuf>;

    /// Parse the lone file matching `pattern` as a JSON object.
    fn get_lone_matching_json_as_dict(&self, pattern: &str) -> Result<Map<String, Value>>;

    /// File names matching `pattern`, in listing order.
    fn files_matching(&self, pattern: &str) -> Result<Vec<String>> {
        let regex = compile_prefix_regex(pattern)?;
        Ok(self
            .list_file_names()?
            .into_iter()
            .filter(|name| regex.is_match(name))
            .collect())
    }

    /// Returns true iff exactly one file name matches `pattern`.
    fn has_lone_file_matching(&self, pattern: &str) -> Result<bool> {
        Ok(self.files_matching(pattern)?.len() == 1)
    }

    /// The name of the lone file matching `pattern`.
    fn lone_file_matching(&self, pattern: &str) -> Result<String> {
        let mut matched = self.files_matching(pattern)?;
        if matched.len() == 1 {
            Ok(matched.remove(0))
        } else {
            Err(StoreError::NoLoneMatch {
                pattern: pattern.to_string(),
                matched,
            })
        }
    }
}
