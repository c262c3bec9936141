//! File store backed by a local submission directory.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::FileStore;

/// A directory holding one submission's decompressed files.
///
/// Only regular files directly inside the directory are visible.
#[derive(Debug, Clone)]
pub struct LocalDirectoryStore {
    root: PathBuf,
}

impl LocalDirectoryStore {
    /// Open `root`, which must be an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::DirectoryNotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of_lone_match(&self, pattern: &str) -> Result<PathBuf> {
        Ok(self.root.join(self.lone_file_matching(pattern)?))
    }
}

impl FileStore for LocalDirectoryStore {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn list_file_names(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| StoreError::DirectoryRead {
            path: self.root.clone(),
            source: e,
        })?;

        let mut names = Vec::new();
        for entry_result in entries {
            let entry = entry_result.map_err(|e| StoreError::DirectoryRead {
                path: self.root.clone(),
                source: e,
            })?;

            // Skip directories
            if !entry.path().is_file() {
                continue;
            }

            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    fn save_lone_file_matching(&self, pattern: &str, dest_dir: Option<&Path>) -> Result<PathBuf> {
        let source = self.path_of_lone_match(pattern)?;
        let Some(dest_dir) = dest_dir else {
            return Ok(source);
        };

        let Some(file_name) = source.file_name() else {
            return Ok(source);
        };
        let dest = dest_dir.join(file_name);
        if dest != source {
            std::fs::copy(&source, &dest).map_err(|e| StoreError::Copy {
                from: source.clone(),
                to: dest.clone(),
                source: e,
            })?;
        }
        debug!(pattern, path = %dest.display(), "materialized file");
        Ok(dest)
    }

    fn get_lone_matching_json_as_dict(&self, pattern: &str) -> Result<Map<String, Value>> {
        let path = self.path_of_lone_match(pattern)?;
        let text = std::fs::read_to_string(&path).map_err(|e| StoreError::JsonRead {
            path: path.clone(),
            source: e,
        })?;
        match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::NotAnObject { path }),
            Err(e) => Err(StoreError::JsonParse { path, source: e }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in &["data.xml", "manifest.json", "part-1.csv", "part-2.csv"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        dir
    }

    #[test]
    fn test_list_file_names_sorted_and_skips_directories() {
        let dir = create_test_dir();
        let store = LocalDirectoryStore::new(dir.path()).unwrap();
        assert_eq!(
            store.list_file_names().unwrap(),
            vec!["data.xml", "manifest.json", "part-1.csv", "part-2.csv"]
        );
    }

    #[test]
    fn test_lone_match_requires_exactly_one() {
        let dir = create_test_dir();
        let store = LocalDirectoryStore::new(dir.path()).unwrap();
        assert!(store.has_lone_file_matching(r"^data\.xml$").unwrap());
        assert!(!store.has_lone_file_matching(r"^part-\d\.csv$").unwrap());
        assert!(!store.has_lone_file_matching(r"^missing$").unwrap());
    }

    #[test]
    fn test_not_a_directory() {
        let dir = create_test_dir();
        let result = LocalDirectoryStore::new(dir.path().join("data.xml"));
        assert!(matches!(result, Err(StoreError::DirectoryNotFound { .. })));
    }
}
