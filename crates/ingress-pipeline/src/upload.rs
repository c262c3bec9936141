//! Upload routes for transform outputs and pass-through files.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{IngressError, Result};

/// Where finished files are sent.
pub trait Uploader {
    fn upload_csv(&self, path: &Path) -> Result<()>;

    fn upload_sdmx(&self, path: &Path) -> Result<()>;

    fn upload_json(&self, path: &Path) -> Result<()>;
}

/// Copies uploads into an outbox directory, one subdirectory per route.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    outbox: PathBuf,
}

impl DirectoryUploader {
    pub fn new(outbox: impl Into<PathBuf>) -> Self {
        Self {
            outbox: outbox.into(),
        }
    }

    pub fn outbox(&self) -> &Path {
        &self.outbox
    }

    fn copy_into(&self, route: &str, path: &Path) -> Result<()> {
        let upload_error = |source| IngressError::Upload {
            path: path.to_path_buf(),
            source,
        };
        let dir = self.outbox.join(route);
        std::fs::create_dir_all(&dir).map_err(upload_error)?;
        let file_name = path.file_name().ok_or_else(|| {
            upload_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no file name",
            ))
        })?;
        let dest = dir.join(file_name);
        std::fs::copy(path, &dest).map_err(upload_error)?;
        info!(route, from = %path.display(), to = %dest.display(), "file uploaded");
        Ok(())
    }
}

impl Uploader for DirectoryUploader {
    fn upload_csv(&self, path: &Path) -> Result<()> {
        self.copy_into("csv", path)
    }

    fn upload_sdmx(&self, path: &Path) -> Result<()> {
        self.copy_into("sdmx", path)
    }

    fn upload_json(&self, path: &Path) -> Result<()> {
        self.copy_into("json", path)
    }
}

/// Logs each upload and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkippedUploader;

impl SkippedUploader {
    fn skip(route: &str, path: &Path) -> Result<()> {
        info!(route, path = %path.display(), "upload skipped");
        Ok(())
    }
}

impl Uploader for SkippedUploader {
    fn upload_csv(&self, path: &Path) -> Result<()> {
        Self::skip("csv", path)
    }

    fn upload_sdmx(&self, path: &Path) -> Result<()> {
        Self::skip("sdmx", path)
    }

    fn upload_json(&self, path: &Path) -> Result<()> {
        Self::skip("json", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_uploader_routes_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("data.csv");
        std::fs::write(&source, "A\n1\n").unwrap();

        let uploader = DirectoryUploader::new(dir.path().join("outbox"));
        uploader.upload_csv(&source).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("outbox/csv/data.csv")).unwrap(),
            "A\n1\n"
        );
    }

    #[test]
    fn missing_source_is_an_upload_error() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = DirectoryUploader::new(dir.path().join("outbox"));
        let err = uploader
            .upload_json(&dir.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, IngressError::Upload { .. }));
    }
}
