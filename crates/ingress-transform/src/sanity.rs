//! Cheap checks run on each materialized input before the transform.

use std::path::Path;

use ingress_model::SanityCheck;
use tracing::debug;

use crate::checks::read_xml_text;
use crate::error::{Result, TransformError};

fn require_extension(path: &Path, extension: &str) -> Result<()> {
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if matches {
        Ok(())
    } else {
        Err(TransformError::InvalidInputFile {
            path: path.to_path_buf(),
            reason: format!("expected a .{extension} file"),
        })
    }
}

/// The file is named `*.xml`, is text, and starts with an XML declaration.
pub fn check_sdmx_xml(path: &Path) -> Result<()> {
    require_extension(path, "xml")?;
    read_xml_text(path)?;
    Ok(())
}

/// The file is named `*.csv` and its header row can be read.
pub fn check_csv(path: &Path) -> Result<()> {
    require_extension(path, "csv")?;
    let mut reader = csv::Reader::from_path(path).map_err(|source| TransformError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let header = reader.headers().map_err(|source| TransformError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    if header.is_empty() {
        return Err(TransformError::InvalidInputFile {
            path: path.to_path_buf(),
            reason: "CSV has no header row".to_string(),
        });
    }
    Ok(())
}

/// Run `check` against `path`.
pub fn run_sanity_check(check: SanityCheck, path: &Path) -> Result<()> {
    debug!(check = %check, path = %path.display(), "running sanity check");
    match check {
        SanityCheck::SdmxXml => check_sdmx_xml(path),
        SanityCheck::Csv => check_csv(path),
        SanityCheck::None => Ok(()),
    }
}
