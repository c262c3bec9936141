//! Structural invariant checks shared by the transforms.

use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::flatten::strip_namespace;
use crate::xml::{XmlDocument, XmlElement};

/// Header elements of an SDMX-ML Compact 2.0 message.
pub const COMPACT20_HEADER_FIELDS: &[&str] = &[
    "ID",
    "Test",
    "Name",
    "Prepared",
    "Sender",
    "Receiver",
    "KeyFamilyRef",
    "KeyFamilyAgency",
    "DataSetAgency",
    "DataSetID",
    "DataSetAction",
    "Extracted",
    "Source",
];

/// Header elements of an SDMX-ML Generic 2.1 message.
pub const GENERIC21_HEADER_FIELDS: &[&str] = &[
    "ID",
    "Test",
    "Prepared",
    "Sender",
    "Receiver",
    "Name",
    "Structure",
    "DataSetAction",
    "DataSetID",
    "Extracted",
    "Source",
];

/// Read `path` and require it to start with an XML declaration.
pub fn read_xml_text(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|e| TransformError::InvalidInputFile {
        path: path.to_path_buf(),
        reason: format!("cannot be read as text: {e}"),
    })?;
    if !text.starts_with("<?xml") {
        return Err(TransformError::InvalidInputFile {
            path: path.to_path_buf(),
            reason: "file does not start with an XML declaration".to_string(),
        });
    }
    Ok(text)
}

/// Require exactly one top-level element whose local name is `wrapper`.
pub fn check_xml_type<'a>(
    doc: &'a XmlDocument,
    wrapper: &'static str,
    path: &Path,
) -> Result<&'a XmlElement> {
    doc.single_root()
        .filter(|root| root.local_name() == wrapper)
        .ok_or_else(|| TransformError::UnrecognisedXmlDialect {
            path: path.to_path_buf(),
            expected: wrapper,
            found: doc.root_names(),
        })
}

/// Require the header's direct children to be exactly `expected`.
///
/// Repeated elements (a multilingual `Name`, say) count once.
pub fn check_header_fields(
    header: &XmlElement,
    expected: &[&str],
    dialect: &'static str,
) -> Result<()> {
    let found: BTreeSet<&str> = header
        .children
        .iter()
        .map(|c| strip_namespace(&c.name))
        .collect();
    let expected: BTreeSet<&str> = expected.iter().copied().collect();

    let unexpected: Vec<String> = found.difference(&expected).map(|s| s.to_string()).collect();
    let missing: Vec<String> = expected.difference(&found).map(|s| s.to_string()).collect();
    if unexpected.is_empty() && missing.is_empty() {
        Ok(())
    } else {
        Err(TransformError::HeaderFieldMismatch {
            dialect,
            unexpected,
            missing,
        })
    }
}

/// Require that no column name appears in more than one of `tables`.
pub fn check_columns_disjoint<'a>(tables: &[(&'static str, Vec<&'a str>)]) -> Result<()> {
    let mut owner: IndexMap<&'a str, &'static str> = IndexMap::new();
    for (table, columns) in tables {
        for &column in columns {
            if let Some(first) = owner.insert(column, *table) {
                return Err(TransformError::ColumnUniquenessViolation {
                    column: column.to_string(),
                    first,
                    second: *table,
                });
            }
        }
    }
    Ok(())
}

/// Require the final column names to be unique.
pub fn check_unique_names(names: &[String], stage: &'static str) -> Result<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(TransformError::ColumnUniquenessViolation {
                column: name.clone(),
                first: stage,
                second: stage,
            });
        }
    }
    Ok(())
}

/// Require every record to carry the same key set as the first.
pub fn check_obs_dicts_have_same_keys(records: &[IndexMap<String, String>]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let expected: BTreeSet<&str> = first.keys().map(String::as_str).collect();
    for (index, record) in records.iter().enumerate().skip(1) {
        let found: BTreeSet<&str> = record.keys().map(String::as_str).collect();
        if found != expected {
            return Err(TransformError::ObsDictsHomogeneityViolation {
                index,
                expected: first.keys().cloned().collect(),
                found: record.keys().cloned().collect(),
            });
        }
    }
    debug!(records = records.len(), "observation records are homogeneous");
    Ok(())
}

/// Strip the `@` and `#` characters left by attribute and text keys.
pub fn canonical_column_name(name: &str) -> String {
    name.replace(['@', '#'], "")
}

/// Require that no column name contains any of `markers`.
pub fn check_tidy_data_columns(names: &[String], markers: &[&'static str]) -> Result<()> {
    for column in names {
        if let Some(&marker) = markers.iter().find(|m| column.contains(**m)) {
            return Err(TransformError::TidyColumnViolation {
                column: column.clone(),
                marker,
            });
        }
    }
    Ok(())
}

/// Require the table to have the expected number of rows.
pub fn check_row_count(stage: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(TransformError::ExpectedObsCountMismatch {
            stage,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjointness_names_both_tables() {
        let err = check_columns_disjoint(&[
            ("header", vec!["ID", "Name"]),
            ("series", vec!["FREQ", "UNIT"]),
            ("observation", vec!["TIME_PERIOD", "FREQ"]),
        ])
        .unwrap_err();
        match err {
            TransformError::ColumnUniquenessViolation {
                column,
                first,
                second,
            } => {
                assert_eq!(column, "FREQ");
                assert_eq!(first, "series");
                assert_eq!(second, "observation");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn homogeneity_names_first_divergent_record() {
        let record = |keys: &[&str]| -> IndexMap<String, String> {
            keys.iter().map(|k| (k.to_string(), String::new())).collect()
        };
        let records = vec![
            record(&["A", "B"]),
            record(&["B", "A"]),
            record(&["A"]),
            record(&["A", "C"]),
        ];
        let err = check_obs_dicts_have_same_keys(&records).unwrap_err();
        assert!(matches!(
            err,
            TransformError::ObsDictsHomogeneityViolation { index: 2, .. }
        ));
    }

    #[test]
    fn tidy_columns_reject_markers() {
        let names = vec!["TIME_PERIOD".to_string(), "na:FREQ".to_string()];
        let err = check_tidy_data_columns(&names, &["@", "na:"]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::TidyColumnViolation { marker: "na:", .. }
        ));
        assert_eq!(canonical_column_name("Sender @id"), "Sender id");
        assert_eq!(canonical_column_name("Name #text"), "Name text");
    }

    #[test]
    fn header_fields_report_differences() {
        let mut header = XmlElement::new("message:Header");
        for name in ["message:ID", "message:Test", "message:Bogus"] {
            header.children.push(XmlElement::new(name));
        }
        let err = check_header_fields(&header, &["ID", "Test", "Prepared"], "2.1").unwrap_err();
        match err {
            TransformError::HeaderFieldMismatch {
                unexpected, missing, ..
            } => {
                assert_eq!(unexpected, vec!["Bogus"]);
                assert_eq!(missing, vec!["Prepared"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
