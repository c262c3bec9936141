//! Tests for the SDMX-ML Compact 2.0 transform.

use std::path::{Path, PathBuf};

use ingress_transform::{
    TransformError, TransformOptions, count_markers, tabulate_compact20, transform_compact20,
};
use serde_json::Value;

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("read fixture")
}

fn stage(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write input");
    path
}

fn message(header_extra: &str, data_set: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<message:CompactData xmlns:message="urn:message" xmlns:na_="urn:na">
  <message:Header>
    <message:ID>IREF1</message:ID>
    {header_extra}
  </message:Header>
  <na_:DataSet>{data_set}</na_:DataSet>
</message:CompactData>
"#
    )
}

#[test]
fn one_row_per_observation_marker() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let text = fixture("compact20.xml");
    let xml = stage(dir.path(), "data.xml", &text);

    let output = transform_compact20(&xml, None, &TransformOptions::default())
        .expect("transform fixture");

    assert_eq!(count_markers(&text, Some("na_"), "Obs"), 5);
    assert_eq!(output.row_count, 5);
    assert_eq!(output.csv_path, dir.path().join("data.csv"));
    assert_eq!(output.metadata_path, dir.path().join("metadata.json"));

    let mut reader = csv::Reader::from_path(&output.csv_path).expect("open csv");
    let headers: Vec<String> = reader
        .headers()
        .expect("read headers")
        .iter()
        .map(str::to_string)
        .collect();
    for name in &headers {
        assert!(!name.contains('@'), "marker left in {name}");
        assert!(!name.contains("na:"), "marker left in {name}");
    }
    for expected in ["ID", "Sender id", "Name text", "FREQ", "REF_AREA", "TIME_PERIOD", "OBS_VALUE"] {
        assert!(headers.iter().any(|h| h == expected), "missing column {expected}");
    }
    assert_eq!(reader.records().count(), 5);
}

#[test]
fn header_is_replicated_on_every_row() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let xml = stage(dir.path(), "data.xml", &fixture("compact20.xml"));

    let table = tabulate_compact20(&xml, &TransformOptions::default()).expect("tabulate");
    assert_eq!(
        table.column_values("DataSetID"),
        Some(vec!["CPIH_A".to_string(); 5])
    );
    assert_eq!(
        table.column_values("REF_AREA"),
        Some(vec![
            "K02000001".to_string(),
            "K02000001".to_string(),
            "K02000001".to_string(),
            "E92000001".to_string(),
            "E92000001".to_string(),
        ])
    );
}

#[test]
fn rerun_is_byte_identical() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let xml = stage(dir.path(), "data.xml", &fixture("compact20.xml"));
    let options = TransformOptions::default();

    let first = transform_compact20(&xml, None, &options).expect("first run");
    let csv = std::fs::read(&first.csv_path).expect("read csv");
    let metadata = std::fs::read(&first.metadata_path).expect("read metadata");

    let second = transform_compact20(&xml, None, &options).expect("second run");
    assert_eq!(std::fs::read(&second.csv_path).expect("read csv"), csv);
    assert_eq!(
        std::fs::read(&second.metadata_path).expect("read metadata"),
        metadata
    );
}

#[test]
fn duplicated_column_is_a_uniqueness_violation() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let text = message(
        "",
        r#"<na_:Series FREQ="M"><na_:Obs TIME_PERIOD="2024-01" FREQ="A" OBS_VALUE="1"/></na_:Series>"#,
    );
    let xml = stage(dir.path(), "data.xml", &text);

    let err = tabulate_compact20(&xml, &TransformOptions::default()).expect_err("duplicate FREQ");
    match err {
        TransformError::ColumnUniquenessViolation { column, .. } => assert_eq!(column, "FREQ"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_attributes_are_padded() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let text = message(
        "",
        r#"<na_:Series FREQ="M">
             <na_:Obs TIME_PERIOD="2024-01" OBS_VALUE="1" OBS_STATUS="P"/>
             <na_:Obs TIME_PERIOD="2024-02" OBS_VALUE="2"/>
           </na_:Series>"#,
    );
    let xml = stage(dir.path(), "data.xml", &text);

    let table = tabulate_compact20(&xml, &TransformOptions::default()).expect("tabulate");
    assert_eq!(
        table.column_values("OBS_STATUS"),
        Some(vec!["P".to_string(), String::new()])
    );
}

#[test]
fn other_dialects_are_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let xml = stage(
        dir.path(),
        "data.xml",
        "<?xml version=\"1.0\"?>\n<message:GenericData xmlns:message=\"urn:m\"/>\n",
    );
    let err = tabulate_compact20(&xml, &TransformOptions::default()).expect_err("wrong dialect");
    assert!(matches!(err, TransformError::UnrecognisedXmlDialect { .. }));
}

#[test]
fn message_without_observations_is_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let xml = stage(dir.path(), "data.xml", &message("", r#"<na_:Series FREQ="M"/>"#));
    let err = tabulate_compact20(&xml, &TransformOptions::default()).expect_err("no obs");
    match err {
        TransformError::NoObservations { marker, .. } => assert_eq!(marker, "<na_:Obs"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn input_without_xml_declaration_is_invalid() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let xml = stage(dir.path(), "data.xml", "<message:CompactData/>");
    let err = tabulate_compact20(&xml, &TransformOptions::default()).expect_err("no declaration");
    assert!(matches!(err, TransformError::InvalidInputFile { .. }));
}

#[test]
fn strict_header_checks_field_list() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let strict = TransformOptions {
        strict_header: true,
        ..TransformOptions::default()
    };

    let xml = stage(dir.path(), "data.xml", &fixture("compact20.xml"));
    assert!(tabulate_compact20(&xml, &strict).is_ok());

    let partial = stage(
        dir.path(),
        "partial.xml",
        &message(
            "<message:Bogus>1</message:Bogus>",
            r#"<na_:Series FREQ="M"><na_:Obs OBS_VALUE="1"/></na_:Series>"#,
        ),
    );
    assert!(tabulate_compact20(&partial, &TransformOptions::default()).is_ok());
    let err = tabulate_compact20(&partial, &strict).expect_err("strict header");
    match err {
        TransformError::HeaderFieldMismatch {
            unexpected,
            missing,
            ..
        } => {
            assert_eq!(unexpected, vec!["Bogus"]);
            assert!(missing.contains(&"Prepared".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn structure_message_enriches_metadata() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let xml = stage(dir.path(), "data.xml", &fixture("compact20.xml"));
    let structure = stage(dir.path(), "structure.xml", &fixture("structure.xml"));

    let output = transform_compact20(&xml, Some(structure.as_path()), &TransformOptions::default())
        .expect("transform with structure");
    let text = std::fs::read_to_string(&output.metadata_path).expect("read metadata");
    let document: Value = serde_json::from_str(&text).expect("parse metadata");

    assert_eq!(document["issued"], "2024-01-20T08:00:00Z");
    assert_eq!(document["modified"], "2024-01-25T09:00:00Z");
    assert_eq!(document["title"], "CPIH Annual Rate");
    assert_eq!(document["spatial_coverage"], "K02000001");
    assert_eq!(
        document["temporal_coverage"],
        "start: 2023-11, end: 2024-01"
    );
    assert_eq!(document["temporal_resolution"], "P1M");

    let columns = document["distributions"][0]["table_schema"]["column"]
        .as_array()
        .expect("column list");
    let find = |name: &str| {
        columns
            .iter()
            .find(|c| c["name"] == name)
            .unwrap_or_else(|| panic!("no schema for {name}"))
    };
    assert_eq!(find("REF_AREA")["titles"], "Reference area");
    assert_eq!(find("FREQ")["datatype"], "String");
    assert_eq!(find("OBS_VALUE")["titles"], "obs_value");
}

#[test]
fn failed_metadata_removes_csv() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let xml = stage(dir.path(), "data.xml", &fixture("compact20.xml"));
    let options = TransformOptions {
        metadata_template: Some(dir.path().join("missing-template.json")),
        ..TransformOptions::default()
    };

    let err = transform_compact20(&xml, None, &options).expect_err("template is missing");
    assert!(matches!(err, TransformError::FileRead { .. }));
    assert!(!dir.path().join("data.csv").exists());
    assert!(!dir.path().join("metadata.json").exists());
    assert!(!dir.path().join("data.csv.tmp").exists());
}

#[test]
fn deeply_nested_message_is_a_syntax_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let text = format!(
        "<?xml version=\"1.0\"?>\n<message:CompactData>{}",
        "<a>".repeat(300_000)
    );
    let xml = stage(dir.path(), "data.xml", &text);

    let err = transform_compact20(&xml, None, &TransformOptions::default())
        .expect_err("nesting limit");
    assert!(matches!(err, TransformError::XmlSyntax { .. }));
    assert!(!dir.path().join("data.csv").exists());
}
