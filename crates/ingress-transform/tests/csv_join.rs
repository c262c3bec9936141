//! Tests for the CSV join transform and the sanity checks.

use std::path::{Path, PathBuf};

use ingress_model::{SanityCheck, TransformKind};
use ingress_transform::{
    JOINED_CSV_FILE_NAME, TransformError, TransformOptions, run_sanity_check, run_transform,
    tabulate_csv_join,
};

fn stage(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write input");
    path
}

#[test]
fn joins_matching_inputs_beside_first() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let a = stage(dir.path(), "a.csv", "TIME_PERIOD,@OBS_VALUE\n2024-01,1\n2024-02,2\n");
    let b = stage(dir.path(), "b.csv", "TIME_PERIOD,@OBS_VALUE\n2024-03,3\n");
    for path in [&a, &b] {
        run_sanity_check(SanityCheck::Csv, path).expect("sanity check");
    }

    let output = run_transform(TransformKind::CsvJoin, &[a, b], &TransformOptions::default())
        .expect("join");
    assert_eq!(output.row_count, 3);
    assert_eq!(output.csv_path, dir.path().join(JOINED_CSV_FILE_NAME));

    let text = std::fs::read_to_string(&output.csv_path).expect("read joined csv");
    assert_eq!(
        text,
        "TIME_PERIOD,OBS_VALUE\n2024-01,1\n2024-02,2\n2024-03,3\n"
    );
    assert!(output.metadata_path.exists());
}

#[test]
fn header_mismatch_names_the_offending_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let a = stage(dir.path(), "a.csv", "GEO,VALUE\nUK,1\n");
    let b = stage(dir.path(), "b.csv", "VALUE,GEO\n2,FR\n");

    let err = tabulate_csv_join(&[a, b.clone()]).expect_err("mismatched headers");
    match err {
        TransformError::CsvHeaderMismatch { path, found, .. } => {
            assert_eq!(path, b);
            assert_eq!(found, vec!["VALUE", "GEO"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn forbidden_marker_fails_tidy_check() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let a = stage(dir.path(), "a.csv", "na:GEO\nUK\n");
    let b = stage(dir.path(), "b.csv", "na:GEO\nFR\n");

    let err = tabulate_csv_join(&[a, b]).expect_err("namespace in column");
    assert!(matches!(
        err,
        TransformError::TidyColumnViolation { marker: "na:", .. }
    ));
}

#[test]
fn non_csv_input_fails_sanity_check() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = stage(dir.path(), "a.txt", "GEO\nUK\n");
    let err = run_sanity_check(SanityCheck::Csv, &path).expect_err("wrong extension");
    assert!(matches!(err, TransformError::InvalidInputFile { .. }));
}
