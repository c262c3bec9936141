//! Tests for the CLI subcommand implementations.

use std::path::{Path, PathBuf};

use ingress_cli::commands::{
    RunRequest, config_json, load_match_table, resolve_config, run_ingress, run_transform_files,
};
use ingress_model::{IngressKind, SupplementaryPolicy, TransformKind};
use ingress_pipeline::PipelineSettings;
use ingress_transform::TransformOptions;

const TABLE: &str = r#"
[[entries]]
pattern = "^prices$"

[entries.config]
config_version = 1
transform = "csv_join"
secondary_function = "dataset_ingress_v1"
required_files = [{ matches = "^part-\\d\\.csv$", count = 2 }]
supplementary_distributions = []
transform_inputs = [
    { pattern = "^part-1\\.csv$", sanity_check = "csv" },
    { pattern = "^part-2\\.csv$", sanity_check = "csv" },
]

[[entries]]
pattern = "^.*$"

[entries.config]
config_version = 1
secondary_function = "generic_file_ingress_v1"
required_files = [{ matches = "^data\\.csv$" }]
supplementary_distributions = []
"#;

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write file");
    path
}

fn request(source_id: &str, files_dir: &Path, outbox: &Path) -> RunRequest {
    RunRequest {
        source_id: source_id.to_string(),
        files_dir: files_dir.to_path_buf(),
        outbox: Some(outbox.to_path_buf()),
        supplementary_policy: None,
        skip_upload: false,
        disable_notifications: true,
    }
}

#[test]
fn built_in_table_is_used_without_a_path() {
    let table = load_match_table(None).expect("built-in table");
    let config = resolve_config(&table, "cpih").expect("cpih resolves");
    assert_eq!(config.transform, TransformKind::SdmxCompact20);
    let json = config_json(config).expect("serialize");
    assert!(json.contains("\"sdmx_compact_2_0\""));
}

#[test]
fn table_file_errors_name_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_match_table(Some(dir.path().join("missing.toml").as_path())).unwrap_err();
    assert!(format!("{err:#}").contains("missing.toml"));
}

#[test]
fn csv_submission_is_joined() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table_path = write(dir.path(), "table.toml", TABLE);
    let submission = dir.path().join("submission");
    std::fs::create_dir(&submission).expect("create submission dir");
    write(&submission, "part-1.csv", "AREA,VALUE\nK02000001,1.5\n");
    write(&submission, "part-2.csv", "AREA,VALUE\nE92000001,2.5\n");

    let table = load_match_table(Some(table_path.as_path())).expect("load table");
    let outcome = run_ingress(&table, &request("prices", &submission, &dir.path().join("out")))
        .expect("ingress succeeds");

    assert_eq!(outcome.kind, IngressKind::DatasetIngress);
    let output = outcome.output.expect("joined output");
    assert_eq!(output.row_count, 2);
    assert_eq!(output.csv_path, submission.join("joined.csv"));
    assert_eq!(outcome.inputs.len(), 2);
}

#[test]
fn unmatched_identifier_falls_back_to_generic_ingress() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table_path = write(dir.path(), "table.toml", TABLE);
    write(dir.path(), "data.csv", "A\n1\n");

    let table = load_match_table(Some(table_path.as_path())).expect("load table");
    let outcome = run_ingress(&table, &request("rpi", dir.path(), &dir.path().join("out")))
        .expect("ingress succeeds");
    assert_eq!(outcome.kind, IngressKind::GenericFileIngress);
    assert_eq!(outcome.uploaded, vec![dir.path().join("data.csv")]);
}

#[test]
fn failed_submission_carries_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table_path = write(dir.path(), "table.toml", TABLE);

    let table = load_match_table(Some(table_path.as_path())).expect("load table");
    let err = run_ingress(&table, &request("prices", dir.path(), &dir.path().join("out")))
        .unwrap_err();
    let text = format!("{err:#}");
    assert!(text.starts_with("process submission prices"));
    assert!(text.contains("part-"));
}

#[test]
fn command_line_overrides_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut run = request("rpi", dir.path(), &dir.path().join("out"));
    run.skip_upload = true;
    run.supplementary_policy = Some(SupplementaryPolicy::NotifyAndContinue);

    let settings = run.settings(PipelineSettings::default());
    assert!(settings.skip_data_upload);
    assert!(settings.disable_notifications);
    assert_eq!(
        settings.supplementary_policy,
        SupplementaryPolicy::NotifyAndContinue
    );

    run.outbox = None;
    assert_eq!(run.outbox(), dir.path().join("outbox"));
}

#[test]
fn transform_subcommand_runs_registered_transform() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = write(dir.path(), "a.csv", "X,Y\n1,2\n");
    let second = write(dir.path(), "b.csv", "X,Y\n3,4\n");

    let output = run_transform_files(
        TransformKind::CsvJoin,
        &[first, second],
        &TransformOptions::default(),
    )
    .expect("join succeeds");
    assert_eq!(output.row_count, 2);
    assert!(output.metadata_path.is_file());

    let err = run_transform_files(
        TransformKind::CsvJoin,
        &[dir.path().join("a.csv")],
        &TransformOptions::default(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").starts_with("run csv_join transform"));
}
