//! The two ingress entry points and submission dispatch.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ingress_config::{MatchTable, transform_details};
use ingress_model::{Configuration, IngressKind, TransformKind};
use ingress_store::LocalDirectoryStore;
use ingress_transform::{TransformOptions, TransformOutput, run_transform};
use tracing::{debug, info, info_span, warn};

use crate::error::{IngressError, Result};
use crate::messages::{submission_failed, unexpected_error};
use crate::notify::{Notice, NotificationSink};
use crate::orchestrator::{IngressOrchestrator, IngressStage};
use crate::settings::PipelineSettings;
use crate::upload::Uploader;

/// What a successful submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressOutcome {
    pub source_id: String,
    pub kind: IngressKind,
    pub transform: TransformKind,
    /// Materialized transform inputs, in declared order.
    pub inputs: Vec<PathBuf>,
    /// Present for dataset ingress only.
    pub output: Option<TransformOutput>,
    /// Every file handed to the uploader.
    pub uploaded: Vec<PathBuf>,
    /// Tolerated problems, such as missing supplementary distributions.
    pub warnings: Vec<String>,
    pub submitter: Option<String>,
}

/// Verify files, run the configured transform and upload its outputs.
pub fn dataset_ingress(
    orchestrator: &mut IngressOrchestrator<'_>,
    config: &Configuration,
    uploader: &dyn Uploader,
) -> Result<IngressOutcome> {
    orchestrator.guarded(|orchestrator| {
        orchestrator.load_submitter()?;
        let details = transform_details(config)?;
        let inputs = orchestrator.verify_then_materialize(config)?;

        orchestrator.set_stage(IngressStage::Transform);
        let output = {
            let span = info_span!("transform", source_id = %orchestrator.source_id(), transform = %details.transform);
            let _guard = span.enter();
            let options = TransformOptions::from_kwargs(&details.kwargs)?;
            run_transform(details.transform, &inputs, &options)?
        };
        let published = check_outputs(&output).and_then(|()| {
            orchestrator.set_stage(IngressStage::Upload);
            let span = info_span!("upload", source_id = %orchestrator.source_id());
            let _guard = span.enter();
            uploader.upload_csv(&output.csv_path)?;
            uploader.upload_json(&output.metadata_path)
        });
        if let Err(err) = published {
            discard_outputs(&output);
            return Err(err);
        }
        info!(rows = output.row_count, "dataset ingress complete");

        orchestrator.notify_success();
        Ok(IngressOutcome {
            source_id: orchestrator.source_id().to_string(),
            kind: IngressKind::DatasetIngress,
            transform: details.transform,
            inputs,
            uploaded: vec![output.csv_path.clone(), output.metadata_path.clone()],
            output: Some(output),
            warnings: orchestrator.warnings().to_vec(),
            submitter: orchestrator.submitter().map(str::to_string),
        })
    })
}

/// Fail unless both transform outputs exist.
fn check_outputs(output: &TransformOutput) -> Result<()> {
    for path in [&output.csv_path, &output.metadata_path] {
        if !path.is_file() {
            return Err(IngressError::OutputMissing { path: path.clone() });
        }
    }
    Ok(())
}

/// Remove the outputs of a submission that failed after its transform ran.
fn discard_outputs(output: &TransformOutput) {
    for path in [&output.csv_path, &output.metadata_path] {
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "removed output of failed submission"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove output"),
        }
    }
}

/// Verify required files and upload every file they match, unchanged.
pub fn generic_file_ingress(
    orchestrator: &mut IngressOrchestrator<'_>,
    config: &Configuration,
    uploader: &dyn Uploader,
) -> Result<IngressOutcome> {
    orchestrator.guarded(|orchestrator| {
        orchestrator.load_submitter()?;
        let patterns = orchestrator.await_required_files(config)?;

        orchestrator.set_stage(IngressStage::Upload);
        let store = orchestrator.store();
        let mut uploaded = Vec::new();
        {
            let span = info_span!("upload", source_id = %orchestrator.source_id());
            let _guard = span.enter();
            for pattern in &patterns {
                for name in store.files_matching(&pattern.matches)? {
                    let exact = format!("^{}$", regex::escape(&name));
                    let path = store.save_lone_file_matching(&exact, None)?;
                    upload_by_extension(uploader, &path)?;
                    uploaded.push(path);
                }
            }
        }
        info!(files = uploaded.len(), "generic file ingress complete");

        orchestrator.notify_success();
        Ok(IngressOutcome {
            source_id: orchestrator.source_id().to_string(),
            kind: IngressKind::GenericFileIngress,
            transform: config.transform,
            inputs: Vec::new(),
            output: None,
            uploaded,
            warnings: orchestrator.warnings().to_vec(),
            submitter: orchestrator.submitter().map(str::to_string),
        })
    })
}

/// Route a file to the uploader by its extension.
pub fn upload_by_extension(uploader: &dyn Uploader, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => uploader.upload_csv(path),
        "xml" => uploader.upload_sdmx(path),
        "json" => uploader.upload_json(path),
        _ => Err(IngressError::UnsupportedFileType {
            path: path.to_path_buf(),
            extension,
        }),
    }
}

/// Resolve the configuration for `source_id` and process the files in
/// `files_dir` with the entry point it names.
pub fn run_submission(
    source_id: &str,
    files_dir: &Path,
    table: &MatchTable,
    settings: &PipelineSettings,
    notifier: &dyn NotificationSink,
    uploader: &dyn Uploader,
) -> Result<IngressOutcome> {
    let span = info_span!("submission", source_id);
    let _guard = span.enter();

    let early_failure = |err: IngressError| {
        let detail = unexpected_error(&format!("Submission {source_id} could not start"), &err);
        notifier.failure(&Notice::new(source_id, None, submission_failed(), detail));
        err
    };
    let config = table
        .resolve(source_id)
        .map_err(|err| early_failure(err.into()))?;
    let store = LocalDirectoryStore::new(files_dir).map_err(|err| early_failure(err.into()))?;
    info!(kind = %config.secondary_function, transform = %config.transform, "configuration resolved");

    let mut orchestrator = IngressOrchestrator::new(source_id, &store, notifier)
        .with_supplementary_policy(settings.supplementary_policy);
    match config.secondary_function {
        IngressKind::DatasetIngress => dataset_ingress(&mut orchestrator, config, uploader),
        IngressKind::GenericFileIngress => generic_file_ingress(&mut orchestrator, config, uploader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::SkippedUploader;

    #[test]
    fn unknown_extension_is_rejected() {
        let err = upload_by_extension(&SkippedUploader, Path::new("notes.txt")).unwrap_err();
        match err {
            IngressError::UnsupportedFileType { extension, .. } => assert_eq!(extension, "txt"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(upload_by_extension(&SkippedUploader, Path::new("data.XML")).is_ok());
    }

    #[test]
    fn half_written_outputs_are_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("data.csv");
        std::fs::write(&csv_path, "A\n1\n").unwrap();
        let output = TransformOutput {
            csv_path: csv_path.clone(),
            metadata_path: dir.path().join("metadata.json"),
            row_count: 1,
        };

        let err = check_outputs(&output).unwrap_err();
        assert!(matches!(err, IngressError::OutputMissing { ref path } if path == &output.metadata_path));
        discard_outputs(&output);
        assert!(!csv_path.exists());
    }
}
