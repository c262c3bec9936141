//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ingress_config::{MatchTable, default_config_table, load_config_table};
use ingress_model::{Configuration, SupplementaryPolicy, TransformKind};
use ingress_pipeline::{IngressOutcome, PipelineSettings, run_submission};
use ingress_transform::{TransformOptions, TransformOutput, run_transform};
use tracing::{debug, info_span};

/// Load the table at `path`, or the built-in table when there is none.
pub fn load_match_table(path: Option<&Path>) -> Result<MatchTable> {
    let table = match path {
        Some(path) => load_config_table(path)
            .with_context(|| format!("load config table {}", path.display()))?,
        None => default_config_table(),
    };
    MatchTable::new(table).context("check config table")
}

/// A submission to process, with command line overrides of the environment.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub source_id: String,
    pub files_dir: PathBuf,
    pub outbox: Option<PathBuf>,
    pub supplementary_policy: Option<SupplementaryPolicy>,
    pub skip_upload: bool,
    pub disable_notifications: bool,
}

impl RunRequest {
    /// Environment settings with this request's overrides applied.
    pub fn settings(&self, mut settings: PipelineSettings) -> PipelineSettings {
        settings.skip_data_upload |= self.skip_upload;
        settings.disable_notifications |= self.disable_notifications;
        if let Some(policy) = self.supplementary_policy {
            settings.supplementary_policy = policy;
        }
        settings
    }

    pub fn outbox(&self) -> PathBuf {
        self.outbox
            .clone()
            .unwrap_or_else(|| self.files_dir.join("outbox"))
    }
}

pub fn run_ingress(table: &MatchTable, request: &RunRequest) -> Result<IngressOutcome> {
    let env = PipelineSettings::from_env().context("read pipeline settings")?;
    let settings = request.settings(env);
    debug!(?settings, "effective settings");

    let notifier = settings.notifier();
    let uploader = settings.uploader(request.outbox());
    run_submission(
        &request.source_id,
        &request.files_dir,
        table,
        &settings,
        notifier.as_ref(),
        uploader.as_ref(),
    )
    .with_context(|| format!("process submission {}", request.source_id))
}

pub fn resolve_config<'a>(table: &'a MatchTable, source_id: &str) -> Result<&'a Configuration> {
    table
        .resolve(source_id)
        .with_context(|| format!("resolve configuration for {source_id}"))
}

pub fn config_json(config: &Configuration) -> Result<String> {
    serde_json::to_string_pretty(config).context("serialize configuration")
}

pub fn run_transform_files(
    kind: TransformKind,
    inputs: &[PathBuf],
    options: &TransformOptions,
) -> Result<TransformOutput> {
    let span = info_span!("transform", transform = %kind);
    let _guard = span.enter();
    run_transform(kind, inputs, options).with_context(|| format!("run {kind} transform"))
}
