//! Staged verification and materialization of a submission's files.

use std::fmt;
use std::path::PathBuf;

use ingress_config::{required_file_patterns, supplementary_distribution_patterns};
use ingress_model::{Configuration, IngressKind, Pattern, SupplementaryPolicy};
use ingress_store::FileStore;
use ingress_transform::run_sanity_check;
use tracing::{debug, info, info_span, warn};

use crate::error::{IngressError, Result};
use crate::manifest::{read_manifest, submitter_email};
use crate::messages::{
    EmailContent, expected_local_file_missing, file_not_found, submission_failed,
    submission_processed, supplementary_distribution_not_found, unexpected_error,
};
use crate::notify::{Notice, NotificationSink};

/// Where a submission is in the orchestrator's lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IngressStage {
    #[default]
    AwaitRequiredFiles,
    AwaitSupplementary,
    MaterializeInputs,
    Transform,
    Upload,
    Done,
}

impl IngressStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitRequiredFiles => "await_required_files",
            Self::AwaitSupplementary => "await_supplementary",
            Self::MaterializeInputs => "materialize_inputs",
            Self::Transform => "transform",
            Self::Upload => "upload",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for IngressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives one submission against a file store and a notification sink.
///
/// Public operations notify the sink of failure exactly once, however deep
/// the error originated. Stages called from inside an operation leave
/// notification to that operation.
pub struct IngressOrchestrator<'a> {
    source_id: String,
    store: &'a dyn FileStore,
    notifier: &'a dyn NotificationSink,
    policy: SupplementaryPolicy,
    pipeline: IngressKind,
    submitter: Option<String>,
    stage: IngressStage,
    warnings: Vec<String>,
}

impl<'a> IngressOrchestrator<'a> {
    pub fn new(
        source_id: impl Into<String>,
        store: &'a dyn FileStore,
        notifier: &'a dyn NotificationSink,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            store,
            notifier,
            policy: SupplementaryPolicy::default(),
            pipeline: IngressKind::default(),
            submitter: None,
            stage: IngressStage::default(),
            warnings: Vec::new(),
        }
    }

    /// Policy applied when a configuration sets none of its own.
    #[must_use]
    pub fn with_supplementary_policy(mut self, policy: SupplementaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn store(&self) -> &'a dyn FileStore {
        self.store
    }

    pub fn stage(&self) -> IngressStage {
        self.stage
    }

    pub fn submitter(&self) -> Option<&str> {
        self.submitter.as_deref()
    }

    /// Supplementary distributions that were missing but tolerated.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Check required and supplementary files, then materialize and sanity
    /// check the transform inputs in declared order.
    pub fn verify_and_materialize(&mut self, config: &Configuration) -> Result<Vec<PathBuf>> {
        self.guarded(|orchestrator| orchestrator.verify_then_materialize(config))
    }

    pub(crate) fn verify_then_materialize(
        &mut self,
        config: &Configuration,
    ) -> Result<Vec<PathBuf>> {
        self.await_required_files(config)?;
        self.await_supplementary(config)?;
        self.materialize_inputs(config)
    }

    /// Run `f`, notifying failure once if it returns an error.
    pub(crate) fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        f(self).inspect_err(|err| {
            let notice = self.failure_notice(err);
            self.notifier.failure(&notice);
        })
    }

    pub(crate) fn set_stage(&mut self, stage: IngressStage) {
        debug!(source_id = %self.source_id, %stage, "entering stage");
        self.stage = stage;
    }

    /// Pick up the submitter address from the manifest, if there is one.
    pub(crate) fn load_submitter(&mut self) -> Result<()> {
        if let Some(manifest) = read_manifest(self.store)? {
            self.submitter = submitter_email(&manifest);
        }
        Ok(())
    }

    /// Verify every required file pattern matches its expected count.
    pub(crate) fn await_required_files(&mut self, config: &Configuration) -> Result<Vec<Pattern>> {
        self.pipeline = config.secondary_function;
        self.set_stage(IngressStage::AwaitRequiredFiles);
        let span = info_span!("await_required_files", source_id = %self.source_id);
        let _guard = span.enter();

        let patterns = required_file_patterns(config)?;
        for pattern in &patterns {
            let (present, matched) = self.check_pattern(pattern)?;
            if !present {
                return Err(IngressError::MissingRequiredFile {
                    pattern: pattern.matches.clone(),
                    expected: pattern.count,
                    matched,
                    location: self.store.location(),
                    listing: self.store.list_file_names()?,
                });
            }
            debug!(pattern = %pattern, "required file present");
        }
        info!(count = patterns.len(), "required files present");
        Ok(patterns)
    }

    /// Verify supplementary distributions, honoring the supplementary policy.
    pub(crate) fn await_supplementary(&mut self, config: &Configuration) -> Result<()> {
        self.set_stage(IngressStage::AwaitSupplementary);
        let span = info_span!("await_supplementary", source_id = %self.source_id);
        let _guard = span.enter();

        let policy = config.supplementary_policy.unwrap_or(self.policy);
        for pattern in supplementary_distribution_patterns(config)? {
            let (present, matched) = self.check_pattern(&pattern)?;
            if present {
                continue;
            }
            let err = IngressError::MissingSupplementaryDistribution {
                pattern: pattern.matches.clone(),
                expected: pattern.count,
                matched,
                location: self.store.location(),
                listing: self.store.list_file_names()?,
            };
            match policy {
                SupplementaryPolicy::Abort => return Err(err),
                SupplementaryPolicy::NotifyAndContinue => {
                    warn!(pattern = %pattern, "supplementary distribution missing, continuing");
                    let notice = self.notice_for(&err);
                    self.notifier.warning(&notice);
                    self.warnings.push(err.to_string());
                }
            }
        }
        Ok(())
    }

    /// Save each transform input locally and run its sanity check.
    pub(crate) fn materialize_inputs(&mut self, config: &Configuration) -> Result<Vec<PathBuf>> {
        self.set_stage(IngressStage::MaterializeInputs);
        let span = info_span!("materialize_inputs", source_id = %self.source_id);
        let _guard = span.enter();

        let mut paths = Vec::with_capacity(config.transform_inputs.len());
        for input in &config.transform_inputs {
            let path = self.store.save_lone_file_matching(&input.pattern, None)?;
            run_sanity_check(input.sanity_check, &path)?;
            info!(pattern = %input.pattern, path = %path.display(), "input materialized");
            paths.push(path);
        }
        Ok(paths)
    }

    pub(crate) fn notify_success(&mut self) {
        self.set_stage(IngressStage::Done);
        let notice = Notice::new(
            self.source_id.clone(),
            self.submitter.clone(),
            submission_processed(),
            format!("{} completed", self.pipeline),
        );
        self.notifier.success(&notice);
    }

    /// Whether `pattern` resolves to its expected count, plus what it matched.
    fn check_pattern(&self, pattern: &Pattern) -> Result<(bool, Vec<String>)> {
        let matched = self.store.files_matching(&pattern.matches)?;
        let present = if pattern.is_lone() {
            self.store.has_lone_file_matching(&pattern.matches)?
        } else {
            matched.len() == pattern.count
        };
        Ok((present, matched))
    }

    fn notice_for(&self, err: &IngressError) -> Notice {
        let pipeline = self.pipeline.as_str();
        let (content, detail): (EmailContent, String) = match err {
            IngressError::MissingRequiredFile {
                pattern, listing, ..
            } => (
                file_not_found(pattern),
                expected_local_file_missing(&err.to_string(), pattern, pipeline, listing),
            ),
            IngressError::MissingSupplementaryDistribution {
                pattern, listing, ..
            } => (
                supplementary_distribution_not_found(pattern),
                expected_local_file_missing(&err.to_string(), pattern, pipeline, listing),
            ),
            IngressError::OutputMissing { path } => {
                let listing = self.store.list_file_names().unwrap_or_default();
                (
                    submission_failed(),
                    expected_local_file_missing(
                        &err.to_string(),
                        &path.display().to_string(),
                        pipeline,
                        &listing,
                    ),
                )
            }
            other => (
                submission_failed(),
                unexpected_error(
                    &format!("{pipeline} failed during {}", self.stage),
                    other,
                ),
            ),
        };
        Notice::new(self.source_id.clone(), self.submitter.clone(), content, detail)
    }

    fn failure_notice(&self, err: &IngressError) -> Notice {
        warn!(source_id = %self.source_id, stage = %self.stage, error = %err, "submission failed");
        self.notice_for(err)
    }
}

impl fmt::Debug for IngressOrchestrator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngressOrchestrator")
            .field("source_id", &self.source_id)
            .field("location", &self.store.location())
            .field("policy", &self.policy)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}
