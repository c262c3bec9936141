//! Submission orchestration.
//!
//! An [`IngressOrchestrator`] walks one submission through its stages:
//! required files are verified, supplementary distributions are checked under
//! the active [`SupplementaryPolicy`], transform inputs are materialized and
//! sanity checked, the transform runs, and its outputs are uploaded. The two
//! entry points, [`dataset_ingress`] and [`generic_file_ingress`], notify the
//! [`NotificationSink`] of failure exactly once and of success only after
//! every output is on disk.
//!
//! [`run_submission`] ties this to a [`MatchTable`] and a local directory.
//!
//! [`SupplementaryPolicy`]: ingress_model::SupplementaryPolicy
//! [`MatchTable`]: ingress_config::MatchTable

mod error;
mod ingress;
mod manifest;
mod messages;
mod notify;
mod orchestrator;
mod settings;
mod upload;

// === Error Types ===
pub use error::{IngressError, Result};

// === Orchestration ===
pub use ingress::{
    IngressOutcome, dataset_ingress, generic_file_ingress, run_submission, upload_by_extension,
};
pub use orchestrator::{IngressOrchestrator, IngressStage};

// === Manifest ===
pub use manifest::{MANIFEST_PATTERN, read_manifest, submitter_email};

// === Notifications ===
pub use messages::{
    EmailContent, expected_local_file_missing, file_not_found, submission_failed,
    submission_processed, supplementary_distribution_not_found, unexpected_error,
};
pub use notify::{LogNotifier, NopNotifier, Notice, NotificationSink};

// === Settings and Upload ===
pub use settings::{DISABLE_NOTIFICATIONS, PipelineSettings, SKIP_DATA_UPLOAD, SUPPLEMENTARY_POLICY};
pub use upload::{DirectoryUploader, SkippedUploader, Uploader};
