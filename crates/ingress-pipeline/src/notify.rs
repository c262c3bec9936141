//! Notification sinks told about submission outcomes.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::messages::EmailContent;

/// What a sink is told about one submission event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Dataset or source identifier of the submission.
    pub source_id: String,
    /// Submitter address from the manifest, when known.
    pub submitter: Option<String>,
    pub content: EmailContent,
    /// Diagnostic text for operators.
    pub detail: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(
        source_id: impl Into<String>,
        submitter: Option<String>,
        content: EmailContent,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            submitter,
            content,
            detail: detail.into(),
            at: Utc::now(),
        }
    }
}

/// Receives submission outcomes. Calls are synchronous and fire-and-forget.
pub trait NotificationSink {
    fn success(&self, notice: &Notice);

    fn failure(&self, notice: &Notice);

    /// A problem that did not stop the submission.
    fn warning(&self, notice: &Notice) {
        let _ = notice;
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopNotifier;

impl NotificationSink for NopNotifier {
    fn success(&self, _notice: &Notice) {}

    fn failure(&self, _notice: &Notice) {}
}

/// Emits notifications as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn success(&self, notice: &Notice) {
        info!(
            source_id = %notice.source_id,
            submitter = notice.submitter.as_deref().unwrap_or("-"),
            at = %notice.at.to_rfc3339(),
            subject = %notice.content.subject,
            "submission succeeded"
        );
    }

    fn failure(&self, notice: &Notice) {
        error!(
            source_id = %notice.source_id,
            submitter = notice.submitter.as_deref().unwrap_or("-"),
            at = %notice.at.to_rfc3339(),
            subject = %notice.content.subject,
            detail = %notice.detail,
            "submission failed"
        );
    }

    fn warning(&self, notice: &Notice) {
        warn!(
            source_id = %notice.source_id,
            submitter = notice.submitter.as_deref().unwrap_or("-"),
            subject = %notice.content.subject,
            detail = %notice.detail,
            "submission warning"
        );
    }
}
