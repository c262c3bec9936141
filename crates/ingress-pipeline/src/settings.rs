//! Process-wide settings read once at start-up.

use std::path::PathBuf;

use ingress_model::{SupplementaryPolicy, parse_flag};
use tracing::debug;

use crate::error::{IngressError, Result};
use crate::notify::{LogNotifier, NopNotifier, NotificationSink};
use crate::upload::{DirectoryUploader, SkippedUploader, Uploader};

pub const DISABLE_NOTIFICATIONS: &str = "DISABLE_NOTIFICATIONS";
pub const SKIP_DATA_UPLOAD: &str = "SKIP_DATA_UPLOAD";
pub const SUPPLEMENTARY_POLICY: &str = "SUPPLEMENTARY_POLICY";

/// Switches that apply to every submission handled by the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSettings {
    pub disable_notifications: bool,
    pub skip_data_upload: bool,
    /// Used when a configuration sets no policy of its own.
    pub supplementary_policy: SupplementaryPolicy,
}

fn flag(name: &'static str, value: Option<String>) -> Result<bool> {
    match value {
        None => Ok(false),
        Some(value) => parse_flag(&value).ok_or(IngressError::InvalidSetting { name, value }),
    }
}

impl PipelineSettings {
    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let supplementary_policy = match lookup(SUPPLEMENTARY_POLICY) {
            None => SupplementaryPolicy::default(),
            Some(value) => {
                SupplementaryPolicy::parse(&value).ok_or(IngressError::InvalidSetting {
                    name: SUPPLEMENTARY_POLICY,
                    value,
                })?
            }
        };
        let settings = Self {
            disable_notifications: flag(DISABLE_NOTIFICATIONS, lookup(DISABLE_NOTIFICATIONS))?,
            skip_data_upload: flag(SKIP_DATA_UPLOAD, lookup(SKIP_DATA_UPLOAD))?,
            supplementary_policy,
        };
        debug!(?settings, "pipeline settings loaded");
        Ok(settings)
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// The sink selected by `disable_notifications`.
    pub fn notifier(&self) -> Box<dyn NotificationSink> {
        if self.disable_notifications {
            Box::new(NopNotifier)
        } else {
            Box::new(LogNotifier)
        }
    }

    /// The uploader selected by `skip_data_upload`.
    pub fn uploader(&self, outbox: impl Into<PathBuf>) -> Box<dyn Uploader> {
        if self.skip_data_upload {
            Box::new(SkippedUploader)
        } else {
            Box::new(DirectoryUploader::new(outbox))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn unset_variables_use_defaults() {
        let settings = PipelineSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, PipelineSettings::default());
    }

    #[test]
    fn flags_and_policy_are_parsed() {
        let settings = PipelineSettings::from_lookup(lookup(&[
            (DISABLE_NOTIFICATIONS, "Yes"),
            (SKIP_DATA_UPLOAD, "1"),
            (SUPPLEMENTARY_POLICY, "notify"),
        ]))
        .unwrap();
        assert!(settings.disable_notifications);
        assert!(settings.skip_data_upload);
        assert_eq!(
            settings.supplementary_policy,
            SupplementaryPolicy::NotifyAndContinue
        );
    }

    #[test]
    fn bad_flag_names_the_variable() {
        let err = PipelineSettings::from_lookup(lookup(&[(SKIP_DATA_UPLOAD, "maybe")])).unwrap_err();
        match err {
            IngressError::InvalidSetting { name, value } => {
                assert_eq!(name, SKIP_DATA_UPLOAD);
                assert_eq!(value, "maybe");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
