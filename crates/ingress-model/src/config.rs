//! Per-submission pipeline configuration.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pattern::Pattern;

/// The only configuration layout version currently understood.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Transform selected by a configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// SDMX-ML Compact 2.0 data message to tidy CSV.
    #[serde(rename = "sdmx_compact_2_0")]
    SdmxCompact20,
    /// SDMX-ML Generic 2.1 data message to tidy CSV.
    #[serde(rename = "sdmx_generic_2_1")]
    SdmxGeneric21,
    /// Concatenate CSV files that share one header.
    CsvJoin,
    /// No transform; files are forwarded as submitted.
    #[default]
    PassThrough,
}

impl TransformKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SdmxCompact20 => "sdmx_compact_2_0",
            Self::SdmxGeneric21 => "sdmx_generic_2_1",
            Self::CsvJoin => "csv_join",
            Self::PassThrough => "pass_through",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check run against a materialized input before the transform sees it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanityCheck {
    /// The file has an `.xml` extension and can be read as text.
    SdmxXml,
    /// The file has a `.csv` extension and a readable header row.
    Csv,
    /// No check.
    #[default]
    None,
}

impl SanityCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SdmxXml => "sdmx_xml",
            Self::Csv => "csv",
            Self::None => "none",
        }
    }
}

impl fmt::Display for SanityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestrator entry point that drives a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IngressKind {
    /// Verify files, run the transform, upload its outputs.
    #[default]
    #[serde(rename = "dataset_ingress_v1")]
    DatasetIngress,
    /// Verify files and upload them verbatim.
    #[serde(rename = "generic_file_ingress_v1")]
    GenericFileIngress,
}

impl IngressKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DatasetIngress => "dataset_ingress_v1",
            Self::GenericFileIngress => "generic_file_ingress_v1",
        }
    }
}

impl fmt::Display for IngressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens when a supplementary distribution is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplementaryPolicy {
    /// Fail the submission.
    #[default]
    Abort,
    /// Emit a warning notification and keep going.
    NotifyAndContinue,
}

impl SupplementaryPolicy {
    /// Parse the values accepted on the command line and in the environment.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abort" | "hard" | "fail" => Some(Self::Abort),
            "notify" | "soft" | "continue" | "notify_and_continue" => Some(Self::NotifyAndContinue),
            _ => None,
        }
    }
}

/// One entry of the ordered `transform_inputs` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformInput {
    /// Regex selecting the lone file to materialize.
    pub pattern: String,
    /// Check run on the materialized file.
    #[serde(default)]
    pub sanity_check: SanityCheck,
}

/// Immutable description of how one submission is processed.
///
/// `required_files` and `supplementary_distributions` are optional so that a
/// configuration loaded from a file can omit them; the pattern accessors in
/// the config crate report the absence instead of defaulting silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub config_version: u32,
    #[serde(default)]
    pub transform: TransformKind,
    /// Ordered inputs passed positionally to the transform.
    #[serde(default)]
    pub transform_inputs: Vec<TransformInput>,
    #[serde(default)]
    pub transform_kwargs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_files: Option<Vec<Pattern>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplementary_distributions: Option<Vec<Pattern>>,
    pub secondary_function: IngressKind,
    /// Overrides the process-wide policy for missing supplementary distributions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplementary_policy: Option<SupplementaryPolicy>,
}

impl Configuration {
    /// Start a dataset ingress configuration running `transform`.
    pub fn dataset_ingress(transform: TransformKind) -> Self {
        Self {
            config_version: CURRENT_CONFIG_VERSION,
            transform,
            transform_inputs: Vec::new(),
            transform_kwargs: BTreeMap::new(),
            required_files: Some(Vec::new()),
            supplementary_distributions: Some(Vec::new()),
            secondary_function: IngressKind::DatasetIngress,
            supplementary_policy: None,
        }
    }

    /// Start a generic file ingress configuration (no transform).
    pub fn generic_file_ingress() -> Self {
        Self {
            secondary_function: IngressKind::GenericFileIngress,
            ..Self::dataset_ingress(TransformKind::PassThrough)
        }
    }

    #[must_use]
    pub fn with_transform_input(
        mut self,
        pattern: impl Into<String>,
        sanity_check: SanityCheck,
    ) -> Self {
        self.transform_inputs.push(TransformInput {
            pattern: pattern.into(),
            sanity_check,
        });
        self
    }

    #[must_use]
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.transform_kwargs.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_required_file(mut self, pattern: impl Into<Pattern>) -> Self {
        self.required_files
            .get_or_insert_with(Vec::new)
            .push(pattern.into());
        self
    }

    #[must_use]
    pub fn with_supplementary_distribution(mut self, pattern: impl Into<Pattern>) -> Self {
        self.supplementary_distributions
            .get_or_insert_with(Vec::new)
            .push(pattern.into());
        self
    }

    #[must_use]
    pub fn with_supplementary_policy(mut self, policy: SupplementaryPolicy) -> Self {
        self.supplementary_policy = Some(policy);
        self
    }

    /// Returns true when the configuration forwards files without a transform.
    pub fn is_pass_through(&self) -> bool {
        self.transform == TransformKind::PassThrough
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_input_order() {
        let config = Configuration::dataset_ingress(TransformKind::CsvJoin)
            .with_transform_input("^b.csv$", SanityCheck::Csv)
            .with_transform_input("^a.csv$", SanityCheck::Csv);
        let patterns: Vec<&str> = config
            .transform_inputs
            .iter()
            .map(|input| input.pattern.as_str())
            .collect();
        assert_eq!(patterns, vec!["^b.csv$", "^a.csv$"]);
    }

    #[test]
    fn generic_ingress_is_pass_through() {
        let config = Configuration::generic_file_ingress();
        assert!(config.is_pass_through());
        assert_eq!(config.secondary_function, IngressKind::GenericFileIngress);
    }

    #[test]
    fn supplementary_policy_parse() {
        assert_eq!(
            SupplementaryPolicy::parse("Abort"),
            Some(SupplementaryPolicy::Abort)
        );
        assert_eq!(
            SupplementaryPolicy::parse(" notify "),
            Some(SupplementaryPolicy::NotifyAndContinue)
        );
        assert_eq!(SupplementaryPolicy::parse("maybe"), None);
    }
}
