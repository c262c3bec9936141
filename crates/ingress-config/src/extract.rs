//! Version-checked access to configuration fields.

use std::collections::BTreeMap;

use ingress_model::{CURRENT_CONFIG_VERSION, Configuration, Pattern, TransformInput, TransformKind};

use crate::error::{ConfigError, Result};

/// `transform_kwargs` keys understood by the transforms.
pub const KNOWN_TRANSFORM_KWARGS: &[&str] = &["metadata_template", "strict_header"];

/// Transform, inputs and keyword arguments taken from one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformDetails {
    pub transform: TransformKind,
    pub inputs: Vec<TransformInput>,
    pub kwargs: BTreeMap<String, String>,
}

fn check_version(config: &Configuration) -> Result<()> {
    if config.config_version == CURRENT_CONFIG_VERSION {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedConfigVersion {
            version: config.config_version,
        })
    }
}

fn missing_field(field: &'static str, config: &Configuration) -> ConfigError {
    let config =
        serde_json::to_string_pretty(config).unwrap_or_else(|_| format!("{config:#?}"));
    ConfigError::MissingConfigField { field, config }
}

/// Patterns for files that must be present in a submission, in declared order.
pub fn required_file_patterns(config: &Configuration) -> Result<Vec<Pattern>> {
    check_version(config)?;
    config
        .required_files
        .clone()
        .ok_or_else(|| missing_field("required_files", config))
}

/// Patterns for supplementary distributions, in declared order.
pub fn supplementary_distribution_patterns(config: &Configuration) -> Result<Vec<Pattern>> {
    check_version(config)?;
    config
        .supplementary_distributions
        .clone()
        .ok_or_else(|| missing_field("supplementary_distributions", config))
}

/// The transform to run and what it runs over.
///
/// Unknown `transform_kwargs` keys are rejected here so a typo fails before any
/// file is touched.
pub fn transform_details(config: &Configuration) -> Result<TransformDetails> {
    check_version(config)?;
    if let Some(key) = config
        .transform_kwargs
        .keys()
        .find(|key| !KNOWN_TRANSFORM_KWARGS.contains(&key.as_str()))
    {
        return Err(ConfigError::UnknownTransformKwarg { key: key.clone() });
    }
    Ok(TransformDetails {
        transform: config.transform,
        inputs: config.transform_inputs.clone(),
        kwargs: config.transform_kwargs.clone(),
    })
}
