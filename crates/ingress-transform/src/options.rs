//! Keyword arguments accepted by the transforms.

use std::collections::BTreeMap;
use std::path::PathBuf;

use ingress_model::parse_flag;

use crate::error::{Result, TransformError};

/// Parsed `transform_kwargs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// JSON object used as the starting metadata document.
    pub metadata_template: Option<PathBuf>,
    /// Validate the Compact 2.0 header element list.
    pub strict_header: bool,
}

impl TransformOptions {
    pub fn from_kwargs(kwargs: &BTreeMap<String, String>) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in kwargs {
            match key.as_str() {
                "metadata_template" => options.metadata_template = Some(PathBuf::from(value)),
                "strict_header" => {
                    options.strict_header =
                        parse_flag(value).ok_or_else(|| TransformError::InvalidKwarg {
                            key: key.clone(),
                            value: value.clone(),
                        })?;
                }
                _ => return Err(TransformError::UnknownKwarg { key: key.clone() }),
            }
        }
        Ok(options)
    }
}
