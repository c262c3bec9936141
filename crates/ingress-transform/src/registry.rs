//! Dispatch from [`TransformKind`] to the function that implements it.

use std::path::PathBuf;

use ingress_model::TransformKind;

use crate::error::{Result, TransformError};
use crate::options::TransformOptions;
use crate::output::TransformOutput;
use crate::{compact20, csv_join, generic21};

/// Signature shared by every registered transform.
pub type TransformFn = fn(&[PathBuf], &TransformOptions) -> Result<TransformOutput>;

/// The transform for `kind`, or `None` for pass-through.
pub fn transform_for(kind: TransformKind) -> Option<TransformFn> {
    match kind {
        TransformKind::SdmxCompact20 => Some(compact20::run),
        TransformKind::SdmxGeneric21 => Some(generic21::run),
        TransformKind::CsvJoin => Some(csv_join::run),
        TransformKind::PassThrough => None,
    }
}

/// Run the transform for `kind` over `inputs`, in declared order.
pub fn run_transform(
    kind: TransformKind,
    inputs: &[PathBuf],
    options: &TransformOptions,
) -> Result<TransformOutput> {
    let transform = transform_for(kind).ok_or(TransformError::NoTransform)?;
    transform(inputs, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_through_has_no_transform() {
        assert!(transform_for(TransformKind::PassThrough).is_none());
        assert!(matches!(
            run_transform(TransformKind::PassThrough, &[], &TransformOptions::default()),
            Err(TransformError::NoTransform)
        ));
    }

    #[test]
    fn sdmx_transforms_check_input_count() {
        let options = TransformOptions::default();
        assert!(matches!(
            run_transform(TransformKind::SdmxGeneric21, &[], &options),
            Err(TransformError::InputCount { found: 0, .. })
        ));
        assert!(matches!(
            run_transform(TransformKind::SdmxCompact20, &[], &options),
            Err(TransformError::InputCount { found: 0, .. })
        ));
    }
}
