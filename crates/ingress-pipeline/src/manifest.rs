//! The optional `manifest.json` that accompanies a submission.

use ingress_store::FileStore;
use serde_json::{Map, Value};

use crate::error::Result;

/// Pattern locating the manifest in a submission.
pub const MANIFEST_PATTERN: &str = r"^manifest\.json$";

/// Read the manifest if the submission has exactly one.
pub fn read_manifest(store: &dyn FileStore) -> Result<Option<Map<String, Value>>> {
    if !store.has_lone_file_matching(MANIFEST_PATTERN)? {
        return Ok(None);
    }
    Ok(Some(store.get_lone_matching_json_as_dict(MANIFEST_PATTERN)?))
}

/// The submitter's e-mail address, from `submitter_email`, `submitter.email`
/// or `fileAuthorEmail`.
pub fn submitter_email(manifest: &Map<String, Value>) -> Option<String> {
    manifest
        .get("submitter_email")
        .or_else(|| manifest.get("submitter").and_then(|s| s.get("email")))
        .or_else(|| manifest.get("fileAuthorEmail"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn email_is_read_from_known_keys() {
        assert_eq!(
            submitter_email(&object(json!({"submitter_email": "a@example.com"}))),
            Some("a@example.com".to_string())
        );
        assert_eq!(
            submitter_email(&object(json!({"submitter": {"email": " b@example.com "}}))),
            Some("b@example.com".to_string())
        );
        assert_eq!(
            submitter_email(&object(json!({"fileAuthorEmail": "c@example.com"}))),
            Some("c@example.com".to_string())
        );
        assert_eq!(submitter_email(&object(json!({"submitter_email": ""}))), None);
        assert_eq!(submitter_email(&object(json!({}))), None);
    }
}
