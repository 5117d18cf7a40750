//! Patch-dialect dispatch. Each submodule implements one of the four
//! `PATCH` content-types against a plain [`serde_json::Value`]; `apply`
//! applies a [`kube_core::params::Patch`] to a stored object and returns
//! the merged document.
mod json_patch;
mod merge;
mod strategic;

use crate::error::{Error, Result};
use kube_core::{params::Patch, response::StatusCause};
use serde_json::Value;

/// Apply `patch` to `target`, dispatching on its dialect, and return the
/// new document. `target` is left untouched on error.
pub fn apply(target: &Value, patch: &Patch) -> Result<Value> {
    match patch {
        Patch::Json(ops) => json_patch::apply(target, ops),
        Patch::Merge(doc) => Ok(merge::apply(target, doc)),
        Patch::Strategic(doc) => strategic::apply(target, doc),
        Patch::Apply => Ok(target.clone()),
    }
}

/// `ObjectMeta`'s known field names. `labels`/`annotations` are maps and
/// accept any key; everything else here is a fixed struct field, so a
/// patch naming anything outside this list is a typo, not a new field.
const KNOWN_METADATA_FIELDS: &[&str] = &[
    "name",
    "generateName",
    "namespace",
    "selfLink",
    "uid",
    "resourceVersion",
    "generation",
    "creationTimestamp",
    "deletionTimestamp",
    "deletionGracePeriodSeconds",
    "labels",
    "annotations",
    "ownerReferences",
    "finalizers",
    "managedFields",
];

/// `fieldValidation=Strict`'s pre-merge check: does `patch` name a field
/// this server doesn't recognize?
///
/// There's no compiled-in OpenAPI schema for `spec`/`status` here — those
/// pass through as opaque `data` — so the only part of the envelope this
/// can check against a known shape is `metadata`. JSON Patch and Apply
/// patches carry no document to check this way and are left alone.
pub fn strict_violations(patch: &Patch) -> Vec<StatusCause> {
    let doc = match patch {
        Patch::Merge(doc) | Patch::Strategic(doc) => doc,
        #[cfg(feature = "jsonpatch")]
        Patch::Json(_) => return Vec::new(),
        Patch::Apply => return Vec::new(),
    };
    let Some(metadata) = doc.get("metadata").and_then(Value::as_object) else {
        return Vec::new();
    };
    metadata
        .keys()
        .filter(|key| !KNOWN_METADATA_FIELDS.contains(&key.as_str()))
        .map(|key| StatusCause {
            reason: "FieldValueNotFound".to_string(),
            message: format!("unknown field \"metadata.{key}\""),
            field: format!("patch.metadata.{key}"),
        })
        .collect()
}

fn bad_request(msg: impl Into<String>) -> Error {
    Error::BadRequest(msg.into())
}

fn unprocessable(msg: impl Into<String>) -> Error {
    Error::Unprocessable(msg.into())
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_violations_flags_unknown_metadata_field() {
        let patch = Patch::Merge(json!({"metadata": {"lables": {"tier": "gold"}}}));
        let causes = strict_violations(&patch);
        assert_eq!(causes.len(), 1);
        assert_eq!(causes[0].field, "patch.metadata.lables");
    }

    #[test]
    fn strict_violations_allows_known_metadata_fields() {
        let patch = Patch::Merge(json!({"metadata": {"labels": {"tier": "gold"}, "annotations": {}}}));
        assert!(strict_violations(&patch).is_empty());
    }

    #[test]
    fn strict_violations_ignores_spec_and_status() {
        let patch = Patch::Strategic(json!({"spec": {"replicas": 3}, "status": {"ready": true}}));
        assert!(strict_violations(&patch).is_empty());
    }
}
