//! Per-verb query-string decoding. Uses plain `serde`-derived structs for
//! the wire shape and converts them into `kube_core::params` types, since
//! those are hand-written for clarity rather than `Deserialize`-derived
//! (grounded in `examples/other_examples/.../reddwarf-apiserver`'s
//! `axum::extract::Query<WatchParams>` handler parameters).
use kube_core::params::{CreateOptions, DeleteOptions, ListParams, PatchOptions, UpdateOptions, ValidationDirective};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct RawListQuery {
    #[serde(rename = "labelSelector")]
    pub label_selector: Option<String>,
    #[serde(rename = "fieldSelector")]
    pub field_selector: Option<String>,
}

impl From<RawListQuery> for ListParams {
    fn from(raw: RawListQuery) -> Self {
        ListParams::new(raw.label_selector, raw.field_selector)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCreateQuery {
    #[serde(rename = "fieldManager")]
    pub field_manager: Option<String>,
}

impl From<RawCreateQuery> for CreateOptions {
    fn from(raw: RawCreateQuery) -> Self {
        CreateOptions {
            field_manager: raw.field_manager,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawUpdateQuery {
    #[serde(rename = "fieldManager")]
    pub field_manager: Option<String>,
}

impl From<RawUpdateQuery> for UpdateOptions {
    fn from(raw: RawUpdateQuery) -> Self {
        UpdateOptions {
            field_manager: raw.field_manager,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPatchQuery {
    #[serde(rename = "fieldManager")]
    pub field_manager: Option<String>,
    #[serde(rename = "fieldValidation")]
    pub field_validation: Option<String>,
}

impl From<RawPatchQuery> for PatchOptions {
    fn from(raw: RawPatchQuery) -> Self {
        PatchOptions {
            field_manager: raw.field_manager,
            field_validation: raw.field_validation.as_deref().and_then(ValidationDirective::parse),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawDeleteQuery {
    #[serde(rename = "gracePeriodSeconds")]
    pub grace_period_seconds: Option<u32>,
    #[serde(rename = "propagationPolicy")]
    pub propagation_policy: Option<String>,
}

impl From<RawDeleteQuery> for DeleteOptions {
    fn from(raw: RawDeleteQuery) -> Self {
        DeleteOptions {
            grace_period_seconds: raw.grace_period_seconds,
            propagation_policy: raw.propagation_policy,
        }
    }
}

/// Decode a raw query string (without the leading `?`) into `T`.
pub fn decode<T: serde::de::DeserializeOwned + Default>(raw: &str) -> Result<T, String> {
    if raw.is_empty() {
        return Ok(T::default());
    }
    serde_urlencoded::from_str(raw).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_list_query() {
        let params: RawListQuery = decode("labelSelector=app%3Dweb&fieldSelector=metadata.name%3Dfoo").unwrap();
        assert_eq!(params.label_selector.as_deref(), Some("app=web"));
        assert_eq!(params.field_selector.as_deref(), Some("metadata.name=foo"));
    }

    #[test]
    fn empty_query_decodes_to_default() {
        let params: RawPatchQuery = decode("").unwrap();
        assert!(params.field_manager.is_none());
    }

    #[test]
    fn patch_query_parses_field_validation() {
        let raw: RawPatchQuery = decode("fieldValidation=Strict").unwrap();
        let opts: PatchOptions = raw.into();
        assert_eq!(opts.field_validation, Some(ValidationDirective::Strict));
    }
}
