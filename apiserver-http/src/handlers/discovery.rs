//! Root/`healthz`/`version`/`api*`/`apis*` discovery handlers.
//!
//! Ported directly from `original_source/pkg/{serverroot,apigroup,
//! apigrouplist,apiresourcelist,apiversions}.go`.
use crate::{negotiation::{self, encode_response}, state::AppState};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;

#[derive(Serialize)]
struct GroupVersionForDiscovery {
    #[serde(rename = "groupVersion")]
    group_version: String,
    version: String,
}

#[derive(Serialize)]
struct ApiGroup {
    kind: &'static str,
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    name: String,
    versions: Vec<GroupVersionForDiscovery>,
    #[serde(rename = "preferredVersion")]
    preferred_version: GroupVersionForDiscovery,
}

fn group_version_string(group: &str, version: &str) -> String {
    if group.is_empty() {
        version.to_string()
    } else {
        format!("{group}/{version}")
    }
}

/// `GET /` — every static discovery path plus one `/apis/{group}` and
/// `/apis/{group}/{version}` entry per known group.
pub async fn root(state: &AppState, headers: &HeaderMap) -> Response {
    let mut paths: BTreeSet<String> = ["/api", "/api/v1", "/apis", "/apis/", "/healthz", "/version"]
        .into_iter()
        .map(str::to_string)
        .collect();
    for group in state.server.registry().groups() {
        paths.insert(format!("/apis/{group}"));
        for version in state.server.registry().versions_for_group(&group) {
            paths.insert(format!("/apis/{group}/{version}"));
        }
    }
    let body = json!({ "paths": paths.into_iter().collect::<Vec<_>>() });
    encode_response(StatusCode::OK, negotiation::response_encoding(headers), &body)
}

/// `GET /healthz` — plain-text `OK`, never negotiated.
pub async fn healthz() -> &'static str {
    "OK"
}

/// `GET /version` — a fixed, plausible `version.Info`-shaped payload.
pub async fn version(headers: &HeaderMap) -> Response {
    let body = json!({
        "major": "1",
        "minor": "29",
        "gitVersion": "v1.29.0",
        "gitCommit": "0000000000000000000000000000000000000",
        "gitTreeState": "clean",
        "buildDate": "2024-01-01T00:00:00Z",
        "goVersion": "n/a",
        "compiler": "rustc",
        "platform": "linux/amd64",
    });
    encode_response(StatusCode::OK, negotiation::response_encoding(headers), &body)
}

/// `GET /apis` — `APIGroupList` over every distinct non-core group.
pub async fn api_group_list(state: &AppState, headers: &HeaderMap) -> Response {
    let groups: Vec<ApiGroup> = state
        .server
        .registry()
        .groups()
        .into_iter()
        .map(|group| build_api_group(state, &group))
        .collect();
    let body = json!({
        "kind": "APIGroupList",
        "apiVersion": "v1",
        "groups": groups,
    });
    encode_response(StatusCode::OK, negotiation::response_encoding(headers), &body)
}

/// `GET /apis/{group}` — `APIGroup` for one group.
pub async fn api_group(state: &AppState, headers: &HeaderMap, group: &str) -> Response {
    let body = build_api_group(state, group);
    encode_response(StatusCode::OK, negotiation::response_encoding(headers), &body)
}

fn build_api_group(state: &AppState, group: &str) -> ApiGroup {
    let versions = state.server.registry().versions_for_group(group);
    let discovery_versions: Vec<GroupVersionForDiscovery> = versions
        .iter()
        .map(|v| GroupVersionForDiscovery {
            group_version: group_version_string(group, v),
            version: v.clone(),
        })
        .collect();
    let preferred = discovery_versions
        .into_iter()
        .next()
        .unwrap_or_else(|| GroupVersionForDiscovery {
            group_version: group_version_string(group, "v1"),
            version: "v1".to_string(),
        });
    let all: Vec<GroupVersionForDiscovery> = versions
        .iter()
        .map(|v| GroupVersionForDiscovery {
            group_version: group_version_string(group, v),
            version: v.clone(),
        })
        .collect();
    ApiGroup {
        kind: "APIGroup",
        api_version: "v1",
        name: group.to_string(),
        versions: all,
        preferred_version: preferred,
    }
}

/// `GET /api` — the core group's `APIVersions`.
pub async fn api_versions(headers: &HeaderMap) -> Response {
    let body = json!({
        "kind": "APIVersions",
        "versions": ["v1"],
        "serverAddressByClientCIDRs": [],
    });
    encode_response(StatusCode::OK, negotiation::response_encoding(headers), &body)
}

/// `GET /api/v1` or `GET /apis/{group}/{version}` — `APIResourceList` for
/// one (group, version) pair.
pub async fn api_resource_list(state: &AppState, headers: &HeaderMap, group: &str, version: &str) -> Response {
    let mut resources = state.server.registry().resources_for_group_version(group, version);
    resources.sort_by(|a, b| a.plural.cmp(&b.plural));
    let api_resources: Vec<serde_json::Value> = resources
        .iter()
        .map(|d| {
            json!({
                "name": d.plural,
                "singularName": d.singular_name(),
                "namespaced": d.namespaced,
                "group": d.group,
                "kind": d.kind,
                "verbs": d.verbs,
            })
        })
        .collect();
    let body = json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": group_version_string(group, version),
        "resources": api_resources,
    });
    encode_response(StatusCode::OK, negotiation::response_encoding(headers), &body)
}
