//! Full URL surface: discovery endpoints plus core/grouped,
//! cluster/namespaced CRUD routes.
//!
//! Ported from `original_source/pkg/server.go::Register`'s chi route table.
use crate::{
    handlers::{discovery, verbs},
    handlers::verbs::Coordinates,
    state::AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::HeaderMap,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::{collections::HashMap, sync::Arc};

pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/healthz", get(discovery::healthz))
        .route("/version", get(version_handler))
        .route("/api", get(api_versions_handler))
        .route("/api/v1", get(core_resource_list_handler))
        .route("/apis", get(api_group_list_handler))
        .route("/apis/:group", get(api_group_handler))
        .route("/apis/:group/:version", get(grouped_resource_list_handler))
        .nest("/api/v1", core_routes())
        .nest("/apis/:group/:version", grouped_routes())
        .with_state(state)
}

async fn root_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    discovery::root(&state, &headers).await
}

async fn version_handler(headers: HeaderMap) -> Response {
    discovery::version(&headers).await
}

async fn api_versions_handler(headers: HeaderMap) -> Response {
    discovery::api_versions(&headers).await
}

async fn core_resource_list_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    discovery::api_resource_list(&state, &headers, "", "v1").await
}

async fn api_group_list_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    discovery::api_group_list(&state, &headers).await
}

async fn api_group_handler(State(state): State<Arc<AppState>>, headers: HeaderMap, Path(group): Path<String>) -> Response {
    discovery::api_group(&state, &headers, &group).await
}

async fn grouped_resource_list_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(params): Path<HashMap<String, String>>,
) -> Response {
    let group = params.get("group").cloned().unwrap_or_default();
    let version = params.get("version").cloned().unwrap_or_else(|| "v1".to_string());
    discovery::api_resource_list(&state, &headers, &group, &version).await
}

fn coordinates(group: String, version: String, resource: String, namespace: Option<String>) -> Coordinates {
    Coordinates {
        group,
        version,
        resource,
        namespace,
    }
}

// --- core (group == "") routes -------------------------------------------------

/// Routes relative to `/api/v1` — group is always the empty core group.
fn core_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/:resource",
            post(core_create).get(core_list).delete(core_delete_collection),
        )
        .route(
            "/:resource/:name",
            get(core_get).put(core_update).patch(core_patch).delete(core_delete),
        )
        .route("/:resource/:name/status", put(core_update_status).patch(core_patch_status))
        .route(
            "/namespaces/:ns/:resource",
            post(core_ns_create).get(core_ns_list).delete(core_ns_delete_collection),
        )
        .route(
            "/namespaces/:ns/:resource/:name",
            get(core_ns_get).put(core_ns_update).patch(core_ns_patch).delete(core_ns_delete),
        )
        .route(
            "/namespaces/:ns/:resource/:name/status",
            put(core_ns_update_status).patch(core_ns_patch_status),
        )
}

async fn core_create(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, None);
    verbs::create(&state, coords, &headers, &raw.unwrap_or_default(), &body).await
}

async fn core_list(State(state): State<Arc<AppState>>, Path(resource): Path<String>, headers: HeaderMap, RawQuery(raw): RawQuery) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, None);
    verbs::list(&state, coords, &headers, &raw.unwrap_or_default()).await
}

async fn core_delete_collection(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, None);
    verbs::delete_collection(&state, coords, &headers, &raw.unwrap_or_default()).await
}

async fn core_get(State(state): State<Arc<AppState>>, Path((resource, name)): Path<(String, String)>, headers: HeaderMap) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, None);
    verbs::get(&state, coords, &headers, &name).await
}

async fn core_update(
    State(state): State<Arc<AppState>>,
    Path((resource, name)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, None);
    verbs::update(&state, coords, &headers, &name, &raw.unwrap_or_default(), &body).await
}

async fn core_update_status(
    State(state): State<Arc<AppState>>,
    Path((resource, name)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    core_update(State(state), Path((resource, name)), headers, RawQuery(raw), body).await
}

async fn core_patch(
    State(state): State<Arc<AppState>>,
    Path((resource, name)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, None);
    verbs::patch(&state, coords, &headers, &name, &raw.unwrap_or_default(), &body).await
}

async fn core_patch_status(
    State(state): State<Arc<AppState>>,
    Path((resource, name)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    core_patch(State(state), Path((resource, name)), headers, RawQuery(raw), body).await
}

async fn core_delete(State(state): State<Arc<AppState>>, Path((resource, name)): Path<(String, String)>, headers: HeaderMap) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, None);
    verbs::delete(&state, coords, &headers, &name).await
}

async fn core_ns_create(
    State(state): State<Arc<AppState>>,
    Path((ns, resource)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, Some(ns));
    verbs::create(&state, coords, &headers, &raw.unwrap_or_default(), &body).await
}

async fn core_ns_list(
    State(state): State<Arc<AppState>>,
    Path((ns, resource)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, Some(ns));
    verbs::list(&state, coords, &headers, &raw.unwrap_or_default()).await
}

async fn core_ns_delete_collection(
    State(state): State<Arc<AppState>>,
    Path((ns, resource)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, Some(ns));
    verbs::delete_collection(&state, coords, &headers, &raw.unwrap_or_default()).await
}

async fn core_ns_get(
    State(state): State<Arc<AppState>>,
    Path((ns, resource, name)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, Some(ns));
    verbs::get(&state, coords, &headers, &name).await
}

async fn core_ns_update(
    State(state): State<Arc<AppState>>,
    Path((ns, resource, name)): Path<(String, String, String)>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, Some(ns));
    verbs::update(&state, coords, &headers, &name, &raw.unwrap_or_default(), &body).await
}

async fn core_ns_update_status(
    State(state): State<Arc<AppState>>,
    Path((ns, resource, name)): Path<(String, String, String)>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    core_ns_update(State(state), Path((ns, resource, name)), headers, RawQuery(raw), body).await
}

async fn core_ns_patch(
    State(state): State<Arc<AppState>>,
    Path((ns, resource, name)): Path<(String, String, String)>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, Some(ns));
    verbs::patch(&state, coords, &headers, &name, &raw.unwrap_or_default(), &body).await
}

async fn core_ns_patch_status(
    State(state): State<Arc<AppState>>,
    Path((ns, resource, name)): Path<(String, String, String)>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    core_ns_patch(State(state), Path((ns, resource, name)), headers, RawQuery(raw), body).await
}

async fn core_ns_delete(
    State(state): State<Arc<AppState>>,
    Path((ns, resource, name)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let coords = coordinates(String::new(), "v1".into(), resource, Some(ns));
    verbs::delete(&state, coords, &headers, &name).await
}

// --- grouped (/apis/{group}/{version}/...) routes ------------------------------
//
// `group`/`version` arrive as part of the same `Path<HashMap<_, _>>` as the
// route's own params, since axum merges a nest's captured segments with the
// nested router's own captures into one extraction.

/// Routes relative to `/apis/{group}/{version}`.
fn grouped_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/:resource",
            post(grouped_create).get(grouped_list).delete(grouped_delete_collection),
        )
        .route(
            "/:resource/:name",
            get(grouped_get).put(grouped_update).patch(grouped_patch).delete(grouped_delete),
        )
        .route(
            "/:resource/:name/status",
            put(grouped_update_status).patch(grouped_patch_status),
        )
        .route(
            "/namespaces/:ns/:resource",
            post(grouped_ns_create).get(grouped_ns_list).delete(grouped_ns_delete_collection),
        )
        .route(
            "/namespaces/:ns/:resource/:name",
            get(grouped_ns_get).put(grouped_ns_update).patch(grouped_ns_patch).delete(grouped_ns_delete),
        )
        .route(
            "/namespaces/:ns/:resource/:name/status",
            put(grouped_ns_update_status).patch(grouped_ns_patch_status),
        )
}

fn grouped_coordinates(params: &HashMap<String, String>, namespace: Option<String>) -> (Coordinates, String) {
    let group = params.get("group").cloned().unwrap_or_default();
    let version = params.get("version").cloned().unwrap_or_else(|| "v1".to_string());
    let resource = params.get("resource").cloned().unwrap_or_default();
    let name = params.get("name").cloned().unwrap_or_default();
    (coordinates(group, version, resource, namespace), name)
}

async fn grouped_create(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let (coords, _) = grouped_coordinates(&params, None);
    verbs::create(&state, coords, &headers, &raw.unwrap_or_default(), &body).await
}

async fn grouped_list(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let (coords, _) = grouped_coordinates(&params, None);
    verbs::list(&state, coords, &headers, &raw.unwrap_or_default()).await
}

async fn grouped_delete_collection(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let (coords, _) = grouped_coordinates(&params, None);
    verbs::delete_collection(&state, coords, &headers, &raw.unwrap_or_default()).await
}

async fn grouped_get(State(state): State<Arc<AppState>>, Path(params): Path<HashMap<String, String>>, headers: HeaderMap) -> Response {
    let (coords, name) = grouped_coordinates(&params, None);
    verbs::get(&state, coords, &headers, &name).await
}

async fn grouped_update(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let (coords, name) = grouped_coordinates(&params, None);
    verbs::update(&state, coords, &headers, &name, &raw.unwrap_or_default(), &body).await
}

async fn grouped_update_status(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    grouped_update(State(state), Path(params), headers, RawQuery(raw), body).await
}

async fn grouped_patch(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let (coords, name) = grouped_coordinates(&params, None);
    verbs::patch(&state, coords, &headers, &name, &raw.unwrap_or_default(), &body).await
}

async fn grouped_patch_status(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    grouped_patch(State(state), Path(params), headers, RawQuery(raw), body).await
}

async fn grouped_delete(State(state): State<Arc<AppState>>, Path(params): Path<HashMap<String, String>>, headers: HeaderMap) -> Response {
    let (coords, name) = grouped_coordinates(&params, None);
    verbs::delete(&state, coords, &headers, &name).await
}

async fn grouped_ns_create(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let ns = params.get("ns").cloned();
    let (coords, _) = grouped_coordinates(&params, ns);
    verbs::create(&state, coords, &headers, &raw.unwrap_or_default(), &body).await
}

async fn grouped_ns_list(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let ns = params.get("ns").cloned();
    let (coords, _) = grouped_coordinates(&params, ns);
    verbs::list(&state, coords, &headers, &raw.unwrap_or_default()).await
}

async fn grouped_ns_delete_collection(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let ns = params.get("ns").cloned();
    let (coords, _) = grouped_coordinates(&params, ns);
    verbs::delete_collection(&state, coords, &headers, &raw.unwrap_or_default()).await
}

async fn grouped_ns_get(State(state): State<Arc<AppState>>, Path(params): Path<HashMap<String, String>>, headers: HeaderMap) -> Response {
    let ns = params.get("ns").cloned();
    let (coords, name) = grouped_coordinates(&params, ns);
    verbs::get(&state, coords, &headers, &name).await
}

async fn grouped_ns_update(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let ns = params.get("ns").cloned();
    let (coords, name) = grouped_coordinates(&params, ns);
    verbs::update(&state, coords, &headers, &name, &raw.unwrap_or_default(), &body).await
}

async fn grouped_ns_update_status(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    grouped_ns_update(State(state), Path(params), headers, RawQuery(raw), body).await
}

async fn grouped_ns_patch(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let ns = params.get("ns").cloned();
    let (coords, name) = grouped_coordinates(&params, ns);
    verbs::patch(&state, coords, &headers, &name, &raw.unwrap_or_default(), &body).await
}

async fn grouped_ns_patch_status(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    grouped_ns_patch(State(state), Path(params), headers, RawQuery(raw), body).await
}

async fn grouped_ns_delete(State(state): State<Arc<AppState>>, Path(params): Path<HashMap<String, String>>, headers: HeaderMap) -> Response {
    let ns = params.get("ns").cloned();
    let (coords, name) = grouped_coordinates(&params, ns);
    verbs::delete(&state, coords, &headers, &name).await
}
