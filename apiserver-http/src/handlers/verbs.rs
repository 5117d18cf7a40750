//! Create/Get/Update/Patch/Delete/List/DeleteCollection, parameterized by
//! group/version/resource/namespace so one set of handlers serves both the
//! core (`/api/v1/...`) and grouped (`/apis/{group}/{version}/...`) trees.
//!
//! These are plain functions, not axum handlers: `router.rs` extracts the
//! path/query/body per concrete route shape (core vs. grouped, namespaced
//! vs. cluster-scoped) and calls into the matching function here, since a
//! single struct can't extract from two differently-shaped URL patterns.
//! Ported from `original_source/pkg/{create,get,update,patch,
//! deletecollection}.go`'s per-verb `*Impl` functions; axum extractor
//! conventions (`Path`/`Query`/`State`/`Result<Response>`) are grounded in
//! `examples/other_examples/.../reddwarf-apiserver`'s handler modules.
use crate::{
    error::HandlerError,
    negotiation::{self, decode, encode_response},
    query,
    query::{RawCreateQuery, RawListQuery, RawPatchQuery, RawUpdateQuery},
    state::AppState,
};
use apiserver_core::Error as EngineError;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use kube_core::{dynamic::DynamicObject, params::{validate_field_manager, Patch}};
use serde_json::json;

/// The resolved coordinates of a single request: which table, and
/// whether this is a namespaced path. Built by `router.rs` from the
/// matched route's `Path` extractor.
pub struct Coordinates {
    pub group: String,
    pub version: String,
    pub resource: String,
    pub namespace: Option<String>,
}

impl Coordinates {
    pub fn group_resource(&self) -> String {
        if self.group.is_empty() {
            self.resource.clone()
        } else {
            format!("{}.{}", self.resource, self.group)
        }
    }
}

fn list_wrapper(items: Vec<DynamicObject>) -> serde_json::Value {
    json!({
        "kind": "List",
        "apiVersion": "v1",
        "items": items,
    })
}

pub async fn create(state: &AppState, coords: Coordinates, headers: &HeaderMap, raw_query: &str, body: &[u8]) -> Response {
    match create_impl(state, &coords, headers, raw_query, body) {
        Ok(obj) => encode_response(StatusCode::CREATED, negotiation::response_encoding(headers), &obj),
        Err(e) => e.into_response_with(headers),
    }
}

fn create_impl(state: &AppState, coords: &Coordinates, headers: &HeaderMap, raw_query: &str, body: &[u8]) -> Result<DynamicObject, HandlerError> {
    let opts: RawCreateQuery = query::decode(raw_query).map_err(HandlerError::BadRequest)?;
    let create_opts: kube_core::params::CreateOptions = opts.into();
    validate_field_manager(&create_opts.field_manager).map_err(|e| HandlerError::BadRequest(e.to_string()))?;

    let encoding = negotiation::request_encoding(headers);
    let obj: DynamicObject = decode(encoding, body).map_err(HandlerError::BadRequest)?;

    let descriptor = state.server.registry().lookup(&coords.group, &coords.version, &coords.resource);
    let namespaced = coords.namespace.is_some();
    let stored = state.server.create(
        &coords.group,
        &descriptor.kind,
        &coords.resource,
        namespaced,
        coords.namespace.as_deref(),
        obj,
    )?;
    Ok(stored)
}

pub async fn get(state: &AppState, coords: Coordinates, headers: &HeaderMap, name: &str) -> Response {
    let namespaced = coords.namespace.is_some();
    let result = state.server.get(
        &coords.group_resource(),
        &coords.group,
        &coords.resource,
        namespaced,
        coords.namespace.as_deref(),
        name,
    );
    respond(result, StatusCode::OK, headers)
}

pub async fn list(state: &AppState, coords: Coordinates, headers: &HeaderMap, raw_query: &str) -> Response {
    match list_impl(state, &coords, raw_query) {
        Ok(items) => encode_response(StatusCode::OK, negotiation::response_encoding(headers), &list_wrapper(items)),
        Err(e) => e.into_response_with(headers),
    }
}

fn list_impl(state: &AppState, coords: &Coordinates, raw_query: &str) -> Result<Vec<DynamicObject>, HandlerError> {
    let raw: RawListQuery = query::decode(raw_query).map_err(HandlerError::BadRequest)?;
    let params: kube_core::params::ListParams = raw.into();
    let namespaced = coords.namespace.is_some();
    let items = state
        .server
        .list(&coords.group, &coords.resource, namespaced, coords.namespace.as_deref(), &params)?;
    Ok(items)
}

pub async fn update(state: &AppState, coords: Coordinates, headers: &HeaderMap, name: &str, raw_query: &str, body: &[u8]) -> Response {
    match update_impl(state, &coords, name, headers, raw_query, body) {
        Ok(obj) => encode_response(StatusCode::OK, negotiation::response_encoding(headers), &obj),
        Err(e) => e.into_response_with(headers),
    }
}

#[allow(clippy::too_many_arguments)]
fn update_impl(
    state: &AppState,
    coords: &Coordinates,
    name: &str,
    headers: &HeaderMap,
    raw_query: &str,
    body: &[u8],
) -> Result<DynamicObject, HandlerError> {
    let opts: RawUpdateQuery = query::decode(raw_query).map_err(HandlerError::BadRequest)?;
    let update_opts: kube_core::params::UpdateOptions = opts.into();
    validate_field_manager(&update_opts.field_manager).map_err(|e| HandlerError::BadRequest(e.to_string()))?;

    let encoding = negotiation::request_encoding(headers);
    let obj: DynamicObject = decode(encoding, body).map_err(HandlerError::BadRequest)?;

    let descriptor = state.server.registry().lookup(&coords.group, &coords.version, &coords.resource);
    let namespaced = coords.namespace.is_some();
    let stored = state.server.update(
        &coords.group,
        &descriptor.kind,
        &coords.resource,
        namespaced,
        coords.namespace.as_deref(),
        name,
        obj,
    )?;
    Ok(stored)
}

pub async fn patch(state: &AppState, coords: Coordinates, headers: &HeaderMap, name: &str, raw_query: &str, body: &[u8]) -> Response {
    match patch_impl(state, &coords, name, headers, raw_query, body) {
        Ok(obj) => encode_response(StatusCode::OK, negotiation::response_encoding(headers), &obj),
        Err(e) => e.into_response_with(headers),
    }
}

#[allow(clippy::too_many_arguments)]
fn patch_impl(
    state: &AppState,
    coords: &Coordinates,
    name: &str,
    headers: &HeaderMap,
    raw_query: &str,
    body: &[u8],
) -> Result<DynamicObject, HandlerError> {
    let opts: RawPatchQuery = query::decode(raw_query).map_err(HandlerError::BadRequest)?;
    let patch_opts: kube_core::params::PatchOptions = opts.into();
    validate_field_manager(&patch_opts.field_manager).map_err(|e| HandlerError::BadRequest(e.to_string()))?;

    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/strategic-merge-patch+json")
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_string();

    let patch_request = decode_patch(&content_type, body)?;

    let descriptor = state.server.registry().lookup(&coords.group, &coords.version, &coords.resource);
    let namespaced = coords.namespace.is_some();
    let stored = state.server.patch(
        &coords.group_resource(),
        &coords.group,
        &descriptor.kind,
        &coords.resource,
        namespaced,
        coords.namespace.as_deref(),
        name,
        &patch_request,
        patch_opts.field_validation,
    )?;
    Ok(stored)
}

fn decode_patch(content_type: &str, body: &[u8]) -> Result<Patch, HandlerError> {
    match content_type {
        "application/json-patch+json" => {
            let ops: json_patch::Patch = serde_json::from_slice(body).map_err(|e| HandlerError::BadRequest(e.to_string()))?;
            Ok(Patch::Json(ops))
        }
        "application/merge-patch+json" => {
            let doc: serde_json::Value = serde_json::from_slice(body).map_err(|e| HandlerError::BadRequest(e.to_string()))?;
            Ok(Patch::Merge(doc))
        }
        "application/apply-patch+yaml" => Ok(Patch::Apply),
        // default / strategic-merge-patch+json
        _ => {
            let doc: serde_json::Value = serde_json::from_slice(body).map_err(|e| HandlerError::BadRequest(e.to_string()))?;
            Ok(Patch::Strategic(doc))
        }
    }
}

pub async fn delete(state: &AppState, coords: Coordinates, headers: &HeaderMap, name: &str) -> Response {
    let namespaced = coords.namespace.is_some();
    let descriptor = state.server.registry().lookup(&coords.group, &coords.version, &coords.resource);
    let result: Result<DynamicObject, EngineError> = state.server.delete(
        &coords.group_resource(),
        &coords.group,
        &descriptor.kind,
        &coords.resource,
        namespaced,
        coords.namespace.as_deref(),
        name,
    );
    respond(result, StatusCode::OK, headers)
}

pub async fn delete_collection(state: &AppState, coords: Coordinates, headers: &HeaderMap, raw_query: &str) -> Response {
    match delete_collection_impl(state, &coords, raw_query) {
        Ok(items) => encode_response(StatusCode::OK, negotiation::response_encoding(headers), &list_wrapper(items)),
        Err(e) => e.into_response_with(headers),
    }
}

fn delete_collection_impl(state: &AppState, coords: &Coordinates, raw_query: &str) -> Result<Vec<DynamicObject>, HandlerError> {
    let raw: RawListQuery = query::decode(raw_query).map_err(HandlerError::BadRequest)?;
    let params: kube_core::params::ListParams = raw.into();
    let descriptor = state.server.registry().lookup(&coords.group, &coords.version, &coords.resource);
    let namespaced = coords.namespace.is_some();
    let removed = state.server.delete_collection(
        &coords.group,
        &descriptor.kind,
        &coords.resource,
        namespaced,
        coords.namespace.as_deref(),
        &params,
    )?;
    Ok(removed)
}

fn respond(result: Result<DynamicObject, EngineError>, ok_status: StatusCode, headers: &HeaderMap) -> Response {
    let encoding = negotiation::response_encoding(headers);
    match result {
        Ok(obj) => encode_response(ok_status, encoding, &obj),
        Err(e) => HandlerError::from(e).into_response_with(headers),
    }
}
