//! End-to-end HTTP trace scenarios, driving the router in-process via
//! `tower::ServiceExt::oneshot` rather than a bound socket — the same
//! style the teacher uses for its `kube-derive` golden-schema tests
//! (`assert_json_diff::assert_json_eq`) and its mock-transport tests
//! (`kube/src/mock_tests.rs`'s `tower_test` plumbing), adapted here to
//! axum's own `Router: Service<Request<Body>>` impl instead of a mocked
//! `tower_test::mock::Handle`, since there's no outbound client to mock —
//! the router itself is the thing under test.
use apiserver_core::{Registry, Server};
use apiserver_http::AppState;
use assert_json_diff::assert_json_eq;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use kube_core::{api_resource::ApiResource, gvk::GroupVersionKind};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_router() -> Router {
    let catalog = vec![
        ApiResource::new(&GroupVersionKind::gvk("", "v1", "Namespace"), "namespaces", false),
        ApiResource::new(&GroupVersionKind::gvk("", "v1", "ConfigMap"), "configmaps", true),
        ApiResource::new(&GroupVersionKind::gvk("", "v1", "Secret"), "secrets", true),
        ApiResource::new(&GroupVersionKind::gvk("", "v1", "Pod"), "pods", true),
    ];
    let server = Arc::new(Server::new(Registry::new(catalog, &[])));
    let state = Arc::new(AppState::new(server));
    apiserver_http::build_router(state)
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

/// S1: creating a Namespace seeds `kube-root-ca.crt` into it.
#[tokio::test]
async fn s1_namespace_create_seeds_root_ca_configmap() {
    let router = test_router();

    let (status, created) = send(
        &router,
        json_request("POST", "/api/v1/namespaces", json!({"metadata": {"name": "demo"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let rv = created["metadata"]["resourceVersion"].as_str().unwrap();
    assert!(!rv.is_empty());

    let (status, cm) = send(
        &router,
        empty_request("GET", "/api/v1/namespaces/demo/configmaps/kube-root-ca.crt"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cm["metadata"]["name"], "kube-root-ca.crt");
    assert!(cm["data"]["ca.crt"].as_str().unwrap().contains("BEGIN CERTIFICATE"));
}

/// S2: `generateName` synthesizes a name with the given prefix.
#[tokio::test]
async fn s2_generate_name_synthesizes_name() {
    let router = test_router();
    let (status, created) = send(
        &router,
        json_request(
            "POST",
            "/api/v1/namespaces/default/configmaps",
            json!({"metadata": {"generateName": "cfg-"}, "data": {}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let name = created["metadata"]["name"].as_str().unwrap();
    assert!(name.starts_with("cfg-"));
    assert_eq!(name.len(), "cfg-".len() + 6);
}

/// S3: a Secret's `stringData` is base64-encoded into `data` and cleared.
#[tokio::test]
async fn s3_secret_string_data_is_base64_encoded() {
    let router = test_router();
    let (status, stored) = send(
        &router,
        json_request(
            "POST",
            "/api/v1/namespaces/default/secrets",
            json!({"metadata": {"name": "creds"}, "stringData": {"user": "admin"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(stored["data"]["user"], "YWRtaW4=");
    assert!(stored.get("stringData").is_none());
}

/// S4: DeleteCollection with a labelSelector only removes matching objects.
#[tokio::test]
async fn s4_delete_collection_respects_label_selector() {
    let router = test_router();
    send(
        &router,
        json_request(
            "POST",
            "/api/v1/namespaces/default/configmaps",
            json!({"metadata": {"name": "keep", "labels": {"tier": "gold"}}, "data": {}}),
        ),
    )
    .await;
    send(
        &router,
        json_request(
            "POST",
            "/api/v1/namespaces/default/configmaps",
            json!({"metadata": {"name": "cull", "labels": {"tier": "bronze"}}, "data": {}}),
        ),
    )
    .await;

    let (status, removed) = send(
        &router,
        empty_request("DELETE", "/api/v1/namespaces/default/configmaps?labelSelector=tier%3Dbronze"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = removed["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["metadata"]["name"], "cull");

    let (status, _) = send(&router, empty_request("GET", "/api/v1/namespaces/default/configmaps/cull")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&router, empty_request("GET", "/api/v1/namespaces/default/configmaps/keep")).await;
    assert_eq!(status, StatusCode::OK);
}

/// S5: deleting a Namespace cascades, removing objects it contained.
#[tokio::test]
async fn s5_namespace_delete_cascades_to_configmap() {
    let router = test_router();
    send(&router, json_request("POST", "/api/v1/namespaces", json!({"metadata": {"name": "team-a"}}))).await;
    send(
        &router,
        json_request(
            "POST",
            "/api/v1/namespaces/team-a/configmaps",
            json!({"metadata": {"name": "cfg"}, "data": {}}),
        ),
    )
    .await;

    let (status, _) = send(&router, empty_request("DELETE", "/api/v1/namespaces/team-a")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, empty_request("GET", "/api/v1/namespaces/team-a/configmaps/cfg")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &router,
        empty_request("GET", "/api/v1/namespaces/team-a/configmaps/kube-root-ca.crt"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// S6: a merge-patch on a Namespace bumps resourceVersion and sets a label.
#[tokio::test]
async fn s6_merge_patch_bumps_revision_and_sets_label() {
    let router = test_router();
    let (_, created) = send(&router, json_request("POST", "/api/v1/namespaces", json!({"metadata": {"name": "demo"}}))).await;
    let original_rv = created["metadata"]["resourceVersion"].as_str().unwrap().to_string();

    let patch_req = Request::builder()
        .method("PATCH")
        .uri("/api/v1/namespaces/demo")
        .header("content-type", "application/merge-patch+json")
        .body(Body::from(json!({"metadata": {"labels": {"env": "prod"}}}).to_string()))
        .unwrap();
    let (status, patched) = send(&router, patch_req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["metadata"]["labels"]["env"], "prod");
    let new_rv = patched["metadata"]["resourceVersion"].as_str().unwrap();
    assert_ne!(new_rv, original_rv);
}

/// S7: `fieldValidation=Strict` rejects a patch naming an unknown
/// `metadata` field with a 422 naming the offending path, while the same
/// patch without the directive is silently accepted.
#[tokio::test]
async fn s7_strict_field_validation_rejects_unknown_metadata_field() {
    let router = test_router();
    send(&router, json_request("POST", "/api/v1/namespaces", json!({"metadata": {"name": "demo"}}))).await;

    let strict_patch = Request::builder()
        .method("PATCH")
        .uri("/api/v1/namespaces/demo?fieldValidation=Strict")
        .header("content-type", "application/merge-patch+json")
        .body(Body::from(json!({"metadata": {"lables": {"env": "prod"}}}).to_string()))
        .unwrap();
    let (status, body) = send(&router, strict_patch).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["reason"], "Invalid");
    assert_eq!(body["details"]["causes"][0]["field"], "patch.metadata.lables");

    let lenient_patch = Request::builder()
        .method("PATCH")
        .uri("/api/v1/namespaces/demo")
        .header("content-type", "application/merge-patch+json")
        .body(Body::from(json!({"metadata": {"lables": {"env": "prod"}}}).to_string()))
        .unwrap();
    let (status, _) = send(&router, lenient_patch).await;
    assert_eq!(status, StatusCode::OK);
}

/// S8: deleting a collection of Namespaces via a label selector cascades
/// the same as deleting a single Namespace does.
#[tokio::test]
async fn s8_delete_collection_cascades_namespace_eviction() {
    let router = test_router();
    send(
        &router,
        json_request("POST", "/api/v1/namespaces", json!({"metadata": {"name": "demo", "labels": {"purge": "yes"}}})),
    )
    .await;
    send(&router, json_request("POST", "/api/v1/namespaces/demo/configmaps", json!({"metadata": {"name": "cfg"}}))).await;

    let (status, _) = send(&router, empty_request("DELETE", "/api/v1/namespaces?labelSelector=purge%3Dyes")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, left) = send(&router, empty_request("GET", "/api/v1/namespaces/demo/configmaps")).await;
    assert_eq!(left["items"].as_array().unwrap().len(), 0);
}

/// Discovery root lists the well-known paths every client probes first.
#[tokio::test]
async fn discovery_root_lists_well_known_paths() {
    let router = test_router();
    let (status, body) = send(&router, empty_request("GET", "/")).await;
    assert_eq!(status, StatusCode::OK);
    let paths: Vec<&str> = body["paths"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    for expected in ["/api", "/api/v1", "/apis", "/healthz", "/version"] {
        assert!(paths.contains(&expected), "missing path {expected}");
    }
}

/// Getting a resource that was never created is a 404 with a Status body,
/// not a panic or an empty 200.
#[tokio::test]
async fn get_missing_object_is_404_status() {
    let router = test_router();
    let (status, body) = send(&router, empty_request("GET", "/api/v1/namespaces/default/pods/ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_eq!(body["status"], json!("Failure"));
    assert_eq!(body["reason"], "NotFound");
}
