//! Minimal kubeconfig rendering.
//!
//! Ported from `original_source/main.go`'s
//! `clientcmd.BuildKubeConfigBytes(restcfg, metav1.NamespaceDefault)` call.
//! That helper builds a full `api.Config` via the upstream `client-go`
//! `clientcmd` package; this server has no `kube::config::Kubeconfig`
//! dependency to hand the same job to (DESIGN.md records why that crate
//! isn't in this workspace), so the handful of fields an `Accept: */*`
//! client actually reads are serialized by hand.
use serde::Serialize;
use std::net::SocketAddr;

#[derive(Serialize)]
struct Kubeconfig {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    clusters: Vec<NamedCluster>,
    contexts: Vec<NamedContext>,
    #[serde(rename = "current-context")]
    current_context: String,
    users: Vec<NamedUser>,
}

#[derive(Serialize)]
struct NamedCluster {
    name: String,
    cluster: Cluster,
}

#[derive(Serialize)]
struct Cluster {
    server: String,
    #[serde(rename = "insecure-skip-tls-verify")]
    insecure_skip_tls_verify: bool,
}

#[derive(Serialize)]
struct NamedContext {
    name: String,
    context: Context,
}

#[derive(Serialize)]
struct Context {
    cluster: String,
    user: String,
    namespace: String,
}

#[derive(Serialize)]
struct NamedUser {
    name: String,
    user: serde_json::Value,
}

/// Render a kubeconfig YAML document pointing at `addr`, with `default` as
/// the current namespace (mirroring the Go original's
/// `metav1.NamespaceDefault` argument).
pub fn render(addr: SocketAddr) -> String {
    let cfg = Kubeconfig {
        api_version: "v1",
        kind: "Config",
        clusters: vec![NamedCluster {
            name: "fake-apiserver".to_string(),
            cluster: Cluster {
                server: format!("http://{addr}"),
                insecure_skip_tls_verify: true,
            },
        }],
        contexts: vec![NamedContext {
            name: "fake-apiserver".to_string(),
            context: Context {
                cluster: "fake-apiserver".to_string(),
                user: "fake-apiserver".to_string(),
                namespace: "default".to_string(),
            },
        }],
        current_context: "fake-apiserver".to_string(),
        users: vec![NamedUser {
            name: "fake-apiserver".to_string(),
            user: serde_json::json!({}),
        }],
    };
    serde_yaml::to_string(&cfg).unwrap_or_default()
}
