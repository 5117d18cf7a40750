//! Process entry point: wires the registry/server/router together, binds
//! an ephemeral port (or `KUBE_FAKE_ADDR`, if set), writes
//! `local.kubeconfig`, and runs until SIGINT/SIGTERM with a bounded drain.
//!
//! Ported from `original_source/main.go`.
mod catalog;
mod kubeconfig;

use apiserver_core::{Registry, Server};
use apiserver_http::AppState;
use std::{sync::Arc, time::Duration};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let registry = Registry::new(catalog::seed(), &[]);
    let server = Arc::new(Server::new(registry));
    let state = Arc::new(AppState::new(server.clone()));

    let bind_addr = std::env::var("KUBE_FAKE_ADDR").unwrap_or_else(|_| "127.0.0.1:0".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "apiserver listening");

    std::fs::write("local.kubeconfig", kubeconfig::render(addr))?;
    tracing::info!("wrote local.kubeconfig");

    bootstrap_cluster(&server);
    server.checkpoint();

    let app = apiserver_http::build_router(state);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("shutdown signal received, draining for up to 5s");
        let _ = shutdown_tx.send(true);
    });

    let mut graceful_rx = shutdown_rx.clone();
    let serve = axum::serve(listener, app.into_make_service()).with_graceful_shutdown(async move {
        let _ = graceful_rx.changed().await;
    });

    let mut timeout_rx = shutdown_rx.clone();
    tokio::select! {
        result = serve => {
            result?;
        }
        _ = async move {
            let _ = timeout_rx.changed().await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        } => {
            tracing::warn!("graceful drain exceeded 5s, shutting down anyway");
        }
    }

    tracing::info!("apiserver stopped");
    dump_export(&server);
    Ok(())
}

/// `resources.InitCluster`: pre-seed `default`/`kube-system` so a client
/// connecting immediately finds the namespaces a real cluster always has.
/// Each creation triggers the `kube-root-ca.crt` ConfigMap hook.
fn bootstrap_cluster(server: &Server) {
    for ns in ["default", "kube-system"] {
        let obj = kube_core::dynamic::DynamicObject {
            types: Some(kube_core::metadata::TypeMeta {
                api_version: "v1".to_string(),
                kind: "Namespace".to_string(),
            }),
            metadata: kube_core::metadata::ObjectMeta {
                name: Some(ns.to_string()),
                ..Default::default()
            },
            data: serde_json::json!({"spec": {}, "status": {}}),
        };
        if let Err(e) = server.create("", "Namespace", "namespaces", false, None, obj) {
            tracing::warn!(namespace = ns, error = %e, "failed to bootstrap namespace");
        }
    }
}

fn dump_export(server: &Server) {
    let (current, deleted) = server.export();
    println!("CURRENT objects __________________________");
    println!("{}", serde_json::to_string_pretty(&current).unwrap_or_default());
    println!("DELETED objects __________________________");
    println!("{}", serde_json::to_string_pretty(&deleted).unwrap_or_default());
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
