use apiserver_core::Server;
use std::sync::Arc;

/// Shared application state handed to every handler via `axum::State`.
#[derive(Clone)]
pub struct AppState {
    pub server: Arc<Server>,
}

impl AppState {
    pub fn new(server: Arc<Server>) -> Self {
        Self { server }
    }
}
