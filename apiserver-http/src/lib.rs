//! HTTP surface for the in-memory apiserver: routing, verb handlers,
//! discovery, and content negotiation over [`apiserver_core::Server`].
pub mod error;
mod handlers;
pub mod negotiation;
pub mod query;
pub mod router;
pub mod state;

pub use router::build as build_router;
pub use state::AppState;
