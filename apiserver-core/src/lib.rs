//! The in-memory storage engine: registry, per-resource tables, the
//! server that ties them together with revision stamping and cross-table
//! hooks, and the patch dialect dispatcher.
pub mod error;
pub mod hooks;
pub mod patch;
pub mod registry;
pub mod server;
pub mod table;

pub use error::{Error, Result};
pub use registry::{GvrKey, Registry};
pub use server::Server;
pub use table::{Key, Table};
