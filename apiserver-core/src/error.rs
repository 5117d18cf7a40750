//! The error taxonomy every verb handler reduces to, matching spec §7.
use kube_core::response::{Status, StatusCause};
use thiserror::Error;

/// Engine-level errors, each carrying enough to render the canonical
/// [`Status`] body the HTTP layer sends back.
#[derive(Debug, Error)]
pub enum Error {
    /// No object exists at the requested key.
    #[error("{group_resource}/{key} not found")]
    NotFound { group_resource: String, key: String },

    /// The request body or a patch document was malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request was well-formed JSON/YAML but could not be processed
    /// (e.g. a JSON-Patch `test` failed, or a strategic-merge patch
    /// violated retain-keys).
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// The decoded object/patch failed validation (field errors attached).
    #[error("invalid: {0}")]
    Invalid { message: String, causes: Vec<StatusCause> },

    /// Anything else — an internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::BadRequest(_) => 400,
            Error::Unprocessable(_) => 422,
            Error::Invalid { .. } => 422,
            Error::Internal(_) => 500,
        }
    }

    /// Render this error as the canonical status body.
    pub fn to_status(&self) -> Status {
        match self {
            Error::NotFound { group_resource, key } => {
                Status::failure(404, "NotFound", format!("{group_resource} \"{key}\" not found"))
                    .with_details("", group_resource, key)
            }
            Error::BadRequest(msg) => Status::failure(400, "BadRequest", msg.clone()),
            Error::Unprocessable(msg) => Status::failure(422, "Invalid", msg.clone()),
            Error::Invalid { message, causes } => {
                Status::failure(422, "Invalid", message.clone()).with_causes(causes.clone())
            }
            Error::Internal(msg) => Status::failure(500, "InternalError", msg.clone()),
        }
    }

    /// Build a [`Error::NotFound`] from a group/resource and a namespace/name key.
    pub fn not_found(group_resource: impl Into<String>, namespace: Option<&str>, name: &str) -> Self {
        let key = match namespace {
            Some(ns) if !ns.is_empty() => format!("{ns}/{name}"),
            _ => name.to_string(),
        };
        Error::NotFound {
            group_resource: group_resource.into(),
            key,
        }
    }
}

/// Convenience alias for this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
