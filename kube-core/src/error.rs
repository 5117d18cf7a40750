use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building or decoding apimachinery values.
#[derive(Error, Debug)]
pub enum Error {
    /// A request parameter failed validation.
    #[error("request validation failed: {0}")]
    RequestValidation(String),

    /// Failed to (de)serialize a value as JSON.
    #[error("error (de)serializing value")]
    SerdeError(#[from] serde_json::Error),

    /// Failed to build an HTTP request/response.
    #[error("http error: {0}")]
    HttpError(#[from] http::Error),
}

/// The canonical error body returned to clients, mirroring the Kubernetes
/// `Status` object's error fields.
#[derive(Error, Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[error("{message}: {reason}")]
pub struct ErrorResponse {
    /// `"Failure"` for every response that reaches this type.
    pub status: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Machine-readable reason.
    #[serde(default)]
    pub reason: String,
    /// HTTP status code echoed in the body.
    pub code: u16,
}
