//! Converts engine errors and request-decoding failures into the
//! canonical negotiated [`Status`] response body.
use crate::negotiation::{encode_response, Encoding};
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use kube_core::response::Status;

/// A handler-level error: either the engine's own taxonomy, or a
/// request-decoding failure this layer raises before ever reaching the
/// engine (malformed body, unparseable query string).
#[derive(Debug)]
pub enum HandlerError {
    Engine(apiserver_core::Error),
    BadRequest(String),
}

impl From<apiserver_core::Error> for HandlerError {
    fn from(e: apiserver_core::Error) -> Self {
        HandlerError::Engine(e)
    }
}

impl HandlerError {
    fn status(&self) -> Status {
        match self {
            HandlerError::Engine(e) => e.to_status(),
            HandlerError::BadRequest(msg) => Status::failure(400, "BadRequest", msg.clone()),
        }
    }

    fn code(&self) -> StatusCode {
        let code = match self {
            HandlerError::Engine(e) => e.status_code(),
            HandlerError::BadRequest(_) => 400,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Render this error honoring the request's `Accept` header.
    pub fn into_response_with(self, headers: &HeaderMap) -> Response {
        let encoding = crate::negotiation::response_encoding(headers);
        encode_response(self.code(), encoding, &self.status())
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        encode_response(self.code(), Encoding::Json, &self.status())
    }
}
