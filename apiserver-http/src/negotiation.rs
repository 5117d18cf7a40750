//! Accept/Content-Type negotiation between JSON and YAML.
//!
//! Ported from `original_source/pkg/server.go`'s `NegotiateInputSerializer`/
//! output serializer selection: `application/*+json` and `application/*+yaml`
//! normalize to plain JSON/YAML before a codec is picked, and protobuf is
//! never offered even though the upstream serializer library supports it.
use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use kube_core::response::Status;
use mime::Mime;
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Yaml,
}

impl Encoding {
    pub fn content_type(self) -> &'static str {
        match self {
            Encoding::Json => "application/json",
            Encoding::Yaml => "application/yaml",
        }
    }
}

/// Pick a response encoding from the `Accept` header. Unrecognized or
/// absent `Accept` defaults to JSON; an `Accept` that names neither JSON
/// nor YAML (e.g. requesting protobuf) also falls back to JSON rather
/// than failing the request — this server has no 406 path, matching
/// spec's note that negotiation failures are out of scope for strict
/// enforcement.
pub fn response_encoding(headers: &HeaderMap) -> Encoding {
    let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
        return Encoding::Json;
    };
    for part in accept.split(',') {
        let candidate = part.split(';').next().unwrap_or("").trim();
        if is_yaml_mime(candidate) {
            return Encoding::Yaml;
        }
        if is_json_mime(candidate) {
            return Encoding::Json;
        }
    }
    Encoding::Json
}

/// Pick a request-body decoding from `Content-Type`, defaulting to JSON
/// when absent.
pub fn request_encoding(headers: &HeaderMap) -> Encoding {
    let Some(content_type) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return Encoding::Json;
    };
    let candidate = content_type.split(';').next().unwrap_or("").trim();
    if is_yaml_mime(candidate) {
        Encoding::Yaml
    } else {
        Encoding::Json
    }
}

fn is_json_mime(candidate: &str) -> bool {
    if candidate == "*/*" {
        return true;
    }
    let Ok(parsed) = candidate.parse::<Mime>() else {
        return false;
    };
    parsed.type_() == mime::APPLICATION && (parsed.subtype() == mime::JSON || has_suffix(&parsed, "json"))
}

fn is_yaml_mime(candidate: &str) -> bool {
    let Ok(parsed) = candidate.parse::<Mime>() else {
        return false;
    };
    (parsed.type_() == mime::APPLICATION || parsed.type_() == mime::TEXT) && (parsed.subtype().as_str() == "yaml" || has_suffix(&parsed, "yaml"))
}

fn has_suffix(mime: &Mime, suffix: &str) -> bool {
    mime.suffix().map(|name| name.as_str()) == Some(suffix)
}

/// Decode a request body according to `Content-Type`.
pub fn decode<T: DeserializeOwned>(encoding: Encoding, body: &[u8]) -> Result<T, String> {
    match encoding {
        Encoding::Json => serde_json::from_slice(body).map_err(|e| e.to_string()),
        Encoding::Yaml => serde_yaml::from_slice(body).map_err(|e| e.to_string()),
    }
}

/// Render `value` as a [`Response`] using `encoding`, with `status`.
pub fn encode_response<T: Serialize>(status: StatusCode, encoding: Encoding, value: &T) -> Response {
    let body: Result<Vec<u8>, String> = match encoding {
        Encoding::Json => serde_json::to_vec(value).map_err(|e| e.to_string()),
        Encoding::Yaml => serde_yaml::to_string(value).map(String::into_bytes).map_err(|e| e.to_string()),
    };
    match body {
        Ok(bytes) => encoded_response(status, encoding, bytes),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response body");
            let fallback = serde_json::to_vec(&Status::failure(500, "InternalError", "failed to encode response"))
                .unwrap_or_default();
            encoded_response(StatusCode::INTERNAL_SERVER_ERROR, Encoding::Json, fallback)
        }
    }
}

fn encoded_response(status: StatusCode, encoding: Encoding, body: Vec<u8>) -> Response {
    let mut response = (status, Bytes::from(body)).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, encoding.content_type().parse().unwrap());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn accept_prefers_yaml_when_named() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/yaml"));
        assert_eq!(response_encoding(&headers), Encoding::Yaml);
    }

    #[test]
    fn accept_plus_yaml_suffix_normalizes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/vnd.kubernetes.protobuf+yaml"));
        assert_eq!(response_encoding(&headers), Encoding::Yaml);
    }

    #[test]
    fn missing_accept_defaults_to_json() {
        assert_eq!(response_encoding(&HeaderMap::new()), Encoding::Json);
    }

    #[test]
    fn content_type_json_plus_suffix_normalizes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/merge-patch+json"));
        assert_eq!(request_encoding(&headers), Encoding::Json);
    }
}
