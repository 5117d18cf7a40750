//! The `Status` response envelope returned for every error, and for any
//! operation (like delete) whose natural result isn't an object.
//!
//! Unlike the type this was adapted from — which only ever *received*
//! `Status` bodies from a real apiserver — this server also *emits* them,
//! so `Serialize` is derived here too.
use serde::{Deserialize, Serialize};

fn is_zero(n: &u16) -> bool {
    *n == 0
}

/// A Kubernetes status object.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// `"Status"`, for API clients that switch on `kind`.
    #[serde(default = "status_kind")]
    pub kind: String,
    #[serde(default = "status_api_version")]
    /// Always `v1`.
    pub api_version: String,
    /// Suggested HTTP return code (0 if unset).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: u16,
    /// `"Success"` or `"Failure"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Machine-readable reason, clarifying the HTTP status code.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// Extended detail, shape depending on `reason`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<StatusDetails>,
}

fn status_kind() -> String {
    "Status".to_string()
}
fn status_api_version() -> String {
    "v1".to_string()
}

impl Status {
    /// Build a failure status for the given HTTP code/reason/message.
    pub fn failure(code: u16, reason: &str, message: impl Into<String>) -> Self {
        Status {
            kind: status_kind(),
            api_version: status_api_version(),
            code,
            status: "Failure".to_string(),
            message: message.into(),
            reason: reason.to_string(),
            details: None,
        }
    }

    /// Attach a `group/kind/name` detail triple, e.g. for 404s.
    #[must_use]
    pub fn with_details(mut self, group: &str, kind: &str, name: &str) -> Self {
        self.details = Some(StatusDetails {
            name: name.to_string(),
            group: group.to_string(),
            kind: kind.to_string(),
            causes: Vec::new(),
        });
        self
    }

    /// Attach field-error causes, e.g. for a 422 from a patch.
    #[must_use]
    pub fn with_causes(mut self, causes: Vec<StatusCause>) -> Self {
        let details = self.details.get_or_insert_with(|| StatusDetails {
            name: String::new(),
            group: String::new(),
            kind: String::new(),
            causes: Vec::new(),
        });
        details.causes = causes;
        self
    }
}

/// Status details object on the [`Status`] object.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetails {
    /// The name of the resource this status concerns.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// The group of the resource this status concerns.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    /// The kind of the resource this status concerns.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Per-field causes, populated for patch validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<StatusCause>,
}

/// A single cause on a [`StatusDetails`] object.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusCause {
    /// Machine-readable reason for this cause.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// The field this cause concerns, e.g. `"patch"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field: String,
}

#[cfg(test)]
mod test {
    use super::Status;

    #[test]
    fn delete_deserialize_test() {
        let statusresp = r#"{"kind":"Status","apiVersion":"v1","status":"Success","details":{"name":"some-app","group":"clux.dev","kind":"foos"}}"#;
        let s: Status = serde_json::from_str::<Status>(statusresp).unwrap();
        assert_eq!(s.details.unwrap().name, "some-app");
    }

    #[test]
    fn not_found_round_trips() {
        let s = Status::failure(404, "NotFound", "configmaps.\"missing\" not found")
            .with_details("", "configmaps", "missing");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["code"], 404);
        assert_eq!(json["reason"], "NotFound");
        assert_eq!(json["details"]["name"], "missing");
    }
}
