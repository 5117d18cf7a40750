//! Request option types mirroring apimachinery's `*Options` structs.
use crate::Error;
use serde::Serialize;

/// Options accepted on collection GET/DELETE calls.
///
/// Only `label_selector`/`field_selector` are acted on by this server;
/// `timeout`/`bookmarks`/`limit`/`continue_token` are carried for parity
/// with the shared apimachinery vocabulary but have no effect here since
/// watches and paginated listing are out of scope.
#[derive(Clone, Debug, Default)]
pub struct ListParams {
    /// Restricts the returned objects by label.
    pub label_selector: Option<String>,
    /// Restricts the returned objects by field.
    pub field_selector: Option<String>,
}

impl ListParams {
    /// Build from raw query-string values (`None` for an absent parameter).
    pub fn new(label_selector: Option<String>, field_selector: Option<String>) -> Self {
        Self {
            label_selector,
            field_selector,
        }
    }
}

/// The server-side validation directive for `fieldValidation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationDirective {
    /// Fail the request on any unknown/duplicate field.
    Strict,
    /// Accepted but treated identically to `Ignore`.
    ///
    /// This server has no warning-header channel to surface a warning
    /// distinct from silent acceptance, so `Warn` degrades to `Ignore`
    /// rather than to `Strict`'s fail-closed behavior.
    Warn,
    /// Silently ignore unknown/duplicate fields.
    Ignore,
}

impl ValidationDirective {
    /// Parse the `fieldValidation` query value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Strict" => Some(Self::Strict),
            "Warn" => Some(Self::Warn),
            "Ignore" => Some(Self::Ignore),
            _ => None,
        }
    }

    /// Whether this directive should fail closed on a strict-decode violation.
    pub fn fails_closed(self) -> bool {
        matches!(self, Self::Strict)
    }
}

impl Default for ValidationDirective {
    fn default() -> Self {
        Self::Ignore
    }
}

/// Options accepted on create calls.
#[derive(Default, Clone, Debug)]
pub struct CreateOptions {
    /// fieldManager of the actor making the change (recorded, not enforced).
    pub field_manager: Option<String>,
}

/// Options accepted on update calls.
#[derive(Default, Clone, Debug)]
pub struct UpdateOptions {
    /// fieldManager of the actor making the change (recorded, not enforced).
    pub field_manager: Option<String>,
}

/// Options accepted on delete/delete-collection calls. Every field is
/// accepted and ignored: there is no grace period, GC, or precondition
/// enforcement in an in-memory emulator with no owner-reference GC.
#[derive(Default, Clone, Debug)]
pub struct DeleteOptions {
    /// Present for wire compatibility; not enforced.
    pub grace_period_seconds: Option<u32>,
    /// Present for wire compatibility; not enforced.
    pub propagation_policy: Option<String>,
}

/// Options accepted on patch calls.
#[derive(Default, Clone, Debug)]
pub struct PatchOptions {
    /// fieldManager of the actor making the change.
    pub field_manager: Option<String>,
    /// Validation strictness for strategic-merge and apply patches.
    pub field_validation: Option<ValidationDirective>,
}

/// A patch request, tagged by dialect, mirroring the four Content-Types
/// this server accepts on `PATCH`.
#[derive(Debug, Clone)]
pub enum Patch {
    /// `application/json-patch+json` — RFC 6902 JSON Patch.
    #[cfg(feature = "jsonpatch")]
    Json(json_patch::Patch),
    /// `application/merge-patch+json` — RFC 7396 JSON Merge Patch.
    Merge(serde_json::Value),
    /// `application/strategic-merge-patch+json` — directive-aware merge.
    Strategic(serde_json::Value),
    /// `application/apply-patch+yaml` — accepted, applied as a no-op.
    Apply,
}

impl Patch {
    /// The canonical Content-Type for this dialect.
    pub fn content_type(&self) -> &'static str {
        match self {
            #[cfg(feature = "jsonpatch")]
            Self::Json(_) => "application/json-patch+json",
            Self::Merge(_) => "application/merge-patch+json",
            Self::Strategic(_) => "application/strategic-merge-patch+json",
            Self::Apply => "application/apply-patch+yaml",
        }
    }
}

/// Validates a field manager name the way apimachinery does: capped length.
pub fn validate_field_manager(field_manager: &Option<String>) -> Result<(), Error> {
    if let Some(fm) = field_manager {
        if fm.len() > 128 {
            return Err(Error::RequestValidation("fieldManager exceeds 128 bytes".into()));
        }
    }
    Ok(())
}

/// Marker trait bound kept for parity with `serde::Serialize`-bounded
/// patch payloads used elsewhere in the apimachinery vocabulary.
pub trait Serializable: Serialize {}
impl<T: Serialize> Serializable for T {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn field_validation_parses_known_values() {
        assert_eq!(ValidationDirective::parse("Strict"), Some(ValidationDirective::Strict));
        assert_eq!(ValidationDirective::parse("Warn"), Some(ValidationDirective::Warn));
        assert_eq!(ValidationDirective::parse("Ignore"), Some(ValidationDirective::Ignore));
        assert_eq!(ValidationDirective::parse("bogus"), None);
    }

    #[test]
    fn only_strict_fails_closed() {
        assert!(ValidationDirective::Strict.fails_closed());
        assert!(!ValidationDirective::Warn.fails_closed());
        assert!(!ValidationDirective::Ignore.fails_closed());
    }

    #[test]
    fn field_manager_validation_rejects_long_names() {
        let long = Some("x".repeat(200));
        assert!(validate_field_manager(&long).is_err());
        assert!(validate_field_manager(&Some("ok".to_string())).is_ok());
    }
}
