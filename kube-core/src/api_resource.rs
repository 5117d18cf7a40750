//! The discovery descriptor for an API resource.
//!
//! This consolidates what the upstream crate this was adapted from split
//! across two types (a minimal `ApiResource` and a richer, unwired
//! `discovery::ApiResource`): here there is exactly one `ApiResource`, with
//! the `namespaced` flag the registry needs to answer discovery queries and
//! to know whether a table accepts a namespace key.
use crate::{gvk::GroupVersionKind, resource::to_plural};
use serde::{Deserialize, Serialize};

/// Everything the registry and the HTTP layer need to know about a resource
/// type: its group/version/kind, its plural name, whether it is namespaced,
/// and the verbs it supports.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ApiResource {
    /// Resource group, empty for the core group.
    pub group: String,
    /// Resource version.
    pub version: String,
    /// apiVersion (`v1` for the core group, `group/version` otherwise).
    pub api_version: String,
    /// Singular PascalCase kind, e.g. `ConfigMap`.
    pub kind: String,
    /// Plural resource name, e.g. `configmaps`.
    pub plural: String,
    /// Whether the resource is namespace-scoped.
    pub namespaced: bool,
    /// Supported verbs, in discovery-response order.
    pub verbs: Vec<String>,
}

/// The fixed verb set every resource in this emulator supports (no watch).
pub const DEFAULT_VERBS: &[&str] = &[
    "create",
    "delete",
    "deletecollection",
    "get",
    "list",
    "patch",
    "update",
];

impl ApiResource {
    /// Construct a descriptor with an explicit plural and scope.
    pub fn new(gvk: &GroupVersionKind, plural: &str, namespaced: bool) -> Self {
        ApiResource {
            api_version: gvk.api_version(),
            group: gvk.group.clone(),
            version: gvk.version.clone(),
            kind: gvk.kind.clone(),
            plural: plural.to_string(),
            namespaced,
            verbs: DEFAULT_VERBS.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Infer a cluster-scoped descriptor from a GVK, guessing the plural
    /// name. Used as a best-effort fallback when an unknown resource shows
    /// up on the wire with a URL-derived kind.
    pub fn from_gvk(gvk: &GroupVersionKind) -> Self {
        ApiResource::new(gvk, &to_plural(&gvk.kind.to_ascii_lowercase()), false)
    }

    /// Override the namespaced flag.
    #[must_use]
    pub fn namespaced(mut self, namespaced: bool) -> Self {
        self.namespaced = namespaced;
        self
    }

    /// Returns the singular, lowercased name used in discovery responses.
    pub fn singular_name(&self) -> String {
        self.kind.to_ascii_lowercase()
    }

    /// Whether this descriptor supports the given verb.
    pub fn supports_operation(&self, operation: &str) -> bool {
        self.verbs.iter().any(|op| op == operation)
    }
}
