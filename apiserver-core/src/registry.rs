//! The (group, version, resource) -> descriptor catalog.
//!
//! Ported from `original_source/pkg/server.go`'s `Registry`/official-groups
//! filtering and `NewServer`'s discovery assembly; version-precedence
//! sorting is `kube_core::version::Version`'s `Ord`, used exactly as its own
//! doctest demonstrates (`sort_by_cached_key(|v| Reverse(Version::parse(v)))`).
use kube_core::{api_resource::ApiResource, gvk::GroupVersionKind, version::Version};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::{
    cmp::Reverse,
    collections::{HashMap, HashSet},
};

/// Groups admitted into a [`Registry`] without being named in the
/// caller-supplied allow-list, ported from `clientgoscheme.Scheme`'s
/// built-in group registrations that `original_source/pkg/server.go`
/// consults via `meta_util.IsOfficialType`.
static OFFICIAL_GROUPS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "",
        "apps",
        "batch",
        "apiextensions.k8s.io",
        "rbac.authorization.k8s.io",
        "networking.k8s.io",
        "storage.k8s.io",
        "policy",
        "autoscaling",
        "admissionregistration.k8s.io",
    ]
    .into_iter()
    .collect()
});

/// Key used to look resources up: `(group, version, plural resource)`.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct GvrKey {
    pub group: String,
    pub version: String,
    pub resource: String,
}

/// A read-mostly map from `(group, version, resource)` to its descriptor,
/// seeded once from a supplied catalog and otherwise only grown by
/// best-effort entries for resources the server sees on the wire but
/// doesn't know about.
pub struct Registry {
    entries: RwLock<HashMap<GvrKey, ApiResource>>,
}

impl Registry {
    /// Seed a registry from a static catalog, defaulting an absent
    /// group to the core group and an absent version to `v1`. Descriptors
    /// whose group is neither in [`OFFICIAL_GROUPS`] nor in
    /// `extra_allowed_groups` are dropped — CRD groups must be named
    /// explicitly by the caller assembling the catalog.
    pub fn new(catalog: impl IntoIterator<Item = ApiResource>, extra_allowed_groups: &[&str]) -> Self {
        let mut entries = HashMap::new();
        for mut descriptor in catalog {
            if !OFFICIAL_GROUPS.contains(descriptor.group.as_str()) && !extra_allowed_groups.contains(&descriptor.group.as_str()) {
                continue;
            }
            if descriptor.version.is_empty() {
                descriptor.version = "v1".to_string();
            }
            descriptor.api_version = if descriptor.group.is_empty() {
                descriptor.version.clone()
            } else {
                format!("{}/{}", descriptor.group, descriptor.version)
            };
            let key = GvrKey {
                group: descriptor.group.clone(),
                version: descriptor.version.clone(),
                resource: descriptor.plural.clone(),
            };
            entries.insert(key, descriptor);
        }
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Look a descriptor up by group/version/resource. Returns a
    /// best-effort descriptor (kind guessed from the resource name,
    /// namespaced=false per spec's unknown-descriptor default) for unknown
    /// resources rather than failing — unknown resources are tolerated,
    /// not rejected. Callers that need the real scope derive `namespaced`
    /// from the matched route instead of trusting this fallback
    /// descriptor.
    pub fn lookup(&self, group: &str, version: &str, resource: &str) -> ApiResource {
        let version = if version.is_empty() { "v1" } else { version };
        let key = GvrKey {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        };
        if let Some(existing) = self.entries.read().get(&key) {
            return existing.clone();
        }
        let guessed_kind = singularize_to_kind(resource);
        let gvk = GroupVersionKind::gvk(group, version, &guessed_kind);
        ApiResource::new(&gvk, resource, false)
    }

    /// Insert or replace a descriptor.
    pub fn set(&self, descriptor: ApiResource) {
        let key = GvrKey {
            group: descriptor.group.clone(),
            version: descriptor.version.clone(),
            resource: descriptor.plural.clone(),
        };
        self.entries.write().insert(key, descriptor);
    }

    /// Visit every known descriptor.
    pub fn visit(&self, mut f: impl FnMut(&ApiResource)) {
        for descriptor in self.entries.read().values() {
            f(descriptor);
        }
    }

    /// All distinct non-empty groups known to the registry.
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self
            .entries
            .read()
            .values()
            .map(|d| d.group.clone())
            .filter(|g| !g.is_empty())
            .collect();
        groups.sort();
        groups.dedup();
        groups
    }

    /// Versions known for a group, sorted by descending precedence
    /// (the first element is the preferred version).
    pub fn versions_for_group(&self, group: &str) -> Vec<String> {
        let mut versions: Vec<String> = self
            .entries
            .read()
            .values()
            .filter(|d| d.group == group)
            .map(|d| d.version.clone())
            .collect();
        versions.sort();
        versions.dedup();
        versions.sort_by_cached_key(|v| Reverse(Version::parse(v)));
        versions
    }

    /// All descriptors for a given (group, version).
    pub fn resources_for_group_version(&self, group: &str, version: &str) -> Vec<ApiResource> {
        let mut resources: Vec<ApiResource> = self
            .entries
            .read()
            .values()
            .filter(|d| d.group == group && d.version == version)
            .cloned()
            .collect();
        resources.sort_by(|a, b| a.plural.cmp(&b.plural));
        resources
    }
}

// Best-effort PascalCase-ish kind guess from a plural resource name, used
// only when an object arrives referencing a resource the catalog never
// seeded (an unrecognized CRD, say). Not a true de-pluralizer; good enough
// for a kind that's only ever echoed back, never schema-validated.
fn singularize_to_kind(resource: &str) -> String {
    let singular = resource.strip_suffix('s').unwrap_or(resource);
    let mut chars = singular.chars();
    match chars.next() {
        Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cm() -> ApiResource {
        ApiResource::new(&GroupVersionKind::gvk("", "v1", "ConfigMap"), "configmaps", true)
    }

    #[test]
    fn lookup_returns_seeded_descriptor() {
        let reg = Registry::new(vec![cm()], &[]);
        let found = reg.lookup("", "v1", "configmaps");
        assert_eq!(found.kind, "ConfigMap");
        assert!(found.namespaced);
    }

    #[test]
    fn lookup_defaults_version_to_v1() {
        let reg = Registry::new(vec![cm()], &[]);
        let found = reg.lookup("", "", "configmaps");
        assert_eq!(found.version, "v1");
    }

    #[test]
    fn lookup_tolerates_unknown_resource() {
        let reg = Registry::new(vec![], &[]);
        let found = reg.lookup("example.test", "v1", "widgets");
        assert_eq!(found.kind, "Widget");
    }

    #[test]
    fn lookup_fallback_defaults_to_cluster_scoped() {
        let reg = Registry::new(vec![], &[]);
        let found = reg.lookup("example.test", "v1", "widgets");
        assert!(!found.namespaced);
    }

    #[test]
    fn versions_sorted_by_descending_precedence() {
        let reg = Registry::new(
            vec![
                ApiResource::new(&GroupVersionKind::gvk("example.test", "v1beta1", "Foo"), "foos", true),
                ApiResource::new(&GroupVersionKind::gvk("example.test", "v1", "Foo"), "foos", true),
                ApiResource::new(&GroupVersionKind::gvk("example.test", "v1alpha1", "Foo"), "foos", true),
            ],
            &["example.test"],
        );
        let versions = reg.versions_for_group("example.test");
        assert_eq!(versions, vec!["v1", "v1beta1", "v1alpha1"]);
    }

    #[test]
    fn construction_drops_unofficial_groups_not_in_allow_list() {
        let reg = Registry::new(
            vec![ApiResource::new(&GroupVersionKind::gvk("example.test", "v1", "Foo"), "foos", true)],
            &[],
        );
        assert!(reg.groups().is_empty());
    }
}
