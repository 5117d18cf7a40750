//! The `Server`: one revision counter, lazily-created tables, and the
//! cross-table hooks triggered by specific GVKs.
//!
//! Ported from `original_source/pkg/server.go`'s `Server`/`storeFor`/
//! `nextRevision` and `pkg/create.go`'s `generateName` handling. The single
//! coarse lock protecting the table map and revision counter mirrors the
//! original's one `sync.Mutex` guarding both (spec §5's lock-ordering rule).
use crate::{
    error::{Error, Result},
    hooks::{self, CreationHook},
    patch,
    registry::Registry,
    table::{Key, Table},
};
use kube_core::{dynamic::DynamicObject, params::{ListParams, ValidationDirective}};
use parking_lot::Mutex;
use rand::{distr::Alphanumeric, Rng};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// Lazily-created per-(group,resource) tables plus the shared revision
/// counter and descriptor catalog.
pub struct Server {
    registry: Registry,
    revision: AtomicU64,
    tables: Mutex<HashMap<(String, String), Arc<Table>>>,
    checked_revision: AtomicU64,
}

impl Server {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            revision: AtomicU64::new(0),
            tables: Mutex::new(HashMap::new()),
            checked_revision: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fetch or lazily create the table for `(group, resource)`.
    pub fn store_for(&self, group: &str, resource: &str, namespaced: bool) -> Arc<Table> {
        let key = (group.to_string(), resource.to_string());
        let mut tables = self.tables.lock();
        tables
            .entry(key)
            .or_insert_with(|| Arc::new(Table::new(namespaced)))
            .clone()
    }

    /// Every known `(group, resource)` table, including ones never yet
    /// touched by a write (used by discovery and export).
    fn all_tables(&self) -> Vec<((String, String), Arc<Table>)> {
        self.tables.lock().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Create a new object: synthesizes `name` from `generateName` when
    /// absent, normalizes namespace from the URL, runs the create-time
    /// hook (if any), stamps a revision, and inserts it.
    pub fn create(
        &self,
        group: &str,
        kind: &str,
        resource: &str,
        namespaced: bool,
        namespace: Option<&str>,
        mut obj: DynamicObject,
    ) -> Result<DynamicObject> {
        if obj.metadata.name.as_deref().unwrap_or("").is_empty() {
            if let Some(prefix) = obj.metadata.generate_name.clone() {
                obj.metadata.name = Some(format!("{prefix}{}", random_suffix()));
            }
        }
        if obj.metadata.name.as_deref().unwrap_or("").is_empty() {
            return Err(Error::BadRequest("object has no name or generateName".into()));
        }
        if namespaced {
            obj.metadata.namespace = namespace.map(str::to_string);
        } else {
            obj.metadata.namespace = None;
        }

        let hook = hooks::creation_hook_for(group, kind);
        if let Some(hook) = hook {
            self.run_creation_hook(hook, group, &mut obj)?;
        }

        let table = self.store_for(group, resource, namespaced);
        let key = Key::of(&obj);
        let revision = self.next_revision();
        let stored = table.insert(key.clone(), obj, revision);
        tracing::debug!(group, resource, namespace = ?namespace, name = %key.name, revision, "created object");

        if hook == Some(CreationHook::Namespace) {
            self.seed_kube_root_ca(&key.name)?;
        }
        Ok(stored)
    }

    fn run_creation_hook(&self, hook: CreationHook, _group: &str, obj: &mut DynamicObject) -> Result<()> {
        match hook {
            CreationHook::Secret => hooks::process_secret(obj),
            CreationHook::Crd => {
                hooks::process_crd(obj);
                self.register_crd_descriptors(obj);
            }
            CreationHook::Namespace => {}
        }
        Ok(())
    }

    /// Derive and register an [`kube_core::api_resource::ApiResource`] per
    /// declared version, so the new custom resource shows up in discovery
    /// and can be looked up without a Registry seed entry.
    fn register_crd_descriptors(&self, crd: &DynamicObject) {
        let group = crd.data.pointer("/spec/group").and_then(|v| v.as_str()).unwrap_or_default();
        let plural = crd
            .data
            .pointer("/spec/names/plural")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let kind = crd.data.pointer("/spec/names/kind").and_then(|v| v.as_str()).unwrap_or_default();
        let namespaced = crd.data.pointer("/spec/scope").and_then(|v| v.as_str()) != Some("Cluster");
        if group.is_empty() || plural.is_empty() || kind.is_empty() {
            return;
        }
        let Some(versions) = crd.data.pointer("/spec/versions").and_then(|v| v.as_array()) else {
            return;
        };
        for version in versions {
            let Some(name) = version.get("name").and_then(|v| v.as_str()) else {
                continue;
            };
            let gvk = kube_core::gvk::GroupVersionKind::gvk(group, name, kind);
            self.registry.set(kube_core::api_resource::ApiResource::new(&gvk, plural, namespaced));
        }
    }

    fn seed_kube_root_ca(&self, namespace: &str) -> Result<()> {
        let table = self.store_for("", "configmaps", true);
        let cm = hooks::kube_root_ca_configmap(namespace);
        let key = Key::of(&cm);
        let revision = self.next_revision();
        table.insert(key, cm, revision);
        tracing::debug!(namespace, "seeded kube-root-ca.crt configmap");
        Ok(())
    }

    /// Replace an object wholesale. No generate-name synthesis, no 201,
    /// no ConfigMap seeding; Secret rewriting still runs.
    pub fn update(
        &self,
        group: &str,
        kind: &str,
        resource: &str,
        namespaced: bool,
        namespace: Option<&str>,
        name: &str,
        mut obj: DynamicObject,
    ) -> Result<DynamicObject> {
        obj.metadata.name = Some(name.to_string());
        obj.metadata.namespace = if namespaced { namespace.map(str::to_string) } else { None };

        if let Some(hook) = hooks::update_hook_for(group, kind) {
            match hook {
                CreationHook::Secret => hooks::process_secret(&mut obj),
                _ => {}
            }
        }

        let table = self.store_for(group, resource, namespaced);
        let key = Key::of(&obj);
        let revision = self.next_revision();
        let stored = table.insert(key.clone(), obj, revision);
        tracing::debug!(group, resource, namespace = ?namespace, name, revision, "updated object");
        Ok(stored)
    }

    pub fn get(
        &self,
        group_resource: &str,
        group: &str,
        resource: &str,
        namespaced: bool,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject> {
        let table = self.store_for(group, resource, namespaced);
        let key = Key::new(namespace, name);
        table.get(&key).ok_or_else(|| Error::not_found(group_resource, namespace, name))
    }

    pub fn list(
        &self,
        group: &str,
        resource: &str,
        namespaced: bool,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Vec<DynamicObject>> {
        let table = self.store_for(group, resource, namespaced);
        let selector = match &params.label_selector {
            Some(raw) => Some(
                kube_core::labels::Selector::parse(raw)
                    .map_err(|e| Error::BadRequest(format!("invalid label selector: {e}")))?,
            ),
            None => None,
        };
        let field_selector = params.field_selector.as_deref();

        let items = table.items().into_iter().filter(|obj| {
            if let Some(ns) = namespace {
                if !ns.is_empty() && obj.metadata.namespace.as_deref() != Some(ns) {
                    return false;
                }
            }
            if let Some(selector) = &selector {
                let labels = obj.metadata.labels.clone().unwrap_or_default().into_iter().collect();
                if !selector.matches(&labels) {
                    return false;
                }
            }
            if let Some(field_selector) = field_selector {
                if !matches_field_selector(obj, field_selector) {
                    return false;
                }
            }
            true
        });
        Ok(items.collect())
    }

    pub fn delete(
        &self,
        group_resource: &str,
        group: &str,
        kind: &str,
        resource: &str,
        namespaced: bool,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject> {
        let table = self.store_for(group, resource, namespaced);
        let key = Key::new(namespace, name);
        let revision = self.next_revision();
        let removed = table
            .remove(&key, revision)
            .ok_or_else(|| Error::not_found(group_resource, namespace, name))?;
        tracing::debug!(group, resource, namespace = ?namespace, name, revision, "deleted object");

        if group.is_empty() && kind == "Namespace" {
            self.cascade_namespace_delete(name);
        }
        Ok(removed)
    }

    pub fn delete_collection(
        &self,
        group: &str,
        kind: &str,
        resource: &str,
        namespaced: bool,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Vec<DynamicObject>> {
        let victims = self.list(group, resource, namespaced, namespace, params)?;
        let table = self.store_for(group, resource, namespaced);
        let mut removed = Vec::with_capacity(victims.len());
        for obj in victims {
            let key = Key::of(&obj);
            let revision = self.next_revision();
            if let Some(tombstoned) = table.remove(&key, revision) {
                if group.is_empty() && kind == "Namespace" {
                    self.cascade_namespace_delete(&key.name);
                }
                removed.push(tombstoned);
            }
        }
        Ok(removed)
    }

    /// Apply a patch to the current object at `key`, re-running the
    /// update-time hooks and stamping a fresh revision.
    ///
    /// `field_validation` of [`ValidationDirective::Strict`] rejects the
    /// patch up front if it names a field this server doesn't recognize,
    /// rather than silently merging it in.
    #[allow(clippy::too_many_arguments)]
    pub fn patch(
        &self,
        group_resource: &str,
        group: &str,
        kind: &str,
        resource: &str,
        namespaced: bool,
        namespace: Option<&str>,
        name: &str,
        patch_request: &kube_core::params::Patch,
        field_validation: Option<ValidationDirective>,
    ) -> Result<DynamicObject> {
        if field_validation.unwrap_or_default().fails_closed() {
            let causes = patch::strict_violations(patch_request);
            if !causes.is_empty() {
                return Err(Error::Invalid {
                    message: format!("{name} failed strict field validation"),
                    causes,
                });
            }
        }

        let table = self.store_for(group, resource, namespaced);
        let key = Key::new(namespace, name);
        let current = table.get(&key).ok_or_else(|| Error::not_found(group_resource, namespace, name))?;

        let current_json = serde_json::to_value(&current).map_err(|e| Error::Internal(e.to_string()))?;
        let patched_json = patch::apply(&current_json, patch_request)?;
        let mut patched: DynamicObject =
            serde_json::from_value(patched_json).map_err(|e| Error::BadRequest(e.to_string()))?;

        patched.metadata.namespace = if namespaced { namespace.map(str::to_string) } else { None };
        patched.metadata.name = Some(name.to_string());

        if let Some(CreationHook::Secret) = hooks::update_hook_for(group, kind) {
            hooks::process_secret(&mut patched);
        }

        let revision = self.next_revision();
        let stored = table.insert(key, patched, revision);
        Ok(stored)
    }

    /// Evict every namespaced object whose namespace is `namespace`,
    /// across every table (the only cross-table write besides
    /// `kube-root-ca.crt` seeding). Not tombstoned, per spec.
    fn cascade_namespace_delete(&self, namespace: &str) {
        for ((group, resource), table) in self.all_tables() {
            table.remove_all_in_namespace(namespace);
            tracing::trace!(group, resource, namespace, "namespace cascade");
        }
    }

    /// Latch the current revision counter as the checkpoint baseline.
    pub fn checkpoint(&self) {
        self.checked_revision.store(self.revision.load(Ordering::SeqCst), Ordering::SeqCst);
    }

    /// Every object (current and deleted, across all tables) whose
    /// revision is `>=` the last checkpoint.
    pub fn export(&self) -> (Vec<DynamicObject>, Vec<DynamicObject>) {
        let since = self.checked_revision.load(Ordering::SeqCst);
        let mut current_dirty = Vec::new();
        let mut deleted_dirty = Vec::new();
        for (_, table) in self.all_tables() {
            let (mut current, mut deleted) = table.dirty_since(since);
            current_dirty.append(&mut current);
            deleted_dirty.append(&mut deleted);
        }
        current_dirty.sort_by_key(|o| {
            o.metadata
                .resource_version
                .as_deref()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0)
        });
        (current_dirty, deleted_dirty)
    }
}

fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(6)
        .map(char::from)
        .collect()
}

/// Minimal field-selector support: only `metadata.name`/`metadata.namespace`.
fn matches_field_selector(obj: &DynamicObject, raw: &str) -> bool {
    raw.split(',').all(|term| {
        let term = term.trim();
        if let Some((field, value)) = term.split_once("!=") {
            return field_value(obj, field.trim()).as_deref() != Some(value.trim());
        }
        if let Some((field, value)) = term.split_once('=') {
            return field_value(obj, field.trim()).as_deref() == Some(value.trim());
        }
        true
    })
}

fn field_value(obj: &DynamicObject, field: &str) -> Option<String> {
    match field {
        "metadata.name" => obj.metadata.name.clone(),
        "metadata.namespace" => obj.metadata.namespace.clone(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube_core::{api_resource::ApiResource, gvk::GroupVersionKind, metadata::ObjectMeta};
    use serde_json::json;

    fn server() -> Server {
        Server::new(Registry::new(
            vec![ApiResource::new(&GroupVersionKind::gvk("", "v1", "ConfigMap"), "configmaps", true)],
            &[],
        ))
    }

    fn cm(name: &str) -> DynamicObject {
        DynamicObject {
            types: None,
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            data: json!({"data": {}}),
        }
    }

    #[test]
    fn create_stamps_increasing_revisions() {
        let s = server();
        let a = s.create("", "ConfigMap", "configmaps", true, Some("default"), cm("a")).unwrap();
        let b = s.create("", "ConfigMap", "configmaps", true, Some("default"), cm("b")).unwrap();
        let rev_a: u64 = a.metadata.resource_version.unwrap().parse().unwrap();
        let rev_b: u64 = b.metadata.resource_version.unwrap().parse().unwrap();
        assert!(rev_b > rev_a);
    }

    #[test]
    fn create_synthesizes_generate_name() {
        let s = server();
        let mut obj = cm("");
        obj.metadata.name = None;
        obj.metadata.generate_name = Some("cm-".to_string());
        let created = s.create("", "ConfigMap", "configmaps", true, Some("default"), obj).unwrap();
        let name = created.metadata.name.unwrap();
        assert!(name.starts_with("cm-"));
        assert_eq!(name.len(), "cm-".len() + 6);
    }

    #[test]
    fn namespace_creation_seeds_root_ca_configmap() {
        let s = server();
        let mut ns = cm("team-a");
        ns.types = Some(kube_core::metadata::TypeMeta {
            api_version: "v1".to_string(),
            kind: "Namespace".to_string(),
        });
        s.create("", "Namespace", "namespaces", false, None, ns).unwrap();
        let found = s.get("configmaps", "", "configmaps", true, Some("team-a"), "kube-root-ca.crt").unwrap();
        assert_eq!(found.metadata.name.as_deref(), Some("kube-root-ca.crt"));
    }

    #[test]
    fn namespace_delete_cascades_across_tables() {
        let s = server();
        s.create("", "ConfigMap", "configmaps", true, Some("team-a"), cm("one")).unwrap();
        s.delete("namespaces", "", "Namespace", "namespaces", false, None, "team-a").unwrap();
        let left = s.list("", "configmaps", true, Some("team-a"), &ListParams::default()).unwrap();
        assert!(left.is_empty());
    }

    #[test]
    fn namespace_delete_collection_also_cascades() {
        let s = server();
        s.create("", "ConfigMap", "configmaps", true, Some("team-a"), cm("one")).unwrap();
        let mut ns = cm("team-a");
        ns.types = Some(kube_core::metadata::TypeMeta {
            api_version: "v1".to_string(),
            kind: "Namespace".to_string(),
        });
        s.create("", "Namespace", "namespaces", false, None, ns).unwrap();

        let removed = s
            .delete_collection("", "Namespace", "namespaces", false, None, &ListParams::default())
            .unwrap();
        assert_eq!(removed.len(), 1);
        let left = s.list("", "configmaps", true, Some("team-a"), &ListParams::default()).unwrap();
        assert!(left.is_empty());
    }

    #[test]
    fn checkpoint_and_export_only_return_dirty_objects() {
        let s = server();
        s.create("", "ConfigMap", "configmaps", true, Some("default"), cm("a")).unwrap();
        s.checkpoint();
        s.create("", "ConfigMap", "configmaps", true, Some("default"), cm("b")).unwrap();
        let (current, _deleted) = s.export();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].metadata.name.as_deref(), Some("b"));
    }

    #[test]
    fn get_missing_object_is_not_found() {
        let s = server();
        let err = s.get("configmaps", "", "configmaps", true, Some("default"), "missing").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn list_with_label_selector_is_a_subset_matching_the_selector() {
        let s = server();
        let mut gold = cm("gold");
        gold.metadata.labels = Some([("tier".to_string(), "gold".to_string())].into_iter().collect());
        let mut bronze = cm("bronze");
        bronze.metadata.labels = Some([("tier".to_string(), "bronze".to_string())].into_iter().collect());
        s.create("", "ConfigMap", "configmaps", true, Some("default"), gold).unwrap();
        s.create("", "ConfigMap", "configmaps", true, Some("default"), bronze).unwrap();

        let all = s.list("", "configmaps", true, Some("default"), &ListParams::default()).unwrap();
        let mut filtered_params = ListParams::default();
        filtered_params.label_selector = Some("tier=gold".to_string());
        let filtered = s.list("", "configmaps", true, Some("default"), &filtered_params).unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(filtered.len(), 1);
        assert!(filtered.iter().all(|o| o.metadata.labels.as_ref().and_then(|l| l.get("tier")).map(String::as_str) == Some("gold")));
        let all_names: std::collections::HashSet<_> = all.iter().filter_map(|o| o.metadata.name.clone()).collect();
        assert!(filtered.iter().all(|o| all_names.contains(o.metadata.name.as_ref().unwrap())));
    }

    #[test]
    fn crd_creation_stamps_status_and_registers_descriptor() {
        let s = server();
        let mut crd = cm("foos.example.test");
        crd.types = Some(kube_core::metadata::TypeMeta {
            api_version: "apiextensions.k8s.io/v1".to_string(),
            kind: "CustomResourceDefinition".to_string(),
        });
        crd.data = json!({
            "spec": {
                "group": "example.test",
                "names": {"kind": "Foo", "plural": "foos"},
                "scope": "Namespaced",
                "versions": [{"name": "v1"}],
            }
        });
        let stored = s
            .create("apiextensions.k8s.io", "CustomResourceDefinition", "customresourcedefinitions", false, None, crd)
            .unwrap();
        assert_eq!(stored.data["status"]["storedVersions"], json!(["v1"]));
        let descriptor = s.registry().lookup("example.test", "v1", "foos");
        assert_eq!(descriptor.kind, "Foo");
        assert!(descriptor.namespaced);
    }
}
