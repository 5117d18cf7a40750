//! A per-(group,resource) storage table: two maps (current, deleted),
//! table-local locking. Ported from `original_source/pkg/storage.go`;
//! the nested-map-under-one-lock shape is enriched from
//! `examples/other_examples/.../tracker.rs`'s `ObjectTracker`, but neither
//! its resourceVersion-conflict check nor its duplicate-create rejection
//! are carried over (see DESIGN.md).
use kube_core::dynamic::DynamicObject;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// A storage key: namespace (absent for cluster-scoped) + name.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Key {
    pub namespace: Option<String>,
    pub name: String,
}

impl Key {
    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()).map(|ns| ns.to_string()),
            name: name.to_string(),
        }
    }

    pub fn of(obj: &DynamicObject) -> Self {
        Self::new(obj.metadata.namespace.as_deref(), obj.metadata.name.as_deref().unwrap_or_default())
    }

    /// The `namespace/name` or bare `name` form used in 404 messages.
    pub fn display(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}/{}", self.name),
            None => self.name.clone(),
        }
    }
}

struct Inner {
    current: BTreeMap<Key, DynamicObject>,
    deleted: BTreeMap<Key, DynamicObject>,
}

/// One table per (group, resource). Namespaced-ness is recorded so
/// `remove_all_in_namespace` can no-op for cluster-scoped tables.
pub struct Table {
    pub namespaced: bool,
    inner: RwLock<Inner>,
}

impl Table {
    pub fn new(namespaced: bool) -> Self {
        Self {
            namespaced,
            inner: RwLock::new(Inner {
                current: BTreeMap::new(),
                deleted: BTreeMap::new(),
            }),
        }
    }

    /// Fetch a live object by key.
    pub fn get(&self, key: &Key) -> Option<DynamicObject> {
        self.inner.read().current.get(key).cloned()
    }

    /// Snapshot of every live object, in key order.
    pub fn items(&self) -> Vec<DynamicObject> {
        self.inner.read().current.values().cloned().collect()
    }

    /// Insert or replace a live object, assigning it the given revision and
    /// clearing any tombstone at the same key.
    pub fn insert(&self, key: Key, mut obj: DynamicObject, revision: u64) -> DynamicObject {
        obj.metadata.resource_version = Some(revision.to_string());
        let mut inner = self.inner.write();
        inner.deleted.remove(&key);
        inner.current.insert(key, obj.clone());
        obj
    }

    /// Tombstone the object at `key`, if present: move it from `current` to
    /// `deleted` at the given revision. Returns the removed object.
    pub fn remove(&self, key: &Key, revision: u64) -> Option<DynamicObject> {
        let mut inner = self.inner.write();
        let mut obj = inner.current.remove(key)?;
        obj.metadata.resource_version = Some(revision.to_string());
        inner.deleted.insert(key.clone(), obj.clone());
        Some(obj)
    }

    /// Remove every live object in `namespace` without tombstoning. Used
    /// only by the namespace-delete cascade.
    pub fn remove_all_in_namespace(&self, namespace: &str) {
        if !self.namespaced || namespace.is_empty() {
            return;
        }
        let mut inner = self.inner.write();
        inner.current.retain(|key, _| key.namespace.as_deref() != Some(namespace));
    }

    /// Every live and tombstoned object with revision `>= since`, current
    /// objects sorted ascending by revision, deleted objects unordered.
    pub fn dirty_since(&self, since: u64) -> (Vec<DynamicObject>, Vec<DynamicObject>) {
        let inner = self.inner.read();
        let rev_of = |o: &DynamicObject| -> u64 {
            o.metadata
                .resource_version
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0)
        };
        let mut current: Vec<DynamicObject> = inner
            .current
            .values()
            .filter(|o| rev_of(o) >= since)
            .cloned()
            .collect();
        current.sort_by_key(rev_of);
        let deleted: Vec<DynamicObject> = inner.deleted.values().filter(|o| rev_of(o) >= since).cloned().collect();
        (current, deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube_core::metadata::ObjectMeta;

    fn obj(name: &str) -> DynamicObject {
        DynamicObject {
            types: None,
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            data: serde_json::json!({}),
        }
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let t = Table::new(true);
        let key = Key::new(Some("ns"), "a");
        t.insert(key.clone(), obj("a"), 1);
        let got = t.get(&key).unwrap();
        assert_eq!(got.metadata.resource_version.as_deref(), Some("1"));
    }

    #[test]
    fn remove_tombstones_and_clears_current() {
        let t = Table::new(true);
        let key = Key::new(Some("ns"), "a");
        t.insert(key.clone(), obj("a"), 1);
        let removed = t.remove(&key, 2).unwrap();
        assert_eq!(removed.metadata.resource_version.as_deref(), Some("2"));
        assert!(t.get(&key).is_none());
        let (_, deleted) = t.dirty_since(0);
        assert_eq!(deleted.len(), 1);
    }

    #[test]
    fn current_and_deleted_are_mutually_exclusive() {
        let t = Table::new(true);
        let key = Key::new(Some("ns"), "a");
        t.insert(key.clone(), obj("a"), 1);
        t.remove(&key, 2);
        t.insert(key.clone(), obj("a"), 3);
        let (current, deleted) = t.dirty_since(0);
        assert_eq!(current.len(), 1);
        assert!(deleted.is_empty() || !deleted.iter().any(|o| o.metadata.name.as_deref() == Some("a")));
    }

    #[test]
    fn namespace_cascade_skips_cluster_scoped_tables() {
        let t = Table::new(false);
        let key = Key::new(None, "a");
        t.insert(key.clone(), obj("a"), 1);
        t.remove_all_in_namespace("ns");
        assert!(t.get(&key).is_some());
    }
}
