pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use once_cell::sync::Lazy;
use std::{borrow::Cow, collections::BTreeMap};

/// An accessor trait for objects that carry [`ObjectMeta`].
///
/// Every stored object, typed or dynamic, implements this so the engine can
/// read name/namespace/labels without matching on a concrete Rust type.
pub trait Resource {
    /// Runtime type information for types that don't know their resource
    /// identity at compile time (every stored object here is this kind).
    type DynamicType: Send + Sync + 'static;

    /// Returns the kind of this object.
    fn kind(dt: &Self::DynamicType) -> Cow<'_, str>;
    /// Returns the group of this object.
    fn group(dt: &Self::DynamicType) -> Cow<'_, str>;
    /// Returns the version of this object.
    fn version(dt: &Self::DynamicType) -> Cow<'_, str>;
    /// Returns the apiVersion of this object.
    fn api_version(dt: &Self::DynamicType) -> Cow<'_, str> {
        let group = Self::group(dt);
        if group.is_empty() {
            return Self::version(dt);
        }
        let mut group = group.into_owned();
        group.push('/');
        group.push_str(&Self::version(dt));
        group.into()
    }
    /// Returns the plural resource name for this kind.
    fn plural(dt: &Self::DynamicType) -> Cow<'_, str> {
        to_plural(&Self::kind(dt).to_ascii_lowercase()).into()
    }

    /// Builds the URL path used to reach collections/items of this resource.
    fn url_path(dt: &Self::DynamicType, namespace: Option<&str>) -> String {
        let n = if let Some(ns) = namespace {
            format!("namespaces/{ns}/")
        } else {
            "".into()
        };
        let group = Self::group(dt);
        let api_version = Self::api_version(dt);
        let plural = Self::plural(dt);
        format!(
            "/{prefix}/{api_version}/{n}{plural}",
            prefix = if group.is_empty() { "api" } else { "apis" },
        )
    }

    /// Metadata every stored object carries.
    fn meta(&self) -> &ObjectMeta;
    /// Mutable access to the metadata every stored object carries.
    fn meta_mut(&mut self) -> &mut ObjectMeta;
}

/// Helper accessors layered on top of [`Resource`].
pub trait ResourceExt: Resource {
    /// The object's name, panicking if unset.
    fn name(&self) -> String;
    /// The namespace the object is in, if any.
    fn namespace(&self) -> Option<String>;
    /// The object's resourceVersion stamp.
    fn resource_version(&self) -> Option<String>;
    /// The object's labels.
    fn labels(&self) -> &BTreeMap<String, String>;
    /// Mutable access to the object's labels.
    fn labels_mut(&mut self) -> &mut BTreeMap<String, String>;
    /// The object's annotations.
    fn annotations(&self) -> &BTreeMap<String, String>;
    /// The object's owner references.
    fn owner_references(&self) -> &[OwnerReference];
}

static EMPTY_MAP: Lazy<BTreeMap<String, String>> = Lazy::new(BTreeMap::new);

impl<K: Resource> ResourceExt for K {
    fn name(&self) -> String {
        self.meta().name.clone().expect(".metadata.name missing")
    }

    fn namespace(&self) -> Option<String> {
        self.meta().namespace.clone()
    }

    fn resource_version(&self) -> Option<String> {
        self.meta().resource_version.clone()
    }

    fn labels(&self) -> &BTreeMap<String, String> {
        self.meta().labels.as_ref().unwrap_or(&EMPTY_MAP)
    }

    fn labels_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.meta_mut().labels.get_or_insert_with(BTreeMap::new)
    }

    fn annotations(&self) -> &BTreeMap<String, String> {
        self.meta().annotations.as_ref().unwrap_or(&EMPTY_MAP)
    }

    fn owner_references(&self) -> &[OwnerReference] {
        self.meta().owner_references.as_deref().unwrap_or_default()
    }
}

// Handles endpoints/endpointslices/nodemetrics/podmetrics specially, then
// the usual -s/-es/-ies english pluralization rules.
pub(crate) fn to_plural(word: &str) -> String {
    if word == "endpoints" || word == "endpointslices" {
        return word.to_owned();
    } else if word == "nodemetrics" {
        return "nodes".to_owned();
    } else if word == "podmetrics" {
        return "pods".to_owned();
    }

    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }

    if word.ends_with('y') {
        if let Some(c) = word.chars().nth(word.len() - 2) {
            if !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u') {
                let mut chars = word.chars();
                chars.next_back();
                return format!("{}ies", chars.as_str());
            }
        }
    }

    format!("{word}s")
}
