//! The type-erased object representation the engine stores and serves.
use crate::{api_resource::ApiResource, metadata::TypeMeta, resource::Resource};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::borrow::Cow;

/// A dynamic representation of a stored object: type info, metadata, and
/// whatever else the client sent, kept as an opaque JSON value.
///
/// Every object this server stores or returns is a `DynamicObject` — there
/// are no per-kind Rust structs, matching the "tagged dynamic value" model
/// called for by this server's design.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct DynamicObject {
    /// `apiVersion`/`kind`, flattened, present on anything round-tripped
    /// through JSON.
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    /// Standard object metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Everything else: `spec`, `status`, `data`, `stringData`, ...
    #[serde(flatten)]
    pub data: serde_json::Value,
}

impl DynamicObject {
    /// Create a `DynamicObject` with minimal values set from an [`ApiResource`].
    #[must_use]
    pub fn new(name: &str, resource: &ApiResource) -> Self {
        Self {
            types: Some(TypeMeta {
                api_version: resource.api_version.clone(),
                kind: resource.kind.clone(),
            }),
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            data: Default::default(),
        }
    }

    /// Attach a namespace.
    #[must_use]
    pub fn within(mut self, ns: &str) -> Self {
        self.metadata.namespace = Some(ns.into());
        self
    }

    /// The kind this object claims, if any.
    pub fn kind(&self) -> Option<&str> {
        self.types.as_ref().map(|t| t.kind.as_str())
    }
}

impl Resource for DynamicObject {
    type DynamicType = ApiResource;

    fn group(dt: &ApiResource) -> Cow<'_, str> {
        dt.group.as_str().into()
    }

    fn version(dt: &ApiResource) -> Cow<'_, str> {
        dt.version.as_str().into()
    }

    fn kind(dt: &ApiResource) -> Cow<'_, str> {
        dt.kind.as_str().into()
    }

    fn api_version(dt: &ApiResource) -> Cow<'_, str> {
        dt.api_version.as_str().into()
    }

    fn plural(dt: &ApiResource) -> Cow<'_, str> {
        dt.plural.as_str().into()
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gvk::GroupVersionKind;

    #[test]
    fn raw_custom_resource_url() {
        let gvk = GroupVersionKind::gvk("example.test", "v1", "Foo");
        let res = ApiResource::from_gvk(&gvk);
        let url = DynamicObject::url_path(&res, Some("myns"));
        assert_eq!(url, "/apis/example.test/v1/namespaces/myns/foos");
    }

    #[test]
    fn raw_resource_in_default_group_url() {
        let gvk = GroupVersionKind::gvk("", "v1", "Service");
        let res = ApiResource::from_gvk(&gvk);
        let url = DynamicObject::url_path(&res, None);
        assert_eq!(url, "/api/v1/services");
    }
}
