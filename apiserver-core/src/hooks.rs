//! Cross-table behavior triggered by specific GVKs on create/update/delete.
//!
//! Ported from `original_source/pkg/resources/{kube-root-ca,secret,crds}.go`
//! and `pkg/create.go`/`pkg/storage.go`'s special-cased hook dispatch.
use base64::{engine::general_purpose::STANDARD, Engine};
use kube_core::{dynamic::DynamicObject, metadata::ObjectMeta};
use serde_json::{json, Map, Value};

/// The `kube-root-ca.crt` ConfigMap seeded into every namespace on create.
///
/// The CA blob is a fixed, self-contained placeholder: this server never
/// issues real certificates, so the PEM content only needs to look like a
/// CA cert, not be a valid one.
pub fn kube_root_ca_configmap(namespace: &str) -> DynamicObject {
    DynamicObject {
        types: Some(kube_core::metadata::TypeMeta {
            api_version: "v1".to_string(),
            kind: "ConfigMap".to_string(),
        }),
        metadata: ObjectMeta {
            name: Some("kube-root-ca.crt".to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: json!({
            "data": {
                "ca.crt": FAKE_CA_CERT,
            }
        }),
    }
}

const FAKE_CA_CERT: &str = "-----BEGIN CERTIFICATE-----\n\
MIIBmzCCAUGgAwIBAgIUfake000000000000000000000000wCgYIKoZIzj0EAwIw\n\
GjEYMBYGA1UEAwwPZmFrZS1hcGlzZXJ2ZXIwHhcNMjQwMTAxMDAwMDAwWhcNMzQw\n\
MTAxMDAwMDAwWjAaMRgwFgYDVQQDDA9mYWtlLWFwaXNlcnZlcjBZMBMGByqGSM49\n\
AgEGCCqGSM49AwEHA0IABE9fakeFakeFakeFakeFakeFakeFakeFakeFakeFakeF\n\
akeFakeFakeFakeFakeFakeFakeFakeFakeFakeFakeFakeFakeFakeFakeo0IwQD\n\
AdBgNVHQ4EFgQUfakefakefakefakefakefakefakefakewHwYDVR0jBBgwFoAUf\n\
akefakefakefakefakefakefakefakewDAYDVR0TAQH/BAIwADAKBggqhkjOPQQD\n\
AgNIADBFAiEAfakefakefakefakefakefakefakefakefakefakefakefakeCIFA\n\
kefakefakefakefakefakefakefakefakefakefakefakefakefakefakefake\n\
-----END CERTIFICATE-----\n";

/// `ProcessSecret`: base64-encode every `stringData` entry into `data`
/// (matching `k8s_openapi`'s `ByteString`, which is what a Secret's
/// `data` field wire-encodes as), then clear `stringData`.
pub fn process_secret(obj: &mut DynamicObject) {
    let Value::Object(root) = &mut obj.data else { return };
    let Some(string_data) = root.remove("stringData") else {
        return;
    };
    let Value::Object(string_data) = string_data else {
        return;
    };
    let data = root.entry("data").or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(data) = data else { return };
    for (k, v) in string_data {
        let encoded = match v.as_str() {
            Some(s) => Value::String(STANDARD.encode(s.as_bytes())),
            None => v,
        };
        data.insert(k, encoded);
    }
}

/// `ProcessCRD`: stamp `Established`/`NamesAccepted` conditions and derive
/// `acceptedNames`/`storedVersions` from `spec`.
pub fn process_crd(obj: &mut DynamicObject) {
    let Value::Object(root) = &mut obj.data else { return };
    let names = root.pointer("/spec/names").cloned().unwrap_or(Value::Null);
    let first_version = root
        .pointer("/spec/versions/0/name")
        .and_then(Value::as_str)
        .unwrap_or("v1")
        .to_string();

    let status = root.entry("status").or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(status) = status else { return };
    status.insert(
        "conditions".to_string(),
        json!([
            {
                "type": "Established",
                "status": "True",
                "reason": "InitialNamesAccepted",
                "message": "the initial names have been accepted",
            },
            {
                "type": "NamesAccepted",
                "status": "True",
                "reason": "NoConflicts",
                "message": "no conflicts found",
            },
        ]),
    );
    status.insert("acceptedNames".to_string(), names);
    status.insert("storedVersions".to_string(), json!([first_version]));
}

/// Which create-time hook, if any, a GVK triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationHook {
    Namespace,
    Secret,
    Crd,
}

pub fn creation_hook_for(group: &str, kind: &str) -> Option<CreationHook> {
    match (group, kind) {
        ("", "Namespace") => Some(CreationHook::Namespace),
        ("", "Secret") => Some(CreationHook::Secret),
        ("apiextensions.k8s.io", "CustomResourceDefinition") => Some(CreationHook::Crd),
        _ => None,
    }
}

/// Which update-time hook, if any, a GVK triggers (only Secret, per
/// `original_source/pkg/update.go` — no Namespace/CRD hook on update).
pub fn update_hook_for(group: &str, kind: &str) -> Option<CreationHook> {
    match (group, kind) {
        ("", "Secret") => Some(CreationHook::Secret),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_secret_base64_encodes_and_clears_string_data() {
        let mut obj = DynamicObject {
            types: None,
            metadata: Default::default(),
            data: json!({"stringData": {"user": "admin"}, "data": {}}),
        };
        process_secret(&mut obj);
        assert_eq!(obj.data["data"]["user"], STANDARD.encode(b"admin"));
        assert!(obj.data.get("stringData").is_none());
    }

    #[test]
    fn process_crd_stamps_status() {
        let mut obj = DynamicObject {
            types: None,
            metadata: Default::default(),
            data: json!({
                "spec": {
                    "names": {"kind": "Foo", "plural": "foos"},
                    "versions": [{"name": "v1"}],
                }
            }),
        };
        process_crd(&mut obj);
        assert_eq!(obj.data["status"]["storedVersions"], json!(["v1"]));
        assert_eq!(obj.data["status"]["acceptedNames"]["kind"], "Foo");
        assert_eq!(obj.data["status"]["conditions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn kube_root_ca_is_named_and_namespaced() {
        let cm = kube_root_ca_configmap("team-a");
        assert_eq!(cm.metadata.name.as_deref(), Some("kube-root-ca.crt"));
        assert_eq!(cm.metadata.namespace.as_deref(), Some("team-a"));
        assert!(cm.data["data"]["ca.crt"].as_str().unwrap().contains("BEGIN CERTIFICATE"));
    }
}
