//! `application/strategic-merge-patch+json`: directive-aware merge.
//!
//! Ported from `original_source/pkg/patch.go`'s `StrategicMergeMapPatch`
//! call and `interpretStrategicMergePatchError`'s taxonomy. This server has
//! no compiled-in OpenAPI schema to read merge keys from, so list merging
//! uses the same fallback apimachinery itself uses for unregistered types:
//! lists of objects merge element-wise by `name` when every element has
//! one, otherwise a list is replaced wholesale — never diffed positionally.
use super::{bad_request, unprocessable};
use crate::error::Result;
use serde_json::{Map, Value};

const PATCH_DIRECTIVE: &str = "$patch";
const RETAIN_KEYS_DIRECTIVE: &str = "$retainKeys";
const SET_ELEMENT_ORDER_PREFIX: &str = "$setElementOrder/";
const DELETE_FROM_PRIMITIVE_LIST_PREFIX: &str = "$deleteFromPrimitiveList/";

pub fn apply(target: &Value, patch: &Value) -> Result<Value> {
    let Value::Object(patch_map) = patch else {
        return Err(bad_request("strategic merge patch document must be a JSON object"));
    };
    merge_object(target, patch_map)
}

fn merge_object(target: &Value, patch: &Map<String, Value>) -> Result<Value> {
    if let Some(directive) = patch.get(PATCH_DIRECTIVE).and_then(Value::as_str) {
        return match directive {
            "replace" => {
                let mut stripped = patch.clone();
                stripped.remove(PATCH_DIRECTIVE);
                Ok(Value::Object(stripped))
            }
            "delete" => Ok(Value::Null),
            other => Err(bad_request(format!("unsupported $patch directive: {other}"))),
        };
    }

    let mut out = match target {
        Value::Object(m) => m.clone(),
        Value::Null => Map::new(),
        _ => return Err(unprocessable("cannot strategically merge a non-object value")),
    };

    let mut set_element_orders: Vec<(&str, &Value)> = Vec::new();
    let mut delete_from_primitive_lists: Vec<(&str, &Value)> = Vec::new();

    for (key, value) in patch {
        if key == RETAIN_KEYS_DIRECTIVE {
            continue;
        }
        if let Some(field) = key.strip_prefix(SET_ELEMENT_ORDER_PREFIX) {
            set_element_orders.push((field, value));
            continue;
        }
        if let Some(field) = key.strip_prefix(DELETE_FROM_PRIMITIVE_LIST_PREFIX) {
            delete_from_primitive_lists.push((field, value));
            continue;
        }
        if value.is_null() {
            out.remove(key);
            continue;
        }
        let existing = out.get(key).cloned().unwrap_or(Value::Null);
        let merged = merge_value(&existing, value)?;
        if merged.is_null() && matches!(value, Value::Object(m) if m.get(PATCH_DIRECTIVE).and_then(Value::as_str) == Some("delete"))
        {
            out.remove(key);
        } else {
            out.insert(key.clone(), merged);
        }
    }

    for (field, order) in delete_from_primitive_lists {
        apply_delete_from_primitive_list(&mut out, field, order)?;
    }
    for (field, order) in set_element_orders {
        apply_set_element_order(&mut out, field, order)?;
    }

    if let Some(retain) = patch.get(RETAIN_KEYS_DIRECTIVE) {
        apply_retain_keys(&mut out, retain, patch)?;
    }

    Ok(Value::Object(out))
}

fn merge_value(target: &Value, patch: &Value) -> Result<Value> {
    match (target, patch) {
        (_, Value::Object(patch_map)) => merge_object(target, patch_map),
        (Value::Array(existing), Value::Array(incoming)) => merge_list(existing, incoming),
        _ => Ok(patch.clone()),
    }
}

/// Merge two JSON arrays: element-wise by `name` when every element on
/// both sides is an object carrying one, otherwise replace wholesale.
fn merge_list(existing: &[Value], incoming: &[Value]) -> Result<Value> {
    if merges_by_name(existing) && merges_by_name(incoming) {
        let mut merged: Vec<Value> = existing.to_vec();
        for item in incoming {
            let name = item.get("name").and_then(Value::as_str);
            if let Some(name) = name {
                if let Some(slot) = merged
                    .iter()
                    .position(|e| e.get("name").and_then(Value::as_str) == Some(name))
                {
                    let Value::Object(patch_map) = item else { unreachable!() };
                    merged[slot] = merge_object(&merged[slot], patch_map)?;
                    continue;
                }
            }
            merged.push(item.clone());
        }
        merged.retain(|v| !v.is_null());
        Ok(Value::Array(merged))
    } else {
        Ok(Value::Array(incoming.to_vec()))
    }
}

fn merges_by_name(list: &[Value]) -> bool {
    !list.is_empty() && list.iter().all(|v| v.get("name").and_then(Value::as_str).is_some())
}

fn apply_retain_keys(out: &mut Map<String, Value>, retain: &Value, patch: &Map<String, Value>) -> Result<()> {
    let Value::Array(keep) = retain else {
        return Err(bad_request("$retainKeys must be a JSON array of field names"));
    };
    let keep: Vec<&str> = keep.iter().filter_map(Value::as_str).collect();
    for key in patch.keys() {
        if key.starts_with('$') {
            continue;
        }
        if !keep.contains(&key.as_str()) {
            return Err(unprocessable(format!(
                "patch field {key:?} is not present in $retainKeys"
            )));
        }
    }
    out.retain(|key, _| keep.contains(&key.as_str()));
    Ok(())
}

fn apply_set_element_order(out: &mut Map<String, Value>, field: &str, order: &Value) -> Result<()> {
    let Value::Array(order) = order else {
        return Err(bad_request(format!("$setElementOrder/{field} must be a JSON array")));
    };
    let Some(Value::Array(current)) = out.get(field) else {
        return Err(unprocessable(format!("no list found at {field:?} to reorder")));
    };
    let mut reordered = Vec::with_capacity(current.len());
    let mut remaining = current.clone();
    for wanted in order {
        if let Some(pos) = remaining.iter().position(|v| v == wanted) {
            reordered.push(remaining.remove(pos));
        }
    }
    reordered.extend(remaining);
    out.insert(field.to_string(), Value::Array(reordered));
    Ok(())
}

fn apply_delete_from_primitive_list(out: &mut Map<String, Value>, field: &str, to_delete: &Value) -> Result<()> {
    let Value::Array(to_delete) = to_delete else {
        return Err(bad_request(format!(
            "$deleteFromPrimitiveList/{field} must be a JSON array"
        )));
    };
    let Some(Value::Array(current)) = out.get(field) else {
        return Err(unprocessable(format!("no list found at {field:?} to delete from")));
    };
    let filtered: Vec<Value> = current.iter().filter(|v| !to_delete.contains(v)).cloned().collect();
    out.insert(field.to_string(), Value::Array(filtered));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_fields_merge_like_merge_patch() {
        let target = json!({"spec": {"replicas": 1, "paused": true}});
        let patch = json!({"spec": {"replicas": 3}});
        let out = apply(&target, &patch).unwrap();
        assert_eq!(out["spec"]["replicas"], 3);
        assert_eq!(out["spec"]["paused"], true);
    }

    #[test]
    fn patch_directive_delete_removes_field() {
        let target = json!({"spec": {"template": {"a": 1}}});
        let patch = json!({"spec": {"template": {"$patch": "delete"}}});
        let out = apply(&target, &patch).unwrap();
        assert!(out["spec"].get("template").is_none());
    }

    #[test]
    fn named_list_elements_merge_by_name() {
        let target = json!({"containers": [{"name": "app", "image": "v1"}, {"name": "sidecar", "image": "v1"}]});
        let patch = json!({"containers": [{"name": "app", "image": "v2"}]});
        let out = apply(&target, &patch).unwrap();
        let containers = out["containers"].as_array().unwrap();
        assert_eq!(containers.len(), 2);
        assert!(containers.iter().any(|c| c["name"] == "app" && c["image"] == "v2"));
        assert!(containers.iter().any(|c| c["name"] == "sidecar" && c["image"] == "v1"));
    }

    #[test]
    fn retain_keys_rejects_out_of_band_field() {
        let target = json!({"spec": {"a": 1, "b": 2}});
        let patch = json!({"spec": {"a": 3, "c": 4, "$retainKeys": ["a", "b"]}});
        assert!(apply(&target, &patch).is_err());
    }

    #[test]
    fn set_element_order_reorders_primitive_list() {
        let target = json!({"finalizers": ["a", "b", "c"]});
        let patch = json!({"$setElementOrder/finalizers": ["c", "a", "b"]});
        let out = apply(&target, &patch).unwrap();
        assert_eq!(out["finalizers"], json!(["c", "a", "b"]));
    }

    #[test]
    fn delete_from_primitive_list_removes_entries() {
        let target = json!({"finalizers": ["a", "b", "c"]});
        let patch = json!({"$deleteFromPrimitiveList/finalizers": ["b"]});
        let out = apply(&target, &patch).unwrap();
        assert_eq!(out["finalizers"], json!(["a", "c"]));
    }
}
