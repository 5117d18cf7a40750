//! `application/merge-patch+json` (RFC 7396): recursive object merge,
//! `null` deletes a key, non-object values replace wholesale.
use serde_json::{Map, Value};

pub fn apply(target: &Value, patch: &Value) -> Value {
    merge(target, patch)
}

fn merge(target: &Value, patch: &Value) -> Value {
    let (Value::Object(target_map), Value::Object(patch_map)) = (target, patch) else {
        return patch.clone();
    };
    let mut out: Map<String, Value> = target_map.clone();
    for (key, patch_value) in patch_map {
        if patch_value.is_null() {
            out.remove(key);
            continue;
        }
        let merged = match out.get(key) {
            Some(existing) => merge(existing, patch_value),
            None => merge(&Value::Object(Map::new()), patch_value),
        };
        out.insert(key.clone(), merged);
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_deletes_key() {
        let target = json!({"a": 1, "b": 2});
        let patch = json!({"b": null});
        assert_eq!(apply(&target, &patch), json!({"a": 1}));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let target = json!({"metadata": {"labels": {"a": "1", "b": "2"}}});
        let patch = json!({"metadata": {"labels": {"b": null, "c": "3"}}});
        let out = apply(&target, &patch);
        assert_eq!(out, json!({"metadata": {"labels": {"a": "1", "c": "3"}}}));
    }

    #[test]
    fn arrays_are_replaced_not_merged() {
        let target = json!({"items": [1, 2, 3]});
        let patch = json!({"items": [9]});
        assert_eq!(apply(&target, &patch), json!({"items": [9]}));
    }

    #[test]
    fn reapplying_the_same_patch_is_idempotent() {
        let target = json!({"metadata": {"labels": {"a": "1"}}});
        let patch = json!({"metadata": {"labels": {"env": "prod"}}});
        let once = apply(&target, &patch);
        let twice = apply(&once, &patch);
        assert_eq!(once, twice);
    }
}
