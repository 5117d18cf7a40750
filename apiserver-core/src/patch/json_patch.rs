//! `application/json-patch+json` (RFC 6902), via the `json-patch` crate.
use super::unprocessable;
use crate::error::Result;
use serde_json::Value;

pub fn apply(target: &Value, ops: &json_patch::Patch) -> Result<Value> {
    let mut doc = target.clone();
    json_patch::patch(&mut doc, ops).map_err(|e| unprocessable(format!("json patch failed: {e}")))?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replace_and_add_apply_in_order() {
        let target = json!({"spec": {"replicas": 1}});
        let ops: json_patch::Patch = serde_json::from_value(json!([
            {"op": "replace", "path": "/spec/replicas", "value": 3},
            {"op": "add", "path": "/spec/paused", "value": false},
        ]))
        .unwrap();
        let out = apply(&target, &ops).unwrap();
        assert_eq!(out["spec"]["replicas"], 3);
        assert_eq!(out["spec"]["paused"], false);
    }

    #[test]
    fn failed_test_op_is_unprocessable() {
        let target = json!({"spec": {"replicas": 1}});
        let ops: json_patch::Patch =
            serde_json::from_value(json!([{"op": "test", "path": "/spec/replicas", "value": 99}])).unwrap();
        assert!(apply(&target, &ops).is_err());
    }
}
