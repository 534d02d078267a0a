//! JSON Patch operation validator.
//!
//! Validates raw JSON Patch operations (as `serde_json::Value` maps) before
//! decoding, so callers can reject untrusted input early with a message that
//! names the failing operation.

use json_delta_json_pointer::validate_json_pointer;
use serde_json::{Map, Value};
use thiserror::Error;

// ── Error ──────────────────────────────────────────────────────────────────

/// Error returned by validation functions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn err(msg: &str) -> ValidationError {
    ValidationError(msg.to_string())
}

// ── Public API ─────────────────────────────────────────────────────────────

/// Validate a list of operations.
///
/// Errors include the index of the failing operation:
/// `"Error in operation [index = N] (reason)."`.
pub fn validate_operations(ops: &Value) -> Result<(), ValidationError> {
    let arr = ops.as_array().ok_or_else(|| err("Not a array."))?;
    if arr.is_empty() {
        return Err(err("Empty operation patch."));
    }
    for (i, op) in arr.iter().enumerate() {
        validate_operation(op).map_err(|e| {
            ValidationError(format!("Error in operation [index = {}] ({}).", i, e.0))
        })?;
    }
    Ok(())
}

/// Validate a single operation object.
pub fn validate_operation(op: &Value) -> Result<(), ValidationError> {
    let map = op.as_object().ok_or_else(|| err("OP_INVALID"))?;

    let path_str = map
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| err("OP_PATH_INVALID"))?;
    validate_pointer_str(path_str)?;

    let op_name = map.get("op").and_then(|v| v.as_str()).unwrap_or("");
    match op_name {
        "add" | "replace" | "test" => validate_has_value(map),
        "remove" => Ok(()),
        "copy" => validate_from(map).map(|_| ()),
        "move" => {
            let from_str = validate_from(map)?;
            if path_str.starts_with(&format!("{from_str}/")) {
                return Err(err("Cannot move into own children."));
            }
            Ok(())
        }
        _ => Err(err("OP_UNKNOWN")),
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn validate_pointer_str(pointer: &str) -> Result<(), ValidationError> {
    validate_json_pointer(pointer).map_err(|e| ValidationError(e.to_string()))
}

fn validate_has_value(map: &Map<String, Value>) -> Result<(), ValidationError> {
    if map.contains_key("value") {
        Ok(())
    } else {
        Err(err("OP_VALUE_MISSING"))
    }
}

fn validate_from<'a>(map: &'a Map<String, Value>) -> Result<&'a str, ValidationError> {
    let from = map
        .get("from")
        .and_then(|v| v.as_str())
        .ok_or_else(|| err("OP_FROM_INVALID"))?;
    validate_pointer_str(from)?;
    Ok(from)
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_rfc6902_ops() {
        let patch = json!([
            {"op": "add", "path": "/a", "value": 1},
            {"op": "remove", "path": "/a"},
            {"op": "replace", "path": "", "value": null},
            {"op": "copy", "path": "/b", "from": "/a"},
            {"op": "move", "path": "/c", "from": "/b"},
            {"op": "test", "path": "/c", "value": 1}
        ]);
        assert!(validate_operations(&patch).is_ok());
    }

    #[test]
    fn rejects_non_array_and_empty() {
        assert_eq!(validate_operations(&json!({})), Err(err("Not a array.")));
        assert_eq!(validate_operations(&json!([])), Err(err("Empty operation patch.")));
    }

    #[test]
    fn reports_failing_index() {
        let patch = json!([
            {"op": "add", "path": "/a", "value": 1},
            {"op": "add", "path": "/b"}
        ]);
        assert_eq!(
            validate_operations(&patch),
            Err(err("Error in operation [index = 1] (OP_VALUE_MISSING)."))
        );
    }

    #[test]
    fn rejects_bad_pointers() {
        assert!(validate_operation(&json!({"op": "remove", "path": "a"})).is_err());
        assert!(validate_operation(&json!({"op": "remove", "path": "/~"})).is_err());
        assert_eq!(
            validate_operation(&json!({"op": "copy", "path": "/a"})),
            Err(err("OP_FROM_INVALID"))
        );
    }

    #[test]
    fn rejects_unknown_op() {
        assert_eq!(
            validate_operation(&json!({"op": "flip", "path": "/a"})),
            Err(err("OP_UNKNOWN"))
        );
    }

    #[test]
    fn rejects_move_into_own_children() {
        let op = json!({"op": "move", "path": "/a/b", "from": "/a"});
        assert_eq!(validate_operation(&op), Err(err("Cannot move into own children.")));
        let sibling = json!({"op": "move", "path": "/ab", "from": "/a"});
        assert!(validate_operation(&sibling).is_ok());
    }
}
