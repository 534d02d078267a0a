//! JSON Patch apply logic (RFC 6902).
//!
//! Object members are inserted and removed with order-preserving map
//! operations, so a patch produced by the differ rebuilds member order as
//! well as content wherever it can.

use json_delta_json_pointer::{array_index, find, get_mut, is_child};
use json_delta_util::deep_equal;
use serde_json::Value;

use super::types::{Op, PatchError};

// ── Path navigation ───────────────────────────────────────────────────────

/// Splits `path` into the mutable parent container and the last step.
fn parent_mut<'a>(doc: &'a mut Value, path: &'a [String]) -> Result<(&'a mut Value, &'a str), PatchError> {
    let (key, parent_path) = path.split_last().ok_or(PatchError::InvalidTarget)?;
    let parent = get_mut(doc, parent_path).ok_or(PatchError::NotFound)?;
    Ok((parent, key.as_str()))
}

fn element_index(key: &str) -> Result<usize, PatchError> {
    array_index(key).ok_or(PatchError::InvalidIndex)
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    if path.is_empty() {
        return Ok(Some(std::mem::replace(doc, value)));
    }
    let (parent, key) = parent_mut(doc, path)?;
    match parent {
        Value::Object(map) => Ok(map.insert(key.to_string(), value)),
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
                return Ok(None);
            }
            let idx = element_index(key)?;
            if idx > arr.len() {
                return Err(PatchError::InvalidIndex);
            }
            arr.insert(idx, value);
            Ok(None)
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Option<Value>, PatchError> {
    let (parent, key) = parent_mut(doc, path)?;
    match parent {
        Value::Object(map) => map.shift_remove(key).ok_or(PatchError::NotFound).map(Some),
        Value::Array(arr) => {
            let idx = element_index(key)?;
            if idx >= arr.len() {
                return Err(PatchError::NotFound);
            }
            Ok(Some(arr.remove(idx)))
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    if path.is_empty() {
        return Ok(Some(std::mem::replace(doc, value)));
    }
    let (parent, key) = parent_mut(doc, path)?;
    let slot = match parent {
        Value::Object(map) => map.get_mut(key).ok_or(PatchError::NotFound)?,
        Value::Array(arr) => {
            let idx = element_index(key)?;
            arr.get_mut(idx).ok_or(PatchError::NotFound)?
        }
        _ => return Err(PatchError::InvalidTarget),
    };
    Ok(Some(std::mem::replace(slot, value)))
}

fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    let src = find(doc, from)?.clone();
    apply_add(doc, path, src)
}

fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    // RFC 6902 §4.4: a location cannot be moved into one of its children
    if is_child(from, path) {
        return Err(PatchError::InvalidTarget);
    }
    if from == path {
        return find(doc, from).map(|_| None).map_err(PatchError::from);
    }
    let value = if from.is_empty() {
        std::mem::take(doc)
    } else {
        apply_remove(doc, from)?.ok_or(PatchError::NotFound)?
    };
    apply_add(doc, path, value)
}

fn apply_test(doc: &Value, path: &[String], value: &Value) -> Result<(), PatchError> {
    let actual = find(doc, path)?;
    if deep_equal(actual, value) {
        Ok(())
    } else {
        Err(PatchError::Test)
    }
}

// ── Main apply function ───────────────────────────────────────────────────

/// Apply a single operation to the document (in-place mutation).
///
/// Returns the value previously at the path for mutating ops, `None` for
/// `test` and for inserts into arrays.
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<Option<Value>, PatchError> {
    match op {
        Op::Add { path, value } => apply_add(doc, path, value.clone()),
        Op::Remove { path, .. } => apply_remove(doc, path),
        Op::Replace { path, value, .. } => apply_replace(doc, path, value.clone()),
        Op::Copy { path, from } => apply_copy(doc, path, from),
        Op::Move { path, from } => apply_move(doc, path, from),
        Op::Test { path, value } => {
            apply_test(doc, path, value)?;
            Ok(None)
        }
    }
}

/// Apply a sequence of operations in order, returning the patched document.
///
/// Stops at the first failing operation.
pub fn apply_patch(mut doc: Value, ops: &[Op]) -> Result<Value, PatchError> {
    for op in ops {
        apply_op(&mut doc, op)?;
    }
    Ok(doc)
}

// ── Tests ─────────────────────────────────────────────────────────────────
