//! JSON Patch diff: generate a JSON Patch from two document values.
//!
//! Objects are compared member by member, arrays go through the
//! [`array`] engine, and anything else is replaced when the values differ.
//! The collected list is run through the [`optimize`] passes and the
//! optimizer bookkeeping (`old_value`) is stripped before it is returned.
//!
//! ```
//! use json_delta::json_patch::to_json_patch;
//! use json_delta::json_patch_diff::generate_patch;
//! use serde_json::json;
//!
//! let ops = generate_patch(&json!({"tags": ["a", "b", "c"]}), &json!({"tags": ["b", "c", "a"]})).unwrap();
//! assert_eq!(
//!     to_json_patch(&ops),
//!     json!([{"op": "move", "path": "/tags/2", "from": "/tags/0"}])
//! );
//! ```

pub mod array;
pub mod optimize;
pub mod types;

use json_delta_json_pointer::child;
use json_delta_util::{deep_equal, serialized_equal};
use serde_json::{Map, Value};
use tracing::debug;

use crate::json_patch::types::Op;

pub use array::diff_array;
pub use optimize::optimize;
pub use types::{ArrayDiffMode, DiffError, DiffOptions, DEFAULT_MAX_ARRAY_SIZE_FOR_LCS};

// ── Public API ────────────────────────────────────────────────────────────

/// Generate a JSON Patch that transforms `original` into `updated`, using
/// default options.
pub fn generate_patch(original: &Value, updated: &Value) -> Result<Vec<Op>, DiffError> {
    JsonPatchDiff::default().diff(original, updated)
}

/// Generate a JSON Patch with explicit options.
///
/// # Errors
///
/// [`DiffError::InvalidArgument`] when `options` do not validate,
/// [`DiffError::OperationFailed`] when array alignment fails.
pub fn generate_patch_with(
    original: &Value,
    updated: &Value,
    options: &DiffOptions,
) -> Result<Vec<Op>, DiffError> {
    JsonPatchDiff::new(options.clone())?.diff(original, updated)
}

/// A differ bound to one set of options.
#[derive(Debug, Clone, Default)]
pub struct JsonPatchDiff {
    options: DiffOptions,
}

impl JsonPatchDiff {
    pub fn new(options: DiffOptions) -> Result<Self, DiffError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Diffs two trees. Neither input is modified.
    pub fn diff(&self, original: &Value, updated: &Value) -> Result<Vec<Op>, DiffError> {
        let mut ops = Vec::new();
        self.diff_at_path(&mut ops, &[], original, updated)?;
        optimize(&mut ops);
        ops.iter_mut().for_each(Op::clear_old_value);
        debug!(ops = ops.len(), "diff complete");
        Ok(ops)
    }

    // ── Core recursive differ ─────────────────────────────────────────────

    fn diff_at_path(
        &self,
        ops: &mut Vec<Op>,
        path: &[String],
        src: &Value,
        dst: &Value,
    ) -> Result<(), DiffError> {
        match (src, dst) {
            (Value::Object(s), Value::Object(d)) => {
                if self.objects_equal(src, dst) {
                    return Ok(());
                }
                self.diff_obj(ops, path, s, d)
            }
            (Value::Array(s), Value::Array(d)) => array::diff_arr(ops, path, s, d, &self.options),
            _ => {
                diff_val(ops, path, src, dst);
                Ok(())
            }
        }
    }

    fn objects_equal(&self, src: &Value, dst: &Value) -> bool {
        if self.options.deep_compare_objects {
            deep_equal(src, dst)
        } else {
            serialized_equal(src, dst)
        }
    }

    fn diff_obj(
        &self,
        ops: &mut Vec<Op>,
        path: &[String],
        src: &Map<String, Value>,
        dst: &Map<String, Value>,
    ) -> Result<(), DiffError> {
        for (key, src_val) in src {
            match dst.get(key) {
                Some(dst_val) => self.diff_at_path(ops, &child(path, key.as_str()), src_val, dst_val)?,
                None if self.options.ignore_removals => {}
                None => ops.push(Op::Remove {
                    path: child(path, key.as_str()),
                    old_value: None,
                }),
            }
        }
        for (key, dst_val) in dst {
            if !src.contains_key(key) {
                ops.push(Op::Add {
                    path: child(path, key.as_str()),
                    value: dst_val.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Scalars and values of different kinds: one `replace` unless equal.
fn diff_val(ops: &mut Vec<Op>, path: &[String], src: &Value, dst: &Value) {
    if deep_equal(src, dst) {
        return;
    }
    ops.push(Op::Replace {
        path: path.to_vec(),
        value: dst.clone(),
        old_value: Some(src.clone()),
    });
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_patch::apply::apply_op;
    use crate::json_patch::codec::json::to_json_patch;
    use serde_json::json;

    fn apply_patch(mut doc: Value, ops: &[Op]) -> Value {
        for op in ops {
            apply_op(&mut doc, op).expect("apply failed");
        }
        doc
    }

    fn assert_roundtrip(src: Value, dst: Value) {
        let ops = generate_patch(&src, &dst).unwrap();
        let result = apply_patch(src, &ops);
        assert!(deep_equal(&result, &dst), "got {result}, want {dst}");
    }

    #[test]
    fn diff_equal_docs() {
        let ops = generate_patch(&json!({"a": 1}), &json!({"a": 1})).unwrap();
        assert!(ops.is_empty());
    }

    #[test]
    fn diff_replace_scalar() {
        let ops = generate_patch(&json!(1), &json!(2)).unwrap();
        assert_eq!(to_json_patch(&ops), json!([{"op": "replace", "path": "", "value": 2}]));
    }

    #[test]
    fn diff_numbers_compare_by_value() {
        assert!(generate_patch(&json!({"n": 1}), &json!({"n": 1.0})).unwrap().is_empty());
    }

    #[test]
    fn diff_type_change_is_replace() {
        let ops = generate_patch(&json!({"a": [1]}), &json!({"a": {"0": 1}})).unwrap();
        assert_eq!(
            to_json_patch(&ops),
            json!([{"op": "replace", "path": "/a", "value": {"0": 1}}])
        );
    }

    #[test]
    fn diff_object_member_order() {
        let ops = generate_patch(
            &json!({"name": "Alice", "age": 30, "city": "NYC"}),
            &json!({"name": "Alice", "age": 31, "country": "USA"}),
        )
        .unwrap();
        assert_eq!(
            to_json_patch(&ops),
            json!([
                {"op": "replace", "path": "/age", "value": 31},
                {"op": "remove", "path": "/city"},
                {"op": "add", "path": "/country", "value": "USA"}
            ])
        );
    }

    #[test]
    fn diff_ignore_removals() {
        let options = DiffOptions::default().with_ignore_removals(true);
        let ops = generate_patch_with(&json!({"a": 1, "b": 2}), &json!({"b": 3}), &options).unwrap();
        assert_eq!(to_json_patch(&ops), json!([{"op": "replace", "path": "/b", "value": 3}]));
    }

    #[test]
    fn diff_numeric_object_keys_are_not_elements() {
        let src = json!({"0": "x", "1": "y"});
        let dst = json!({"1": "y", "2": "x"});
        let ops = generate_patch(&src, &dst).unwrap();
        assert_eq!(
            to_json_patch(&ops),
            json!([
                {"op": "remove", "path": "/0"},
                {"op": "add", "path": "/2", "value": "x"}
            ])
        );
    }

    #[test]
    fn diff_strips_old_value() {
        let ops = generate_patch(&json!([1, 2, 3]), &json!([3])).unwrap();
        assert!(ops.iter().all(|op| op.old_value().is_none()));
        assert_roundtrip(json!([1, 2, 3]), json!([3]));
    }

    #[test]
    fn diff_rejects_invalid_options() {
        let options = DiffOptions::default().with_max_array_size_for_lcs(0);
        let result = generate_patch_with(&json!([]), &json!([1]), &options);
        assert!(matches!(result, Err(DiffError::InvalidArgument(_))));
    }

    #[test]
    fn diff_serialized_object_comparison_gives_same_patch() {
        let src = json!({"a": {"x": 1, "y": [1, 2]}, "b": 1});
        let dst = json!({"a": {"y": [1, 2], "x": 1}, "b": 2});
        let deep = generate_patch(&src, &dst).unwrap();
        let options = DiffOptions::default().with_deep_compare_objects(false);
        let textual = generate_patch_with(&src, &dst, &options).unwrap();
        assert_eq!(deep, textual);
    }

    #[test]
    fn diff_roundtrips() {
        assert_roundtrip(json!(null), json!({"a": 1}));
        assert_roundtrip(json!({"a": [1, 2, 3]}), json!({"a": [3, 2, 1]}));
        assert_roundtrip(json!([{"id": 1}, {"id": 2}]), json!([{"id": 2}, {"id": 1, "x": true}]));
        assert_roundtrip(json!({"a": {"b": {"c": [1]}}}), json!({"a": {"b": {"c": [1, [2]]}}}));
        assert_roundtrip(json!(["a", "b", "c", "d", "e"]), json!(["e", "x", "c", "a"]));
    }
}
