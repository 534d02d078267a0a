#![allow(dead_code)]

use json_delta::json_patch::{apply_op, to_json_patch, Op};
use json_delta::json_patch_diff::{generate_patch, generate_patch_with, DiffOptions};
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Applies `ops` to `doc` in order, panicking on the first failure.
pub fn apply(mut doc: Value, ops: &[Op]) -> Value {
    for (i, op) in ops.iter().enumerate() {
        if let Err(e) = apply_op(&mut doc, op) {
            panic!("op {i} ({}) failed: {e}", serde_json::to_string(&to_json_patch(&ops[i..=i])).unwrap());
        }
    }
    doc
}

/// Diffs with default options and renders the RFC 6902 document.
pub fn patch(original: &Value, updated: &Value) -> Value {
    to_json_patch(&generate_patch(original, updated).expect("diff failed"))
}

pub fn patch_with(original: &Value, updated: &Value, options: &DiffOptions) -> Value {
    to_json_patch(&generate_patch_with(original, updated, options).expect("diff failed"))
}

/// Small value domain so that generated documents share elements often.
pub fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (0i64..4).prop_map(Value::from),
        Just(Value::from(1.5)),
        "[ab~/]{0,2}".prop_map(Value::String),
    ]
}

pub fn arb_json() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 40, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..7).prop_map(Value::Array),
            prop::collection::vec(("[a-c0-2/~]{1,2}", inner), 0..5).prop_map(|pairs| {
                let mut map = Map::new();
                for (k, v) in pairs {
                    map.insert(k, v);
                }
                Value::Object(map)
            }),
        ]
    })
}

/// Arrays over a tiny alphabet, to exercise alignment and move detection.
pub fn arb_small_array() -> impl Strategy<Value = Value> {
    prop::collection::vec((0u8..5).prop_map(|n| Value::from(n.to_string())), 0..10).prop_map(Value::Array)
}
