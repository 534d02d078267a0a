use serde_json::{Number, Value};

use super::decimal::CanonicalDecimal;

/// Performs a deep equality check between two JSON values.
///
/// - Values of different kinds are never equal (`0` is not `false`, `""` is
///   not `null`).
/// - Numbers are compared by value, see [`numbers_equal`].
/// - Arrays are equal when they have the same length and are element-wise
///   equal in order.
/// - Objects are equal when they have the same number of members and every
///   member of `a` exists in `b` with an equal value. Member order is ignored.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_delta_util::json_equal::deep_equal;
///
/// let a = json!({"foo": [1, 2, 3], "bar": 1.0});
/// let b = json!({"bar": 1, "foo": [1, 2, 3]});
/// let c = json!({"foo": [3, 2, 1], "bar": 1});
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,

        (Value::Array(arr_a), Value::Array(arr_b)) => {
            arr_a.len() == arr_b.len() && arr_a.iter().zip(arr_b).all(|(x, y)| deep_equal(x, y))
        }

        (Value::Object(obj_a), Value::Object(obj_b)) => {
            if obj_a.len() != obj_b.len() {
                return false;
            }
            obj_a.iter().all(|(key, val_a)| match obj_b.get(key) {
                Some(val_b) => deep_equal(val_a, val_b),
                None => false,
            })
        }

        _ => false,
    }
}

/// Compares two numbers by value.
///
/// Same-representation integers compare directly. Anything else is lowered
/// to a [`CanonicalDecimal`] first, so `1` and `1.0` are equal and `-0.0`
/// equals `0`.
pub fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (CanonicalDecimal::from_number(a), CanonicalDecimal::from_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Compares the compact serializations of two values.
///
/// Cheaper to reason about than [`deep_equal`] but stricter: object members
/// must appear in the same order and numbers must be spelled the same way.
///
/// ```
/// use serde_json::json;
/// use json_delta_util::json_equal::serialized_equal;
///
/// assert!(serialized_equal(&json!([1, "a"]), &json!([1, "a"])));
/// assert!(!serialized_equal(&json!(1), &json!(1.0)));
/// ```
pub fn serialized_equal(a: &Value, b: &Value) -> bool {
    match (serde_json::to_string(a), serde_json::to_string(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}
