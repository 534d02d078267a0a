//! JSON Pointer (RFC 6901) utilities.
//!
//! Paths are kept as vectors of unescaped steps while the diff engine works
//! on them and are rendered to pointer strings only at the edges.
//!
//! # Example
//!
//! ```
//! use json_delta_json_pointer::{child, format_json_pointer, parse_json_pointer};
//!
//! let path = child(&parse_json_pointer("/users"), "a/b");
//! assert_eq!(path, vec!["users".to_string(), "a/b".to_string()]);
//! assert_eq!(format_json_pointer(&path), "/users/a~1b");
//! ```

use serde_json::Value;
use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep};

pub mod validate;
pub use validate::{validate_json_pointer, ValidationError};

/// Unescapes a JSON Pointer path component.
///
/// Per RFC 6901, `~1` is replaced with `/` and then `~0` with `~`.
///
/// # Example
///
/// ```
/// use json_delta_json_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// assert_eq!(unescape_component("~01"), "~1");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // ~1 first, otherwise "~01" would decode to "/"
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// Per RFC 6901, `~` is replaced with `~0` and then `/` with `~1`.
///
/// # Example
///
/// ```
/// use json_delta_json_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("a/b"), "a~1b");
/// assert_eq!(escape_component("plain"), "plain");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains(['/', '~']) {
        return component.to_string();
    }
    // ~ first, otherwise the ~ introduced by ~1 would be escaped again
    component.replace('~', "~0").replace('/', "~1")
}

/// Parses a JSON Pointer string into unescaped path steps.
///
/// The empty string is the root and yields an empty path. The leading `/` is
/// dropped without further checks; use [`validate_json_pointer`] first when
/// the input is untrusted.
///
/// ```
/// use json_delta_json_pointer::parse_json_pointer;
///
/// assert_eq!(parse_json_pointer(""), Vec::<String>::new());
/// assert_eq!(parse_json_pointer("/"), vec![""]);
/// assert_eq!(parse_json_pointer("/a~0b/c~1d/0"), vec!["a~b", "c/d", "0"]);
/// ```
pub fn parse_json_pointer(pointer: &str) -> Path {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer[1..].split('/').map(unescape_component).collect()
}

/// Formats path steps into a JSON Pointer string, escaping every step.
///
/// ```
/// use json_delta_json_pointer::format_json_pointer;
///
/// assert_eq!(format_json_pointer(&[]), "");
/// assert_eq!(format_json_pointer(&["tags".to_string(), "2".to_string()]), "/tags/2");
/// ```
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::with_capacity(path.iter().map(|s| s.len() + 1).sum());
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Returns `path` extended by one step.
pub fn child(path: &[String], step: impl Into<PathStep>) -> Path {
    let mut out = Vec::with_capacity(path.len() + 1);
    out.extend_from_slice(path);
    out.push(step.into());
    out
}

/// Returns `path` extended by an array index step.
pub fn index_child(path: &[String], index: usize) -> Path {
    child(path, index.to_string())
}

/// Returns the parent of `path`.
///
/// # Errors
///
/// [`JsonPointerError::NoParent`] for the root path.
pub fn parent(path: &[String]) -> Result<&[String], JsonPointerError> {
    match path.split_last() {
        Some((_, head)) => Ok(head),
        None => Err(JsonPointerError::NoParent),
    }
}

/// Checks that a step is a canonical array index: base-10 digits without
/// leading zeros.
///
/// ```
/// use json_delta_json_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("42"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("-"));
/// ```
pub fn is_valid_index(step: &str) -> bool {
    let bytes = step.as_bytes();
    match bytes {
        [] => false,
        [b'0', _, ..] => false,
        _ => bytes.iter().all(u8::is_ascii_digit),
    }
}

/// Parses a step as a canonical array index.
///
/// ```
/// use json_delta_json_pointer::array_index;
///
/// assert_eq!(array_index("7"), Some(7));
/// assert_eq!(array_index("07"), None);
/// assert_eq!(array_index("name"), None);
/// ```
pub fn array_index(step: &str) -> Option<usize> {
    if !is_valid_index(step) {
        return None;
    }
    step.parse().ok()
}

/// Splits a path whose last step is an array index into `(base, index)`.
///
/// ```
/// use json_delta_json_pointer::{parse_json_pointer, split_index};
///
/// let path = parse_json_pointer("/tags/3");
/// let (base, index) = split_index(&path).unwrap();
/// assert_eq!(base, ["tags".to_string()]);
/// assert_eq!(index, 3);
/// assert!(split_index(&parse_json_pointer("/tags/x")).is_none());
/// ```
pub fn split_index(path: &[String]) -> Option<(&[String], usize)> {
    let (last, base) = path.split_last()?;
    array_index(last).map(|index| (base, index))
}

/// Checks that `prefix` is `path` itself or one of its ancestors.
pub fn is_prefix(prefix: &[String], path: &[String]) -> bool {
    path.len() >= prefix.len() && path[..prefix.len()] == *prefix
}

/// Checks that `parent` is a proper ancestor of `child`.
///
/// ```
/// use json_delta_json_pointer::is_child;
///
/// let parent = vec!["foo".to_string()];
/// let child = vec!["foo".to_string(), "bar".to_string()];
/// assert!(is_child(&parent, &child));
/// assert!(!is_child(&child, &parent));
/// assert!(!is_child(&parent, &parent));
/// ```
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && is_prefix(parent, child)
}

/// Gets a value from a document by path.
///
/// Returns `None` when a step does not resolve. Array steps must be
/// canonical indices; `-` never resolves.
///
/// ```
/// use json_delta_json_pointer::{get, parse_json_pointer};
/// use serde_json::json;
///
/// let doc = json!({"foo": {"bar": [10, 20]}});
/// assert_eq!(get(&doc, &parse_json_pointer("/foo/bar/1")), Some(&json!(20)));
/// assert_eq!(get(&doc, &parse_json_pointer("/foo/baz")), None);
/// ```
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(val, |current, step| match current {
        Value::Array(arr) => arr.get(array_index(step)?),
        Value::Object(map) => map.get(step),
        _ => None,
    })
}

/// Resolves `path` in `val`, reporting why a step failed.
///
/// ```
/// use json_delta_json_pointer::{find, parse_json_pointer, JsonPointerError};
/// use serde_json::json;
///
/// let doc = json!({"arr": [1, 2]});
/// assert_eq!(find(&doc, &parse_json_pointer("/arr/1")), Ok(&json!(2)));
/// assert_eq!(find(&doc, &parse_json_pointer("/arr/01")), Err(JsonPointerError::InvalidIndex));
/// assert_eq!(find(&doc, &parse_json_pointer("/arr/2")), Err(JsonPointerError::NotFound));
/// assert_eq!(find(&doc, &parse_json_pointer("/x")), Err(JsonPointerError::NotFound));
/// ```
pub fn find<'a>(val: &'a Value, path: &[String]) -> Result<&'a Value, JsonPointerError> {
    path.iter().try_fold(val, |current, step| match current {
        Value::Array(arr) => {
            let index = array_index(step).ok_or(JsonPointerError::InvalidIndex)?;
            arr.get(index).ok_or(JsonPointerError::NotFound)
        }
        Value::Object(map) => map.get(step).ok_or(JsonPointerError::NotFound),
        _ => Err(JsonPointerError::NotFound),
    })
}

/// Mutable counterpart of [`get`].
pub fn get_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    path.iter().try_fold(val, |current, step| match current {
        Value::Array(arr) => arr.get_mut(array_index(step)?),
        Value::Object(map) => map.get_mut(step),
        _ => None,
    })
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("NOT_FOUND")]
    NotFound,
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("NO_PARENT")]
    NoParent,
}
