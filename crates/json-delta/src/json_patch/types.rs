//! Core types for the JSON Patch module.

use serde_json::Value;
use thiserror::Error;

use json_delta_json_pointer::JsonPointerError;
pub use json_delta_json_pointer::Path;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("NOT_FOUND")]
    NotFound,
    #[error("TEST")]
    Test,
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("INVALID_TARGET")]
    InvalidTarget,
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

impl From<JsonPointerError> for PatchError {
    fn from(e: JsonPointerError) -> Self {
        match e {
            JsonPointerError::NotFound => PatchError::NotFound,
            JsonPointerError::InvalidIndex => PatchError::InvalidIndex,
            JsonPointerError::NoParent => PatchError::InvalidTarget,
        }
    }
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// A JSON Patch (RFC 6902) operation.
///
/// `old_value` on `Remove` and `Replace` is bookkeeping for the diff
/// optimizer: the value that sat at `path` before the operation. It is not
/// part of RFC 6902 and is stripped from generated patches.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add {
        path: Path,
        value: Value,
    },
    Remove {
        path: Path,
        old_value: Option<Value>,
    },
    Replace {
        path: Path,
        value: Value,
        old_value: Option<Value>,
    },
    Copy {
        path: Path,
        from: Path,
    },
    Move {
        path: Path,
        from: Path,
    },
    Test {
        path: Path,
        value: Value,
    },
}

impl Op {
    /// Returns the RFC 6902 `op` member for this operation.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Copy { .. } => "copy",
            Op::Move { .. } => "move",
            Op::Test { .. } => "test",
        }
    }

    /// Returns the target path of the operation.
    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path, .. }
            | Op::Replace { path, .. }
            | Op::Copy { path, .. }
            | Op::Move { path, .. }
            | Op::Test { path, .. } => path,
        }
    }

    pub fn path_mut(&mut self) -> &mut Path {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path, .. }
            | Op::Replace { path, .. }
            | Op::Copy { path, .. }
            | Op::Move { path, .. }
            | Op::Test { path, .. } => path,
        }
    }

    /// Returns the source path of `move` and `copy`.
    pub fn from(&self) -> Option<&Path> {
        match self {
            Op::Copy { from, .. } | Op::Move { from, .. } => Some(from),
            _ => None,
        }
    }

    pub fn from_mut(&mut self) -> Option<&mut Path> {
        match self {
            Op::Copy { from, .. } | Op::Move { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Returns the `value` member of `add`, `replace` and `test`.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Op::Add { value, .. } | Op::Replace { value, .. } | Op::Test { value, .. } => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Returns the recorded pre-operation value, if any.
    pub fn old_value(&self) -> Option<&Value> {
        match self {
            Op::Remove { old_value, .. } | Op::Replace { old_value, .. } => old_value.as_ref(),
            _ => None,
        }
    }

    /// Drops the recorded pre-operation value.
    pub fn clear_old_value(&mut self) {
        if let Op::Remove { old_value, .. } | Op::Replace { old_value, .. } = self {
            *old_value = None;
        }
    }

    /// Returns true if the operation changes the shape of its parent
    /// container (inserts, deletes or relocates a member).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Op::Add { .. } | Op::Remove { .. } | Op::Move { .. } | Op::Copy { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(steps: &[&str]) -> Path {
        steps.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accessors_cover_every_variant() {
        let mv = Op::Move { path: path(&["b"]), from: path(&["a"]) };
        assert_eq!(mv.op_name(), "move");
        assert_eq!(mv.path(), &path(&["b"]));
        assert_eq!(mv.from(), Some(&path(&["a"])));
        assert_eq!(mv.value(), None);

        let add = Op::Add { path: path(&["x"]), value: json!(1) };
        assert_eq!(add.value(), Some(&json!(1)));
        assert_eq!(add.from(), None);
        assert!(add.is_structural());

        let test = Op::Test { path: path(&["x"]), value: json!(1) };
        assert!(!test.is_structural());
    }

    #[test]
    fn clear_old_value_only_touches_carriers() {
        let mut op = Op::Replace { path: path(&["a"]), value: json!(2), old_value: Some(json!(1)) };
        assert_eq!(op.old_value(), Some(&json!(1)));
        op.clear_old_value();
        assert_eq!(op.old_value(), None);
        assert_eq!(op.value(), Some(&json!(2)));
    }

    #[test]
    fn path_mut_rewrites_target() {
        let mut op = Op::Remove { path: path(&["a", "3"]), old_value: None };
        op.path_mut()[1] = "4".to_string();
        assert_eq!(op.path(), &path(&["a", "4"]));
    }
}
