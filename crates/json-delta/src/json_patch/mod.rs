//! JSON Patch implementation (RFC 6902).
//!
//! # Operations
//!
//! `add`, `remove`, `replace`, `copy`, `move`, `test`. The differ emits the
//! first four plus `move`; `copy` and `test` are accepted by the applier and
//! the codec so any RFC 6902 document can be replayed.

pub mod types;
pub mod apply;
pub mod codec;
pub mod validate;

pub use types::{Op, Path, PatchError};
pub use apply::{apply_op, apply_patch};
pub use codec::json::{from_json, from_json_patch, to_json, to_json_patch};
pub use validate::{validate_operation, validate_operations, ValidationError};
