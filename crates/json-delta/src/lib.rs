//! json-delta: structural JSON diff producing RFC 6902 JSON Patch documents.
//!
//! - [`json_patch`]: the operation model, applier, codec and validator.
//! - [`json_patch_diff`]: the differ (object walk, LCS array alignment,
//!   patch optimizer).
//! - [`json_cli`]: text-in/text-out helpers behind the `json-diff` and
//!   `json-patch` binaries.

pub mod json_patch;
pub mod json_patch_diff;
pub mod json_cli;
