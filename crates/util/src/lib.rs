//! json-delta-util - value helpers shared by the json-delta crates.
//!
//! The only resident today is [`json_equal`], the equality primitive the diff
//! engine uses to decide whether two subtrees differ.

pub mod json_equal;

pub use json_equal::{deep_equal, numbers_equal, serialized_equal, CanonicalDecimal};
