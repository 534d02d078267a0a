//! JSON equality utilities.
//!
//! Two flavours are provided:
//!
//! - [`deep_equal`] walks both trees. Objects compare order-independently and
//!   numbers compare by value through [`CanonicalDecimal`], so `1`, `1.0` and
//!   `10e-1` are the same number.
//! - [`serialized_equal`] compares compact serializations. It is sensitive to
//!   object key order and to number formatting.

mod decimal;
mod deep_equal;

pub use decimal::CanonicalDecimal;
pub use deep_equal::{deep_equal, numbers_equal, serialized_equal};
