//! Validation functions for JSON Pointer strings.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("POINTER_INVALID: pointer must be empty or start with '/'")]
    PointerInvalid,
    #[error("POINTER_INVALID: '~' at byte {0} is not followed by '0' or '1'")]
    DanglingEscape(usize),
}

/// Validates a JSON Pointer string against RFC 6901.
///
/// # Errors
///
/// - [`ValidationError::PointerInvalid`] when a non-empty pointer does not
///   start with `/`.
/// - [`ValidationError::DanglingEscape`] when a `~` is not part of `~0` or
///   `~1`.
///
/// # Example
///
/// ```
/// use json_delta_json_pointer::validate_json_pointer;
///
/// validate_json_pointer("").unwrap();
/// validate_json_pointer("/foo/a~1b").unwrap();
/// validate_json_pointer("foo").unwrap_err();
/// validate_json_pointer("/a~2").unwrap_err();
/// ```
pub fn validate_json_pointer(pointer: &str) -> Result<(), ValidationError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(ValidationError::PointerInvalid);
    }
    let bytes = pointer.as_bytes();
    for (at, byte) in bytes.iter().enumerate() {
        if *byte == b'~' && !matches!(bytes.get(at + 1), Some(b'0' | b'1')) {
            return Err(ValidationError::DanglingEscape(at));
        }
    }
    Ok(())
}
