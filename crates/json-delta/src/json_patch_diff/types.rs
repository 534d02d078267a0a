//! Options and errors for the JSON Patch differ.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// The request was rejected before any work was done.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An internal invariant did not hold; no partial patch is returned.
    #[error("operation failed: {0}")]
    OperationFailed(String),
}

// ── Array mode ────────────────────────────────────────────────────────────

/// How array elements are aligned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayDiffMode {
    /// LCS alignment with move detection.
    #[default]
    Full,
    /// Positional comparison; linear time, no moves.
    Fast,
}

// ── Options ───────────────────────────────────────────────────────────────

pub const DEFAULT_MAX_ARRAY_SIZE_FOR_LCS: usize = 1000;

/// Differ configuration.
///
/// Deserializes from camelCase keys, every key optional:
///
/// ```
/// use json_delta::json_patch_diff::{ArrayDiffMode, DiffOptions};
///
/// let options: DiffOptions = toml::from_str(r#"
///     arrayMode = "fast"
///     maxArraySizeForLcs = 50
/// "#).unwrap();
/// assert_eq!(options.array_mode, ArrayDiffMode::Fast);
/// assert_eq!(options.max_array_size_for_lcs, 50);
/// assert!(options.deep_compare_arrays);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiffOptions {
    pub array_mode: ArrayDiffMode,
    /// Skip `remove` ops for object members missing from the updated tree.
    pub ignore_removals: bool,
    /// Short-circuit equal objects with `deep_equal` (true) or with
    /// serialized text equality (false).
    pub deep_compare_objects: bool,
    /// Match array elements with `deep_equal` (true) or with serialized
    /// text equality (false).
    pub deep_compare_arrays: bool,
    /// Arrays longer than this are diffed in `Fast` mode.
    pub max_array_size_for_lcs: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            array_mode: ArrayDiffMode::Full,
            ignore_removals: false,
            deep_compare_objects: true,
            deep_compare_arrays: true,
            max_array_size_for_lcs: DEFAULT_MAX_ARRAY_SIZE_FOR_LCS,
        }
    }
}

impl DiffOptions {
    pub fn with_array_mode(mut self, mode: ArrayDiffMode) -> Self {
        self.array_mode = mode;
        self
    }

    pub fn with_ignore_removals(mut self, ignore: bool) -> Self {
        self.ignore_removals = ignore;
        self
    }

    pub fn with_deep_compare_objects(mut self, deep: bool) -> Self {
        self.deep_compare_objects = deep;
        self
    }

    pub fn with_deep_compare_arrays(mut self, deep: bool) -> Self {
        self.deep_compare_arrays = deep;
        self
    }

    pub fn with_max_array_size_for_lcs(mut self, max: usize) -> Self {
        self.max_array_size_for_lcs = max;
        self
    }

    /// Checks option consistency.
    ///
    /// # Errors
    ///
    /// [`DiffError::InvalidArgument`] when `max_array_size_for_lcs` is zero.
    pub fn validate(&self) -> Result<(), DiffError> {
        if self.max_array_size_for_lcs == 0 {
            return Err(DiffError::InvalidArgument(
                "maxArraySizeForLcs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Mode actually used for an array pair of the given lengths.
    pub(crate) fn effective_mode(&self, m: usize, n: usize) -> ArrayDiffMode {
        if m.max(n) > self.max_array_size_for_lcs {
            ArrayDiffMode::Fast
        } else {
            self.array_mode
        }
    }
}
