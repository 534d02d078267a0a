//! Array element alignment.
//!
//! `Full` mode aligns the two sequences with a longest-common-subsequence
//! table and emits removes and adds for the unaligned elements. `Fast` mode
//! compares positionally.

use json_delta_json_pointer::{format_json_pointer, index_child};
use json_delta_util::deep_equal;
use serde_json::Value;
use tracing::debug;

use super::optimize::optimize;
use super::types::{ArrayDiffMode, DiffError, DiffOptions};
use crate::json_patch::types::Op;

/// An aligned element: `orig` in the original array, `upd` in the updated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexPair {
    orig: usize,
    upd: usize,
}

/// Diffs two arrays located at `base`.
///
/// The returned list is already optimized: in `Full` mode relocated
/// elements come back as `move` and same-slot remove/add pairs as `replace`.
/// Removes that survive optimization carry the removed element in
/// `old_value`.
///
/// # Errors
///
/// [`DiffError::OperationFailed`] when the LCS table cannot be sized or the
/// alignment is inconsistent.
pub fn diff_array(
    base: &[String],
    original: &[Value],
    updated: &[Value],
    options: &DiffOptions,
) -> Result<Vec<Op>, DiffError> {
    let mut ops = Vec::new();
    diff_arr(&mut ops, base, original, updated, options)?;
    Ok(ops)
}

pub(crate) fn diff_arr(
    ops: &mut Vec<Op>,
    base: &[String],
    original: &[Value],
    updated: &[Value],
    options: &DiffOptions,
) -> Result<(), DiffError> {
    let (m, n) = (original.len(), updated.len());
    if m == 0 && n == 0 {
        return Ok(());
    }
    let mode = options.effective_mode(m, n);
    if mode != options.array_mode {
        debug!(
            path = %format_json_pointer(base),
            len = m.max(n),
            limit = options.max_array_size_for_lcs,
            "array exceeds LCS limit, diffing positionally"
        );
    }
    let matcher = ElementMatcher::new(original, updated, options.deep_compare_arrays);
    match mode {
        ArrayDiffMode::Full => {
            let mut local = Vec::new();
            let pairs = lcs(m, n, |i, j| matcher.matches(i, j))?;
            emit_unaligned(&mut local, base, original, updated, &pairs)?;
            optimize(&mut local);
            ops.append(&mut local);
        }
        ArrayDiffMode::Fast => diff_positional(ops, base, original, updated, &matcher),
    }
    Ok(())
}

// ── Element equality ──────────────────────────────────────────────────────

/// Element match predicate. Serialized forms are computed once per element
/// when structural comparison is off.
struct ElementMatcher<'a> {
    original: &'a [Value],
    updated: &'a [Value],
    hashes: Option<(Vec<String>, Vec<String>)>,
}

impl<'a> ElementMatcher<'a> {
    fn new(original: &'a [Value], updated: &'a [Value], deep: bool) -> Self {
        let hashes = (!deep).then(|| {
            (
                original.iter().map(struct_hash).collect(),
                updated.iter().map(struct_hash).collect(),
            )
        });
        Self {
            original,
            updated,
            hashes,
        }
    }

    fn matches(&self, i: usize, j: usize) -> bool {
        match &self.hashes {
            Some((src, dst)) => src[i] == dst[j],
            None => deep_equal(&self.original[i], &self.updated[j]),
        }
    }
}

/// Serialized form of an element, used as its content identifier.
fn struct_hash(v: &Value) -> String {
    v.to_string()
}

// ── Full mode ─────────────────────────────────────────────────────────────

/// Longest common subsequence of two index ranges, returned in ascending
/// order.
///
/// Ties during backtracking consume `original` first.
fn lcs(m: usize, n: usize, eq: impl Fn(usize, usize) -> bool) -> Result<Vec<IndexPair>, DiffError> {
    let width = n + 1;
    let cells = (m + 1)
        .checked_mul(width)
        .ok_or_else(|| DiffError::OperationFailed(format!("LCS table {m}x{n} overflows")))?;
    let mut dp: Vec<u32> = Vec::new();
    dp.try_reserve_exact(cells)
        .map_err(|e| DiffError::OperationFailed(format!("LCS table {m}x{n}: {e}")))?;
    dp.resize(cells, 0);

    for i in 0..m {
        for j in 0..n {
            dp[(i + 1) * width + j + 1] = if eq(i, j) {
                dp[i * width + j] + 1
            } else {
                dp[(i + 1) * width + j].max(dp[i * width + j + 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(dp[cells - 1] as usize);
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        if eq(i - 1, j - 1) {
            pairs.push(IndexPair {
                orig: i - 1,
                upd: j - 1,
            });
            i -= 1;
            j -= 1;
        } else if dp[(i - 1) * width + j] >= dp[i * width + j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    pairs.reverse();
    Ok(pairs)
}

/// Removes for unaligned original elements (descending), then adds for
/// unaligned updated elements (ascending).
fn emit_unaligned(
    ops: &mut Vec<Op>,
    base: &[String],
    original: &[Value],
    updated: &[Value],
    pairs: &[IndexPair],
) -> Result<(), DiffError> {
    let mut orig_aligned = vec![false; original.len()];
    let mut upd_aligned = vec![false; updated.len()];
    for pair in pairs {
        match (orig_aligned.get_mut(pair.orig), upd_aligned.get_mut(pair.upd)) {
            (Some(o), Some(u)) => {
                *o = true;
                *u = true;
            }
            _ => {
                return Err(DiffError::OperationFailed(format!(
                    "alignment {}:{} out of range at {}",
                    pair.orig,
                    pair.upd,
                    format_json_pointer(base)
                )))
            }
        }
    }

    for (i, elem) in original.iter().enumerate().rev() {
        if !orig_aligned[i] {
            ops.push(Op::Remove {
                path: index_child(base, i),
                old_value: Some(elem.clone()),
            });
        }
    }
    for (j, elem) in updated.iter().enumerate() {
        if !upd_aligned[j] {
            ops.push(Op::Add {
                path: index_child(base, j),
                value: elem.clone(),
            });
        }
    }
    Ok(())
}

// ── Fast mode ─────────────────────────────────────────────────────────────

fn diff_positional(
    ops: &mut Vec<Op>,
    base: &[String],
    original: &[Value],
    updated: &[Value],
    matcher: &ElementMatcher<'_>,
) {
    let common = original.len().min(updated.len());
    for i in 0..common {
        if !matcher.matches(i, i) {
            ops.push(Op::Replace {
                path: index_child(base, i),
                value: updated[i].clone(),
                old_value: Some(original[i].clone()),
            });
        }
    }
    for i in (common..original.len()).rev() {
        ops.push(Op::Remove {
            path: index_child(base, i),
            old_value: None,
        });
    }
    for (j, elem) in updated.iter().enumerate().skip(common) {
        ops.push(Op::Add {
            path: index_child(base, j),
            value: elem.clone(),
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
