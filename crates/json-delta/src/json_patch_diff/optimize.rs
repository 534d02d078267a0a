//! Patch post-processing.
//!
//! Rewrites a freshly generated op list into an equivalent, shorter one:
//!
//! - a `remove` of an array element followed by an `add` of an equal value
//!   into the same array becomes a `move`;
//! - a `remove` and an `add` hitting the same array slot become a `replace`;
//! - a `replace` overwritten by a later op at the same path is dropped;
//! - a `replace` whose new value equals the old one is dropped.
//!
//! Only removes that carry `old_value` take part in the first two rules.
//! The array engine sets it on removes it emits in `Full` mode, so object
//! members whose names look like indices are never mistaken for elements.
//!
//! Ops between a paired remove and add were computed against an array that
//! no longer held the removed element. Pairing keeps that element in place
//! until the add, so those ops are rebased onto the longer array.

use std::collections::BTreeMap;

use json_delta_json_pointer::{array_index, format_json_pointer, index_child, is_child, is_prefix, split_index};
use json_delta_util::deep_equal;
use serde_json::Value;
use tracing::trace;

use crate::json_patch::types::{Op, Path};

/// Optimizes `ops` in place until no rule applies.
///
/// Every rule shortens the list, so the loop terminates and running it again
/// on its own output changes nothing.
pub fn optimize(ops: &mut Vec<Op>) {
    loop {
        let before = ops.len();
        detect_moves(ops);
        pair_replacements(ops);
        collapse_superseded(ops);
        drop_noop_replaces(ops);
        if ops.len() == before {
            break;
        }
    }
}

// ── Element tracking ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Access {
    Insert,
    Delete,
    Touch,
}

/// An op rewrites the tracked array or one of its ancestors.
#[derive(Debug)]
struct Conflict;

/// Rewritten paths of one intervening op. `None` keeps the current path.
#[derive(Debug)]
struct Edit {
    at: usize,
    path: Option<Path>,
    from: Option<Path>,
}

/// Index of an element inside the array at `base` that later ops do not
/// know about.
struct Tracked<'a> {
    base: &'a [String],
    index: usize,
}

impl Tracked<'_> {
    fn rebase_path(&mut self, path: &[String], access: Access) -> Result<Option<Path>, Conflict> {
        if is_prefix(path, self.base) {
            return Err(Conflict);
        }
        if !is_child(self.base, path) {
            return Ok(None);
        }
        let depth = self.base.len();
        let direct = path.len() == depth + 1;
        let step = path[depth].as_str();
        if step == "-" {
            return match (direct, access) {
                (true, Access::Insert) => Ok(None),
                _ => Err(Conflict),
            };
        }
        let x = array_index(step).ok_or(Conflict)?;
        let access = if direct { access } else { Access::Touch };
        let c = self.index;
        let rebased = match access {
            Access::Insert if x <= c => {
                self.index = c.checked_add(1).ok_or(Conflict)?;
                x
            }
            Access::Delete if x < c => {
                self.index = c - 1;
                x
            }
            _ if x >= c => x.checked_add(1).ok_or(Conflict)?,
            _ => x,
        };
        if rebased == x {
            return Ok(None);
        }
        let mut out = path.to_vec();
        out[depth] = rebased.to_string();
        Ok(Some(out))
    }

    fn rebase(&mut self, op: &Op, at: usize) -> Result<Edit, Conflict> {
        let (path, from) = match op {
            Op::Add { path, .. } => (self.rebase_path(path, Access::Insert)?, None),
            Op::Remove { path, .. } => (self.rebase_path(path, Access::Delete)?, None),
            Op::Replace { path, .. } | Op::Test { path, .. } => {
                (self.rebase_path(path, Access::Touch)?, None)
            }
            Op::Move { path, from } => {
                let from = self.rebase_path(from, Access::Delete)?;
                (self.rebase_path(path, Access::Insert)?, from)
            }
            Op::Copy { path, from } => {
                let from = self.rebase_path(from, Access::Touch)?;
                (self.rebase_path(path, Access::Insert)?, from)
            }
        };
        Ok(Edit { at, path, from })
    }
}

/// Outcome of a forward scan from a remove.
struct Found {
    /// Position of the matching add.
    at: usize,
    /// Index of the removed element just before the add.
    from: usize,
    /// Index the add targets.
    to: usize,
    edits: Vec<Edit>,
}

/// Walks the ops after `start`, tracking the element removed there, until
/// `pick` accepts an op. `pick` gets the op and the element's current index
/// and returns the index the op targets.
fn scan(
    ops: &[Op],
    start: usize,
    base: &[String],
    index: usize,
    pick: impl Fn(&Op, usize) -> Option<usize>,
) -> Option<Found> {
    let mut tracked = Tracked { base, index };
    let mut edits = Vec::new();
    for (at, op) in ops.iter().enumerate().skip(start + 1) {
        if let Some(to) = pick(op, tracked.index) {
            return Some(Found {
                at,
                from: tracked.index,
                to,
                edits,
            });
        }
        edits.push(tracked.rebase(op, at).ok()?);
    }
    None
}

/// Removes `ops[start]`, applies the rebased paths and puts `replacement`
/// (or nothing) where the matching add was.
fn commit(ops: &mut Vec<Op>, start: usize, found: Found, replacement: Option<Op>) {
    for edit in found.edits {
        let op = &mut ops[edit.at];
        if let Some(path) = edit.path {
            *op.path_mut() = path;
        }
        if let (Some(from), Some(slot)) = (edit.from, op.from_mut()) {
            *slot = from;
        }
    }
    match replacement {
        Some(op) => ops[found.at] = op,
        None => {
            ops.remove(found.at);
        }
    }
    ops.remove(start);
}

fn removed_element(op: &Op) -> Option<(&[String], usize, &Value)> {
    match op {
        Op::Remove {
            path,
            old_value: Some(old),
        } => split_index(path).map(|(base, index)| (base, index, old)),
        _ => None,
    }
}

fn added_element<'a>(op: &'a Op, base: &[String]) -> Option<(usize, &'a Value)> {
    match op {
        Op::Add { path, value } => match split_index(path) {
            Some((b, index)) if b == base => Some((index, value)),
            _ => None,
        },
        _ => None,
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────

fn detect_moves(ops: &mut Vec<Op>) {
    let mut r = 0;
    while r < ops.len() {
        let found = removed_element(&ops[r]).and_then(|(base, index, old)| {
            let found = scan(&ops[..], r, base, index, |op, _| {
                added_element(op, base)
                    .filter(|(_, value)| deep_equal(value, old))
                    .map(|(to, _)| to)
            })?;
            Some((base.to_vec(), found))
        });
        let Some((base, found)) = found else {
            r += 1;
            continue;
        };
        if found.from == found.to {
            trace!(
                path = %format_json_pointer(&index_child(&base, found.to)),
                "remove/add pair restores an element"
            );
            commit(ops, r, found, None);
            continue;
        }
        let from = index_child(&base, found.from);
        let path = index_child(&base, found.to);
        trace!(
            from = %format_json_pointer(&from),
            path = %format_json_pointer(&path),
            "remove/add pair relocates an element"
        );
        commit(ops, r, found, Some(Op::Move { from, path }));
    }
}

fn pair_replacements(ops: &mut Vec<Op>) {
    let mut r = ops.len();
    while r > 0 {
        r -= 1;
        let found = removed_element(&ops[r]).and_then(|(base, index, old)| {
            let found = scan(&ops[..], r, base, index, |op, current| {
                added_element(op, base)
                    .filter(|&(to, _)| to == current)
                    .map(|(to, _)| to)
            })?;
            Some((base.to_vec(), old.clone(), found))
        });
        let Some((base, old, found)) = found else {
            continue;
        };
        let Some(value) = ops[found.at].value().cloned() else {
            continue;
        };
        let path = index_child(&base, found.to);
        trace!(path = %format_json_pointer(&path), "remove/add pair replaces an element");
        let replacement = Op::Replace {
            path,
            value,
            old_value: Some(old),
        };
        commit(ops, r, found, Some(replacement));
    }
}

fn targets(op: &Op) -> impl Iterator<Item = &Path> {
    std::iter::once(op.path()).chain(op.from())
}

/// Checks whether `op` can observe or shift the value at `path`.
fn interferes(op: &Op, path: &[String], parent: Option<&[String]>) -> bool {
    targets(op).any(|target| {
        is_prefix(target, path)
            || is_prefix(path, target)
            || (op.is_structural() && parent.is_some_and(|p| is_child(p, target)))
    })
}

/// Position of the op that overwrites the result of `ops[p]`, if any.
fn superseded_by(ops: &[Op], p: usize) -> Option<usize> {
    let first = &ops[p];
    if !matches!(first, Op::Add { .. } | Op::Replace { .. }) {
        return None;
    }
    let path = first.path();
    let parent = path.split_last().map(|(_, head)| head);
    for (q, op) in ops.iter().enumerate().skip(p + 1) {
        if op.path() == path {
            return match (first, op) {
                (Op::Replace { .. }, Op::Replace { .. } | Op::Remove { .. })
                | (Op::Add { .. }, Op::Replace { .. }) => Some(q),
                _ => None,
            };
        }
        if interferes(op, path, parent) {
            return None;
        }
    }
    None
}

/// Paths of the ops at and after the collapse cursor, with multiplicity.
///
/// Lets the collapse pass skip the forward scan for an op whose path never
/// appears again, which is every op of a list over disjoint paths.
#[derive(Debug, Default)]
struct PathCounts(BTreeMap<Path, usize>);

impl PathCounts {
    fn of(ops: &[Op]) -> Self {
        let mut counts = Self::default();
        for op in ops {
            *counts.0.entry(op.path().clone()).or_insert(0) += 1;
        }
        counts
    }

    fn repeats(&self, path: &[String]) -> bool {
        self.0.get(path).is_some_and(|&n| n > 1)
    }

    fn release(&mut self, path: &[String]) {
        if let Some(n) = self.0.get_mut(path) {
            *n -= 1;
            if *n == 0 {
                self.0.remove(path);
            }
        }
    }
}

fn collapse_superseded(ops: &mut Vec<Op>) {
    let mut pending = PathCounts::of(ops);
    let mut p = 0;
    while p < ops.len() {
        let found = if pending.repeats(ops[p].path()) {
            superseded_by(ops, p)
        } else {
            None
        };
        let Some(q) = found else {
            pending.release(ops[p].path());
            p += 1;
            continue;
        };
        trace!(path = %format_json_pointer(ops[p].path()), "collapsing superseded op");
        pending.release(ops[q].path());
        if matches!(ops[p], Op::Add { .. }) {
            if let Op::Replace { value, .. } = ops.remove(q) {
                if let Op::Add { value: slot, .. } = &mut ops[p] {
                    *slot = value;
                }
            }
        } else if let Op::Replace { old_value: old, .. } = ops.remove(p) {
            match &mut ops[q - 1] {
                Op::Replace { old_value, .. } => *old_value = old,
                Op::Remove { old_value, .. } if old_value.is_some() => *old_value = old,
                _ => {}
            }
        }
    }
}

fn drop_noop_replaces(ops: &mut Vec<Op>) {
    ops.retain(|op| match op {
        Op::Replace {
            value,
            old_value: Some(old),
            ..
        } => !deep_equal(value, old),
        _ => true,
    });
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_patch::apply::apply_op;
    use json_delta_json_pointer::parse_json_pointer;
    use serde_json::json;

    fn p(pointer: &str) -> Path {
        parse_json_pointer(pointer)
    }

    fn remove(pointer: &str, old: Value) -> Op {
        Op::Remove {
            path: p(pointer),
            old_value: Some(old),
        }
    }

    fn add(pointer: &str, value: Value) -> Op {
        Op::Add {
            path: p(pointer),
            value,
        }
    }

    fn replace(pointer: &str, value: Value, old: Value) -> Op {
        Op::Replace {
            path: p(pointer),
            value,
            old_value: Some(old),
        }
    }

    fn apply(mut doc: Value, ops: &[Op]) -> Value {
        for op in ops {
            apply_op(&mut doc, op).expect("apply failed");
        }
        doc
    }

    /// Optimizes `ops` and checks that the result still rebuilds the same
    /// document from `doc`.
    fn optimized(doc: Value, mut ops: Vec<Op>) -> Vec<Op> {
        let expected = apply(doc.clone(), &ops);
        optimize(&mut ops);
        assert!(deep_equal(&apply(doc, &ops), &expected));
        ops
    }

    #[test]
    fn remove_then_add_of_same_value_is_a_move() {
        let ops = optimized(
            json!(["a", "b", "c"]),
            vec![remove("/0", json!("a")), add("/2", json!("a"))],
        );
        assert_eq!(
            ops,
            vec![Op::Move {
                from: p("/0"),
                path: p("/2")
            }]
        );
    }

    #[test]
    fn move_source_accounts_for_intervening_removes() {
        // [a, b, c, d] -> [c, d, a, b]
        let ops = optimized(
            json!(["a", "b", "c", "d"]),
            vec![
                remove("/3", json!("d")),
                remove("/2", json!("c")),
                add("/0", json!("c")),
                add("/1", json!("d")),
            ],
        );
        assert_eq!(
            ops,
            vec![
                Op::Move {
                    from: p("/2"),
                    path: p("/0")
                },
                Op::Move {
                    from: p("/3"),
                    path: p("/1")
                },
            ]
        );
    }

    #[test]
    fn remove_then_add_at_same_slot_cancels() {
        let ops = optimized(
            json!([1, 2, 3]),
            vec![remove("/1", json!(2)), add("/1", json!(2.0))],
        );
        assert!(ops.is_empty());
    }

    #[test]
    fn same_slot_pair_becomes_replace() {
        let ops = optimized(
            json!([1, 2, 3]),
            vec![
                remove("/1", json!(2)),
                remove("/0", json!(1)),
                add("/0", json!(4)),
                add("/1", json!(5)),
            ],
        );
        assert_eq!(
            ops,
            vec![
                replace("/0", json!(4), json!(1)),
                replace("/1", json!(5), json!(2)),
            ]
        );
    }

    #[test]
    fn pairing_rebases_intervening_ops() {
        // [x, a, y] -> [a, z]
        let ops = optimized(
            json!(["x", "a", "y"]),
            vec![
                remove("/2", json!("y")),
                remove("/0", json!("x")),
                add("/1", json!("z")),
            ],
        );
        assert_eq!(
            ops,
            vec![
                remove("/0", json!("x")),
                replace("/1", json!("z"), json!("y")),
            ]
        );
    }

    #[test]
    fn removes_without_old_value_are_left_alone() {
        let mut ops = vec![
            Op::Remove {
                path: p("/0"),
                old_value: None,
            },
            add("/0", json!(1)),
        ];
        let before = ops.clone();
        optimize(&mut ops);
        assert_eq!(ops, before);
    }

    #[test]
    fn rewriting_the_array_blocks_pairing() {
        let mut ops = vec![
            remove("/list/0", json!(1)),
            replace("/list", json!([]), json!([2])),
            add("/list/0", json!(1)),
        ];
        let before = ops.clone();
        optimize(&mut ops);
        assert_eq!(ops, before);
    }

    #[test]
    fn different_arrays_do_not_pair() {
        let ops = optimized(
            json!({"a": [1], "b": []}),
            vec![remove("/a/0", json!(1)), add("/b/0", json!(1))],
        );
        assert_eq!(ops.len(), 2);
    }

    #[test]
    fn later_replace_supersedes_earlier() {
        let ops = optimized(
            json!({"k": 1}),
            vec![
                replace("/k", json!(2), json!(1)),
                replace("/k", json!(3), json!(2)),
            ],
        );
        assert_eq!(ops, vec![replace("/k", json!(3), json!(1))]);
    }

    #[test]
    fn replace_then_remove_keeps_remove() {
        let ops = optimized(
            json!({"k": 1, "j": 0}),
            vec![
                replace("/k", json!(2), json!(1)),
                Op::Remove {
                    path: p("/k"),
                    old_value: None,
                },
            ],
        );
        assert_eq!(
            ops,
            vec![Op::Remove {
                path: p("/k"),
                old_value: None
            }]
        );
    }

    #[test]
    fn add_absorbs_following_replace() {
        let ops = optimized(
            json!({}),
            vec![add("/k", json!(1)), replace("/k", json!(2), json!(1))],
        );
        assert_eq!(ops, vec![add("/k", json!(2))]);
    }

    #[test]
    fn structural_sibling_blocks_collapse() {
        let mut ops = vec![
            replace("/1", json!("b"), json!("x")),
            add("/0", json!("n")),
            replace("/1", json!("c"), json!("y")),
        ];
        let before = ops.clone();
        optimize(&mut ops);
        assert_eq!(ops, before);
    }

    #[test]
    fn noop_replace_is_dropped() {
        let mut ops = vec![
            replace("/a", json!(1.0), json!(1)),
            replace("/b", json!(2), json!(1)),
        ];
        optimize(&mut ops);
        assert_eq!(ops, vec![replace("/b", json!(2), json!(1))]);
    }

    #[test]
    fn collapse_reaches_past_unrelated_paths() {
        let ops = optimized(
            json!({"a": 0, "b": 0, "c": 0}),
            vec![
                replace("/a", json!(1), json!(0)),
                replace("/b", json!(1), json!(0)),
                replace("/a", json!(2), json!(1)),
                replace("/c", json!(1), json!(0)),
                replace("/a", json!(3), json!(2)),
            ],
        );
        assert_eq!(
            ops,
            vec![
                replace("/b", json!(1), json!(0)),
                replace("/c", json!(1), json!(0)),
                replace("/a", json!(3), json!(0)),
            ]
        );
    }

    #[test]
    fn path_counts_track_remaining_ops() {
        let ops = vec![
            replace("/a", json!(1), json!(0)),
            replace("/b", json!(1), json!(0)),
            replace("/a", json!(2), json!(1)),
        ];
        let mut counts = PathCounts::of(&ops);
        assert!(counts.repeats(&p("/a")));
        assert!(!counts.repeats(&p("/b")));
        counts.release(&p("/a"));
        assert!(!counts.repeats(&p("/a")));
        counts.release(&p("/a"));
        counts.release(&p("/a"));
        assert!(counts.0.get(&p("/a")).is_none());
    }

    #[test]
    fn optimize_is_idempotent() {
        let mut ops = vec![
            remove("/3", json!("d")),
            remove("/1", json!("b")),
            add("/0", json!("d")),
            add("/2", json!("q")),
            replace("/x", json!(1), json!(1)),
        ];
        optimize(&mut ops);
        let once = ops.clone();
        optimize(&mut ops);
        assert_eq!(ops, once);
    }
}
