//! ID list helpers
//!
//! Set difference over follower/friend ID snapshots. The diff is
//! directional: `diff(a, b)` returns the items of `b` missing from `a`,
//! so it is called twice with swapped arguments to get both the gained
//! and the lost direction.

use std::collections::HashSet;

/// Return items from `b` that are NOT in `a`.
///
/// Builds a membership set over `a`, then scans `b` in order, so the
/// result preserves the relative order of `b`. Inputs are not mutated
/// and duplicates in `b` are kept as-is.
pub fn diff(a: &[i64], b: &[i64]) -> Vec<i64> {
    let known: HashSet<i64> = a.iter().copied().collect();
    b.iter()
        .copied()
        .filter(|item| !known.contains(item))
        .collect()
}

/// Check for `val` in `list`.
pub fn contains(list: &[i64], val: i64) -> bool {
    list.contains(&val)
}
