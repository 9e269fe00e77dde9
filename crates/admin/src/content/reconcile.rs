//! Relationship reconciliation.
//!
//! Join-table rows are never edited in place: every save recomputes the
//! difference between the desired set of related keys and the rows already
//! stored, producing the minimal batch of inserts and deletes. Rows whose key
//! appears on both sides are left untouched, so unique constraints hold
//! during the transition and unchanged relationships generate no write
//! traffic.

use std::collections::HashSet;
use std::hash::Hash;

/// The insertions and deletions needed to make stored relationship rows
/// match a desired set of keys.
///
/// `insert` preserves the first-occurrence order of the desired keys;
/// `delete` holds surrogate row ids. The two sets are disjoint by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan<K> {
    pub insert: Vec<K>,
    pub delete: Vec<i32>,
}

impl<K> ReconcilePlan<K> {
    /// True when applying the plan would change nothing.
    pub fn is_noop(&self) -> bool {
        self.insert.is_empty() && self.delete.is_empty()
    }
}

/// Diff a desired set of related keys against the currently stored rows.
///
/// `extract` maps a stored row to its `(row_id, key)` pair. Desired keys are
/// treated as a set: duplicates collapse to a single insert. Callers that
/// reconcile an unordered relationship must canonicalize both the desired
/// keys and the extracted keys (see [`AgendaPair`]) so the same edge compares
/// equal no matter which endpoint initiated the edit.
pub fn reconcile<K, R, F>(
    desired: impl IntoIterator<Item = K>,
    current: &[R],
    extract: F,
) -> ReconcilePlan<K>
where
    K: Eq + Hash + Clone,
    F: Fn(&R) -> (i32, K),
{
    let rows: Vec<(i32, K)> = current.iter().map(extract).collect();
    let existing: HashSet<&K> = rows.iter().map(|(_, key)| key).collect();

    let mut wanted = HashSet::new();
    let mut insert = Vec::new();
    for key in desired {
        if wanted.contains(&key) {
            continue;
        }
        if !existing.contains(&key) {
            insert.push(key.clone());
        }
        wanted.insert(key);
    }

    let delete = rows
        .iter()
        .filter(|(_, key)| !wanted.contains(key))
        .map(|(row_id, _)| *row_id)
        .collect();

    ReconcilePlan { insert, delete }
}

/// Canonical key for the symmetric agenda-to-agenda relationship.
///
/// The stored row keeps `agenda_from < agenda_to`, so an unordered edge has
/// exactly one representation. Constructing the pair through [`AgendaPair::new`]
/// applies the same normalization to desired ids, which lets an edit from
/// either endpoint discover the single stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgendaPair {
    pub from: i32,
    pub to: i32,
}

impl AgendaPair {
    /// Normalize an unordered id pair into `(min, max)` form.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }

    /// The endpoint of this pair that is not `id`.
    pub fn other(&self, id: i32) -> i32 {
        if self.from == id { self.to } else { self.from }
    }
}
