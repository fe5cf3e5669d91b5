//! Snapshot diffing by object identity.
//!
//! Births and closures are inferred purely from which identifiers appear in
//! which snapshot. This only holds if identifiers are stable for an entity's
//! lifetime and never recycled: a recycled identifier makes a closed shop
//! and its unrelated successor look like one unchanged object.

use std::collections::HashSet;
use std::hash::Hash;

use commerce_map_features_models::ChangeCounts;
use commerce_map_geo_models::Snapshot;

/// Counts identifiers only in `later` (new) and only in `earlier` (closed).
///
/// Duplicate identifiers within one input are counted once.
#[must_use]
pub fn diff<T, I, J>(earlier: I, later: J) -> ChangeCounts
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
    J: IntoIterator<Item = T>,
{
    let earlier: HashSet<T> = earlier.into_iter().collect();
    let later: HashSet<T> = later.into_iter().collect();

    ChangeCounts {
        new_objects: later.difference(&earlier).count() as u64,
        closed_objects: earlier.difference(&later).count() as u64,
    }
}

/// [`diff`] over the object keys of two snapshots.
#[must_use]
pub fn diff_snapshots(earlier: &Snapshot, later: &Snapshot) -> ChangeCounts {
    diff(
        earlier.objects.iter().map(|o| o.key()),
        later.objects.iter().map(|o| o.key()),
    )
}
