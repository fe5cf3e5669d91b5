//! Builds a period history from dated snapshots.
//!
//! Two attribution strategies are supported. [`DiffStrategy::FirstLast`]
//! emits the earliest and latest snapshot only, with the latest carrying the
//! births and closures across the whole window; this is what the temporal
//! analyzer's rates are defined against. [`DiffStrategy::Consecutive`]
//! emits every snapshot with its delta against the previous one, which is
//! what per-year dataset rows want.

use commerce_map_features_models::{ChangeCounts, DiffStrategy};
use commerce_map_geo_models::{BoundingBox, PeriodSummary, Snapshot};

use crate::diff::diff_snapshots;

/// Summarizes `snapshots` (in any order) as a period series over `bbox`.
///
/// Labels are the capture dates in `YYYY-MM-DD` form. The earliest summary
/// always reports zero new and closed objects since there is nothing to
/// compare it against.
#[must_use]
pub fn build_history(
    snapshots: &[Snapshot],
    bbox: BoundingBox,
    strategy: DiffStrategy,
) -> Vec<PeriodSummary> {
    let mut ordered: Vec<&Snapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.captured_at);

    let Some(first) = ordered.first().copied() else {
        return Vec::new();
    };

    let mut series = vec![summarize(first, bbox, ChangeCounts::default())];

    match strategy {
        DiffStrategy::FirstLast => {
            if let [_, .., last] = ordered.as_slice() {
                series.push(summarize(last, bbox, diff_snapshots(first, last)));
            }
        }
        DiffStrategy::Consecutive => {
            for pair in ordered.windows(2) {
                series.push(summarize(pair[1], bbox, diff_snapshots(pair[0], pair[1])));
            }
        }
    }

    log::debug!(
        "Built {} {strategy} period summaries from {} snapshots over {bbox}",
        series.len(),
        snapshots.len()
    );

    series
}

fn summarize(snapshot: &Snapshot, bbox: BoundingBox, changes: ChangeCounts) -> PeriodSummary {
    PeriodSummary {
        period: snapshot.captured_at.format("%Y-%m-%d").to_string(),
        bbox,
        total_objects: snapshot.len() as u64,
        new_objects: changes.new_objects,
        closed_objects: changes.closed_objects,
    }
}
