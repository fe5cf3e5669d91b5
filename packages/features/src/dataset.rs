//! Training dataset assembly.
//!
//! A dataset covers a bounding box split into clusters and a window of
//! calendar years. Each cluster gets one feature row per year. Years with
//! no observation are backfilled from the most recent earlier year that has
//! one. Years before the first observation get a row with zero counts.

use std::collections::BTreeMap;

use chrono::{Datelike as _, NaiveDate};
use commerce_map_features_models::{
    AreaObservations, ClusterRecord, Dataset, DiffStrategy, FeatureRow, SpatialFeatures,
    YearFeatures,
};
use commerce_map_geo_models::{BoundingBox, GeoObject, PeriodSummary, Snapshot};

use crate::FeatureError;
use crate::history::build_history;
use crate::references::ReferenceConfig;

/// Extracts the leading four-digit year of a period label such as `"2021"`,
/// `"2021-06-01"` or `"2021-Q3"`.
///
/// # Errors
///
/// Returns [`FeatureError::InvalidArgument`] if the label does not start
/// with exactly four digits.
pub fn period_year(label: &str) -> Result<i32, FeatureError> {
    let digits = label.bytes().take_while(u8::is_ascii_digit).count();
    if digits != 4 {
        return Err(FeatureError::invalid(format!(
            "period label '{label}' does not start with a four-digit year"
        )));
    }

    label[..4]
        .parse()
        .map_err(|e| FeatureError::invalid(format!("period label '{label}': {e}")))
}

/// Whole years between two dates, counting a year as 365.25 days.
///
/// # Errors
///
/// Returns [`FeatureError::InvalidArgument`] if `end` is before `start`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn window_years(start: NaiveDate, end: NaiveDate) -> Result<u32, FeatureError> {
    let days = (end - start).num_days();
    if days < 0 {
        return Err(FeatureError::invalid(format!(
            "end date {end} is before start date {start}"
        )));
    }

    Ok((days as f64 / 365.25) as u32)
}

/// Expands `series` into one row per calendar year in
/// `start_year..=end_year`.
///
/// If several periods fall in the same year the latest label wins. Rates
/// in each row are relative to that row's own total, and density is the
/// total per km² of average footprint.
///
/// # Errors
///
/// Returns [`FeatureError::InvalidArgument`] if the year range is inverted
/// or a period label has no leading year.
pub fn yearly_rows(
    series: &[PeriodSummary],
    spatial: &SpatialFeatures,
    start_year: i32,
    end_year: i32,
) -> Result<Vec<YearFeatures>, FeatureError> {
    if start_year > end_year {
        return Err(FeatureError::invalid(format!(
            "start year {start_year} is after end year {end_year}"
        )));
    }

    let mut ordered: Vec<&PeriodSummary> = series.iter().collect();
    ordered.sort_by(|a, b| a.period.cmp(&b.period));

    let mut by_year = BTreeMap::new();
    for summary in ordered {
        by_year.insert(period_year(&summary.period)?, summary);
    }

    Ok((start_year..=end_year)
        .map(|year| {
            let row = by_year
                .range(..=year)
                .next_back()
                .map_or_else(|| spatial_row(spatial), |(_, s)| feature_row(s, spatial));

            YearFeatures {
                year,
                data: vec![row],
            }
        })
        .collect())
}

const fn spatial_row(spatial: &SpatialFeatures) -> FeatureRow {
    FeatureRow {
        avg_area: spatial.avg_area,
        avg_dist_to_primary: spatial.avg_dist_to_primary,
        avg_dist_to_subway: spatial.avg_dist_to_subway,
        closure_rate: 0.0,
        new_object_rate: 0.0,
        object_density: 0.0,
        total_objects: 0,
    }
}

#[allow(clippy::cast_precision_loss)]
fn feature_row(summary: &PeriodSummary, spatial: &SpatialFeatures) -> FeatureRow {
    let total = summary.total_objects as f64;
    let per_total = |value: u64| {
        if summary.total_objects == 0 {
            0.0
        } else {
            value as f64 / total
        }
    };

    FeatureRow {
        closure_rate: per_total(summary.closed_objects),
        new_object_rate: per_total(summary.new_objects),
        object_density: if spatial.avg_area > 0.0 {
            total / spatial.avg_area
        } else {
            0.0
        },
        total_objects: summary.total_objects,
        ..spatial_row(spatial)
    }
}

/// Builds the dataset record for one cluster.
///
/// # Errors
///
/// Returns [`FeatureError`] if [`yearly_rows`] fails.
pub fn build_cluster_record(
    index: usize,
    bbox: &BoundingBox,
    series: &[PeriodSummary],
    spatial: &SpatialFeatures,
    start_year: i32,
    end_year: i32,
) -> Result<ClusterRecord, FeatureError> {
    Ok(ClusterRecord {
        index,
        bbox: bbox.to_string(),
        data: yearly_rows(series, spatial, start_year, end_year)?,
    })
}

/// Assigns each object to the first cell that contains its coordinate.
///
/// Objects on a shared edge go to the earlier cell in grid order, so no
/// object is counted twice. Objects outside every cell are dropped.
#[must_use]
pub fn partition(objects: &[GeoObject], cells: &[BoundingBox]) -> Vec<Vec<GeoObject>> {
    let mut buckets = vec![Vec::new(); cells.len()];
    let mut outside = 0_usize;

    for object in objects {
        match cells.iter().position(|c| c.contains(object.coordinate)) {
            Some(index) => buckets[index].push(object.clone()),
            None => outside += 1,
        }
    }

    if outside > 0 {
        log::debug!("{outside} objects fell outside every cell");
    }

    buckets
}

/// Builds a full training dataset for `observations` over `bbox`.
///
/// The box is split into clusters of `cluster_size_km`; snapshots captured
/// outside `start..=end` are ignored. Each cluster's history uses
/// consecutive diffs, its current state is its latest snapshot, and its
/// references are the qualifying roads and stations inside the cluster.
///
/// # Errors
///
/// Returns [`FeatureError`] if the date window is inverted, the cluster size
/// is not positive, or a grid cell cannot be constructed.
pub fn build_dataset(
    observations: &AreaObservations,
    bbox: &BoundingBox,
    cluster_size_km: f64,
    start: NaiveDate,
    end: NaiveDate,
    references: &ReferenceConfig,
) -> Result<Dataset, FeatureError> {
    let years = window_years(start, end)?;
    let cells = commerce_map_geo::split(bbox, cluster_size_km)?;

    let transit = references.transit_stations(observations.transit.clone());
    let roads = references.qualifying_roads(observations.roads.clone());

    let mut in_window: Vec<&Snapshot> = observations
        .snapshots
        .iter()
        .filter(|s| (start..=end).contains(&s.captured_at))
        .collect();
    in_window.sort_by_key(|s| s.captured_at);

    log::info!(
        "Building dataset for '{}' over {bbox}: {} clusters, {} snapshots between {start} and {end}",
        observations.category,
        cells.len(),
        in_window.len()
    );

    let mut per_cell: Vec<Vec<Snapshot>> = vec![Vec::with_capacity(in_window.len()); cells.len()];
    for snapshot in &in_window {
        for (cell_snapshots, objects) in per_cell
            .iter_mut()
            .zip(partition(&snapshot.objects, &cells))
        {
            cell_snapshots.push(Snapshot::new(snapshot.captured_at, objects));
        }
    }

    let transit_per_cell = partition(&transit, &cells);
    let roads_per_cell = partition(&roads, &cells);

    let mut clusters = Vec::with_capacity(cells.len());
    for (index, cell) in cells.iter().enumerate() {
        log::debug!("Processing cluster {}/{}", index + 1, cells.len());

        let snapshots = &per_cell[index];
        let history = build_history(snapshots, *cell, DiffStrategy::Consecutive);
        let current = snapshots
            .last()
            .cloned()
            .unwrap_or_else(|| Snapshot::new(end, Vec::new()));

        let vector = crate::extract(
            current,
            &history,
            years,
            &transit_per_cell[index],
            &roads_per_cell[index],
        );

        clusters.push(build_cluster_record(
            index,
            cell,
            &history,
            &vector.spatial,
            start.year(),
            end.year(),
        )?);
    }

    Ok(Dataset { clusters })
}

/// Default dataset file name for a category and window.
#[must_use]
pub fn dataset_file_name(category: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "dataset_{category}_{}_to_{}.json",
        start.format("%Y%m%d"),
        end.format("%Y%m%d")
    )
}
