#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Feature records produced by the extraction engine.
//!
//! Field names serialize in `snake_case` because the prediction service and
//! the model trainer read them under those names.
//!
//! Every numeric field uses 0 as the "no signal" value: an empty snapshot,
//! an empty reference set, or a zero denominator all produce 0 rather than
//! a missing value or a NaN. Consumers that need to tell "no data" apart
//! from a genuine zero should look at `total_objects` (spatial) or at the
//! length of the history they supplied (temporal).

use commerce_map_geo_models::{GeoObject, PeriodSummary, Snapshot};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Descriptors computed over a single snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SpatialFeatures {
    /// Number of objects in the snapshot.
    pub total_objects: u64,
    /// Mean footprint area in km².
    pub avg_area: f64,
    /// Number of transit stations supplied as references.
    pub subway_stations: u64,
    /// Mean distance from each object to its nearest transit station, km.
    pub avg_dist_to_subway: f64,
    /// Mean distance from each object to its nearest qualifying road, km.
    pub avg_dist_to_primary: f64,
}

impl SpatialFeatures {
    /// The all-zero record returned for an empty snapshot.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total_objects: 0,
            avg_area: 0.0,
            subway_stations: 0,
            avg_dist_to_subway: 0.0,
            avg_dist_to_primary: 0.0,
        }
    }
}

/// Descriptors computed over an area's history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TemporalFeatures {
    /// Length of the analysis window in years, as supplied by the caller.
    pub years_analyzed: u32,
    /// Last period's object count per year of the window.
    pub object_density: f64,
    /// Last period's new objects relative to the first period's total.
    pub new_object_rate: f64,
    /// Last period's closures relative to the first period's total.
    pub closure_rate: f64,
    /// Relative change in total objects from first to last period.
    pub net_growth_rate: f64,
    /// Signed change in total objects per year. Negative means shrinkage.
    pub trend_slope: f64,
}

impl TemporalFeatures {
    /// The all-zero record for an empty history.
    #[must_use]
    pub const fn empty(years_analyzed: u32) -> Self {
        Self {
            years_analyzed,
            object_density: 0.0,
            new_object_rate: 0.0,
            closure_rate: 0.0,
            net_growth_rate: 0.0,
            trend_slope: 0.0,
        }
    }
}

/// The combined input handed to the predictive model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FeatureVector {
    pub spatial: SpatialFeatures,
    pub temporal: TemporalFeatures,
    /// The current objects the spatial features were computed from.
    #[serde(rename = "elements")]
    pub objects: Vec<GeoObject>,
}

/// Payload forwarded to the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelRequest {
    pub features: FeatureVector,
    /// Object category the features describe (e.g. "cafe").
    pub shop_type: String,
    pub historical_data: Vec<PeriodSummary>,
    pub years: u32,
}

/// Births and closures between two snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChangeCounts {
    /// Identifiers present only in the later snapshot.
    pub new_objects: u64,
    /// Identifiers present only in the earlier snapshot.
    pub closed_objects: u64,
}

/// How new/closed counts are attributed across a series of snapshots.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DiffStrategy {
    /// Compare the earliest snapshot against the latest one.
    #[default]
    FirstLast,
    /// Compare each snapshot against its immediate predecessor.
    Consecutive,
}

/// Everything observed over an area across an analysis window: dated
/// snapshots of the category of interest plus the raw reference objects.
///
/// Reference objects are unfiltered; callers run them through a reference
/// filter before analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AreaObservations {
    /// Object category the snapshots were queried for.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
    #[serde(default)]
    pub transit: Vec<GeoObject>,
    #[serde(default)]
    pub roads: Vec<GeoObject>,
}

/// One feature row of the training dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FeatureRow {
    pub avg_area: f64,
    pub avg_dist_to_primary: f64,
    pub avg_dist_to_subway: f64,
    pub closure_rate: f64,
    pub new_object_rate: f64,
    pub object_density: f64,
    pub total_objects: u64,
}

/// Feature rows for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearFeatures {
    pub year: i32,
    pub data: Vec<FeatureRow>,
}

/// All yearly rows for one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    /// Position of the cell in the row-major grid.
    pub index: usize,
    /// Cell bounds in `"minLat,minLon,maxLat,maxLon"` form.
    pub bbox: String,
    pub data: Vec<YearFeatures>,
}

/// A training dataset: one record per cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub clusters: Vec<ClusterRecord>,
}
