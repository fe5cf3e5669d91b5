#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Feature extraction and historical diffing for commercial activity.
//!
//! Turns point-of-interest snapshots into the fixed-shape
//! [`FeatureVector`](commerce_map_features_models::FeatureVector) consumed by
//! the prediction service. All analysis is pure: callers fetch snapshots and
//! reference objects, this crate only reads them.
//!
//! The entry point is [`engine::extract`]. The remaining modules are the
//! building blocks it composes, plus the history and dataset builders used
//! when preparing training data.

pub mod dataset;
pub mod diff;
pub mod engine;
pub mod history;
pub mod references;
pub mod spatial;
pub mod temporal;

use commerce_map_geo::GeoError;
use commerce_map_geo_models::GeoModelError;

pub use engine::extract;

/// Errors that can occur during feature extraction.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// An argument was outside its accepted domain.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of what went wrong.
        message: String,
    },

    /// Reference filter configuration could not be parsed.
    #[error("Config error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// I/O error (config file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Geographic computation failed.
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// A geographic value failed validation.
    #[error(transparent)]
    Model(#[from] GeoModelError),
}

impl FeatureError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;

    use commerce_map_geo_models::{BoundingBox, Coordinate, ElementKind, GeoObject, PeriodSummary};

    pub fn object(id: i64, lat: f64, lon: f64) -> GeoObject {
        GeoObject {
            id,
            kind: ElementKind::Node,
            coordinate: Coordinate::new(lat, lon),
            bounds: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn tagged(id: i64, lat: f64, lon: f64, tags: &[(&str, &str)]) -> GeoObject {
        GeoObject {
            tags: tags
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            ..object(id, lat, lon)
        }
    }

    pub fn summary(period: &str, total: u64, new: u64, closed: u64) -> PeriodSummary {
        PeriodSummary {
            period: period.to_string(),
            bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap(),
            total_objects: total,
            new_objects: new,
            closed_objects: closed,
        }
    }
}
