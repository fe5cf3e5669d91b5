#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geodesic helpers and grid partitioning for area analysis.
//!
//! Everything here is a pure function over [`Coordinate`]s and
//! [`BoundingBox`]es: haversine distance, latitude-corrected box area,
//! exact nearest-reference lookup, and splitting a box into a grid of
//! clusters of a target physical size.

pub mod geomath;
pub mod grid;

use commerce_map_geo_models::{BoundingBox, Coordinate, GeoModelError};

pub use geomath::{box_area, distance, nearest_distance};
pub use grid::split;

/// Errors that can occur during geographic computations.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// An argument was outside its accepted domain.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of what went wrong.
        message: String,
    },

    /// A box or coordinate failed validation.
    #[error(transparent)]
    Model(#[from] GeoModelError),
}

/// Converts a bounding box into a `geo` rectangle (x = longitude,
/// y = latitude).
#[must_use]
pub fn to_rect(bbox: &BoundingBox) -> geo::Rect<f64> {
    geo::Rect::new(
        geo::Coord {
            x: bbox.min_lon(),
            y: bbox.min_lat(),
        },
        geo::Coord {
            x: bbox.max_lon(),
            y: bbox.max_lat(),
        },
    )
}

/// Converts a coordinate into a `geo` point (x = longitude, y = latitude).
#[must_use]
pub fn to_point(at: Coordinate) -> geo::Point<f64> {
    geo::Point::new(at.lon, at.lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_uses_lon_as_x() {
        let bbox = BoundingBox::new(10.0, 20.0, 11.0, 22.0).unwrap();
        let rect = to_rect(&bbox);
        assert!((rect.min().x - 20.0).abs() < f64::EPSILON);
        assert!((rect.min().y - 10.0).abs() < f64::EPSILON);
        assert!((rect.width() - 2.0).abs() < f64::EPSILON);
        assert!((rect.height() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_uses_lon_as_x() {
        let point = to_point(Coordinate::new(55.0, 37.0));
        assert!((point.x() - 37.0).abs() < f64::EPSILON);
        assert!((point.y() - 55.0).abs() < f64::EPSILON);
    }
}
