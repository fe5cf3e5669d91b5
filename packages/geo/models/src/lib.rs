#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic value types shared across the commerce map toolchain.
//!
//! These types describe what a snapshot source hands us: coordinates,
//! bounding boxes, observed points of interest, and the per-period summary
//! rows kept by the historical store. They carry no behavior beyond parsing
//! and validation; all math lives in `commerce_map_geo`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Errors raised while constructing or parsing geographic values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeoModelError {
    /// A value was out of range or malformed.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of what went wrong.
        message: String,
    },
}

impl GeoModelError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude, -90 to 90.
    pub lat: f64,
    /// Longitude, -180 to 180.
    pub lon: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both components fall inside their WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

#[derive(Deserialize)]
struct RawBoundingBox {
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = GeoModelError;

    fn try_from(raw: RawBoundingBox) -> Result<Self, Self::Error> {
        Self::new(raw.min_lat, raw.min_lon, raw.max_lat, raw.max_lon)
    }
}

/// An axis-aligned latitude/longitude rectangle.
///
/// Construction validates that every corner is a valid coordinate and that
/// the minimum corner does not exceed the maximum one. Once built, a box is
/// never modified; the fields are only reachable through accessors.
///
/// The textual form is `"minLat,minLon,maxLat,maxLon"`, which is what the
/// request boundary accepts and what the dataset files record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoundingBox")]
pub struct BoundingBox {
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
}

impl BoundingBox {
    /// Creates a validated bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`GeoModelError::InvalidArgument`] if any corner is out of
    /// range or if a minimum exceeds its maximum.
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Result<Self, GeoModelError> {
        for (name, value) in [("minLat", min_lat), ("maxLat", max_lat)] {
            if !(-90.0..=90.0).contains(&value) {
                return Err(GeoModelError::invalid(format!(
                    "{name} {value} out of range [-90, 90]"
                )));
            }
        }
        for (name, value) in [("minLon", min_lon), ("maxLon", max_lon)] {
            if !(-180.0..=180.0).contains(&value) {
                return Err(GeoModelError::invalid(format!(
                    "{name} {value} out of range [-180, 180]"
                )));
            }
        }
        if min_lat > max_lat || min_lon > max_lon {
            return Err(GeoModelError::invalid(
                "minLat must be <= maxLat and minLon must be <= maxLon",
            ));
        }

        Ok(Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        })
    }

    /// A zero-area box sitting on a single coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GeoModelError::InvalidArgument`] if the coordinate is out of
    /// range.
    pub fn point(at: Coordinate) -> Result<Self, GeoModelError> {
        Self::new(at.lat, at.lon, at.lat, at.lon)
    }

    #[must_use]
    pub const fn min_lat(&self) -> f64 {
        self.min_lat
    }

    #[must_use]
    pub const fn min_lon(&self) -> f64 {
        self.min_lon
    }

    #[must_use]
    pub const fn max_lat(&self) -> f64 {
        self.max_lat
    }

    #[must_use]
    pub const fn max_lon(&self) -> f64 {
        self.max_lon
    }

    /// Latitude span in degrees.
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude span in degrees.
    #[must_use]
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    #[must_use]
    pub fn mid_latitude(&self) -> f64 {
        f64::midpoint(self.min_lat, self.max_lat)
    }

    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            self.mid_latitude(),
            f64::midpoint(self.min_lon, self.max_lon),
        )
    }

    /// Closed-interval containment: points on the boundary are inside.
    #[must_use]
    pub fn contains(&self, at: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&at.lat)
            && (self.min_lon..=self.max_lon).contains(&at.lon)
    }

    /// Whether the box has zero extent along either axis.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.lat_span() <= 0.0 || self.lon_span() <= 0.0
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6},{:.6},{:.6},{:.6}",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}

impl FromStr for BoundingBox {
    type Err = GeoModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(GeoModelError::invalid(format!(
                "bbox must have 4 components, got {}",
                parts.len()
            )));
        }

        let mut values = [0.0_f64; 4];
        for ((slot, part), name) in values
            .iter_mut()
            .zip(&parts)
            .zip(["minLat", "minLon", "maxLat", "maxLon"])
        {
            *slot = part
                .parse()
                .map_err(|e| GeoModelError::invalid(format!("invalid {name} '{part}': {e}")))?;
        }

        Self::new(values[0], values[1], values[2], values[3])
    }
}

/// OSM element type. Nodes, ways and relations are numbered independently.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ElementKind {
    #[default]
    Node,
    Way,
    Relation,
}

/// Identity of a real-world entity across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub kind: ElementKind,
    pub id: i64,
}

/// A point of interest as observed at one instant.
///
/// The identifier must be stable for the lifetime of the real-world entity
/// and must never be reused for an unrelated one. Snapshot diffing relies on
/// this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoObject {
    /// Source-assigned identifier.
    pub id: i64,
    /// Element type the identifier belongs to.
    #[serde(default, rename = "type")]
    pub kind: ElementKind,
    /// Representative position.
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Footprint; absent for point-like objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingBox>,
    /// Free-form attribute tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl GeoObject {
    #[must_use]
    pub const fn key(&self) -> ObjectKey {
        ObjectKey {
            kind: self.kind,
            id: self.id,
        }
    }

    /// The object's footprint, falling back to a degenerate box on its
    /// coordinate. Returns `None` only if that coordinate is itself invalid.
    #[must_use]
    pub fn footprint(&self) -> Option<BoundingBox> {
        self.bounds.or_else(|| BoundingBox::point(self.coordinate).ok())
    }

    /// Looks up a tag value.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// A set of objects observed over one area at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Snapshot {
    /// Date the snapshot represents.
    pub captured_at: NaiveDate,
    #[serde(default)]
    pub objects: Vec<GeoObject>,
}

impl Snapshot {
    #[must_use]
    pub const fn new(captured_at: NaiveDate, objects: Vec<GeoObject>) -> Self {
        Self {
            captured_at,
            objects,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// One row of an area's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PeriodSummary {
    /// Sortable label (e.g. "2021", "2021-06-01"). Must be zero-padded so
    /// that lexicographic order matches chronological order.
    pub period: String,
    /// Area the counts cover.
    pub bbox: BoundingBox,
    /// Objects present at the end of the period.
    pub total_objects: u64,
    /// Objects that appeared during the period.
    pub new_objects: u64,
    /// Objects that disappeared during the period.
    pub closed_objects: u64,
}
