//! Cluster grid partitioning.
//!
//! Splits a bounding box into a row-major grid of cells for batched
//! analysis. The degree-to-kilometer conversion here is a flat
//! approximation anchored at the box's minimum latitude, not the ellipsoid
//! model used by [`crate::box_area`].

use commerce_map_geo_models::BoundingBox;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};

use crate::{GeoError, to_rect};

/// Kilometers per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.32;

/// Largest grid [`split`] will produce.
pub const MAX_CLUSTERS: usize = 1_000_000;

/// Splits `bbox` into cells roughly `target_size_km` on a side.
///
/// The target is treated as a linear edge length even though callers
/// describe it as a cluster "size". Cells are returned row-major: all cells
/// of the southernmost row first, west to east. The last row and column are
/// pinned to the box's maximum edges, so the cells cover `bbox` exactly.
///
/// A box with zero span on either axis yields a single cell equal to itself.
///
/// # Errors
///
/// Returns [`GeoError::InvalidArgument`] if `target_size_km` is not a
/// positive finite number, or if the grid would exceed [`MAX_CLUSTERS`]
/// cells.
pub fn split(bbox: &BoundingBox, target_size_km: f64) -> Result<Vec<BoundingBox>, GeoError> {
    if !target_size_km.is_finite() || target_size_km <= 0.0 {
        return Err(GeoError::InvalidArgument {
            message: format!("cluster size must be positive, got {target_size_km}"),
        });
    }

    if bbox.is_degenerate() {
        return Ok(vec![*bbox]);
    }

    let lat_km = bbox.lat_span() * KM_PER_DEGREE;
    let lon_km = bbox.lon_span() * KM_PER_DEGREE * bbox.min_lat().to_radians().cos();

    let rows = cell_count(lat_km, target_size_km);
    let cols = cell_count(lon_km, target_size_km);

    log::debug!(
        "Splitting {bbox} ({lat_km:.3} km x {lon_km:.3} km) into {rows}x{cols} clusters of {target_size_km} km"
    );

    let total = rows
        .checked_mul(cols)
        .filter(|&n| n <= MAX_CLUSTERS)
        .ok_or_else(|| GeoError::InvalidArgument {
            message: format!(
                "cluster size {target_size_km} km splits {bbox} into more than {MAX_CLUSTERS} clusters"
            ),
        })?;

    let mut cells = Vec::with_capacity(total);

    for row in 0..rows {
        let min_lat = edge(bbox.min_lat(), bbox.max_lat(), row, rows);
        let max_lat = edge(bbox.min_lat(), bbox.max_lat(), row + 1, rows);

        for col in 0..cols {
            let min_lon = edge(bbox.min_lon(), bbox.max_lon(), col, cols);
            let max_lon = edge(bbox.min_lon(), bbox.max_lon(), col + 1, cols);

            cells.push(BoundingBox::new(min_lat, min_lon, max_lat, max_lon)?);
        }
    }

    Ok(cells)
}

/// Number of cells needed along one axis. Always at least one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cell_count(span_km: f64, target_size_km: f64) -> usize {
    let count = (span_km / target_size_km).ceil();
    if count >= 1.0 { count as usize } else { 1 }
}

/// Position of the `k`-th grid line out of `count` cells between `min` and
/// `max`. The final line is `max` itself.
#[allow(clippy::cast_precision_loss)]
fn edge(min: f64, max: f64, k: usize, count: usize) -> f64 {
    if k >= count {
        return max;
    }
    let step = (max - min) / count as f64;
    (k as f64).mul_add(step, min)
}

/// Renders grid cells as a `GeoJSON` feature collection of polygons, each
/// tagged with its `index` in the grid.
#[must_use]
pub fn to_geojson(cells: &[BoundingBox]) -> FeatureCollection {
    let features = cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let polygon = to_rect(cell).to_polygon();

            let mut properties = JsonObject::new();
            properties.insert("index".to_string(), serde_json::json!(index));
            properties.insert("bbox".to_string(), serde_json::json!(cell.to_string()));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&polygon))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use geo::Area as _;

    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap()
    }

    #[test]
    fn rejects_non_positive_target() {
        assert!(split(&unit_box(), 0.0).is_err());
        assert!(split(&unit_box(), -5.0).is_err());
        assert!(split(&unit_box(), f64::NAN).is_err());
    }

    #[test]
    fn one_degree_box_at_equator_is_single_cluster() {
        let cells = split(&unit_box(), KM_PER_DEGREE).unwrap();
        assert_eq!(cells, vec![unit_box()]);
    }

    #[test]
    fn halving_target_quadruples_clusters() {
        let coarse = split(&unit_box(), KM_PER_DEGREE).unwrap();
        let fine = split(&unit_box(), KM_PER_DEGREE / 2.0).unwrap();
        assert_eq!(coarse.len(), 1);
        assert_eq!(fine.len(), 4);

        let bbox = BoundingBox::new(55.6, 37.4, 55.9, 37.8).unwrap();
        let a = split(&bbox, 2.0).unwrap().len();
        let b = split(&bbox, 1.0).unwrap().len();
        assert!(b >= 3 * a && b <= 5 * a, "{a} -> {b}");
    }

    #[test]
    fn degenerate_box_yields_itself() {
        let point = BoundingBox::new(55.75, 37.61, 55.75, 37.61).unwrap();
        assert_eq!(split(&point, 1.0).unwrap(), vec![point]);
    }

    #[test]
    fn box_degenerate_on_one_axis_yields_itself() {
        let line = BoundingBox::new(0.0, 0.0, 0.0, 1.0).unwrap();
        assert_eq!(split(&line, 10.0).unwrap(), vec![line]);

        let meridian = BoundingBox::new(10.0, 5.0, 12.0, 5.0).unwrap();
        assert_eq!(split(&meridian, 1.0).unwrap(), vec![meridian]);
    }

    #[test]
    fn rejects_targets_that_overflow_the_grid() {
        let world = BoundingBox::new(-80.0, -180.0, 80.0, 180.0).unwrap();
        assert!(matches!(
            split(&world, 1e-9),
            Err(GeoError::InvalidArgument { .. })
        ));

        assert!(matches!(
            split(&unit_box(), 0.001),
            Err(GeoError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn accepts_large_grid_below_the_cap() {
        let cells = split(&unit_box(), KM_PER_DEGREE / 500.0).unwrap();
        assert!(cells.len() >= 500 * 500 && cells.len() <= 501 * 501);
        assert!(cells.len() <= MAX_CLUSTERS);
    }

    #[test]
    fn cells_are_row_major() {
        let cells = split(&unit_box(), KM_PER_DEGREE / 2.0).unwrap();
        // south-west, south-east, north-west, north-east
        assert!(cells[0].min_lat() < f64::EPSILON && cells[0].min_lon() < f64::EPSILON);
        assert!(cells[1].min_lat() < f64::EPSILON && cells[1].min_lon() > 0.0);
        assert!(cells[2].min_lat() > 0.0 && cells[2].min_lon() < f64::EPSILON);
        assert!(cells[3].min_lat() > 0.0 && cells[3].min_lon() > 0.0);
    }

    #[test]
    fn cells_cover_box_exactly() {
        let bbox = BoundingBox::new(55.6, 37.4, 55.9, 37.8).unwrap();
        let cells = split(&bbox, 3.0).unwrap();

        let total: f64 = cells.iter().map(|c| to_rect(c).unsigned_area()).sum();
        let expected = to_rect(&bbox).unsigned_area();
        assert!((total - expected).abs() < 1e-9, "{total} vs {expected}");

        let min_lat = cells.iter().map(BoundingBox::min_lat).fold(f64::INFINITY, f64::min);
        let max_lat = cells.iter().map(BoundingBox::max_lat).fold(f64::NEG_INFINITY, f64::max);
        let min_lon = cells.iter().map(BoundingBox::min_lon).fold(f64::INFINITY, f64::min);
        let max_lon = cells.iter().map(BoundingBox::max_lon).fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(
            (min_lat, min_lon, max_lat, max_lon),
            (bbox.min_lat(), bbox.min_lon(), bbox.max_lat(), bbox.max_lon())
        );
    }

    #[test]
    fn neighboring_cells_share_edges() {
        let bbox = BoundingBox::new(55.6, 37.4, 55.9, 37.8).unwrap();
        let cols = cell_count(
            bbox.lon_span() * KM_PER_DEGREE * bbox.min_lat().to_radians().cos(),
            3.0,
        );
        let cells = split(&bbox, 3.0).unwrap();

        for row in cells.chunks(cols) {
            for pair in row.windows(2) {
                assert!((pair[0].max_lon() - pair[1].min_lon()).abs() < f64::EPSILON);
            }
        }
        for (lower, upper) in cells.iter().zip(cells.iter().skip(cols)) {
            assert!((lower.max_lat() - upper.min_lat()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn geojson_has_one_polygon_per_cell() {
        let cells = split(&unit_box(), KM_PER_DEGREE / 2.0).unwrap();
        let collection = to_geojson(&cells);
        assert_eq!(collection.features.len(), 4);

        let last = &collection.features[3];
        let index = last.properties.as_ref().and_then(|p| p.get("index"));
        assert_eq!(index, Some(&serde_json::json!(3)));
        assert!(matches!(
            last.geometry.as_ref().map(|g| &g.value),
            Some(geojson::Value::Polygon(_))
        ));
    }
}
