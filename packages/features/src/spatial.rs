//! Spatial descriptors over a single snapshot.

use commerce_map_features_models::SpatialFeatures;
use commerce_map_geo::{box_area, nearest_distance};
use commerce_map_geo_models::GeoObject;

/// Computes footprint and proximity features for `objects`.
///
/// `roads` must already be restricted to qualifying road classes. Proximity
/// averages are 0 when the corresponding reference set is empty, and the
/// whole record is zero when `objects` is empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze(objects: &[GeoObject], transit: &[GeoObject], roads: &[GeoObject]) -> SpatialFeatures {
    if objects.is_empty() {
        return SpatialFeatures::empty();
    }

    let count = objects.len() as f64;

    let total_area: f64 = objects
        .iter()
        .map(|o| {
            o.footprint().map_or_else(
                || {
                    log::warn!("Object {} has no valid footprint, counting zero area", o.id);
                    0.0
                },
                |footprint| box_area(&footprint),
            )
        })
        .sum();

    let features = SpatialFeatures {
        total_objects: objects.len() as u64,
        avg_area: total_area / count,
        subway_stations: transit.len() as u64,
        avg_dist_to_subway: mean_nearest_distance(objects, transit),
        avg_dist_to_primary: mean_nearest_distance(objects, roads),
    };

    log::debug!(
        "Spatial features over {} objects ({} stations, {} roads): {features:?}",
        objects.len(),
        transit.len(),
        roads.len()
    );

    features
}

#[allow(clippy::cast_precision_loss)]
fn mean_nearest_distance(objects: &[GeoObject], references: &[GeoObject]) -> f64 {
    if objects.is_empty() || references.is_empty() {
        return 0.0;
    }

    let total: f64 = objects
        .iter()
        .map(|o| nearest_distance(o.coordinate, references.iter().map(|r| r.coordinate)))
        .sum();

    total / objects.len() as f64
}

#[cfg(test)]
mod tests {
    use commerce_map_geo::distance;
    use commerce_map_geo_models::BoundingBox;

    use super::*;
    use crate::test_support::object;

    /// Ten shops spread across a roughly 1 km² box near the equator, each
    /// with a small building footprint.
    fn ten_shops() -> Vec<GeoObject> {
        (0..10)
            .map(|i| {
                let lat = 0.0009 * f64::from(i);
                let lon = 0.0009 * f64::from(i);
                let mut shop = object(i64::from(i), lat, lon);
                shop.bounds = Some(BoundingBox::new(lat, lon, lat + 0.0001, lon + 0.0001).unwrap());
                shop
            })
            .collect()
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let transit = vec![object(100, 0.0, 0.0)];
        let roads = vec![object(200, 1.0, 1.0)];
        assert_eq!(analyze(&[], &transit, &roads), SpatialFeatures::empty());
    }

    #[test]
    fn no_references_means_zero_distances() {
        let features = analyze(&ten_shops(), &[], &[]);
        assert_eq!(features.total_objects, 10);
        assert_eq!(features.subway_stations, 0);
        assert!(features.avg_area > 0.0);
        assert!(features.avg_dist_to_subway.abs() < f64::EPSILON);
        assert!(features.avg_dist_to_primary.abs() < f64::EPSILON);
    }

    #[test]
    fn point_objects_have_zero_average_area() {
        let objects = vec![object(1, 10.0, 10.0), object(2, 10.1, 10.1)];
        let features = analyze(&objects, &[], &[]);
        assert!(features.avg_area.abs() < f64::EPSILON);
    }

    #[test]
    fn averages_nearest_distance_per_object() {
        let objects = vec![object(1, 0.0, 0.0), object(2, 0.0, 1.0)];
        let stations = vec![object(10, 0.0, 0.1), object(11, 0.0, 0.9), object(12, 5.0, 5.0)];

        let features = analyze(&objects, &stations, &[]);

        let expected = f64::midpoint(
            distance(objects[0].coordinate, stations[0].coordinate),
            distance(objects[1].coordinate, stations[1].coordinate),
        );
        assert!((features.avg_dist_to_subway - expected).abs() < 1e-9);
        assert_eq!(features.subway_stations, 3);
    }

    #[test]
    fn roads_feed_primary_distance_only() {
        let objects = vec![object(1, 0.0, 0.0)];
        let roads = vec![object(20, 0.0, 0.01)];

        let features = analyze(&objects, &[], &roads);

        assert!(features.avg_dist_to_subway.abs() < f64::EPSILON);
        assert!((features.avg_dist_to_primary - distance(objects[0].coordinate, roads[0].coordinate)).abs() < 1e-12);
    }
}
