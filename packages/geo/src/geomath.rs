//! Distance and area math on the WGS84 sphere/ellipsoid.
//!
//! Distances are in kilometers, areas in square kilometers.

use commerce_map_geo_models::{BoundingBox, Coordinate};

/// Mean Earth radius used by [`distance`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates (haversine).
#[must_use]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = lat_b - lat_a;
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    // h can creep past 1.0 for antipodal points
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Area of a bounding box, scaled by the meridian and parallel lengths at
/// the box's mid-latitude.
///
/// Zero for degenerate boxes; never negative.
#[must_use]
pub fn box_area(bbox: &BoundingBox) -> f64 {
    let phi = bbox.mid_latitude().to_radians();
    let meters_per_lat_degree = 559.82f64.mul_add(-(2.0 * phi).cos(), 111_132.92);
    let meters_per_lon_degree = 111_412.84 * phi.cos();

    let area_m2 = (bbox.lat_span() * meters_per_lat_degree)
        * (bbox.lon_span() * meters_per_lon_degree);

    area_m2.abs() / 1_000_000.0
}

/// Distance from `point` to the closest of `references`.
///
/// Every reference is checked. Returns 0 when there are no references,
/// which callers treat as "no signal" rather than "adjacent".
#[must_use]
pub fn nearest_distance<I>(point: Coordinate, references: I) -> f64
where
    I: IntoIterator<Item = Coordinate>,
{
    references
        .into_iter()
        .map(|reference| distance(point, reference))
        .fold(None, |best: Option<f64>, d| {
            Some(best.map_or(d, |b| b.min(d)))
        })
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(55.7558, 37.6173),
            Coordinate::new(-33.8688, 151.2093),
            Coordinate::new(40.7128, -74.0060),
            Coordinate::new(89.9, 179.9),
            Coordinate::new(-90.0, -180.0),
        ]
    }

    #[test]
    fn distance_to_self_is_zero() {
        for p in sample_points() {
            assert!(distance(p, p).abs() < f64::EPSILON, "{p}");
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let points = sample_points();
        for a in &points {
            for b in &points {
                let ab = distance(*a, *b);
                let ba = distance(*b, *a);
                assert!((ab - ba).abs() < 1e-9, "{a} -> {b}: {ab} vs {ba}");
            }
        }
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.01, "{d}");
    }

    #[test]
    fn antipodal_distance_is_half_circumference() {
        let d = distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6, "{d}");
    }

    #[test]
    fn degenerate_box_has_zero_area() {
        let point = BoundingBox::new(55.0, 37.0, 55.0, 37.0).unwrap();
        assert!(box_area(&point).abs() < f64::EPSILON);

        let line = BoundingBox::new(55.0, 37.0, 56.0, 37.0).unwrap();
        assert!(box_area(&line).abs() < f64::EPSILON);
    }

    #[test]
    fn box_area_is_non_negative_everywhere() {
        for (min_lat, max_lat) in [(-90.0, -89.0), (-10.0, 10.0), (60.0, 61.0), (89.0, 90.0)] {
            let bbox = BoundingBox::new(min_lat, -1.0, max_lat, 1.0).unwrap();
            assert!(box_area(&bbox) >= 0.0, "{bbox}");
        }
    }

    #[test]
    fn one_degree_box_at_equator() {
        let bbox = BoundingBox::new(-0.5, -0.5, 0.5, 0.5).unwrap();
        let expected = (111_132.92 - 559.82) * 111_412.84 / 1_000_000.0;
        assert!((box_area(&bbox) - expected).abs() < 1e-6);
    }

    #[test]
    fn box_area_shrinks_toward_the_poles() {
        let equator = BoundingBox::new(0.0, 0.0, 0.1, 0.1).unwrap();
        let north = BoundingBox::new(60.0, 0.0, 60.1, 0.1).unwrap();
        assert!(box_area(&north) < box_area(&equator));
    }

    #[test]
    fn nearest_distance_without_references_is_zero() {
        let d = nearest_distance(Coordinate::new(10.0, 10.0), Vec::new());
        assert!(d.abs() < f64::EPSILON);
    }

    #[test]
    fn nearest_distance_matches_brute_force_minimum() {
        let point = Coordinate::new(55.75, 37.62);
        let references = sample_points();
        let expected = references
            .iter()
            .map(|r| distance(point, *r))
            .fold(f64::INFINITY, f64::min);

        let actual = nearest_distance(point, references.iter().copied());
        assert!((actual - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn nearest_distance_finds_closest_at_end_of_list() {
        let point = Coordinate::new(0.0, 0.0);
        let references = vec![
            Coordinate::new(10.0, 10.0),
            Coordinate::new(5.0, 5.0),
            Coordinate::new(0.0, 0.001),
        ];
        let d = nearest_distance(point, references);
        assert!(d < 0.2, "{d}");
    }
}
