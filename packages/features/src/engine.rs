//! Composes spatial and temporal analysis into a single feature vector.

use commerce_map_features_models::{FeatureVector, ModelRequest};
use commerce_map_geo_models::{GeoObject, PeriodSummary, Snapshot};

use crate::{spatial, temporal};

/// Builds the feature vector for one area, window and category.
///
/// `transit` and `roads` are the reference objects visible in the area,
/// already filtered to stations and qualifying roads. An empty `current`
/// snapshot yields zero spatial features; the history is still analyzed.
#[must_use]
pub fn extract(
    current: Snapshot,
    historical: &[PeriodSummary],
    window_years: u32,
    transit: &[GeoObject],
    roads: &[GeoObject],
) -> FeatureVector {
    log::debug!(
        "Extracting features: {} current objects as of {}, {} historical periods, {window_years}-year window",
        current.len(),
        current.captured_at,
        historical.len()
    );

    let spatial = spatial::analyze(&current.objects, transit, roads);
    let temporal = temporal::analyze(historical, window_years);

    FeatureVector {
        spatial,
        temporal,
        objects: current.objects,
    }
}

/// Wraps a feature vector with the context the prediction service needs.
#[must_use]
pub fn model_request(
    features: FeatureVector,
    category: impl Into<String>,
    historical: Vec<PeriodSummary>,
    window_years: u32,
) -> ModelRequest {
    ModelRequest {
        features,
        shop_type: category.into(),
        historical_data: historical,
        years: window_years,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use commerce_map_features_models::SpatialFeatures;

    use super::*;
    use crate::test_support::{object, summary};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn empty_current_still_analyzes_history() {
        let history = vec![summary("2020", 100, 0, 0), summary("2024", 120, 25, 5)];
        let stations = vec![object(9, 0.5, 0.5)];

        let vector = extract(Snapshot::new(date(), Vec::new()), &history, 4, &stations, &[]);

        assert_eq!(vector.spatial, SpatialFeatures::empty());
        assert!((vector.temporal.trend_slope - 5.0).abs() < 1e-12);
        assert!(vector.objects.is_empty());
    }

    #[test]
    fn passes_current_objects_through() {
        let current = Snapshot::new(date(), vec![object(1, 0.1, 0.1), object(2, 0.2, 0.2)]);
        let roads = vec![object(50, 0.1, 0.2)];

        let vector = extract(current.clone(), &[], 2, &[], &roads);

        assert_eq!(vector.objects, current.objects);
        assert_eq!(vector.spatial.total_objects, 2);
        assert!(vector.spatial.avg_dist_to_primary > 0.0);
        assert_eq!(vector.temporal.years_analyzed, 2);
    }

    #[test]
    fn model_request_carries_window_and_category() {
        let vector = extract(Snapshot::new(date(), Vec::new()), &[], 3, &[], &[]);
        let history = vec![summary("2021", 1, 0, 0)];

        let request = model_request(vector, "cafe", history.clone(), 3);

        assert_eq!(request.shop_type, "cafe");
        assert_eq!(request.years, 3);
        assert_eq!(request.historical_data, history);
    }
}
