//! Temporal descriptors over an area's period history.
//!
//! The series is compared end to end: the first period (after sorting by
//! label) is the baseline and the last period is the current state.
//! Intermediate periods only matter through their position in the order.
//!
//! Object density is the last period's total divided by the window length
//! in years. Summing totals across periods would count the same long-lived
//! object once per period, so it is not used.

use commerce_map_features_models::TemporalFeatures;
use commerce_map_geo_models::PeriodSummary;

/// Computes growth, closure and trend features for `series`.
///
/// The input order is ignored; periods are sorted by label first. Labels
/// must be zero-padded so that lexicographic order is chronological.
/// `years_analyzed` is the caller's window length; when it is 0 the density
/// and slope are 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze(series: &[PeriodSummary], years_analyzed: u32) -> TemporalFeatures {
    let mut ordered: Vec<&PeriodSummary> = series.iter().collect();
    ordered.sort_by(|a, b| a.period.cmp(&b.period));

    let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
        return TemporalFeatures::empty(years_analyzed);
    };

    let baseline = first.total_objects as f64;
    let net_change = last.total_objects as f64 - baseline;
    let years = f64::from(years_analyzed);

    let per_baseline = |value: f64| {
        if first.total_objects == 0 {
            0.0
        } else {
            value / baseline
        }
    };
    let per_year = |value: f64| {
        if years_analyzed == 0 {
            0.0
        } else {
            value / years
        }
    };

    let features = TemporalFeatures {
        years_analyzed,
        object_density: per_year(last.total_objects as f64),
        new_object_rate: per_baseline(last.new_objects as f64),
        closure_rate: per_baseline(last.closed_objects as f64),
        net_growth_rate: per_baseline(net_change),
        trend_slope: per_year(net_change),
    };

    log::debug!(
        "Temporal features over {} periods ({} to {}): {features:?}",
        ordered.len(),
        first.period,
        last.period
    );

    features
}
