//! Per-date anomaly trend series.

use crate::models::{Observation, TrendDirection, TrendPoint, TrendStats};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Number of points averaged at each end of a series.
const TREND_WINDOW: usize = 3;

/// Compute the anomaly trend, optionally restricted to one cell.
///
/// An empty `cell_filter` means no filter. Points are ordered by calendar
/// date; dates that don't parse as `YYYY-MM-DD` come last.
pub fn compute_trend(observations: &[Observation], cell_filter: Option<&str>) -> Vec<TrendPoint> {
    let cell_filter = cell_filter.filter(|c| !c.is_empty());

    let mut by_date: HashMap<&str, (usize, usize)> = HashMap::new();

    for obs in observations
        .iter()
        .filter(|o| cell_filter.map_or(true, |cell| o.cell_name == cell))
    {
        let entry = by_date.entry(obs.date.as_str()).or_default();
        entry.1 += 1;
        if obs.is_anomaly {
            entry.0 += 1;
        }
    }

    let mut points: Vec<TrendPoint> = by_date
        .into_iter()
        .map(|(date, (anomaly_count, total_measurements))| TrendPoint {
            date: date.to_string(),
            anomaly_count,
            total_measurements,
            anomaly_rate: anomaly_count as f64 / total_measurements as f64 * 100.0,
        })
        .collect();

    points.sort_by_cached_key(|p| date_sort_key(&p.date));
    points
}

/// Chronological sort key; unparsable dates order after every valid one.
pub(crate) fn date_sort_key(date: &str) -> (bool, Option<NaiveDate>, String) {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
    (parsed.is_none(), parsed, date.to_string())
}

fn mean_rate(points: &[TrendPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.anomaly_rate).sum::<f64>() / points.len() as f64
}

/// Classify a series by comparing the mean rate of its last points to its first.
pub fn classify_trend(points: &[TrendPoint]) -> TrendDirection {
    if points.len() < 2 {
        return TrendDirection::Stable;
    }

    let head = &points[..TREND_WINDOW.min(points.len())];
    let tail = &points[points.len().saturating_sub(TREND_WINDOW)..];

    let earlier = mean_rate(head);
    let recent = mean_rate(tail);

    if recent > earlier * 1.1 {
        TrendDirection::Increasing
    } else if recent < earlier * 0.9 {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Average rate, peak rate and total anomalies of a series.
pub fn trend_stats(points: &[TrendPoint]) -> TrendStats {
    TrendStats {
        average_rate: mean_rate(points),
        peak_rate: points.iter().map(|p| p.anomaly_rate).fold(0.0, f64::max),
        total_anomalies: points.iter().map(|p| p.anomaly_count).sum(),
    }
}
