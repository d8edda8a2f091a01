//! KPI metric aggregation and table views.
//!
//! This module provides the summary cards, search/sort table and
//! chart selection for the KPI detection-quality table.

use crate::models::{KpiMetric, ScoreGrade, ScoreIndicator, SortKey, SummaryStats};
use std::cmp::Ordering;

/// Compute summary statistics over all KPI rows.
///
/// Empty input yields zeroed averages and the `"N/A"` best performer.
pub fn calculate_summary_stats(rows: &[KpiMetric]) -> SummaryStats {
    let Some(first) = rows.first() else {
        return SummaryStats::default();
    };

    let total = rows.len() as f64;
    let mean = |field: fn(&KpiMetric) -> f64| rows.iter().map(field).sum::<f64>() / total;

    // Strict comparison keeps the earliest row on ties
    let best = rows
        .iter()
        .skip(1)
        .fold(first, |best, row| if row.f1_score > best.f1_score { row } else { best });

    SummaryStats {
        total_kpis: rows.len(),
        avg_precision: mean(|r| r.precision),
        avg_recall: mean(|r| r.recall),
        avg_f1_score: mean(|r| r.f1_score),
        best_performer: best.kpi.clone(),
    }
}

/// Filter rows by a case-insensitive KPI substring and sort them.
///
/// Numeric keys sort highest first, `Name` sorts alphabetically. The sort
/// is stable, so rows with equal keys keep their input order.
pub fn filter_and_sort_data(rows: &[KpiMetric], search_term: &str, sort_by: SortKey) -> Vec<KpiMetric> {
    let needle = search_term.to_lowercase();

    let mut filtered: Vec<KpiMetric> = rows
        .iter()
        .filter(|row| row.kpi.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| match sort_by {
        SortKey::Precision => b.precision.total_cmp(&a.precision),
        SortKey::Recall => b.recall.total_cmp(&a.recall),
        SortKey::F1Score => b.f1_score.total_cmp(&a.f1_score),
        SortKey::Name => compare_names(&a.kpi, &b.kpi),
    });

    filtered
}

/// Case-insensitive collation, falling back to byte order.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Grade a precision, recall or F1 score.
pub fn score_grade(score: f64) -> ScoreGrade {
    if score >= 0.8 {
        ScoreGrade::Good
    } else if score >= 0.6 {
        ScoreGrade::Fair
    } else {
        ScoreGrade::Poor
    }
}

/// Indicator shown next to a summary score.
pub fn score_indicator(score: f64) -> ScoreIndicator {
    if score >= 0.7 {
        ScoreIndicator::Up
    } else if score >= 0.5 {
        ScoreIndicator::Steady
    } else {
        ScoreIndicator::Down
    }
}

/// Get the first `n` rows for the comparison chart.
pub fn top_kpis(rows: &[KpiMetric], n: usize) -> Vec<KpiMetric> {
    rows.iter().take(n).cloned().collect()
}
