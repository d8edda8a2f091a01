//! Markdown and JSON dashboard generation.
//!
//! This module renders the KPI and cell dashboards as Markdown documents
//! with tables and text bar charts, or as pretty-printed JSON.

use crate::analysis::{score_grade, score_indicator};
use crate::models::{
    CellDashboard, CellMetric, DashboardMetadata, KpiBreakdown, KpiDashboard, KpiMetric,
    Observation, RiskDistribution, SummaryStats, TrendPoint,
};
use anyhow::Result;
use serde::Serialize;

/// Width of a full bar in the text charts.
const BAR_WIDTH: usize = 20;

/// Generate the KPI detection-quality dashboard.
pub fn generate_kpi_markdown(dashboard: &KpiDashboard) -> String {
    let mut output = String::new();

    output.push_str("# KPI Anomaly Detection Dashboard\n\n");
    output.push_str(&generate_metadata_section(&dashboard.metadata));
    output.push_str(&generate_summary_section(&dashboard.summary));
    output.push_str(&generate_chart_section(&dashboard.chart));
    output.push_str(&generate_table_section(
        &dashboard.rows,
        &dashboard.search_term,
        &dashboard.sort_by,
    ));
    output.push_str(&generate_footer());

    output
}

/// Generate the per-cell anomaly dashboard.
pub fn generate_cell_markdown(dashboard: &CellDashboard) -> String {
    let mut output = String::new();

    output.push_str("# Cell Anomaly Analysis\n\n");
    output.push_str(&generate_metadata_section(&dashboard.metadata));
    output.push_str(&generate_cells_section(&dashboard.cells, &dashboard.risk));
    output.push_str(&generate_trend_section(dashboard));

    if let Some(ref breakdown) = dashboard.breakdown {
        output.push_str(&generate_heatmap_section(breakdown));
    }

    output.push_str(&generate_recent_section(&dashboard.recent_anomalies));
    output.push_str(&generate_footer());

    output
}

/// Generate a JSON document of any dashboard.
pub fn generate_json_report<T: Serialize>(dashboard: &T) -> Result<String> {
    serde_json::to_string_pretty(dashboard).map_err(Into::into)
}

fn percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Render a text bar of `value` relative to `max`.
fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let filled = ((value / max).clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled)
}

fn generate_metadata_section(metadata: &DashboardMetadata) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    if let Some(seed) = metadata.seed {
        section.push_str(&format!("- **Seed:** {}\n", seed));
    }
    section.push('\n');

    section
}

fn summary_score(score: f64) -> String {
    format!("{} {}", score_indicator(score).symbol(), percent(score))
}

fn generate_summary_section(summary: &SummaryStats) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Total KPIs | Avg Precision | Avg Recall | Avg F1-Score | Best Performer |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        summary.total_kpis,
        summary_score(summary.avg_precision),
        summary_score(summary.avg_recall),
        summary_score(summary.avg_f1_score),
        summary.best_performer
    ));

    section
}

fn generate_chart_section(chart: &[KpiMetric]) -> String {
    if chart.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Performance Comparison\n\n");

    let max = chart
        .iter()
        .flat_map(|m| [m.precision, m.recall, m.f1_score])
        .fold(0.0, f64::max);

    section.push_str("```\n");
    for metric in chart {
        section.push_str(&format!("{} (F1: {})\n", metric.kpi, percent(metric.f1_score)));
        for (label, value) in [
            ("Precision", metric.precision),
            ("Recall", metric.recall),
            ("F1-Score", metric.f1_score),
        ] {
            section.push_str(&format!(
                "  {:<9} {:<width$} {:.0}%\n",
                label,
                bar(value, max),
                value * 100.0,
                width = BAR_WIDTH
            ));
        }
    }
    section.push_str("```\n\n");

    section
}

fn generate_table_section(rows: &[KpiMetric], search_term: &str, sort_by: &str) -> String {
    let mut section = String::new();

    section.push_str("## KPI Metrics\n\n");
    if search_term.is_empty() {
        section.push_str(&format!("*Sorted by {}*\n\n", sort_by));
    } else {
        section.push_str(&format!(
            "*Matching \"{}\", sorted by {}*\n\n",
            search_term, sort_by
        ));
    }

    if rows.is_empty() {
        section.push_str("No KPIs match the current filter.\n\n");
        return section;
    }

    section.push_str("| Rank | KPI | Precision | Recall | F1-Score |\n");
    section.push_str("|:---:|:---|:---:|:---:|:---:|\n");

    for (i, row) in rows.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} {} | {} {} | {} {} |\n",
            i + 1,
            row.kpi,
            score_grade(row.precision).emoji(),
            percent(row.precision),
            score_grade(row.recall).emoji(),
            percent(row.recall),
            score_grade(row.f1_score).emoji(),
            percent(row.f1_score),
        ));
    }
    section.push('\n');

    section
}

fn generate_cells_section(cells: &[CellMetric], risk: &RiskDistribution) -> String {
    let mut section = String::new();

    section.push_str("## Cell Performance Overview\n\n");
    section.push_str(&format!("*{} cells analyzed*\n\n", cells.len()));

    section.push_str("| 🔴 High Risk | 🟡 Medium Risk | 🟢 Low Risk |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        risk.high, risk.medium, risk.low
    ));

    if cells.is_empty() {
        return section;
    }

    section.push_str("| # | Cell | Risk | Anomaly Rate | Anomalies | Top Issue |\n");
    section.push_str("|:---:|:---|:---:|:---:|:---:|:---|\n");

    for (i, cell) in cells.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} {} | {:.1}% | {}/{} | {} |\n",
            i + 1,
            cell.cell_name,
            cell.risk_level.emoji(),
            cell.risk_level,
            cell.anomaly_rate,
            cell.total_anomalies,
            cell.total_measurements,
            cell.top_anomalous_kpi
        ));
    }
    section.push('\n');

    section
}

fn generate_trend_section(dashboard: &CellDashboard) -> String {
    let mut section = String::new();

    section.push_str("## Anomaly Trend Analysis\n\n");
    if let Some(ref cell) = dashboard.selected_cell {
        section.push_str(&format!("*Cell: {}*\n\n", cell));
    }

    section.push_str(&format!(
        "**Trend:** {} {}\n\n",
        dashboard.trend_direction.emoji(),
        dashboard.trend_direction
    ));

    if dashboard.trend.is_empty() {
        section.push_str("No observations for this selection.\n\n");
        return section;
    }

    let stats = &dashboard.trend_stats;
    section.push_str("| Average Rate | Peak Rate | Total Anomalies |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {:.1}% | {:.1}% | {} |\n\n",
        stats.average_rate, stats.peak_rate, stats.total_anomalies
    ));

    section.push_str(&generate_trend_chart(&dashboard.trend, stats.average_rate, stats.peak_rate));

    section
}

fn generate_trend_chart(points: &[TrendPoint], average: f64, peak: f64) -> String {
    let mut chart = String::from("```\n");

    for point in points {
        let marker = if point.anomaly_rate > average { "▲" } else { " " };
        chart.push_str(&format!(
            "{} {:<width$} {:>5.1}% {}\n",
            point.date,
            bar(point.anomaly_rate, peak),
            point.anomaly_rate,
            marker,
            width = BAR_WIDTH
        ));
    }

    chart.push_str("```\n\n▲ above average\n\n");
    chart
}

fn generate_heatmap_section(breakdown: &KpiBreakdown) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Cell Anomaly Heatmap: {}\n\n", breakdown.kpi));
    section.push_str(&format!(
        "*Anomaly rate: {:.1}% | Total cells: {}*\n\n",
        breakdown.anomaly_rate,
        breakdown.cells.len()
    ));

    if breakdown.cells.is_empty() {
        return section;
    }

    section.push_str("| Cell | Band | Anomalies | Rate |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");

    for cell in &breakdown.cells {
        section.push_str(&format!(
            "| {} | {} | {}/{} | {:.0}% |\n",
            cell.cell_name,
            cell.band.emoji(),
            cell.anomaly_count,
            cell.total_measurements,
            cell.anomaly_fraction * 100.0
        ));
    }

    section.push_str("\n🟩 Normal (0%) · 🟨 Low (under 30%) · 🟧 Medium (30-60%) · 🟥 High (60%+)\n\n");

    section
}

fn generate_recent_section(recent: &[Observation]) -> String {
    let mut section = String::new();

    section.push_str("## Recent Anomalies\n\n");

    if recent.is_empty() {
        section.push_str("No anomalies recorded.\n\n");
        return section;
    }

    section.push_str("| Date | Cell | Severity | Value |\n");
    section.push_str("|:---|:---|:---:|:---:|\n");

    for obs in recent {
        let severity = obs
            .severity
            .map(|s| format!("{} {}", s.emoji(), s))
            .unwrap_or_default();
        section.push_str(&format!(
            "| {} | {} | {} | {:.2} |\n",
            obs.date, obs.cell_name, severity, obs.value
        ));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "---\n\n*Dashboard generated by KPIDash*\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        HeatBand, HeatmapCell, RiskLevel, Severity, TrendDirection, TrendStats,
    };
    use chrono::Utc;

    fn metadata(seed: Option<u64>) -> DashboardMetadata {
        DashboardMetadata {
            generated_at: Utc::now(),
            source: "test".to_string(),
            seed,
        }
    }

    fn kpi_dashboard() -> KpiDashboard {
        let rows = vec![
            KpiMetric::new("Cell Availability", 0.9, 0.8, 0.8471),
            KpiMetric::new("DL BLER (%)", 0.5, 0.6, 0.5455),
        ];

        KpiDashboard {
            metadata: metadata(None),
            summary: SummaryStats {
                total_kpis: 2,
                avg_precision: 0.7,
                avg_recall: 0.7,
                avg_f1_score: 0.6963,
                best_performer: "Cell Availability".to_string(),
            },
            search_term: String::new(),
            sort_by: "f1Score".to_string(),
            chart: rows.clone(),
            rows,
        }
    }

    fn cell_dashboard() -> CellDashboard {
        CellDashboard {
            metadata: metadata(Some(42)),
            cells: vec![CellMetric {
                cell_name: "CELL_001_SECTOR_A".to_string(),
                total_anomalies: 3,
                total_measurements: 10,
                anomaly_rate: 30.0,
                top_anomalous_kpi: "PATHLOSS".to_string(),
                risk_level: RiskLevel::High,
            }],
            risk: RiskDistribution {
                high: 1,
                medium: 0,
                low: 0,
            },
            selected_cell: Some("CELL_001_SECTOR_A".to_string()),
            trend: vec![TrendPoint {
                date: "2024-01-01".to_string(),
                anomaly_count: 3,
                total_measurements: 10,
                anomaly_rate: 30.0,
            }],
            trend_direction: TrendDirection::Stable,
            trend_stats: TrendStats {
                average_rate: 30.0,
                peak_rate: 30.0,
                total_anomalies: 3,
            },
            breakdown: Some(KpiBreakdown {
                kpi: "PATHLOSS".to_string(),
                total_measurements: 10,
                total_anomalies: 3,
                anomaly_rate: 30.0,
                cells: vec![HeatmapCell {
                    cell_name: "CELL_001_SECTOR_A".to_string(),
                    anomaly_count: 3,
                    total_measurements: 10,
                    anomaly_fraction: 0.3,
                    band: HeatBand::Medium,
                }],
            }),
            recent_anomalies: vec![Observation {
                cell_name: "CELL_001_SECTOR_A".to_string(),
                kpi: "PATHLOSS".to_string(),
                value: 12.5,
                is_anomaly: true,
                date: "2024-01-01".to_string(),
                severity: Some(Severity::High),
            }],
        }
    }

    #[test]
    fn test_generate_kpi_markdown() {
        let markdown = generate_kpi_markdown(&kpi_dashboard());

        assert!(markdown.contains("# KPI Anomaly Detection Dashboard"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("| 2 | ↑ 70.0% | ↑ 70.0% | → 69.6% | Cell Availability |"));
        assert!(markdown.contains("## Performance Comparison"));
        assert!(markdown.contains("| 1 | Cell Availability |"));
        assert!(markdown.contains("*Sorted by f1Score*"));
    }

    #[test]
    fn test_empty_table_message() {
        let mut dashboard = kpi_dashboard();
        dashboard.rows.clear();
        dashboard.chart.clear();
        dashboard.search_term = "zzz".to_string();

        let markdown = generate_kpi_markdown(&dashboard);
        assert!(markdown.contains("No KPIs match"));
        assert!(markdown.contains("Matching \"zzz\""));
        assert!(!markdown.contains("## Performance Comparison"));
    }

    #[test]
    fn test_generate_cell_markdown() {
        let markdown = generate_cell_markdown(&cell_dashboard());

        assert!(markdown.contains("# Cell Anomaly Analysis"));
        assert!(markdown.contains("- **Seed:** 42"));
        assert!(markdown.contains("| 1 | CELL_001_SECTOR_A | 🔴 High | 30.0% | 3/10 | PATHLOSS |"));
        assert!(markdown.contains("*Cell: CELL_001_SECTOR_A*"));
        assert!(markdown.contains("**Trend:** ➖ Stable"));
        assert!(markdown.contains("## Cell Anomaly Heatmap: PATHLOSS"));
        assert!(markdown.contains("| 2024-01-01 | CELL_001_SECTOR_A | 🔴 High | 12.50 |"));
    }

    #[test]
    fn test_empty_trend_message() {
        let mut dashboard = cell_dashboard();
        dashboard.trend.clear();
        dashboard.breakdown = None;
        dashboard.recent_anomalies.clear();

        let markdown = generate_cell_markdown(&dashboard);
        assert!(markdown.contains("No observations for this selection."));
        assert!(markdown.contains("No anomalies recorded."));
        assert!(!markdown.contains("Heatmap"));
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(1.0, 1.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(0.5, 1.0).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(0.0, 1.0), "");
        assert_eq!(bar(1.0, 0.0), "");
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&kpi_dashboard()).unwrap();
        assert!(json.contains("\"totalKPIs\": 2"));
        assert!(json.contains("\"bestPerformer\""));
        assert!(json.contains("\"f1Score\""));

        let json = generate_json_report(&cell_dashboard()).unwrap();
        assert!(json.contains("\"trendDirection\": \"stable\""));
        assert!(json.contains("\"riskLevel\": \"high\""));
    }
}
