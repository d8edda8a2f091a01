//! Dashboard assembly.
//!
//! Composes loaded or generated data with the aggregation functions into
//! the dashboard documents handed to the report generator.

use crate::analysis;
use crate::models::{
    CellDashboard, DashboardMetadata, KpiDashboard, KpiMetric, Observation, SortKey,
};
use tracing::{debug, warn};

/// Display options of the KPI dashboard.
#[derive(Debug, Clone)]
pub struct KpiViewOptions {
    pub search_term: String,
    pub sort_by: String,
    /// Rows shown in the comparison chart.
    pub top: usize,
}

/// Display options of the cell dashboard.
#[derive(Debug, Clone)]
pub struct CellViewOptions {
    /// Restrict the trend to this cell.
    pub selected_cell: Option<String>,
    /// KPI of the heatmap; the first KPI when unset.
    pub kpi: Option<String>,
    pub heatmap_cells: usize,
    pub recent_anomalies: usize,
}

/// Build the KPI dashboard from loaded rows.
pub fn build_kpi_dashboard(
    rows: &[KpiMetric],
    options: &KpiViewOptions,
    metadata: DashboardMetadata,
) -> KpiDashboard {
    let summary = analysis::calculate_summary_stats(rows);
    let sort_key = SortKey::from(options.sort_by.as_str());
    let table = analysis::filter_and_sort_data(rows, &options.search_term, sort_key);

    debug!(
        "{} of {} KPIs match '{}', sorted by {}",
        table.len(),
        rows.len(),
        options.search_term,
        sort_key
    );

    KpiDashboard {
        metadata,
        summary,
        search_term: options.search_term.clone(),
        sort_by: sort_key.to_string(),
        chart: analysis::top_kpis(&table, options.top),
        rows: table,
    }
}

/// Build the cell dashboard from an observation set.
pub fn build_cell_dashboard(
    observations: &[Observation],
    options: &CellViewOptions,
    metadata: DashboardMetadata,
) -> CellDashboard {
    let metrics = analysis::compute_cell_metrics(observations);
    let risk = analysis::risk_distribution(&metrics);
    let cells = analysis::rank_cells(&metrics);

    let selected_cell = options.selected_cell.clone().filter(|c| !c.is_empty());
    if let Some(ref cell) = selected_cell {
        if !observations.iter().any(|o| o.cell_name == *cell) {
            warn!("Cell {} has no observations", cell);
        }
    }

    let trend = analysis::compute_trend(observations, selected_cell.as_deref());
    let trend_direction = analysis::classify_trend(&trend);
    let trend_stats = analysis::trend_stats(&trend);

    let kpi = options
        .kpi
        .clone()
        .or_else(|| analysis::kpis_in(observations).into_iter().next());

    let breakdown = kpi.as_deref().map(|kpi| {
        let mut breakdown = analysis::kpi_breakdown(observations, kpi);
        if breakdown.total_measurements == 0 {
            warn!("KPI {} has no observations", kpi);
        }
        breakdown.cells.truncate(options.heatmap_cells);
        breakdown
    });

    let recent_anomalies = kpi
        .as_deref()
        .map(|kpi| analysis::recent_anomalies(observations, kpi, options.recent_anomalies))
        .unwrap_or_default();

    CellDashboard {
        metadata,
        cells,
        risk,
        selected_cell,
        trend,
        trend_direction,
        trend_stats,
        breakdown,
        recent_anomalies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RiskLevel, Severity};
    use crate::source::{GeneratorConfig, MockGenerator};
    use chrono::{NaiveDate, Utc};

    fn metadata() -> DashboardMetadata {
        DashboardMetadata {
            generated_at: Utc::now(),
            source: "test".to_string(),
            seed: None,
        }
    }

    fn cell_options() -> CellViewOptions {
        CellViewOptions {
            selected_cell: None,
            kpi: None,
            heatmap_cells: 32,
            recent_anomalies: 10,
        }
    }

    fn generated(seed: u64) -> Vec<Observation> {
        let end = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        MockGenerator::new(GeneratorConfig::new(seed, end))
            .unwrap()
            .generate()
    }

    #[test]
    fn test_kpi_dashboard_from_csv_rows() {
        let rows = crate::source::parse_metrics(
            "kpi,precision,recall,f1Score\nA,0.9,0.8,0.8471\nB,0.5,0.6,0.5455",
        )
        .unwrap();
        let options = KpiViewOptions {
            search_term: String::new(),
            sort_by: "bogus".to_string(),
            top: 1,
        };

        let dashboard = build_kpi_dashboard(&rows, &options, metadata());

        assert_eq!(dashboard.summary.total_kpis, 2);
        assert_eq!(dashboard.summary.best_performer, "A");
        assert_eq!(dashboard.sort_by, "f1Score");
        assert_eq!(dashboard.rows.len(), 2);
        assert_eq!(dashboard.chart.len(), 1);
        assert_eq!(dashboard.chart[0].kpi, "A");
    }

    #[test]
    fn test_summary_covers_all_rows_despite_filter() {
        let rows = vec![
            KpiMetric::new("PATHLOSS", 0.7, 0.7, 0.7),
            KpiMetric::new("Active_Users", 0.9, 0.9, 0.9),
        ];
        let options = KpiViewOptions {
            search_term: "path".to_string(),
            sort_by: "name".to_string(),
            top: 8,
        };

        let dashboard = build_kpi_dashboard(&rows, &options, metadata());

        assert_eq!(dashboard.rows.len(), 1);
        assert_eq!(dashboard.summary.total_kpis, 2);
        assert_eq!(dashboard.summary.best_performer, "Active_Users");
    }

    #[test]
    fn test_cell_dashboard_from_generated_data() {
        let observations = generated(42);
        let dashboard = build_cell_dashboard(&observations, &cell_options(), metadata());

        assert_eq!(dashboard.cells.len(), 20);
        assert!(dashboard
            .cells
            .windows(2)
            .all(|w| w[0].anomaly_rate >= w[1].anomaly_rate));
        assert_eq!(
            dashboard.risk.high + dashboard.risk.medium + dashboard.risk.low,
            20
        );

        assert_eq!(dashboard.trend.len(), 30);
        assert_eq!(dashboard.trend[0].date, "2023-12-17");
        assert_eq!(dashboard.trend[29].date, "2024-01-15");
        assert!(dashboard.trend.iter().all(|p| p.total_measurements == 20 * 16));

        let breakdown = dashboard.breakdown.expect("breakdown");
        assert_eq!(breakdown.kpi, "Cell Availability");
        assert_eq!(breakdown.cells.len(), 20);

        assert!(dashboard.recent_anomalies.len() <= 10);
        assert!(dashboard
            .recent_anomalies
            .iter()
            .all(|o| o.is_anomaly && o.kpi == "Cell Availability" && o.severity.is_some()));
    }

    #[test]
    fn test_cell_dashboard_selected_cell_and_kpi() {
        let observations = generated(5);
        let options = CellViewOptions {
            selected_cell: Some("CELL_003_SECTOR_C".to_string()),
            kpi: Some("PATHLOSS".to_string()),
            heatmap_cells: 4,
            recent_anomalies: 3,
        };

        let dashboard = build_cell_dashboard(&observations, &options, metadata());

        assert_eq!(dashboard.selected_cell.as_deref(), Some("CELL_003_SECTOR_C"));
        assert!(dashboard.trend.iter().all(|p| p.total_measurements == 16));
        let breakdown = dashboard.breakdown.unwrap();
        assert_eq!(breakdown.kpi, "PATHLOSS");
        assert_eq!(breakdown.cells.len(), 4);
        assert_eq!(breakdown.total_measurements, 20 * 30);
        assert!(dashboard.recent_anomalies.len() <= 3);
    }

    #[test]
    fn test_cell_dashboard_unknown_cell_has_empty_trend() {
        let observations = vec![Observation {
            cell_name: "cellX".to_string(),
            kpi: "kpi1".to_string(),
            value: 10.0,
            is_anomaly: true,
            date: "2024-01-01".to_string(),
            severity: Some(Severity::High),
        }];
        let options = CellViewOptions {
            selected_cell: Some("nowhere".to_string()),
            ..cell_options()
        };

        let dashboard = build_cell_dashboard(&observations, &options, metadata());

        assert!(dashboard.trend.is_empty());
        assert_eq!(dashboard.trend_stats.total_anomalies, 0);
        assert_eq!(dashboard.cells[0].risk_level, RiskLevel::High);
    }

    #[test]
    fn test_cell_dashboard_empty_input() {
        let dashboard = build_cell_dashboard(&[], &cell_options(), metadata());

        assert!(dashboard.cells.is_empty());
        assert!(dashboard.trend.is_empty());
        assert!(dashboard.breakdown.is_none());
        assert!(dashboard.recent_anomalies.is_empty());
    }
}
