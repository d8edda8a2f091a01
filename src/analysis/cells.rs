//! Per-cell anomaly rollups.
//!
//! Observations are grouped by cell, and by (cell, KPI) for anomaly
//! counting. Groups keep the order in which they first appear.

use crate::models::{
    CellMetric, HeatBand, HeatmapCell, KpiBreakdown, Observation, RiskDistribution, RiskLevel,
    NO_ANOMALOUS_KPI,
};
use super::trend::date_sort_key;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// Running counts for one cell.
#[derive(Default)]
struct CellAccumulator<'a> {
    total_measurements: usize,
    total_anomalies: usize,
    /// KPIs in order of their first anomaly.
    anomalous_kpis: Vec<&'a str>,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Compute one metric per distinct cell, in order of first appearance.
pub fn compute_cell_metrics(observations: &[Observation]) -> Vec<CellMetric> {
    let mut order: Vec<&str> = Vec::new();
    let mut cells: HashMap<&str, CellAccumulator<'_>> = HashMap::new();
    let mut kpi_anomalies: HashMap<(&str, &str), usize> = HashMap::new();

    for obs in observations {
        let cell = cells.entry(obs.cell_name.as_str()).or_insert_with(|| {
            order.push(obs.cell_name.as_str());
            CellAccumulator::default()
        });

        cell.total_measurements += 1;

        if obs.is_anomaly {
            cell.total_anomalies += 1;
            let count = kpi_anomalies
                .entry((obs.cell_name.as_str(), obs.kpi.as_str()))
                .or_default();
            if *count == 0 {
                cell.anomalous_kpis.push(obs.kpi.as_str());
            }
            *count += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|name| cells.get(name).map(|acc| (name, acc)))
        .map(|(name, acc)| {
            let anomaly_rate = percent(acc.total_anomalies, acc.total_measurements);

            // Strictly greater keeps the earlier KPI on ties
            let mut top = NO_ANOMALOUS_KPI;
            let mut max = 0;
            for &kpi in &acc.anomalous_kpis {
                let count = kpi_anomalies.get(&(name, kpi)).copied().unwrap_or(0);
                if count > max {
                    max = count;
                    top = kpi;
                }
            }

            CellMetric {
                cell_name: name.to_string(),
                total_anomalies: acc.total_anomalies,
                total_measurements: acc.total_measurements,
                anomaly_rate,
                top_anomalous_kpi: top.to_string(),
                risk_level: RiskLevel::from_rate(anomaly_rate),
            }
        })
        .collect()
}

/// Rank cells by anomaly rate (highest first), keeping input order on ties.
pub fn rank_cells(metrics: &[CellMetric]) -> Vec<CellMetric> {
    let mut ranked = metrics.to_vec();
    ranked.sort_by(|a, b| b.anomaly_rate.total_cmp(&a.anomaly_rate));
    ranked
}

/// Count cells at each risk level.
pub fn risk_distribution(metrics: &[CellMetric]) -> RiskDistribution {
    metrics
        .iter()
        .fold(RiskDistribution::default(), |mut dist, m| {
            match m.risk_level {
                RiskLevel::High => dist.high += 1,
                RiskLevel::Medium => dist.medium += 1,
                RiskLevel::Low => dist.low += 1,
            }
            dist
        })
}

/// Get all observations of one cell.
#[allow(dead_code)] // Selector for callers that need a cell's raw rows
pub fn cell_observations(observations: &[Observation], cell_name: &str) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| o.cell_name == cell_name)
        .cloned()
        .collect()
}

/// Distinct KPI names in order of first appearance.
pub fn kpis_in(observations: &[Observation]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut kpis = Vec::new();

    for obs in observations {
        if seen.insert(obs.kpi.as_str()) {
            kpis.push(obs.kpi.clone());
        }
    }

    kpis
}

/// Break down one KPI's anomalies by cell.
pub fn kpi_breakdown(observations: &[Observation], kpi: &str) -> KpiBreakdown {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut total_measurements = 0;
    let mut total_anomalies = 0;

    for obs in observations.iter().filter(|o| o.kpi == kpi) {
        total_measurements += 1;
        let entry = counts.entry(obs.cell_name.as_str()).or_insert_with(|| {
            order.push(obs.cell_name.as_str());
            (0, 0)
        });
        entry.1 += 1;

        if obs.is_anomaly {
            total_anomalies += 1;
            entry.0 += 1;
        }
    }

    let cells = order
        .into_iter()
        .map(|name| {
            let (anomaly_count, total) = counts.get(name).copied().unwrap_or((0, 0));
            let anomaly_fraction = if total == 0 {
                0.0
            } else {
                anomaly_count as f64 / total as f64
            };

            HeatmapCell {
                cell_name: name.to_string(),
                anomaly_count,
                total_measurements: total,
                anomaly_fraction,
                band: HeatBand::from_fraction(anomaly_fraction),
            }
        })
        .collect();

    KpiBreakdown {
        kpi: kpi.to_string(),
        total_measurements,
        total_anomalies,
        anomaly_rate: percent(total_anomalies, total_measurements),
        cells,
    }
}

/// Anomalies of one KPI, newest first, truncated to `limit`.
pub fn recent_anomalies(observations: &[Observation], kpi: &str, limit: usize) -> Vec<Observation> {
    let mut anomalies: Vec<Observation> = observations
        .iter()
        .filter(|o| o.kpi == kpi && o.is_anomaly)
        .cloned()
        .collect();

    anomalies.sort_by_cached_key(|o| Reverse(date_sort_key(&o.date)));
    anomalies.truncate(limit);
    anomalies
}
