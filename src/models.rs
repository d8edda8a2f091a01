//! Data models for the KPI dashboards.
//!
//! This module contains the core data structures used throughout
//! the application: loaded KPI metrics, synthetic cell observations,
//! and the rollups derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel reported as the best performer when no KPI rows exist.
pub const NO_BEST_PERFORMER: &str = "N/A";

/// Sentinel reported as the top anomalous KPI of a cell without anomalies.
pub const NO_ANOMALOUS_KPI: &str = "None";

/// Detection quality scores for one KPI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiMetric {
    /// KPI name (unique per table).
    pub kpi: String,
    /// Precision in [0, 1].
    pub precision: f64,
    /// Recall in [0, 1].
    pub recall: f64,
    /// F1-score in [0, 1].
    pub f1_score: f64,
}

impl KpiMetric {
    pub fn new(kpi: impl Into<String>, precision: f64, recall: f64, f1_score: f64) -> Self {
        Self {
            kpi: kpi.into(),
            precision,
            recall,
            f1_score,
        }
    }
}

/// Severity of an anomalous observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

impl Severity {
    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Low => "🟠",
            Severity::Medium => "🟡",
            Severity::High => "🔴",
        }
    }
}

/// A single (cell, KPI, date) measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Cell identifier.
    pub cell_name: String,
    /// KPI name.
    pub kpi: String,
    /// Measured value.
    pub value: f64,
    /// Whether the measurement was flagged anomalous.
    pub is_anomaly: bool,
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    /// Severity, present only for anomalies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// Coarse classification of a cell's anomaly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classify an anomaly rate given in percent.
    ///
    /// Bounds are exclusive: exactly 20% is medium and exactly 10% is low.
    pub fn from_rate(anomaly_rate: f64) -> Self {
        if anomaly_rate > 20.0 {
            RiskLevel::High
        } else if anomaly_rate > 10.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Low => "🟢",
            RiskLevel::Medium => "🟡",
            RiskLevel::High => "🔴",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// Per-cell rollup of observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellMetric {
    pub cell_name: String,
    pub total_anomalies: usize,
    pub total_measurements: usize,
    /// Percentage of anomalous measurements (0-100).
    pub anomaly_rate: f64,
    /// KPI with the most anomalies, or [`NO_ANOMALOUS_KPI`].
    #[serde(rename = "topAnomalousKPI")]
    pub top_anomalous_kpi: String,
    pub risk_level: RiskLevel,
}

/// Number of cells at each risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Per-date rollup of observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    pub anomaly_count: usize,
    pub total_measurements: usize,
    /// Percentage of anomalous measurements (0-100).
    pub anomaly_rate: f64,
}

/// Direction of a trend series, comparing its tail against its head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "Increasing"),
            TrendDirection::Decreasing => write!(f, "Decreasing"),
            TrendDirection::Stable => write!(f, "Stable"),
        }
    }
}

impl TrendDirection {
    pub fn emoji(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "📈",
            TrendDirection::Decreasing => "📉",
            TrendDirection::Stable => "➖",
        }
    }
}

/// Headline numbers of a trend series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendStats {
    pub average_rate: f64,
    pub peak_rate: f64,
    pub total_anomalies: usize,
}

/// Summary cards of the KPI metrics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    #[serde(rename = "totalKPIs")]
    pub total_kpis: usize,
    pub avg_precision: f64,
    pub avg_recall: f64,
    pub avg_f1_score: f64,
    /// KPI with the highest F1-score, or [`NO_BEST_PERFORMER`].
    pub best_performer: String,
}

impl Default for SummaryStats {
    fn default() -> Self {
        Self {
            total_kpis: 0,
            avg_precision: 0.0,
            avg_recall: 0.0,
            avg_f1_score: 0.0,
            best_performer: NO_BEST_PERFORMER.to_string(),
        }
    }
}

/// Quality grade of a single score in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreGrade {
    Poor,
    Fair,
    Good,
}

impl ScoreGrade {
    pub fn emoji(&self) -> &'static str {
        match self {
            ScoreGrade::Poor => "🔻",
            ScoreGrade::Fair => "➖",
            ScoreGrade::Good => "🔺",
        }
    }
}

/// Direction indicator of a summary score in [0, 1].
///
/// Uses wider bands than [`ScoreGrade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreIndicator {
    Down,
    Steady,
    Up,
}

impl ScoreIndicator {
    pub fn symbol(&self) -> &'static str {
        match self {
            ScoreIndicator::Down => "↓",
            ScoreIndicator::Steady => "→",
            ScoreIndicator::Up => "↑",
        }
    }
}

/// Sort column of the KPI metrics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Precision,
    Recall,
    #[default]
    F1Score,
    Name,
}

impl From<&str> for SortKey {
    /// Unrecognized keys fall back to F1-score.
    fn from(s: &str) -> Self {
        match s {
            "precision" => SortKey::Precision,
            "recall" => SortKey::Recall,
            "f1Score" => SortKey::F1Score,
            "name" => SortKey::Name,
            _ => SortKey::F1Score,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Precision => write!(f, "precision"),
            SortKey::Recall => write!(f, "recall"),
            SortKey::F1Score => write!(f, "f1Score"),
            SortKey::Name => write!(f, "name"),
        }
    }
}

/// Four-tier bucket of an anomaly fraction for heatmap display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatBand {
    Normal,
    Low,
    Medium,
    High,
}

impl HeatBand {
    /// Bucket a fraction in [0, 1].
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction == 0.0 {
            HeatBand::Normal
        } else if fraction < 0.3 {
            HeatBand::Low
        } else if fraction < 0.6 {
            HeatBand::Medium
        } else {
            HeatBand::High
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            HeatBand::Normal => "🟩",
            HeatBand::Low => "🟨",
            HeatBand::Medium => "🟧",
            HeatBand::High => "🟥",
        }
    }
}

/// One cell of the per-KPI heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub cell_name: String,
    pub anomaly_count: usize,
    pub total_measurements: usize,
    /// Anomalous share in [0, 1].
    pub anomaly_fraction: f64,
    pub band: HeatBand,
}

/// Anomaly statistics of a single KPI across cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiBreakdown {
    pub kpi: String,
    pub total_measurements: usize,
    pub total_anomalies: usize,
    /// Percentage of anomalous measurements (0-100).
    pub anomaly_rate: f64,
    pub cells: Vec<HeatmapCell>,
}

/// Metadata about a generated dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetadata {
    /// Date and time the dashboard was generated.
    pub generated_at: DateTime<Utc>,
    /// Where the data came from (file path or generator description).
    pub source: String,
    /// Generator seed, for synthetic data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// The KPI detection-quality dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiDashboard {
    pub metadata: DashboardMetadata,
    pub summary: SummaryStats,
    pub search_term: String,
    pub sort_by: String,
    /// Filtered and sorted table rows.
    pub rows: Vec<KpiMetric>,
    /// Leading rows shown in the comparison chart.
    pub chart: Vec<KpiMetric>,
}

/// The per-cell anomaly dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellDashboard {
    pub metadata: DashboardMetadata,
    /// Cells ranked by anomaly rate, highest first.
    pub cells: Vec<CellMetric>,
    pub risk: RiskDistribution,
    /// Cell the trend is restricted to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_cell: Option<String>,
    pub trend: Vec<TrendPoint>,
    pub trend_direction: TrendDirection,
    pub trend_stats: TrendStats,
    /// Per-KPI heatmap, absent when no observations exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<KpiBreakdown>,
    pub recent_anomalies: Vec<Observation>,
}
