//! Synthetic cell anomaly data.
//!
//! Generates one observation per (cell, KPI, date) over a rolling window
//! of days. The random source is seeded so runs are reproducible.

use super::SourceError;
use crate::models::{Observation, Severity};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// KPIs observed on every cell.
pub const DEFAULT_KPIS: [&str; 16] = [
    "Cell Availability",
    "Average ENDC User DL Throughpu(Mbps)",
    "Total_Traffic_Vol_GB",
    "DL RBSym Utilization",
    "DL BLER (%)",
    "Active_Users",
    "Maximum number of RRC Connected Users",
    "Avg. Overall DL Latency (ms)",
    "Average CQI ( 256 QAM)",
    "PATHLOSS",
    "UL RSSI (dBm/PRB)",
    "NR_DL_256QAM",
    "NR_DL_64QAM",
    "NR_DL_16QAM",
    "NR_DL_QPSK",
    "MIMO Utilisation",
];

/// Cells the generator produces data for.
pub const DEFAULT_CELLS: [&str; 20] = [
    "CELL_001_SECTOR_A",
    "CELL_002_SECTOR_B",
    "CELL_003_SECTOR_C",
    "CELL_004_SECTOR_A",
    "CELL_005_SECTOR_B",
    "CELL_006_SECTOR_C",
    "CELL_007_SECTOR_A",
    "CELL_008_SECTOR_B",
    "CELL_009_SECTOR_C",
    "CELL_010_SECTOR_A",
    "CELL_011_SECTOR_B",
    "CELL_012_SECTOR_C",
    "CELL_013_SECTOR_A",
    "CELL_014_SECTOR_B",
    "CELL_015_SECTOR_C",
    "CELL_016_SECTOR_A",
    "CELL_017_SECTOR_B",
    "CELL_018_SECTOR_C",
    "CELL_019_SECTOR_A",
    "CELL_020_SECTOR_B",
];

/// Longest window the generator accepts, about ten years.
pub const MAX_DAYS: u32 = 3660;

/// Probability of a high-severity anomaly.
const HIGH_SEVERITY_SHARE: f64 = 0.2;
/// Cumulative probability of high or medium severity.
const MEDIUM_SEVERITY_CUTOFF: f64 = 0.5;

/// Settings for synthetic data generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random source.
    pub seed: u64,
    /// Last date of the window (inclusive).
    pub end_date: NaiveDate,
    /// Number of days in the window.
    pub days: u32,
    /// Probability that a single observation is anomalous.
    pub anomaly_probability: f64,
    pub kpis: Vec<String>,
    pub cells: Vec<String>,
}

impl GeneratorConfig {
    /// Default settings with the given seed, ending on `end_date`.
    pub fn new(seed: u64, end_date: NaiveDate) -> Self {
        Self {
            seed,
            end_date,
            days: 30,
            anomaly_probability: 0.15,
            kpis: DEFAULT_KPIS.iter().map(|s| s.to_string()).collect(),
            cells: DEFAULT_CELLS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn validate(&self) -> Result<(), SourceError> {
        if !(0.0..=1.0).contains(&self.anomaly_probability) {
            return Err(SourceError::InvalidGenerator(format!(
                "anomaly probability {} is outside [0, 1]",
                self.anomaly_probability
            )));
        }
        if self.days == 0 {
            return Err(SourceError::InvalidGenerator(
                "window must span at least one day".to_string(),
            ));
        }
        if self.days > MAX_DAYS {
            return Err(SourceError::InvalidGenerator(format!(
                "window of {} days exceeds the maximum of {}",
                self.days, MAX_DAYS
            )));
        }
        if self.kpis.is_empty() || self.cells.is_empty() {
            return Err(SourceError::InvalidGenerator(
                "KPI and cell lists must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Dates of the window, oldest first.
    ///
    /// Fails when the window reaches before the earliest representable date.
    pub fn dates(&self) -> Result<Vec<String>, SourceError> {
        (0..self.days)
            .rev()
            .map(|back| {
                self.end_date
                    .checked_sub_signed(Duration::days(i64::from(back)))
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .ok_or_else(|| {
                        SourceError::InvalidGenerator(format!(
                            "window of {} days ending {} starts before the earliest supported date",
                            self.days, self.end_date
                        ))
                    })
            })
            .collect()
    }
}

/// Seeded generator of cell observations.
pub struct MockGenerator {
    config: GeneratorConfig,
    dates: Vec<String>,
    rng: StdRng,
}

impl MockGenerator {
    /// Create a generator, checking the configuration.
    pub fn new(config: GeneratorConfig) -> Result<Self, SourceError> {
        config.validate()?;
        let dates = config.dates()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self { config, dates, rng })
    }

    /// Generate the full observation set.
    ///
    /// Rows are ordered by cell, then KPI, then date.
    pub fn generate(&mut self) -> Vec<Observation> {
        let dates = &self.dates;
        let mut observations =
            Vec::with_capacity(self.config.cells.len() * self.config.kpis.len() * dates.len());

        for cell in &self.config.cells {
            for kpi in &self.config.kpis {
                for date in dates {
                    let is_anomaly = self.rng.gen::<f64>() < self.config.anomaly_probability;
                    let base_value = self.rng.gen::<f64>() * 100.0;

                    let (value, severity) = if is_anomaly {
                        let scale = 0.3 + self.rng.gen::<f64>() * 0.4;
                        (base_value * scale, Some(draw_severity(&mut self.rng)))
                    } else {
                        (base_value, None)
                    };

                    observations.push(Observation {
                        cell_name: cell.clone(),
                        kpi: kpi.clone(),
                        value,
                        is_anomaly,
                        date: date.clone(),
                        severity,
                    });
                }
            }
        }

        debug!(
            "Generated {} observations (seed {})",
            observations.len(),
            self.config.seed
        );

        observations
    }
}

/// Draw a severity: 20% high, 30% medium, 50% low.
fn draw_severity<R: Rng>(rng: &mut R) -> Severity {
    let roll = rng.gen::<f64>();
    if roll < HIGH_SEVERITY_SHARE {
        Severity::High
    } else if roll < MEDIUM_SEVERITY_CUTOFF {
        Severity::Medium
    } else {
        Severity::Low
    }
}
