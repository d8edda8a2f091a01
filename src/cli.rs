//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// KPIDash - anomaly detection dashboards for network KPIs
///
/// Summarize precision/recall/F1 of KPI anomaly detectors from a CSV file,
/// or explore per-cell anomaly rollups over seeded synthetic data.
///
/// Examples:
///   kpidash --metrics data/Anomaly_Detection_Metrics.csv --sort precision
///   kpidash --search throughput --format json -o kpis.json
///   kpidash --view cells --seed 7 --cell CELL_003_SECTOR_C
///   kpidash --view cells --kpi PATHLOSS --days 14
///   kpidash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dashboard to generate
    #[arg(long, default_value = "kpi", value_name = "VIEW")]
    pub view: View,

    /// KPI metrics CSV file
    ///
    /// Header row followed by kpi,precision,recall,f1Score rows.
    /// Can also be set via KPIDASH_METRICS env var or .kpidash.toml config.
    #[arg(long, value_name = "FILE", env = "KPIDASH_METRICS")]
    pub metrics: Option<PathBuf>,

    /// Case-insensitive KPI name filter for the metrics table
    #[arg(short, long, default_value = "", value_name = "TERM")]
    pub search: String,

    /// Sort column of the metrics table
    ///
    /// Values: precision, recall, f1Score, name. Anything else sorts by f1Score.
    #[arg(long, value_name = "KEY")]
    pub sort: Option<String>,

    /// Number of KPIs shown in the comparison chart
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Seed for synthetic cell data
    #[arg(long, value_name = "SEED", env = "KPIDASH_SEED")]
    pub seed: Option<u64>,

    /// Number of days of synthetic data
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Last day of synthetic data (YYYY-MM-DD, default today)
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<NaiveDate>,

    /// Probability that a synthetic observation is anomalous (0.0 - 1.0)
    #[arg(long, value_name = "P")]
    pub anomaly_probability: Option<f64>,

    /// Restrict the anomaly trend to one cell
    #[arg(long, value_name = "NAME")]
    pub cell: Option<String>,

    /// KPI shown in the cell heatmap (default: first KPI)
    #[arg(long, value_name = "NAME")]
    pub kpi: Option<String>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .kpidash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .kpidash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Which dashboard to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    /// KPI detection quality (precision/recall/F1) from the metrics CSV
    #[default]
    Kpi,
    /// Per-cell anomaly analysis over synthetic data
    Cells,
}

/// Output format for the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(p) = self.anomaly_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err("Anomaly probability must be between 0.0 and 1.0".to_string());
            }
        }

        if let Some(days) = self.days {
            if days == 0 || days > crate::source::MAX_DAYS {
                return Err(format!(
                    "Days must be between 1 and {}",
                    crate::source::MAX_DAYS
                ));
            }
        }

        if self.top == Some(0) {
            return Err("Top must be at least 1".to_string());
        }

        if self.view == View::Kpi && (self.cell.is_some() || self.kpi.is_some()) {
            return Err("--cell and --kpi only apply to --view cells".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` setting; `--quiet` wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
