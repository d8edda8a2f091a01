//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.kpidash.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".kpidash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input data settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Synthetic data generator settings.
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Dashboard display settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output file path. Output goes to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Input data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path of the KPI metrics CSV.
    #[serde(default = "default_metrics_path")]
    pub metrics_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            metrics_path: default_metrics_path(),
        }
    }
}

fn default_metrics_path() -> PathBuf {
    PathBuf::from("data/Anomaly_Detection_Metrics.csv")
}

/// Synthetic data generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Random seed.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of days in the window ending today.
    #[serde(default = "default_days")]
    pub days: u32,

    /// Probability that an observation is anomalous.
    #[serde(default = "default_anomaly_probability")]
    pub anomaly_probability: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            days: default_days(),
            anomaly_probability: default_anomaly_probability(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

fn default_days() -> u32 {
    30
}

fn default_anomaly_probability() -> f64 {
    0.15
}

/// Dashboard display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Default sort column of the KPI table.
    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    /// Rows shown in the KPI comparison chart.
    #[serde(default = "default_top_kpis")]
    pub top_kpis: usize,

    /// Cells shown in the KPI heatmap.
    #[serde(default = "default_heatmap_cells")]
    pub heatmap_cells: usize,

    /// Entries shown in the recent anomalies timeline.
    #[serde(default = "default_recent_anomalies")]
    pub recent_anomalies: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sort_by: default_sort_by(),
            top_kpis: default_top_kpis(),
            heatmap_cells: default_heatmap_cells(),
            recent_anomalies: default_recent_anomalies(),
        }
    }
}

fn default_sort_by() -> String {
    "f1Score".to_string()
}

fn default_top_kpis() -> usize {
    8
}

fn default_heatmap_cells() -> usize {
    32
}

fn default_recent_anomalies() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(ref metrics) = args.metrics {
            self.data.metrics_path = metrics.clone();
        }

        if let Some(seed) = args.seed {
            self.generator.seed = seed;
        }
        if let Some(days) = args.days {
            self.generator.days = days;
        }
        if let Some(probability) = args.anomaly_probability {
            self.generator.anomaly_probability = probability;
        }

        if let Some(ref sort) = args.sort {
            self.display.sort_by = sort.clone();
        }
        if let Some(top) = args.top {
            self.display.top_kpis = top;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
