//! Data sources for the dashboards.
//!
//! KPI metrics are loaded from a CSV file; cell observations are
//! generated from a seeded random source.

pub mod generator;
pub mod loader;

pub use generator::{GeneratorConfig, MockGenerator, MAX_DAYS};
pub use loader::{load_metrics, parse_metrics};

/// Error type for data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The input file is missing or unreadable.
    #[error("Failed to load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A row does not have the expected shape.
    #[error("Invalid data on line {line}: {reason}")]
    Data { line: u64, reason: String },

    /// The generator was configured with unusable settings.
    #[error("Invalid generator settings: {0}")]
    InvalidGenerator(String),
}
