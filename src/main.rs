//! KPIDash - anomaly detection dashboards for network KPIs
//!
//! A CLI tool that summarizes anomaly-detection quality metrics per KPI
//! and analyzes per-cell anomaly data, producing Markdown or JSON reports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing or malformed input, bad config, etc.)

mod analysis;
mod cli;
mod config;
mod dashboard;
mod models;
mod report;
mod source;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use cli::{Args, OutputFormat, View};
use config::Config;
use dashboard::{CellViewOptions, KpiViewOptions};
use models::DashboardMetadata;
use source::{GeneratorConfig, MockGenerator};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config comes before logging: `[general] verbose` feeds the log level
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("KPIDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    if let Err(e) = run(&args, &config).await {
        error!("Dashboard generation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .kpidash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", config::CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so a dashboard written to stdout stays clean.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load data, aggregate it and write the selected dashboard.
async fn run(args: &Args, config: &Config) -> Result<()> {
    let output = match args.view {
        View::Kpi => render_kpi_view(args, config).await?,
        View::Cells => render_cell_view(args, config)?,
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write dashboard to {}", path.display()))?;
            info!("Dashboard saved to {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

async fn render_kpi_view(args: &Args, config: &Config) -> Result<String> {
    let path = &config.data.metrics_path;
    let rows = source::load_metrics(path)
        .await
        .context("Could not load KPI metrics")?;

    if rows.is_empty() {
        warn!("{} contains no KPI rows", path.display());
    }

    let options = KpiViewOptions {
        search_term: args.search.clone(),
        sort_by: config.display.sort_by.clone(),
        top: config.display.top_kpis,
    };
    let metadata = DashboardMetadata {
        generated_at: Utc::now(),
        source: path.display().to_string(),
        seed: None,
    };

    let dashboard = dashboard::build_kpi_dashboard(&rows, &options, metadata);
    info!(
        "{} KPIs, best performer: {}",
        dashboard.summary.total_kpis, dashboard.summary.best_performer
    );

    match config.general.format {
        OutputFormat::Json => report::generate_json_report(&dashboard),
        OutputFormat::Markdown => Ok(report::generate_kpi_markdown(&dashboard)),
    }
}

fn render_cell_view(args: &Args, config: &Config) -> Result<String> {
    let settings = &config.generator;
    let end_date = args.end_date.unwrap_or_else(|| Local::now().date_naive());

    let generator_config = GeneratorConfig {
        days: settings.days,
        anomaly_probability: settings.anomaly_probability,
        ..GeneratorConfig::new(settings.seed, end_date)
    };
    let observations = MockGenerator::new(generator_config)
        .context("Could not generate cell data")?
        .generate();

    info!(
        "Generated {} observations ending {} (seed {})",
        observations.len(),
        end_date,
        settings.seed
    );

    let options = CellViewOptions {
        selected_cell: args.cell.clone(),
        kpi: args.kpi.clone(),
        heatmap_cells: config.display.heatmap_cells,
        recent_anomalies: config.display.recent_anomalies,
    };
    let metadata = DashboardMetadata {
        generated_at: Utc::now(),
        source: format!("synthetic, {} days ending {}", settings.days, end_date),
        seed: Some(settings.seed),
    };

    let dashboard = dashboard::build_cell_dashboard(&observations, &options, metadata);
    info!(
        "{} cells: {} high, {} medium, {} low risk; trend {}",
        dashboard.cells.len(),
        dashboard.risk.high,
        dashboard.risk.medium,
        dashboard.risk.low,
        dashboard.trend_direction
    );

    match config.general.format {
        OutputFormat::Json => report::generate_json_report(&dashboard),
        OutputFormat::Markdown => Ok(report::generate_cell_markdown(&dashboard)),
    }
}

/// Where the configuration came from, logged once logging is up.
enum ConfigOrigin {
    File(std::path::PathBuf),
    Defaults,
    /// The default file exists but could not be loaded.
    Fallback(anyhow::Error),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Loaded config from {}", path.display()),
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::Fallback(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::File(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((
            config,
            ConfigOrigin::File(config::CONFIG_FILE_NAME.into()),
        )),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Fallback(e))),
    }
}
