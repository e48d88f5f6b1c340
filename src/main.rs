//! CLI entry point for the AQI publisher.
//!
//! A default run reads the latest PM2.5 and PM10 means from the data
//! source, converts them to AQI and writes them back, and is meant to be
//! re-triggered by an external timer.

use anyhow::{Context, Result};
use aqi_publisher::aqi::{AqiCategory, Pollutant, compute_aqi};
use aqi_publisher::config::Config;
use aqi_publisher::infra::influx::InfluxClient;
use aqi_publisher::output::{PublishOutcome, publish};
use aqi_publisher::pipeline::run_all;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aqi_publisher")]
#[command(about = "Convert particulate readings into EPA AQI values", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute AQI for the latest readings and publish them (default)
    Run {
        /// Log the results without writing them, in addition to NO_SUBMIT
        #[arg(long, default_value_t = false)]
        no_submit: bool,
    },
    /// Convert a single concentration without touching the data source
    Compute {
        /// Pollutant table to use (pm25 or pm10)
        pollutant: Pollutant,

        /// Concentration in µg/m³
        #[arg(allow_negative_numbers = true)]
        concentration: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/aqi_publisher.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aqi_publisher.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run { no_submit: false }) {
        Commands::Run { no_submit } => {
            let config = Config::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
            run(config, no_submit).await?;
        }
        Commands::Compute {
            pollutant,
            concentration,
        } => {
            let table = pollutant.table();
            let aqi = compute_aqi(concentration, table)?;
            info!(
                %pollutant,
                concentration = table.round(concentration),
                aqi,
                category = AqiCategory::from_aqi(aqi).label(),
                "AQI"
            );
            println!("{aqi}");
        }
    }

    Ok(())
}

/// One pass over all monitored fields followed by the publish gate.
#[tracing::instrument(skip(config), fields(url = %config.url, database = %config.database))]
async fn run(config: Config, no_submit: bool) -> Result<()> {
    let should_publish = config.should_submit && !no_submit;
    if !should_publish {
        info!("Not submitting results");
    }

    let client = InfluxClient::from_config(&config).context("failed to build data source client")?;

    let measurements = run_all(&Pollutant::MONITORED, config.window, &client).await?;

    match publish(&measurements, should_publish, &client).await? {
        PublishOutcome::Submitted(n) => info!(submitted = n, "Run complete"),
        PublishOutcome::Skipped(n) => info!(computed = n, "Run complete, nothing written"),
    }
    Ok(())
}
