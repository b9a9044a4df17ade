mod config;
mod dashboard;
mod errors;
mod models;
mod simulation;

use clap::Parser;
use config::Config;
use dashboard::{write_snapshot, Dashboard, RefreshLoop};
use errors::{DashboardError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "Synthetic Dashboard")]
#[command(version = "0.1.0")]
#[command(about = "Synthetic price charts for a fixed set of assets", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Operating mode: snapshot or watch
    #[arg(short, long, default_value = "snapshot")]
    mode: String,

    /// Chart timeframe (3d, 2w, 3m, 1yr, 5y, 10y)
    #[arg(short, long)]
    timeframe: Option<String>,

    /// Fixed RNG seed for reproducible charts (overrides config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop watch mode after this many refreshes
    #[arg(long)]
    ticks: Option<u64>,

    /// Write the latest snapshot as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let args = Args::parse();

    let config_missing = !Path::new(&args.config).exists();
    let mut config = if config_missing {
        Config::default()
    } else {
        Config::load_from_file(&args.config)?
    };
    config.expand_env_vars()?;

    init_logging(&config.logging.level)?;

    info!("Starting Synthetic Dashboard v0.1.0");
    if config_missing {
        warn!("Config file {} not found, using built-in assets", args.config);
    }

    let mut dashboard = Dashboard::from_config(&config, args.seed)?;
    if let Some(ref timeframe) = args.timeframe {
        dashboard.select_timeframe(timeframe);
    }
    info!("Mode: {}, timeframe: {}", args.mode, dashboard.timeframe());

    match args.mode.as_str() {
        "snapshot" => run_snapshot(dashboard, args.output),
        "watch" => run_watch(dashboard, &config, args.output, args.ticks).await,
        _ => {
            error!("Invalid mode: {}", args.mode);
            Err(DashboardError::ConfigError(format!(
                "Invalid mode: {}. Must be 'snapshot' or 'watch'",
                args.mode
            )))
        }
    }
}

/// Initialize logging based on configuration
fn init_logging(level: &str) -> Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| DashboardError::Unknown(format!("Failed to set logger: {}", e)))?;

    Ok(())
}

/// Render every chart once
fn run_snapshot(mut dashboard: Dashboard, output: Option<PathBuf>) -> Result<()> {
    let snapshot = dashboard.refresh();
    println!("{}", snapshot.format_report());

    if let Some(path) = output {
        write_snapshot(&path, &snapshot)?;
        info!("Snapshot saved to {}", path.display());
    }

    Ok(())
}

/// Refresh on the configured cadence until Ctrl-C or the tick limit
async fn run_watch(
    dashboard: Dashboard,
    config: &Config,
    output: Option<PathBuf>,
    ticks: Option<u64>,
) -> Result<()> {
    let interval = Duration::from_secs(config.general.update_interval_seconds);
    let mut refresh_loop = RefreshLoop::new(dashboard, interval);
    if let Some(path) = output {
        refresh_loop = refresh_loop.with_output(path);
    }
    if let Some(ticks) = ticks {
        refresh_loop = refresh_loop.with_max_ticks(ticks);
    }

    let render = |snapshot: &models::DashboardSnapshot| -> Result<()> {
        println!("{}", snapshot.format_report());
        Ok(())
    };

    tokio::select! {
        result = refresh_loop.run(render) => {
            let completed = result?;
            info!("Stopped after {} refreshes", completed);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Dashboard stopped by user");
        }
    }
    info!("Last refresh status: {}", refresh_loop.status());

    Ok(())
}
