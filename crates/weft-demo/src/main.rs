//! weft-demo: a layered order flow traced end to end.
//!
//! Runs one or more concurrent order flows through a handler -> service ->
//! repository chain. Each flow carries its own correlation id, so the
//! interleaved log output still reads as separate nested traces.

mod config;
mod order;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use weft::{TaskLocalStore, Tracer, with_flow};

use config::DemoConfig;

/// Layered tracing demo: every flow logs one nested trace.
#[derive(Parser)]
#[command(name = "weft-demo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Item id to order
    #[arg(long, default_value = "item-1001")]
    item: String,

    /// Number of concurrent flows to run
    #[arg(long, default_value = "1")]
    flows: usize,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for daily-rolling log files (default: log to stderr)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging to stderr for interactive use.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Initialize logging to daily-rolling files in `log_dir`.
fn init_file_logging(log_dir: &std::path::Path, verbose: bool) {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
        // Fall back to stderr logging
        init_logging(verbose);
        return;
    }

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "weft-demo.log");

    // Use non-blocking writer to avoid blocking on log writes
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Store guard in a static to prevent it from being dropped
    // (dropping the guard would stop logging)
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(_guard);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter)
        .init();
}

/// Load configuration from an explicit path, or use defaults.
fn load_config(path: Option<&PathBuf>) -> DemoConfig {
    match path {
        Some(p) => match DemoConfig::from_file(p) {
            Ok(config) => {
                info!("Loaded config from {}", p.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                DemoConfig::default()
            }
        },
        None => DemoConfig::default(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.log_dir.as_deref() {
        Some(dir) => init_file_logging(dir, cli.verbose),
        None => init_logging(cli.verbose),
    }

    let config = load_config(cli.config.as_ref());
    let flows = cli.flows.max(1);

    // Async flows may migrate across worker threads, so the tracer gets a
    // task-local store and each flow runs inside its own scope.
    let tracer = Arc::new(Tracer::new().with_store(Arc::new(TaskLocalStore::new())));
    let handler = Arc::new(order::build_handler(
        tracer,
        Duration::from_millis(config.repository.latency_ms),
        &config.repository.fail_item,
    ));

    info!(
        "Running {} flow(s) for item '{}' (repository rejects '{}')",
        flows, cli.item, config.repository.fail_item
    );

    let mut tasks = Vec::new();
    for _ in 0..flows {
        let handler = Arc::clone(&handler);
        let item = cli.item.clone();
        tasks.push(tokio::spawn(async move {
            with_flow(async move { handler.request(&item).await }).await
        }));
    }

    let mut failures = 0usize;
    for task in tasks {
        match task.await? {
            Ok(receipt) => info!("{}", receipt),
            Err(e) => {
                failures += 1;
                tracing::error!("order failed: {}", e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} flow(s) failed", failures, flows);
    }

    Ok(())
}
