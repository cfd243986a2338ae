//! Tank level monitor.
//!
//! Runs the tank pipeline against the simulated sensor and writes one
//! Signal K delta per published value, newline-delimited, to stdout or to a
//! file. Logs go to stderr.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tankline_connectors::{Connector, SignalKOutput, WriterConnector};
use tankline_core::{Application, MonotonicTime, TimeSource};
use tracing_subscriber::EnvFilter;

use tankline_app::driver::{shared, SimulatedDs1603l};
use tankline_app::{tank, AppConfig};

/// Longest the main loop sleeps between ticks.
const MAX_IDLE: Duration = Duration::from_millis(100);

/// Fuel tank level monitor publishing Signal K deltas.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
struct Args {
    /// Path to configuration file (defaults apply when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append deltas to this file instead of writing to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the configured hostname.
    #[arg(long)]
    hostname: Option<String>,

    /// Stop after this many seconds.
    #[arg(long)]
    run_for: Option<u64>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(hostname) = &args.hostname {
        config.device.hostname = hostname.clone();
        config.validate()?;
    }

    let hostname = config.get_hostname();
    info!("Tankline {} starting as {}", tankline_core::VERSION, hostname);

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    let output = SignalKOutput::new(WriterConnector::new(writer), hostname.as_str())
        .with_context(config.device.context.as_str());

    let clock = MonotonicTime::new();
    let mut app = Application::new(&clock, output);

    let sensor = shared(SimulatedDs1603l::new(&config.simulation));
    tank::register(&mut app, &config, &hostname, sensor, MonotonicTime::new())?;

    let deadline = args.run_for.map(Duration::from_secs);
    loop {
        app.tick();

        if !app.output().connector().is_connected() {
            break;
        }

        let elapsed = Duration::from_millis(app.clock().now());
        if deadline.map_or(false, |deadline| elapsed >= deadline) {
            break;
        }

        let idle = app
            .until_next_due()
            .map_or(MAX_IDLE, Duration::from_millis)
            .min(MAX_IDLE);
        std::thread::sleep(idle);
    }

    let stats = app.output().stats().clone();
    info!(
        "Stopped: {} deltas sent, {} failed, {} bytes",
        stats.messages_sent, stats.messages_failed, stats.bytes_sent
    );
    if !app.output().connector().is_connected() {
        anyhow::bail!("output closed: {}", stats.last_error.unwrap_or_default());
    }

    Ok(())
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
