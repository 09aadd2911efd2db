//! `pollvisor` binary: polls an endpoint until SIGINT/SIGTERM/SIGQUIT.
//!
//! ```bash
//! pollvisor --endpoint http://httpbin.org/uuid --interval-ms 3000 --timeout-ms 1000
//! RUST_LOG=debug pollvisor --log-format json
//! ```

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pollvisor::{Config, DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, LogWriter, Service};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

/// Periodically GETs an endpoint and logs the extracted field.
#[derive(Debug, Parser)]
#[command(name = "pollvisor", version, about)]
struct Cli {
    /// Endpoint fetched by every dispatch.
    #[arg(long, env = "POLLVISOR_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// `User-Agent` header.
    #[arg(long, env = "POLLVISOR_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// `Referer` header (defaults to the endpoint).
    #[arg(long, env = "POLLVISOR_REFERER")]
    referer: Option<String>,

    /// JSON string field extracted from a successful response.
    #[arg(long, env = "POLLVISOR_FIELD", default_value = "uuid")]
    field: String,

    /// Period between timer-triggered dispatches, in milliseconds.
    #[arg(long, env = "POLLVISOR_INTERVAL_MS", default_value_t = 3000)]
    interval_ms: u64,

    /// Per-attempt timeout, in milliseconds.
    #[arg(long, env = "POLLVISOR_TIMEOUT_MS", default_value_t = 1000)]
    timeout_ms: u64,

    /// Drain grace after shutdown, in milliseconds (0 = wait for every dispatch).
    #[arg(long, env = "POLLVISOR_GRACE_MS", default_value_t = 0)]
    grace_ms: u64,

    /// Log level (overridden by `RUST_LOG`).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            endpoint: self.endpoint.clone(),
            user_agent: self.user_agent.clone(),
            referer: self.referer.clone(),
            field: self.field.clone(),
            interval: Duration::from_millis(self.interval_ms),
            attempt_timeout: Duration::from_millis(self.timeout_ms),
            grace: Duration::from_millis(self.grace_ms),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_level, cli.log_format) {
        eprintln!("pollvisor: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let cfg = cli.config();
    info!(endpoint = %cfg.endpoint, interval = ?cfg.interval, timeout = ?cfg.attempt_timeout, "start");

    let service = Service::builder(cfg)
        .with_subscriber(Arc::new(LogWriter::new()))
        .build()
        .context("building service")?;

    let summary = service.run().await?;
    info!(launched = summary.launched, "exit");
    Ok(())
}

fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("initializing json logging")?,
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("initializing logging")?,
    }
    Ok(())
}
