//! Depwatch CLI
//!
//! Command-line interface for one-shot dependency probes and metric snapshots,
//! without starting the HTTP server.
//!
//! # Usage
//!
//! ```bash
//! depwatch --help
//! depwatch probe --redis-host 10.0.0.5 --timeout-ms 500
//! depwatch metrics
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shared::config::{MetricsConfig, RedisConfig};
use shared::health::{HealthProber, HealthResult, RedisClient};
use shared::metrics::Registry;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Depwatch CLI - dependency probes and metric snapshots
#[derive(Parser)]
#[command(name = "depwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ping Redis once and print the health result as JSON
    Probe(ProbeArgs),
    /// Print one metrics snapshot in Prometheus text format
    Metrics(MetricsArgs),
}

#[derive(Args)]
struct ProbeArgs {
    /// Full connection URL; overrides host, port and password
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Redis host
    #[arg(long, env = "REDIS_HOST", default_value = "127.0.0.1")]
    redis_host: String,

    /// Redis port
    #[arg(long, env = "REDIS_PORT", default_value_t = 6379)]
    redis_port: u16,

    /// Redis password
    #[arg(long, env = "REDIS_PASSWORD", hide_env_values = true)]
    redis_password: Option<String>,

    /// Probe timeout in milliseconds
    #[arg(
        long,
        env = "DEPWATCH_PROBE_TIMEOUT_MS",
        default_value_t = 2000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_ms: u64,
}

impl ProbeArgs {
    fn redis_config(&self) -> RedisConfig {
        RedisConfig {
            url: self.redis_url.clone(),
            host: self.redis_host.clone(),
            port: self.redis_port,
            password: self.redis_password.clone().filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Args)]
struct MetricsArgs {
    /// Skip process and runtime metrics
    #[arg(long)]
    no_default_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Probe(args)) => {
            let result = probe(&args).await?;
            println!("{}", serde_json::to_string(&result)?);
            Ok(exit_code(&result))
        }
        Some(Commands::Metrics(args)) => {
            print!("{}", snapshot(&args)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("Depwatch CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn probe(args: &ProbeArgs) -> Result<HealthResult> {
    let client = RedisClient::new(&args.redis_config()).context("Invalid Redis configuration")?;
    let prober = HealthProber::new(Arc::new(client), Duration::from_millis(args.timeout_ms));
    Ok(prober.check_health().await)
}

fn snapshot(args: &MetricsArgs) -> Result<String> {
    let config = if args.no_default_metrics {
        MetricsConfig::without_default_metrics()
    } else {
        MetricsConfig::default()
    };

    let registry = Registry::new();
    registry
        .initialize(&config)
        .context("Failed to initialize metrics registry")?;
    Ok(registry.serialize()?)
}

fn exit_code(result: &HealthResult) -> ExitCode {
    if result.status {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
