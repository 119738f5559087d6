//! splatgate - session coordinator service
//!
//! Entry point for the coordinator binary. Also hosts the capability
//! maintenance modes (`--show-capabilities`, `--diagnose`).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use splatgate::capabilities::{run_diagnostics, GraphicsProbe};
use splatgate::config::{default_config_path, Config};
use splatgate::coordinator::{router, CoordinatorState, SessionStore};
use splatgate::telemetry::{init_logging, log_startup, LogFormat};
use tracing::info;

/// Command-line arguments for splatgate
#[derive(Parser, Debug)]
#[command(name = "splatgate")]
#[command(version, about = "Splat viewer session coordinator", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "SPLATGATE_LISTEN_ADDR")]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short, long, env = "SPLATGATE_PORT")]
    pub port: Option<u16>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (pretty|compact|json)
    #[arg(long, default_value = "pretty")]
    pub log_format: String,

    /// Probe the local graphics stack, print the capability report, exit
    #[arg(long)]
    pub show_capabilities: bool,

    /// Output format for --show-capabilities (text|json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Run capability diagnostics and exit
    ///
    /// Probes the local stack and prints the resolved settings plus
    /// observations. Helpful for understanding why a client lands on a
    /// reduced or fallback strategy.
    #[arg(long)]
    pub diagnose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path().display().to_string());

    // Silently fall back to defaults if no config file exists yet
    let config = Config::load(&config_path)
        .unwrap_or_else(|_| Config::default_config())
        .with_overrides(args.listen.clone(), args.port);
    config.validate()?;

    let log_format: LogFormat = args.log_format.parse()?;
    init_logging(args.verbose, log_format, &config.logging.level)?;

    if args.show_capabilities || args.diagnose {
        return show_capabilities(&args.format);
    }

    log_startup(&config);

    let store = Arc::new(SessionStore::new(config.coordinator.eviction_timeout()));
    let app = router(CoordinatorState {
        store: store.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr)
        .await
        .context(format!("Failed to bind {}", config.server.listen_addr))?;
    info!("coordinator listening on {}", config.server.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("coordinator server error")?;

    info!(
        "coordinator stopped; final stats: {:?}",
        store.stats()
    );
    Ok(())
}

fn show_capabilities(format: &str) -> Result<()> {
    let report = run_diagnostics(GraphicsProbe::probe());

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => println!("{}", report.format_text()),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {e}");
    }
    info!("shutdown signal received");
}
