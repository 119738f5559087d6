//! Logging initialization and startup diagnostics

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("Unknown log format: {other} (expected pretty|compact|json)"),
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Precedence for the level filter: `RUST_LOG` env, then `-v` count, then
/// the configured level.
pub fn init_logging(verbose: u8, format: LogFormat, configured_level: &str) -> Result<()> {
    let level = match verbose {
        0 => configured_level,
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("splatgate={level},tower_http=warn")));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
    .context("logging setup")?;

    Ok(())
}

/// Log the startup banner with build identification.
pub fn log_startup(config: &Config) {
    info!("splatgate v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "  built: {} {} ({})",
        option_env!("BUILD_DATE").unwrap_or("unknown"),
        option_env!("BUILD_TIME").unwrap_or(""),
        option_env!("GIT_HASH").unwrap_or("unknown")
    );
    info!("  listen: {}", config.server.listen_addr);
    info!(
        "  coordination: heartbeat {}s, eviction {}s, threshold {}",
        config.coordinator.heartbeat_interval_secs,
        config.coordinator.eviction_timeout_secs,
        config.coordinator.max_local_sessions
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
    }
}
