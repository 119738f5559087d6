//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - Environment variables (via CLI arg attributes)
//! - CLI arguments

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::viewer::ViewerOptions;

/// Default config location: XDG config dir, `/etc` as the fallback.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from("/etc/splatgate/config.toml"),
        |d| d.join("splatgate/config.toml"),
    )
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Coordinator HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Session coordination constants
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    /// Viewer-side configuration
    #[serde(default)]
    pub viewer: ViewerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the coordinator service listens on
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8807".to_string(),
        }
    }
}

/// Constants shared by the client heartbeat loop and the server eviction
/// logic. They must be kept consistent: the eviction timeout has to cover
/// at least three heartbeat intervals so a couple of missed beats do not
/// evict a live session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Client heartbeat interval, seconds
    pub heartbeat_interval_secs: u64,
    /// Server-side eviction timeout, seconds
    pub eviction_timeout_secs: u64,
    /// Concurrent shared-renderer sessions tolerated before new clients
    /// are redirected to the CDN embed
    pub max_local_sessions: usize,
    /// Client-side bound on any single coordinator request, milliseconds
    pub request_timeout_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        // Chosen empirically; treat as tunables, not derived values
        Self {
            heartbeat_interval_secs: 20,
            eviction_timeout_secs: 60,
            max_local_sessions: 5,
            request_timeout_ms: 2_500,
        }
    }
}

impl CoordinatorConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn eviction_timeout(&self) -> Duration {
        Duration::from_secs(self.eviction_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Coordinator endpoint the viewer client talks to
    pub coordinator_url: String,
    /// Base URL of the CDN embed renderer
    pub embed_base_url: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            coordinator_url: "http://127.0.0.1:8807".to_string(),
            embed_base_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace|debug|info|warn|error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read config file: {path}"))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Create the default configuration.
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            coordinator: CoordinatorConfig::default(),
            viewer: ViewerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<()> {
        self.server
            .listen_addr
            .parse::<SocketAddr>()
            .context("Invalid listen address")?;

        if self.coordinator.heartbeat_interval_secs == 0 {
            anyhow::bail!("heartbeat_interval_secs must be nonzero");
        }

        if self.coordinator.eviction_timeout_secs < 3 * self.coordinator.heartbeat_interval_secs {
            anyhow::bail!(
                "eviction_timeout_secs ({}) must be at least 3x heartbeat_interval_secs ({}) \
                 to tolerate missed heartbeats",
                self.coordinator.eviction_timeout_secs,
                self.coordinator.heartbeat_interval_secs
            );
        }

        if self.coordinator.max_local_sessions == 0 {
            anyhow::bail!("max_local_sessions must be nonzero");
        }

        if self.coordinator.request_timeout_ms == 0 {
            anyhow::bail!("request_timeout_ms must be nonzero");
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!("Invalid log level: {other}"),
        }

        Ok(())
    }

    /// Override config with CLI arguments.
    pub fn with_overrides(mut self, listen: Option<String>, port: Option<u16>) -> Self {
        if let Some(listen_addr) = listen {
            self.server.listen_addr = listen_addr;
        }
        if let Some(port) = port {
            if let Ok(mut addr) = self.server.listen_addr.parse::<SocketAddr>() {
                addr.set_port(port);
                self.server.listen_addr = addr.to_string();
            }
        }
        self
    }

    /// Viewer-side options derived from this config.
    pub fn viewer_options(&self) -> ViewerOptions {
        ViewerOptions {
            heartbeat_interval: self.coordinator.heartbeat_interval(),
            admission_threshold: self.coordinator.max_local_sessions,
            embed_base_url: self.viewer.embed_base_url.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
