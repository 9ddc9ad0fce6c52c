//! Configuration module
//!
//! Settings come from a TOML file (`~/.config/ocpp-dispatch/config.toml`
//! by default, overridable through `OCPP_DISPATCH_CONFIG`). Every field
//! has a default, so a partial file or no file at all still yields a
//! runnable configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::application::polling::PollSettings;
use crate::application::services::{RetentionConfig, SessionSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ocpp-dispatch")
        .join("config.toml")
}

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub session: SessionConfig,
    pub simulator: SimulatorConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Grace period for draining in-flight requests on shutdown
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter, overridable through `RUST_LOG`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Session operation timing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long to wait for a device acknowledgement
    pub ack_timeout_secs: u64,
    /// How long to wait for a transaction to open
    pub start_timeout_secs: u64,
    /// How long to wait for a transaction to close
    pub stop_timeout_secs: u64,
    /// Pause between confirmation samples
    pub poll_interval_ms: u64,
    /// Upper bound on operations blocked in a poll at the same time
    pub max_concurrent_polls: usize,
    /// How long finished command tasks stay queryable
    pub task_retention_secs: u64,
    /// How often the retention sweeper runs
    pub sweep_interval_secs: u64,
}

impl SessionConfig {
    pub fn settings(&self) -> SessionSettings {
        let interval = Duration::from_millis(self.poll_interval_ms);
        SessionSettings {
            ack: PollSettings::new(Duration::from_secs(self.ack_timeout_secs), interval),
            start: PollSettings::new(Duration::from_secs(self.start_timeout_secs), interval),
            stop: PollSettings::new(Duration::from_secs(self.stop_timeout_secs), interval),
            max_concurrent_polls: self.max_concurrent_polls,
        }
    }

    pub fn retention(&self) -> RetentionConfig {
        RetentionConfig {
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
            retain_for: Duration::from_secs(self.task_retention_secs),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ack_timeout_secs: 10,
            start_timeout_secs: 5,
            stop_timeout_secs: 60,
            poll_interval_ms: 250,
            max_concurrent_polls: 64,
            task_retention_secs: 3600,
            sweep_interval_secs: 60,
        }
    }
}

/// Simulated station behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// One of `accept`, `reject`, `error`, `silent`
    pub behavior: String,
    /// Delay before the simulated station answers
    pub answer_delay_ms: u64,
}

impl SimulatorConfig {
    pub fn answer_delay(&self) -> Duration {
        Duration::from_millis(self.answer_delay_ms)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            behavior: "accept".to_string(),
            answer_delay_ms: 500,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
