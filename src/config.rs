//! # Monitor Configuration
//!
//! A single TOML file describes where printer messages come from, how the
//! monitor supervises that stream, and whether the read-only web API runs.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [printer]
//! name = "AnkerMake M5"
//!
//! [source]
//! kind = "websocket"          # or "tcp" / "file" for relays and recorded traces
//! host = "ws://127.0.0.1:4470"
//!
//! [monitor]
//! heartbeat_timeout_secs = 30
//! restart_backoff_secs = 5
//! poll_interval_secs = 5
//! # Defaults to ankerctl's status API on the websocket host.
//! # status_url = "http://127.0.0.1:4470/api/ankerctl/status"
//! # status_document = "/var/lib/ankerctl/status.json"
//!
//! [web]
//! enabled = true
//! bind = "0.0.0.0:3000"
//! ```
//!
//! Every section and key is optional; see the `default_*` functions below.

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub printer: PrinterConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub web: WebConfig,
}

/// Identity of the monitored printer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrinterConfig {
    #[serde(default = "default_printer_name")]
    pub name: String,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            name: default_printer_name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// ankerctl's `/ws/mqtt` websocket.
    WebSocket,
    /// Newline-delimited JSON over plain TCP.
    Tcp,
    /// Recorded newline-delimited JSON trace.
    File,
}

/// Where printer messages are read from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,
    /// ankerctl base URL, for `websocket`.
    #[serde(default = "default_source_host")]
    pub host: Option<String>,
    /// `host:port`, for `tcp`.
    #[serde(default)]
    pub address: Option<String>,
    /// Trace file, for `file`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            host: default_source_host(),
            address: None,
            path: None,
        }
    }
}

/// Liveness and supervision settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    #[serde(default = "default_heartbeat_timeout_secs")]
    pub heartbeat_timeout_secs: u64,
    #[serde(default = "default_restart_backoff_secs")]
    pub restart_backoff_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// HTTP status endpoint. Takes precedence over `status_document`.
    #[serde(default)]
    pub status_url: Option<String>,
    #[serde(default)]
    pub status_document: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            heartbeat_timeout_secs: default_heartbeat_timeout_secs(),
            restart_backoff_secs: default_restart_backoff_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            status_url: None,
            status_document: None,
        }
    }
}

/// Read-only HTTP API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebConfig {
    #[serde(default = "default_web_enabled")]
    pub enabled: bool,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: default_web_enabled(),
            bind: default_bind(),
        }
    }
}

fn default_printer_name() -> String {
    "AnkerMake".to_string()
}
fn default_source_kind() -> SourceKind {
    SourceKind::WebSocket
}
fn default_source_host() -> Option<String> {
    Some("ws://127.0.0.1:4470".to_string())
}
fn default_heartbeat_timeout_secs() -> u64 {
    30
}
fn default_restart_backoff_secs() -> u64 {
    5
}
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_web_enabled() -> bool {
    true
}
fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

impl Config {
    /// Reject settings the monitor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.heartbeat_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "monitor.heartbeat_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.monitor.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "monitor.poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.monitor.status_url.is_some() && self.monitor.status_document.is_some() {
            return Err(ConfigError::Invalid(
                "monitor.status_url and monitor.status_document are mutually exclusive".to_string(),
            ));
        }
        match self.source.kind {
            SourceKind::WebSocket if self.source.host.as_deref().unwrap_or("").is_empty() => Err(
                ConfigError::Invalid("source.host is required for a websocket source".to_string()),
            ),
            SourceKind::Tcp if self.source.address.as_deref().unwrap_or("").is_empty() => Err(
                ConfigError::Invalid("source.address is required for a tcp source".to_string()),
            ),
            SourceKind::File if self.source.path.is_none() => Err(ConfigError::Invalid(
                "source.path is required for a file source".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Parse and validate a configuration from TOML text.
pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}
