//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Backend the proxy forwards to.
    pub upstream: UpstreamConfig,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Whitelist gate.
    pub access: AccessConfig,

    /// Logging and body auditing.
    pub logging: LoggingConfig,

    /// Shutdown behaviour.
    pub lifecycle: LifecycleConfig,
}

impl ProxyConfig {
    /// Whether request bodies are audited.
    pub fn log_request(&self) -> bool {
        self.logging.log_request || self.logging.log_all
    }

    /// Whether response bodies are audited.
    pub fn log_response(&self) -> bool {
        self.logging.log_response || self.logging.log_all
    }

    /// Whether every path is forwarded.
    pub fn write_enabled(&self) -> bool {
        self.access.enable_write
    }
}

/// Backend (OLAP server) configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Absolute URL of the backend, e.g. `http://127.0.0.1:7777`.
    pub target_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            target_url: "http://127.0.0.1:7777".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address. A leading `:` (e.g. `:8080`) binds all interfaces.
    pub bind_address: String,
}

impl ListenerConfig {
    /// Bind address in a form `TcpListener::bind` accepts.
    pub fn resolved_address(&self) -> String {
        if self.bind_address.starts_with(':') {
            format!("0.0.0.0{}", self.bind_address)
        } else {
            self.bind_address.clone()
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: ":8080".to_string(),
        }
    }
}

/// Access control.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AccessConfig {
    /// Forward every path, bypassing the whitelist.
    pub enable_write: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Optional file that receives a copy of every log line.
    pub log_file: Option<String>,

    /// Audit client request bodies.
    pub log_request: bool,

    /// Audit backend response bodies.
    pub log_response: bool,

    /// Shorthand for both `log_request` and `log_response`.
    pub log_all: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            log_file: None,
            log_request: false,
            log_response: false,
            log_all: false,
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Deadline for in-flight requests after an interrupt.
    pub shutdown_timeout_secs: u64,
}

impl LifecycleConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: 30,
        }
    }
}

/// Fixed HTTP server limits. Deliberately absent from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerTimeouts {
    /// Time allowed to read request headers.
    pub read: Duration,
    /// Time allowed to produce the response.
    pub write: Duration,
    /// Connections with no traffic for this long are closed (see `net::idle`).
    pub idle: Duration,
    /// Upper bound on the request header block.
    pub max_header_bytes: usize,
}

impl Default for ServerTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(15),
            write: Duration::from_secs(15),
            idle: Duration::from_secs(60),
            max_header_bytes: 1 << 20,
        }
    }
}
