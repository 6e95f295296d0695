//! Command-line flags.
//!
//! Flags override values from the optional config file, which in turn
//! override the built-in defaults.

use clap::Parser;
use std::path::PathBuf;

use crate::config::loader::{finalize, read_config};
use crate::config::{ConfigError, LogFormat, ProxyConfig};

/// Whitelisting reverse proxy for an OLAP server.
#[derive(Parser, Debug, Default)]
#[command(name = "xdjprox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Optional TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// OLAP server address [default: http://127.0.0.1:7777]
    #[arg(short = 'o', value_name = "URL")]
    pub target_url: Option<String>,

    /// Local listen address [default: :8080]
    #[arg(short = 'i', value_name = "ADDR")]
    pub listen: Option<String>,

    /// Enable write requests (forward every path)
    #[arg(short = 'w')]
    pub enable_write: bool,

    /// Log client http requests
    #[arg(long = "log-req")]
    pub log_request: bool,

    /// Log OLAP http responses
    #[arg(long = "log-res")]
    pub log_response: bool,

    /// Log requests and responses
    #[arg(long = "log-all")]
    pub log_all: bool,

    /// Append log output to this file as well as stdout
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,

    /// Log output format: json, pretty or compact
    #[arg(long = "log-format", value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Build the validated configuration: defaults, then file, then flags.
    pub fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => read_config(path)?,
            None => ProxyConfig::default(),
        };
        finalize(self.apply(base))
    }

    /// Overlay the flags that were given onto `config`.
    pub fn apply(self, mut config: ProxyConfig) -> ProxyConfig {
        if let Some(url) = self.target_url {
            config.upstream.target_url = url;
        }
        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if self.enable_write {
            config.access.enable_write = true;
        }
        if self.log_all {
            config.logging.log_all = true;
        }
        if self.log_request || config.logging.log_all {
            config.logging.log_request = true;
        }
        if self.log_response || config.logging.log_all {
            config.logging.log_response = true;
        }
        if let Some(file) = self.log_file {
            config.logging.log_file = Some(file);
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        config
    }
}
