//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Target URL must be absolute, http(s), with a host
//! - Bind address must carry a port
//! - Value ranges (shutdown timeout > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target url '{url}' is not a valid absolute URL: {reason}")]
    InvalidTargetUrl { url: String, reason: String },

    #[error("target url '{url}' must use http or https, got '{scheme}'")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("target url '{url}' has no host")]
    MissingHost { url: String },

    #[error("bind address '{address}' must be of the form [host]:port")]
    InvalidBindAddress { address: String },

    #[error("shutdown timeout must be greater than zero")]
    ZeroShutdownTimeout,
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_target_url(&config.upstream.target_url) {
        errors.push(e);
    }

    if !has_port(&config.listener.resolved_address()) {
        errors.push(ValidationError::InvalidBindAddress {
            address: config.listener.bind_address.clone(),
        });
    }

    if config.lifecycle.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::ZeroShutdownTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse and check the backend URL.
pub fn validate_target_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidTargetUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::UnsupportedScheme {
                url: raw.to_string(),
                scheme: other.to_string(),
            })
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::MissingHost {
            url: raw.to_string(),
        });
    }

    Ok(url)
}

fn has_port(address: &str) -> bool {
    address
        .rsplit_once(':')
        .map(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
        .unwrap_or(false)
}
