//! Error types for the proxy.
//!
//! Only startup can fail the process. Errors on the request path are logged
//! where they happen and turned into responses.

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::proxy::ProxyBuildError;

/// Fatal errors raised while starting or running the server.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The listener could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend client could not be built.
    #[error("backend setup failed: {0}")]
    Backend(#[from] ProxyBuildError),

    /// Log file or other I/O setup failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using ProxyError.
pub type Result<T> = std::result::Result<T, ProxyError>;
