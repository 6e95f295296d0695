//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener for a validated configuration
//! - Build the server and wire the interrupt listener to it
//! - Block until the server has drained and stopped
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subscribe to shutdown before the signal task exists, so no trigger is lost

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};

/// Run the proxy until interrupted.
pub async fn run(config: ProxyConfig) -> Result<()> {
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_interrupt_listener(shutdown);

    let listener = bind(&config).await?;
    serve(config, listener, server_shutdown).await
}

/// Bind the configured listen address.
pub async fn bind(config: &ProxyConfig) -> Result<TcpListener> {
    let address = config.listener.resolved_address();
    TcpListener::bind(&address)
        .await
        .map_err(|source| ProxyError::Bind { address, source })
}

/// Serve on an already bound listener until `shutdown` fires.
pub async fn serve(
    config: ProxyConfig,
    listener: TcpListener,
    shutdown: tokio::sync::broadcast::Receiver<()>,
) -> Result<()> {
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown).await?;
    Ok(())
}
