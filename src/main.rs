//! xdjprox
//!
//! Reverse proxy in front of an OLAP server. Forwards a fixed whitelist of
//! read-only API calls and rejects everything else, unless write mode is on.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http/server ──▶ http/dispatch ──▶ routing (whitelist)
//!                                      │
//!                    ┌─────────────────┴──────────────────┐
//!                    ▼                                    ▼
//!              http/forward                          http/block
//!        (headers, observers)                     (400, code 1009)
//!                    │
//!                    ▼
//!              http/proxy ─────────────────────────────▶ OLAP server
//!
//!     lifecycle: SIGINT ──▶ Shutdown ──▶ drain ──▶ Stopped
//! ```

use clap::Parser;

use xdjprox::cli::Cli;
use xdjprox::lifecycle::startup;
use xdjprox::observability::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    // Flushes and closes the log file when dropped at the end of main.
    let _log_guard = init_logging(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        target_url = %config.upstream.target_url,
        bind_address = %config.listener.bind_address,
        enable_write = config.write_enabled(),
        log_request = config.log_request(),
        log_response = config.log_response(),
        log_file = ?config.logging.log_file,
        "xdjprox starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
