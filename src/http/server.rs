//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatcher as the only handler
//! - Configure HTTP/1.1 and HTTP/2 support with fixed server limits
//! - Accept connections, one task per connection
//! - Stop accepting on shutdown and drain in-flight requests

use axum::{extract::ConnectInfo, http::Request, Router};
use hyper::body::Incoming;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::{conn::auto, graceful::GracefulShutdown},
    service::TowerToHyperService,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ProxyConfig, ServerTimeouts};
use crate::http::dispatch::{dispatch_handler, Dispatcher};
use crate::http::proxy::ProxyBuildError;
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::net::connection::ConnectionTracker;
use crate::net::idle::IdleTimeout;

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
    timeouts: ServerTimeouts,
    lifecycle: Lifecycle,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyBuildError> {
        let config = Arc::new(config);
        let timeouts = ServerTimeouts::default();
        let dispatcher = Arc::new(Dispatcher::from_config(config.clone())?);
        tracing::debug!(
            whitelist_entries = dispatcher.policy().len(),
            write_enabled = config.write_enabled(),
            "Route policy compiled"
        );
        let router = Self::build_router(dispatcher, &timeouts);

        Ok(Self {
            router,
            config,
            timeouts,
            lifecycle: Lifecycle::new(),
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(dispatcher: Arc<Dispatcher>, timeouts: &ServerTimeouts) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(dispatcher)
            .layer(TimeoutLayer::new(timeouts.write))
            .layer(TraceLayer::new_for_http())
    }

    /// Handle for observing lifecycle transitions.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    /// Run the server until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;

        let mut builder = auto::Builder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .keep_alive(true)
            .header_read_timeout(self.timeouts.read)
            .max_buf_size(self.timeouts.max_header_bytes);

        let graceful = GracefulShutdown::new();
        let tracker = ConnectionTracker::new();

        self.lifecycle.set(LifecycleState::Listening);
        tracing::info!(
            address = %addr,
            target = %self.config.upstream.target_url,
            write_enabled = self.config.write_enabled(),
            "HTTP server listening"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to accept connection");
                            tokio::time::sleep(Duration::from_millis(100)).await;
                            continue;
                        }
                    };

                    let guard = tracker.track(peer);
                    let service = self.router.clone().map_request(move |mut req: Request<Incoming>| {
                        req.extensions_mut().insert(ConnectInfo(peer));
                        req
                    });
                    let conn = builder.serve_connection_with_upgrades(
                        TokioIo::new(IdleTimeout::new(stream, self.timeouts.idle)),
                        TowerToHyperService::new(service),
                    );
                    let conn = graceful.watch(conn.into_owned());

                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            tracing::debug!(
                                connection_id = %guard.id(),
                                peer_addr = %guard.peer(),
                                error = %e,
                                "Connection closed with error"
                            );
                        }
                        drop(guard);
                    });
                }
                _ = shutdown.recv() => {
                    break;
                }
            }
        }

        // No new connections from here on.
        drop(listener);
        self.lifecycle.set(LifecycleState::Draining);
        tracing::info!(
            active_connections = tracker.active_count(),
            "Shutdown signal received, draining connections"
        );

        let deadline = self.config.lifecycle.shutdown_timeout();
        match tokio::time::timeout(deadline, graceful.shutdown()).await {
            Ok(()) => tracing::info!("All connections drained"),
            Err(_) => tracing::error!(
                timeout_secs = deadline.as_secs(),
                remaining = tracker.active_count(),
                "HTTP server shutdown timed out"
            ),
        }

        self.lifecycle.set(LifecycleState::Stopped);
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
