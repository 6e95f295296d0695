//! OS signal handling.
//!
//! A dedicated task waits for the interrupt signal (Ctrl-C / SIGINT) and
//! turns it into a [`Shutdown`] trigger. Nothing else listens for signals.

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Spawn the task that triggers `shutdown` on interrupt.
pub fn spawn_interrupt_listener(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!(
                    subscribers = shutdown.receiver_count(),
                    "Interrupt received, shutting down"
                );
                shutdown.trigger();
            }
            Err(e) => {
                // Without a handler the server keeps running until killed.
                tracing::error!(error = %e, "Failed to install interrupt handler");
            }
        }
    })
}
