//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Bind listener → Listening
//!
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs + http/server.rs):
//!     Trigger received → Stop accepting → Drain connections → Stopped
//! ```
//!
//! # Design Decisions
//! - States are published on a watch channel so anyone can observe them
//! - Only the interrupt moves the server out of Listening
//! - Shutdown has a deadline; overrunning it is logged, not fatal

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;

use std::sync::Arc;
use tokio::sync::watch;

/// Server lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Starting,
    Listening,
    Draining,
    Stopped,
}

/// Shared publisher of [`LifecycleState`].
#[derive(Debug, Clone)]
pub struct Lifecycle {
    tx: Arc<watch::Sender<LifecycleState>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Starting);
        Self { tx: Arc::new(tx) }
    }

    /// Move to `state`, logging the transition.
    pub fn set(&self, state: LifecycleState) {
        let previous = self.tx.send_replace(state);
        tracing::debug!(from = ?previous, to = ?state, "Lifecycle transition");
    }

    pub fn current(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }

    /// Wait until the state is at least `target`.
    pub async fn wait_for(&self, target: LifecycleState) {
        let mut rx = self.subscribe();
        // The sender lives in self, so the channel cannot close here.
        let _ = rx.wait_for(|state| *state >= target).await;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
