//! Client connection bookkeeping.
//!
//! Each accepted socket gets a [`ConnectionGuard`] that lives as long as the
//! hyper connection task. The shared count tells the drain phase how many
//! clients are still being served.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection number, shown as `conn-N` in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Shared count of open client connections.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    open: Arc<AtomicUsize>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection from `peer`; it counts as open until the guard drops.
    pub fn track(&self, peer: SocketAddr) -> ConnectionGuard {
        self.open.fetch_add(1, Ordering::SeqCst);
        let guard = ConnectionGuard {
            open: Arc::clone(&self.open),
            id: ConnectionId::next(),
            peer,
            opened_at: Instant::now(),
        };
        tracing::trace!(connection_id = %guard.id, peer_addr = %peer, "Connection opened");
        guard
    }

    pub fn active_count(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct ConnectionGuard {
    open: Arc<AtomicUsize>,
    id: ConnectionId,
    peer: SocketAddr,
    opened_at: Instant,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(
            connection_id = %self.id,
            peer_addr = %self.peer,
            open_ms = self.opened_at.elapsed().as_millis() as u64,
            "Connection closed"
        );
    }
}
