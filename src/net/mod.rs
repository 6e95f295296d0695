//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → http/server.rs (accept loop)
//!     → connection.rs (id, open-connection count)
//!     → idle.rs (close after the idle period without traffic)
//!     → Hand off to HTTP layer
//! ```

pub mod connection;
pub mod idle;
