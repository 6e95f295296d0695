//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers produce:
//!     → logging.rs (structured events, stdout + optional file)
//!     → observers.rs (request/response body audit records)
//!
//! Every event inside a request carries request_id and session from the
//! request span.
//! ```

pub mod logging;
pub mod observers;

pub use observers::{RequestObserver, ResponseObserver};
