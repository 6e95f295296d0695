//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path (percent-decoded)
//!     → router.rs (RoutePolicy::resolve)
//!     → matcher.rs (exact or prefix match against whitelist.rs)
//!     → Return: Forward or Block
//! ```
//!
//! # Design Decisions
//! - Whitelist compiled at startup, immutable at runtime
//! - No normalization of case or trailing slashes
//! - Deterministic: same input always resolves the same way

pub mod matcher;
pub mod router;
pub mod whitelist;

pub use router::{Disposition, RoutePolicy};
