//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper connection, limits, drain)
//!     → dispatch.rs (request.rs context, routing policy)
//!     → forward.rs (header rewrite, observers) → proxy.rs → backend
//!       or block.rs (fixed 400)
//!     → response.rs (hop-by-hop stripping, gateway errors)
//!     → Send to client
//! ```

pub mod block;
pub mod dispatch;
pub mod forward;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use block::BlockHandler;
pub use dispatch::{Dispatcher, RequestHandler};
pub use forward::ForwardHandler;
pub use proxy::SingleHostProxy;
pub use request::RequestContext;
pub use server::HttpServer;
