//! Whitelisting reverse proxy for an OLAP analytics server.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::{Lifecycle, LifecycleState, Shutdown};
pub use routing::{Disposition, RoutePolicy};
