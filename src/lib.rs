//! Minimal API gateway library.
//!
//! Forwards `/api/<service>/**` to the configured backend with the prefix
//! stripped, and answers `GET /api/gateway/health` itself.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
