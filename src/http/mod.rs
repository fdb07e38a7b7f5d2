//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → GET /api/gateway/health → health
//!     → anything else → proxy.rs
//!         → routing (match + rewrite)
//!         → request.rs (upstream headers)
//!         → backend via pooled client
//!         → response.rs (error mapping) or relayed backend response
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::GatewayError;
pub use server::{AppState, HttpServer};
