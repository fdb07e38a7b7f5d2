//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Per request (http/server.rs):
//!     SetRequestId → TraceLayer span (request_id) → PropagateRequestId
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through logs, the upstream request and the response
//! - Metrics are off by default; recording without a recorder is free

pub mod logging;
pub mod metrics;
