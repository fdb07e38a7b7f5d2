//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (connect, response-head and body-idle deadlines)
//!     → On failure: 502 to the client, no retry
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries or circuit breaking: a failed call fails the request

pub mod timeouts;

pub use timeouts::UpstreamTimeouts;
