//! Timeout enforcement for upstream calls.
//!
//! # Responsibilities
//! - Bound connection establishment (connector setting)
//! - Bound the exchange up to backend response headers, request upload included
//! - Bound silence between body frames in both directions
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the future cancels the call
//! - Timeout errors are distinct from other errors but map to the same 502
//! - Response bodies only get an idle timeout, so long downloads are not cut off
//! - Request bodies also get the idle timeout, but must finish uploading within
//!   the response deadline since the backend answers after reading them

use std::time::Duration;

use axum::{
    body::{Body, Bytes, HttpBody},
    BoxError,
};
use tower_http::timeout::TimeoutBody;

use crate::config::TimeoutConfig;

/// Resolved timeout settings shared by every forwarded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub connect: Duration,
    pub response: Duration,
    pub idle: Duration,
}

impl UpstreamTimeouts {
    /// Wrap a body so that it errors if no frame arrives within `idle`.
    ///
    /// Already finished bodies become `Body::empty()` so the connection
    /// still sees them as empty and does not fall back to chunked framing.
    pub fn idle_body<B>(&self, body: B) -> Body
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        if body.is_end_stream() {
            Body::empty()
        } else {
            Body::new(TimeoutBody::new(self.idle, body))
        }
    }
}

impl From<&TimeoutConfig> for UpstreamTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_secs),
            response: Duration::from_secs(config.request_secs),
            idle: Duration::from_secs(config.idle_secs),
        }
    }
}

impl Default for UpstreamTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}
