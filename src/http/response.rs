//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Map per-request failures to HTTP status codes and JSON bodies
//! - Keep internal details out of client-facing bodies
//!
//! # Design Decisions
//! - Every per-request failure ends here; none propagate past the handler
//! - Unreachable or slow backends surface as 502 Bad Gateway, no retries
//! - Backend responses themselves are relayed untouched (see `proxy.rs`)

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Per-request gateway failure.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No configured prefix covers the request path.
    #[error("no route for path {0}")]
    NoRouteMatch(String),

    /// Connection refused, DNS failure, reset or protocol error talking to the backend.
    #[error("upstream {service} unavailable: {source}")]
    UpstreamUnavailable {
        service: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// The backend did not produce response headers in time.
    #[error("upstream {service} did not respond within {timeout:?}")]
    UpstreamTimeout { service: String, timeout: Duration },

    /// Anything else; logged, never shown to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::NoRouteMatch(_) => StatusCode::NOT_FOUND,
            GatewayError::UpstreamUnavailable { .. } | GatewayError::UpstreamTimeout { .. } => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = match &self {
            GatewayError::NoRouteMatch(path) => {
                tracing::warn!(path = %path, "No route matched");
                json!({ "error": "no route for path" })
            }
            GatewayError::UpstreamUnavailable { service, .. }
            | GatewayError::UpstreamTimeout { service, .. } => {
                tracing::warn!(service = %service, error = %self, "Upstream error");
                json!({ "error": "upstream unavailable", "service": service })
            }
            GatewayError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error while forwarding");
                json!({ "error": "internal server error" })
            }
        };

        (self.status(), Json(body)).into_response()
    }
}
