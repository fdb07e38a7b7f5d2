//! Request forwarding.
//!
//! # Responsibilities
//! - Resolve the route for each inbound request
//! - Rewrite the path and build the outbound request
//! - Relay the backend response (status, headers, streamed body)
//!
//! # Data Flow
//! ```text
//! Request → RouteTable::match_path
//!     NoMatch → 404, no outbound call
//!     Match   → strip prefix → upstream URI + headers → client.request
//!         Ok(resp)        → relay as-is
//!         Err / deadline  → 502
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{Uri, Version},
    response::{IntoResponse, Response},
};

use crate::http::request::{request_id, upstream_headers};
use crate::http::response::GatewayError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::Route;

/// Fallback handler: everything that is not a gateway endpoint lands here.
pub async fn forward(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let Some(matched) = state.routes.match_path(&path) else {
        let response = GatewayError::NoRouteMatch(path.clone()).into_response();
        metrics::record_request(method.as_str(), response.status(), "none", start);
        return response;
    };

    let service = matched.route.name();
    let response = match send_upstream(&state, matched.route, matched.path, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    };

    metrics::record_request(method.as_str(), response.status(), service, start);
    response
}

async fn send_upstream(
    state: &AppState,
    route: &Route,
    rewritten_path: &str,
    request: Request,
) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();

    let url = route.upstream_url(rewritten_path, parts.uri.query());
    let uri: Uri = url
        .parse()
        .map_err(|e| GatewayError::Internal(format!("invalid upstream uri {url}: {e}")))?;

    let client_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let mut outbound = axum::http::Request::builder()
        .method(parts.method)
        .uri(uri)
        .version(Version::HTTP_11)
        .body(state.timeouts.idle_body(body))
        .map_err(|e| GatewayError::Internal(format!("failed to build upstream request: {e}")))?;
    *outbound.headers_mut() = upstream_headers(&parts.headers, route.authority(), client_addr);

    tracing::debug!(
        request_id = request_id(&parts.headers).unwrap_or("unknown"),
        service = %route.name(),
        method = %outbound.method(),
        upstream = %outbound.uri(),
        "Proxying request"
    );

    let upstream = tokio::time::timeout(state.timeouts.response, state.client.request(outbound));
    let response = match upstream.await {
        Ok(Ok(response)) => response,
        Ok(Err(source)) => {
            return Err(GatewayError::UpstreamUnavailable {
                service: route.name().to_string(),
                source,
            })
        }
        Err(_) => {
            return Err(GatewayError::UpstreamTimeout {
                service: route.name().to_string(),
                timeout: state.timeouts.response,
            })
        }
    };

    let (parts, body) = response.into_parts();
    Ok(Response::from_parts(parts, state.timeouts.idle_body(body)))
}
