//! Request identification and upstream header preparation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Build the header set sent to the backend
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing and propagated upstream
//! - `Host` is rewritten to the backend authority ("change origin")
//! - Connection-scoped (hop-by-hop) headers stay on their own hop
//! - Client address appended to `X-Forwarded-For`, never replacing it

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::{
    header::{
        CONNECTION, HOST, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION, TE, TRAILER, TRANSFER_ENCODING,
        UPGRADE,
    },
    uri::Authority,
    HeaderMap, HeaderName, HeaderValue, Request,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");
const PROXY_CONNECTION: HeaderName = HeaderName::from_static("proxy-connection");

/// Generates `x-request-id` values from random UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

/// Request ID of an inbound request, if set.
pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    [
        CONNECTION,
        KEEP_ALIVE,
        PROXY_CONNECTION,
        PROXY_AUTHENTICATE,
        PROXY_AUTHORIZATION,
        TE,
        TRAILER,
        TRANSFER_ENCODING,
        UPGRADE,
    ]
    .contains(name)
}

/// Headers for the outbound request: everything the client sent except
/// `Host` and hop-by-hop headers, plus `Host` set to `authority` and the
/// `X-Forwarded-*` trio.
pub fn upstream_headers(
    inbound: &HeaderMap,
    authority: &Authority,
    client_addr: Option<SocketAddr>,
) -> HeaderMap {
    // Headers named in `Connection` are scoped to this hop as well.
    let connection_scoped: HashSet<HeaderName> = inbound
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    let mut headers = HeaderMap::with_capacity(inbound.len() + 3);
    for (name, value) in inbound {
        if name == HOST || is_hop_by_hop(name) || connection_scoped.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Ok(host) = HeaderValue::from_str(authority.as_str()) {
        headers.insert(HOST, host);
    }

    if let Some(addr) = client_addr {
        let prior: Vec<&str> = inbound
            .get_all(&X_FORWARDED_FOR)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        let chain = if prior.is_empty() {
            addr.ip().to_string()
        } else {
            format!("{}, {}", prior.join(", "), addr.ip())
        };
        if let Ok(value) = HeaderValue::from_str(&chain) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    if !headers.contains_key(&X_FORWARDED_HOST) {
        if let Some(host) = inbound.get(HOST) {
            headers.insert(X_FORWARDED_HOST, host.clone());
        }
    }

    if !headers.contains_key(&X_FORWARDED_PROTO) {
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    }

    headers
}
