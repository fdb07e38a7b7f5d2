//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: health endpoint, then the forwarder as fallback
//! - Wire up middleware (request ID, tracing, optional CORS)
//! - Build the shared upstream client
//! - Serve until the shutdown signal fires, then drain

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    http::Request,
    routing::get,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::health::{self, HEALTH_PATH};
use crate::http::proxy;
use crate::http::request::{request_id, UuidRequestId};
use crate::resilience::UpstreamTimeouts;
use crate::routing::{RouteTable, RouteTableError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub client: Client<HttpConnector, Body>,
    pub timeouts: UpstreamTimeouts,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(routes: RouteTable, timeouts: UpstreamTimeouts) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeouts.connect));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            routes: Arc::new(routes),
            client,
            timeouts,
            started_at: Instant::now(),
        }
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server, compiling the route table from `config`.
    pub fn new(config: GatewayConfig) -> Result<Self, RouteTableError> {
        let routes = RouteTable::from_config(&config)?;
        for route in routes.routes() {
            tracing::info!(prefix = %route.prefix(), target = %route.target(), "Route attached");
        }

        let state = AppState::new(routes, UpstreamTimeouts::from(&config.timeouts));
        let router = Self::build_router(&config, state);

        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route(HEALTH_PATH, get(health::health))
            .fallback(proxy::forward)
            .with_state(state);

        if config.cors.enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id = request_id(req.headers()).unwrap_or("-"),
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    /// The fully layered router; useful for driving the gateway in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires. In-flight requests are drained before returning.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.services.len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn server(services: &[(&str, &str)]) -> HttpServer {
        let mut config = GatewayConfig::default();
        config.services = services
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HttpServer::new(config).unwrap()
    }

    async fn call(router: Router, method: &str, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_reports_targets() {
        let server = server(&[("product-service", "http://127.0.0.1:1")]);
        let (status, headers, body) = call(server.router(), "GET", HEALTH_PATH).await;

        assert_eq!(status, StatusCode::OK);
        assert!(headers.contains_key("x-request-id"));
        assert_eq!(body["service"], "gateway");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["targets"], json!({ "product-service": "http://127.0.0.1:1" }));
        assert!(body["uptimeSeconds"].is_u64());
    }

    #[tokio::test]
    async fn test_unknown_prefix_is_404() {
        let server = server(&[("product-service", "http://127.0.0.1:1")]);
        for uri in ["/api/unknown-service/x", "/", "/api/gateway/other", "/api/product-servicex"] {
            let (status, _, body) = call(server.router(), "GET", uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, json!({ "error": "no route for path" }));
        }
    }

    #[tokio::test]
    async fn test_supplied_request_id_is_echoed() {
        let server = server(&[]);
        let request = Request::builder()
            .uri(HEALTH_PATH)
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_rejects_ambiguous_routes() {
        let mut config = GatewayConfig::default();
        config.services.insert("user".into(), "http://127.0.0.1:1".into());
        assert!(matches!(
            HttpServer::new(config),
            Err(RouteTableError::OverlappingPrefix { .. })
        ));
    }
}
