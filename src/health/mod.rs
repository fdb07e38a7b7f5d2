//! Gateway health reporting.
//!
//! # Responsibilities
//! - Report the gateway's own liveness
//! - Expose the static target map for operators
//!
//! # Design Decisions
//! - No I/O: backends are never probed, so this endpoint cannot fail
//! - Uptime is measured from the `Instant` captured when the server was built

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::routing::RouteTable;

/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/api/gateway/health";

/// Body of `GET /api/gateway/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub service: String,
    pub status: String,
    pub targets: BTreeMap<String, String>,
    pub uptime_seconds: u64,
}

impl HealthReport {
    pub fn new(routes: &RouteTable, started_at: Instant) -> Self {
        Self {
            service: "gateway".to_string(),
            status: "ok".to_string(),
            targets: routes.targets(),
            uptime_seconds: started_at.elapsed().as_secs(),
        }
    }
}

/// `GET /api/gateway/health`
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport::new(&state.routes, state.started_at))
}
