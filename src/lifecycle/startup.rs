//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Compile the route table
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and exits non-zero
//! - Listener binds last (traffic only when routes are ready)

use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, GatewayConfig};
use crate::http::HttpServer;
use crate::routing::RouteTableError;

/// Fatal startup failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<RouteTableError> for StartupError {
    fn from(e: RouteTableError) -> Self {
        StartupError::Config(ConfigError::Routes(e))
    }
}

/// Read configuration from `path` (or defaults) and the environment.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, StartupError> {
    Ok(load_config(path)?)
}

/// Compile routes and bind the listener for an already loaded config.
pub async fn prepare(config: GatewayConfig) -> Result<(HttpServer, TcpListener), StartupError> {
    let address = config.listener.bind_address();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    Ok((server, listener))
}
