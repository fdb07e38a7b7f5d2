//! API gateway
//!
//! A single front-end process that forwards requests under `/api/<service>`
//! to independent backend services.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────┐
//!                     │                    GATEWAY                    │
//!   Client Request    │  ┌──────────┐    ┌──────────┐    ┌─────────┐  │
//!   ──────────────────┼─▶│  server  │───▶│ routing  │───▶│  proxy  │──┼──▶ Backend
//!                     │  │ (axum)   │    │  table   │    │ forward │  │    Service
//!   Client Response   │  └────┬─────┘    └──────────┘    └────┬────┘  │
//!   ◀─────────────────┼───────┴─────────────────────────────────┘     │
//!                     │                                               │
//!                     │  health: GET /api/gateway/health (no I/O)     │
//!                     │  config · lifecycle · observability · timeouts│
//!                     └───────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use api_gateway::lifecycle::{signals, startup, Shutdown};
use api_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Path-prefix API gateway", long_about = None)]
struct Args {
    /// TOML config file; built-in defaults are used when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = startup::load(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        services = config.services.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse::<SocketAddr>()?);
    }

    let (server, listener) = startup::prepare(config).await.map_err(|e| {
        tracing::error!(error = %e, "Startup failed");
        e
    })?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
