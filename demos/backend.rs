//! Demo backend service.
//!
//! Stands in for the product, payment and user services the gateway fronts:
//!
//! ```text
//! cargo run --example backend -- --service product-service --port 3001
//! cargo run --example backend -- --service payment-service --port 3002
//! cargo run --example backend -- --service user-service --port 3003
//! cargo run
//! curl http://localhost:3000/api/product-service/products
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use axum::{extract::State, routing::get, Json, Router};
use clap::Parser;
use serde_json::{json, Value};

#[derive(Parser)]
struct Args {
    /// Service name; routes are mounted under /api/<service>.
    #[arg(short, long, default_value = "product-service")]
    service: String,

    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    port: u16,
}

#[derive(Clone)]
struct Service {
    name: String,
    started_at: Instant,
}

fn resource(name: &str) -> (&'static str, Value) {
    match name {
        "payment-service" => (
            "payments",
            json!([
                { "id": "PM-2001", "amount": 45.0, "currency": "USD", "status": "captured" },
                { "id": "PM-2002", "amount": 19.99, "currency": "USD", "status": "pending" }
            ]),
        ),
        "user-service" => (
            "users",
            json!([
                { "id": "U-3001", "name": "Jordan" },
                { "id": "U-3002", "name": "Bipro" }
            ]),
        ),
        _ => (
            "products",
            json!([
                { "id": "P-1001", "name": "Mechanical Keyboard", "price": 89.0 },
                { "id": "P-1002", "name": "USB-C Hub", "price": 34.5 }
            ]),
        ),
    }
}

async fn health(State(service): State<Service>) -> Json<Value> {
    Json(json!({
        "service": service.name,
        "status": "ok",
        "uptime": service.started_at.elapsed().as_secs_f64(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let prefix = format!("/api/{}", args.service);
    let (collection, data) = resource(&args.service);
    let count = data.as_array().map(Vec::len).unwrap_or(0);

    let service = Service {
        name: args.service.clone(),
        started_at: Instant::now(),
    };

    let app = Router::new()
        .route(&format!("{prefix}/health"), get(health))
        .route(
            &format!("{prefix}/{collection}"),
            get(move || {
                let data = data.clone();
                async move { Json(json!({ "count": count, "data": data })) }
            }),
        )
        .with_state(service);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(service = %args.service, address = %addr, "Demo backend listening");
    axum::serve(listener, app).await?;
    Ok(())
}
