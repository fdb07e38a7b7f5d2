//! Failure injection tests for the gateway.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use axum::{http::StatusCode, routing::get, Router};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

mod common;

#[tokio::test]
async fn test_unknown_service_is_404_without_upstream_call() {
    let (backend_addr, hits) = common::start_echo_backend().await;
    let gateway = common::start_gateway(common::config_with(&[(
        "product-service",
        format!("http://{backend_addr}"),
    )]))
    .await;
    let client = common::client();

    for path in ["/api/unknown-service/x", "/api/product-servicex/y", "/other"] {
        let res = client.get(gateway.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "no route for path" }));
    }

    assert_eq!(hits.load(Ordering::SeqCst), 0, "no backend should be contacted");

    gateway.stop();
}

#[tokio::test]
async fn test_backend_not_listening_is_502() {
    let dead = common::unused_addr().await;
    let gateway = common::start_gateway(common::config_with(&[(
        "payment-service",
        format!("http://{dead}"),
    )]))
    .await;

    let start = Instant::now();
    let res = common::client()
        .get(gateway.url("/api/payment-service/payments"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(start.elapsed() < Duration::from_secs(5));
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "error": "upstream unavailable", "service": "payment-service" })
    );

    gateway.stop();
}

#[tokio::test]
async fn test_unresolvable_host_is_502() {
    let gateway = common::start_gateway(common::config_with(&[(
        "ghost",
        "http://ghost.invalid:8080".to_string(),
    )]))
    .await;

    let res = common::client()
        .get(gateway.url("/api/ghost/anything"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["service"], "ghost");

    gateway.stop();
}

#[tokio::test]
async fn test_slow_backend_times_out_with_502() {
    let backend = Router::new().route(
        "/hang",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            "too late"
        }),
    );
    let backend_addr = common::start_backend(backend).await;

    let mut config = common::config_with(&[("user-service", format!("http://{backend_addr}"))]);
    config.timeouts.request_secs = 1;
    let gateway = common::start_gateway(config).await;

    let start = Instant::now();
    let res = common::client()
        .get(gateway.url("/api/user-service/hang"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(
        start.elapsed() < Duration::from_secs(4),
        "gateway took {:?} to give up",
        start.elapsed()
    );

    gateway.stop();
}

#[tokio::test]
async fn test_health_is_ok_with_every_backend_down() {
    let dead_a = common::unused_addr().await;
    let dead_b = common::unused_addr().await;
    let gateway = common::start_gateway(common::config_with(&[
        ("product-service", format!("http://{dead_a}")),
        ("user-service", format!("http://{dead_b}")),
    ]))
    .await;

    let res = common::client()
        .get(gateway.url("/api/gateway/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["service"], "gateway");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["targets"]["product-service"], format!("http://{dead_a}"));
    assert_eq!(body["targets"]["user-service"], format!("http://{dead_b}"));

    gateway.stop();
}

#[tokio::test]
async fn test_gateway_survives_upstream_failures() {
    let dead = common::unused_addr().await;
    let (live, _) = common::start_echo_backend().await;
    let gateway = common::start_gateway(common::config_with(&[
        ("dead", format!("http://{dead}")),
        ("live", format!("http://{live}")),
    ]))
    .await;
    let client = common::client();

    for _ in 0..5 {
        let res = client.get(gateway.url("/api/dead/x")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }
    let res = client.get(gateway.url("/api/live/x")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    gateway.stop();
}

/// Read from `stream` until a full request head has arrived.
async fn read_request_head(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(())
}

#[tokio::test]
async fn test_client_disconnect_cancels_upstream() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend_addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();

    // Accepts one request, never answers, and reports when the gateway hangs up.
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request_head(&mut stream).await.unwrap();
        let mut chunk = [0u8; 256];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        let _ = closed_tx.send(Instant::now());
    });

    let gateway = common::start_gateway(common::config_with(&[(
        "product-service",
        format!("http://{backend_addr}"),
    )]))
    .await;

    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();
    let res = client
        .get(gateway.url("/api/product-service/slow"))
        .send()
        .await;
    assert!(res.is_err(), "client should give up first");
    let gave_up = Instant::now();

    let closed_at = tokio::time::timeout(Duration::from_millis(1500), closed_rx)
        .await
        .expect("upstream connection was not closed after the client left")
        .unwrap();
    assert!(closed_at.duration_since(gave_up) < Duration::from_millis(1500));

    gateway.stop();
}

#[tokio::test]
async fn test_stalled_response_body_is_aborted() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend_addr = listener.local_addr().unwrap();

    // Promises 100 bytes, sends 10, then goes silent with the socket open.
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request_head(&mut stream).await.unwrap();
        stream
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n0123456789")
            .await
            .unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    let mut config = common::config_with(&[("user-service", format!("http://{backend_addr}"))]);
    config.timeouts.idle_secs = 1;
    let gateway = common::start_gateway(config).await;

    let start = Instant::now();
    let res = common::client()
        .get(gateway.url("/api/user-service/export"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = tokio::time::timeout(Duration::from_secs(5), res.bytes())
        .await
        .expect("body read hung past the idle timeout");
    assert!(body.is_err(), "truncated body must surface as an error");
    assert!(
        start.elapsed() < Duration::from_secs(3),
        "stalled body took {:?} to abort",
        start.elapsed()
    );

    gateway.stop();
}
