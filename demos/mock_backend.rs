//! Tiny backend for trying the balancer locally.
//!
//! `cargo run --example mock_backend -- 8081` then point an endpoint at
//! `http://127.0.0.1:8081`.

use std::net::SocketAddr;

use axum::{http::StatusCode, routing::get, Router};

#[tokio::main]
async fn main() {
    let port: u16 = std::env::args()
        .nth(1)
        .and_then(|p| p.parse().ok())
        .unwrap_or(8081);

    let app = Router::new()
        .route("/", get(move || async move { format!("Hello from backend {}", port) }))
        .route("/status", get(|| async { "ok" }))
        .route("/flaky", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "try again") }));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Mock backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
