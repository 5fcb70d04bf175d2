//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and proxy handlers
//! - Wire up middleware (request ID, tracing, outer deadline)
//! - Translate inbound requests into `ProxyRequest`
//! - Map forwarder failures onto gateway status codes

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Instrument;

use crate::config::BalancerConfig;
use crate::forwarder::{ForwardError, ForwarderSettings, RequestForwarder};
use crate::http::client::{HyperUpstreamClient, UpstreamClient};
use crate::http::health::get_health;
use crate::http::{ProxyRequest, MAX_BODY_BYTES};
use crate::load_balancer::{EndpointError, EndpointSelector};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: RequestForwarder,
}

/// HTTP server for the balancer.
pub struct HttpServer {
    router: Router,
    config: BalancerConfig,
    forwarder: RequestForwarder,
}

impl HttpServer {
    /// Build the selector, client and forwarder from configuration.
    pub fn new(config: BalancerConfig) -> Result<Self, EndpointError> {
        let client: Arc<dyn UpstreamClient> = Arc::new(HyperUpstreamClient::new());
        Self::with_client(config, client)
    }

    /// Same as [`new`](Self::new) with a custom upstream client.
    pub fn with_client(
        config: BalancerConfig,
        client: Arc<dyn UpstreamClient>,
    ) -> Result<Self, EndpointError> {
        let selector = Arc::new(EndpointSelector::from_urls(
            &config.endpoints,
            config.health_check.thresholds(),
        )?);
        let forwarder = RequestForwarder::new(selector, client, ForwarderSettings::from_config(&config));

        let state = AppState {
            forwarder: forwarder.clone(),
        };
        let router = Self::build_router(&config, state);

        Ok(Self {
            router,
            config,
            forwarder,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BalancerConfig, state: AppState) -> Router {
        let request_timeout = Duration::from_secs(config.listener.request_timeout_secs);

        Router::new()
            .route("/health", get(get_health))
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(request_timeout)),
            )
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoints = self.config.endpoints.len(),
            max_retries = self.forwarder.settings().max_retries,
            performance_routing = self.forwarder.settings().performance_routing,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Router clone, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Main proxy handler.
/// Buffers the body, forwards through the pool, maps terminal failures.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejecting request body");
            return error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("request body exceeds {} bytes", MAX_BODY_BYTES),
            );
        }
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let proxy_request = ProxyRequest {
        method: parts.method,
        path_and_query,
        headers: parts.headers,
        body,
    };

    let span = tracing::info_span!(
        "forward",
        request_id = %request_id,
        method = %proxy_request.method,
        path = %proxy_request.path_and_query,
    );

    match state.forwarder.forward(&proxy_request).instrument(span).await {
        Ok(response) => response.into_response(),
        Err(e @ ForwardError::NoEndpointsAvailable) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
        Err(e @ ForwardError::AllAttemptsExhausted { .. }) => {
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let body = json!({
        "error": status.canonical_reason().unwrap_or("Error"),
        "message": message,
    });
    (status, Json(body)).into_response()
}
