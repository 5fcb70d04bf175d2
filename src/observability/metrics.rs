//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_requests_total` (counter): forward calls by outcome
//! - `balancer_request_duration_seconds` (histogram): end-to-end forward latency
//! - `balancer_upstream_attempts_total` (counter): attempts by endpoint and result
//! - `balancer_upstream_duration_seconds` (histogram): per-attempt latency by endpoint
//! - `balancer_retries_total` (counter): retries scheduled
//! - `balancer_endpoint_healthy` (gauge): 1=healthy, 0=unhealthy

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_forward(outcome: &'static str, elapsed: Duration) {
    counter!("balancer_requests_total", "outcome" => outcome).increment(1);
    histogram!("balancer_request_duration_seconds", "outcome" => outcome).record(elapsed.as_secs_f64());
}

pub fn record_attempt(endpoint: &str, result: &'static str, elapsed: Duration) {
    counter!(
        "balancer_upstream_attempts_total",
        "endpoint" => endpoint.to_string(),
        "result" => result
    )
    .increment(1);
    histogram!("balancer_upstream_duration_seconds", "endpoint" => endpoint.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_retry() {
    counter!("balancer_retries_total").increment(1);
}

pub fn record_endpoint_health(endpoint: &str, healthy: bool) {
    gauge!("balancer_endpoint_healthy", "endpoint" => endpoint.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exporter_port_in_use_is_an_error() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();

        assert!(init_metrics(addr).is_err());
    }
}
