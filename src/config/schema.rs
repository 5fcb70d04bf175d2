//! Configuration schema definitions.
//!
//! The core routing fields are required: a config file missing any of them
//! is rejected at startup. Listener and observability sections are optional.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::health::state::HealthThresholds;

/// Root configuration for the balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BalancerConfig {
    /// Backend base URLs, in round-robin order.
    pub endpoints: Vec<String>,

    /// Per-attempt upstream timeout in milliseconds.
    pub timeout_ms: u64,

    /// Maximum attempts per inbound request.
    pub max_retries: u32,

    /// Passive health settings.
    pub health_check: HealthCheckConfig,

    /// Prefer low-latency endpoints once latency data exists.
    pub performance_based_routing: bool,

    /// Listener settings.
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl BalancerConfig {
    /// Minimal config for the given endpoints, with the usual defaults.
    pub fn with_endpoints<S: Into<String>>(endpoints: impl IntoIterator<Item = S>) -> Self {
        Self {
            endpoints: endpoints.into_iter().map(Into::into).collect(),
            timeout_ms: 5_000,
            max_retries: 3,
            health_check: HealthCheckConfig::default(),
            performance_based_routing: false,
            listener: ListenerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Passive health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthCheckConfig {
    /// Consecutive failures before an endpoint is skipped.
    pub fail_threshold: u32,

    /// How long an unhealthy endpoint is skipped after its last failure, in milliseconds.
    pub recovery_time_ms: u64,
}

impl HealthCheckConfig {
    pub fn thresholds(&self) -> HealthThresholds {
        HealthThresholds::new(self.fail_threshold, Duration::from_millis(self.recovery_time_ms))
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            fail_threshold: 3,
            recovery_time_ms: 30_000,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Outer deadline for a whole inbound request, retries included, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
