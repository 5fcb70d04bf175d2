//! Per-endpoint health record.
//!
//! # States
//! - Healthy: endpoint is eligible for selection
//! - Unhealthy: failure streak reached the threshold and the last failure is
//!   still inside the recovery window
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: consecutive_failures >= fail_threshold
//! Unhealthy → Healthy: any success, or recovery window elapsed since last failure
//! ```
//!
//! # Design Decisions
//! - Owned exclusively by the selector; mutated only through its feedback methods
//! - Latency is only sampled on successful calls
//! - Recovery is time-based, no probe required

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Smoothing factor for the response time moving average.
pub const EWMA_ALPHA: f64 = 0.3;

/// Threshold pair evaluated by [`EndpointHealth::is_healthy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthThresholds {
    /// Consecutive failures needed before an endpoint is considered unhealthy.
    pub fail_threshold: u32,
    /// How long after the last failure an unhealthy endpoint stays excluded.
    pub recovery_time: Duration,
}

impl HealthThresholds {
    pub fn new(fail_threshold: u32, recovery_time: Duration) -> Self {
        Self {
            fail_threshold,
            recovery_time,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FailureStamp {
    /// Monotonic time, used for the recovery window.
    at: Instant,
    /// Wall-clock time, used for reporting.
    wall: DateTime<Utc>,
}

/// Mutable health state of one endpoint.
#[derive(Debug, Clone, Default)]
pub struct EndpointHealth {
    consecutive_failures: u32,
    last_failure: Option<FailureStamp>,
    avg_response_time_ms: f64,
    samples: u64,
}

impl EndpointHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a successful call. Clears the failure streak.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Report a failed call.
    pub fn record_failure(&mut self) {
        self.record_failure_at(Instant::now());
    }

    pub(crate) fn record_failure_at(&mut self, now: Instant) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_failure = Some(FailureStamp {
            at: now,
            wall: Utc::now(),
        });
    }

    /// Fold a latency sample into the moving average.
    pub fn update_response_time(&mut self, sample: Duration) {
        let sample_ms = sample.as_secs_f64() * 1000.0;
        if self.samples == 0 {
            self.avg_response_time_ms = sample_ms;
        } else {
            self.avg_response_time_ms =
                EWMA_ALPHA * sample_ms + (1.0 - EWMA_ALPHA) * self.avg_response_time_ms;
        }
        self.samples = self.samples.saturating_add(1);
    }

    /// Return true unless the failure streak reached the threshold and the
    /// last failure is still within the recovery window.
    pub fn is_healthy(&self, thresholds: &HealthThresholds) -> bool {
        self.is_healthy_at(thresholds, Instant::now())
    }

    pub(crate) fn is_healthy_at(&self, thresholds: &HealthThresholds, now: Instant) -> bool {
        if self.consecutive_failures < thresholds.fail_threshold {
            return true;
        }
        match self.last_failure {
            Some(stamp) => now.saturating_duration_since(stamp.at) > thresholds.recovery_time,
            None => true,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Smoothed response time in milliseconds, 0 before the first sample.
    pub fn avg_response_time_ms(&self) -> f64 {
        self.avg_response_time_ms
    }

    pub fn last_failure_time(&self) -> Option<DateTime<Utc>> {
        self.last_failure.map(|stamp| stamp.wall)
    }

    /// Read-only projection for health reporting.
    pub fn snapshot(&self, url: &str, thresholds: &HealthThresholds) -> EndpointSnapshot {
        EndpointSnapshot {
            url: url.to_string(),
            healthy: self.is_healthy(thresholds),
            consecutive_failures: self.consecutive_failures,
            last_failure_time: self.last_failure_time(),
            avg_response_time_ms: round2(self.avg_response_time_ms),
        }
    }
}

/// Point-in-time view of one endpoint's health.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSnapshot {
    pub url: String,
    pub healthy: bool,
    pub consecutive_failures: u32,
    pub last_failure_time: Option<DateTime<Utc>>,
    pub avg_response_time_ms: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
