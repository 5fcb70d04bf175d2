//! Endpoint selection and feedback.
//!
//! # Responsibilities
//! - Own the ordered endpoint list and one health record per endpoint
//! - Choose the next endpoint under round-robin or performance routing
//! - Absorb success / failure / latency feedback from the forwarder
//! - Expose read-only health snapshots

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::Rng;

use crate::health::state::{EndpointHealth, EndpointSnapshot, HealthThresholds};
use crate::load_balancer::{
    endpoint::{Endpoint, EndpointError},
    performance,
    round_robin::{Pick, RoundRobin},
    Policy, PoolView,
};

/// Mutable part of the selector. Guarded by a single lock.
#[derive(Debug)]
struct SelectorState {
    round_robin: RoundRobin,
    health: Vec<EndpointHealth>,
}

/// Chooses endpoints for the forwarder and tracks their health.
#[derive(Debug)]
pub struct EndpointSelector {
    endpoints: Vec<Endpoint>,
    positions: HashMap<Endpoint, usize>,
    thresholds: HealthThresholds,
    state: Mutex<SelectorState>,
}

impl EndpointSelector {
    /// Create a selector over a fixed, ordered endpoint list.
    ///
    /// The list order defines the round-robin sequence. If an endpoint is
    /// listed twice, feedback is routed to its first occurrence.
    pub fn new(endpoints: Vec<Endpoint>, thresholds: HealthThresholds) -> Self {
        let mut positions = HashMap::with_capacity(endpoints.len());
        for (i, endpoint) in endpoints.iter().enumerate() {
            positions.entry(endpoint.clone()).or_insert(i);
        }

        let health = vec![EndpointHealth::new(); endpoints.len()];

        Self {
            endpoints,
            positions,
            thresholds,
            state: Mutex::new(SelectorState {
                round_robin: RoundRobin::new(),
                health,
            }),
        }
    }

    /// Parse base URLs and build a selector.
    pub fn from_urls<S: AsRef<str>>(
        urls: &[S],
        thresholds: HealthThresholds,
    ) -> Result<Self, EndpointError> {
        let endpoints = urls
            .iter()
            .map(|u| Endpoint::parse(u.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(endpoints, thresholds))
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Choose the endpoint for the next attempt.
    ///
    /// Returns `None` only when no endpoints are configured.
    pub fn choose(&self, use_performance_routing: bool) -> Option<Endpoint> {
        self.choose_with_rng(use_performance_routing, &mut rand::thread_rng())
    }

    /// Same as [`choose`](Self::choose) with a caller-supplied random source.
    pub fn choose_with_rng<R: Rng + ?Sized>(
        &self,
        use_performance_routing: bool,
        rng: &mut R,
    ) -> Option<Endpoint> {
        if self.endpoints.is_empty() {
            return None;
        }

        let (index, policy, last_resort) = {
            let mut state = self.state.lock();
            let SelectorState { round_robin, health } = &mut *state;
            let health: &[EndpointHealth] = health;
            let pool = PoolView {
                health,
                thresholds: &self.thresholds,
                now: Instant::now(),
            };

            let weighted = if use_performance_routing && performance::has_latency_data(health) {
                performance::pick(&pool, rng)
            } else {
                None
            };

            match weighted {
                Some(index) => (index, Policy::PerformanceWeighted, false),
                None => match round_robin.next(&pool)? {
                    Pick::Healthy(index) => (index, Policy::RoundRobin, false),
                    Pick::LastResort(index) => (index, Policy::RoundRobin, true),
                },
            }
        };

        let endpoint = self.endpoints[index].clone();
        if last_resort {
            tracing::warn!(
                endpoint = %endpoint,
                pool_size = self.endpoints.len(),
                "No healthy endpoints, routing to last resort"
            );
        } else {
            tracing::trace!(endpoint = %endpoint, policy = policy.as_str(), "Endpoint selected");
        }
        Some(endpoint)
    }

    /// Report a successful call. Unknown endpoints are ignored.
    pub fn record_success(&self, endpoint: &Endpoint) {
        self.with_health(endpoint, |h| h.record_success());
    }

    /// Report a failed call. Unknown endpoints are ignored.
    pub fn record_failure(&self, endpoint: &Endpoint) {
        let failures = self.with_health(endpoint, |h| {
            h.record_failure();
            h.consecutive_failures()
        });
        if let Some(failures) = failures {
            if failures == self.thresholds.fail_threshold {
                tracing::warn!(
                    endpoint = %endpoint,
                    consecutive_failures = failures,
                    recovery_ms = self.thresholds.recovery_time.as_millis() as u64,
                    "Endpoint marked unhealthy"
                );
            }
        }
    }

    /// Report the latency of a successful call. Unknown endpoints are ignored.
    pub fn record_response_time(&self, endpoint: &Endpoint, elapsed: Duration) {
        self.with_health(endpoint, |h| h.update_response_time(elapsed));
    }

    /// Copy of one endpoint's health record.
    pub fn health_of(&self, endpoint: &Endpoint) -> Option<EndpointHealth> {
        self.with_health(endpoint, |h| h.clone())
    }

    /// Snapshot of every endpoint, keyed by base URL.
    pub fn health_snapshot(&self) -> BTreeMap<String, EndpointSnapshot> {
        let state = self.state.lock();
        self.endpoints
            .iter()
            .zip(state.health.iter())
            .map(|(endpoint, health)| {
                (
                    endpoint.to_string(),
                    health.snapshot(endpoint.as_str(), &self.thresholds),
                )
            })
            .collect()
    }

    fn with_health<T>(&self, endpoint: &Endpoint, f: impl FnOnce(&mut EndpointHealth) -> T) -> Option<T> {
        let index = *self.positions.get(endpoint)?;
        let mut state = self.state.lock();
        state.health.get_mut(index).map(f)
    }
}
