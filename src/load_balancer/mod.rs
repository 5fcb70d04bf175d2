//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! RequestForwarder asks for an endpoint
//!     → selector.rs (lock state, evaluate health)
//!     → Apply policy:
//!         - performance.rs (favour lowest smoothed latency) when enabled and
//!           latency data exists
//!         - round_robin.rs (rotate through healthy endpoints) otherwise
//!     → Return endpoint identity (endpoint.rs)
//!
//! Outcome of the call
//!     → selector.rs feedback (success / failure / latency)
//!     → health::state (per-endpoint record)
//! ```
//!
//! # Design Decisions
//! - Endpoint set is fixed at construction
//! - One lock guards the cursor and every health record; never held across I/O
//! - Selection never refuses while endpoints exist (last resort fallback)

use std::time::Instant;

use crate::health::state::{EndpointHealth, HealthThresholds};

pub mod endpoint;
pub mod performance;
pub mod round_robin;
pub mod selector;

pub use endpoint::{Endpoint, EndpointError};
pub use selector::EndpointSelector;

/// Selection policy that produced a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    RoundRobin,
    PerformanceWeighted,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::RoundRobin => "round_robin",
            Policy::PerformanceWeighted => "performance",
        }
    }
}

/// Read-only view of the pool handed to a policy while the selector lock is held.
pub(crate) struct PoolView<'a> {
    pub health: &'a [EndpointHealth],
    pub thresholds: &'a HealthThresholds,
    pub now: Instant,
}

impl PoolView<'_> {
    pub fn len(&self) -> usize {
        self.health.len()
    }

    pub fn is_healthy(&self, index: usize) -> bool {
        self.health[index].is_healthy_at(self.thresholds, self.now)
    }

    pub fn healthy_indices(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.is_healthy(i)).collect()
    }
}
