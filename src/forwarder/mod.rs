//! Request forwarding engine.
//!
//! # Data Flow
//! ```text
//! ProxyRequest
//!     → engine.rs: Selecting (selector.choose)
//!     → Executing (UpstreamClient::execute with timeout)
//!     → classify (resilience::retries)
//!         - Succeeded: record success + latency, return response
//!         - ClientErrorReturned: return upstream 4xx verbatim, health untouched
//!         - Retrying: record failure, back off, select again
//!         - Exhausted: AllAttemptsExhausted
//! ```
//!
//! # Design Decisions
//! - The per-request loop is an explicit state machine (attempt.rs)
//! - Only two errors leave the forwarder; everything below is classified here
//! - Dropping the `forward` future cancels the attempt in flight; nothing is
//!   recorded for an attempt that never completed

pub mod attempt;
pub mod engine;

use std::time::Duration;

use crate::config::BalancerConfig;
use crate::resilience::BackoffPolicy;

pub use attempt::AttemptFailure;
pub use engine::RequestForwarder;

/// Terminal failure of a forward call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForwardError {
    #[error("no endpoints available")]
    NoEndpointsAvailable,
    #[error("all {attempts} attempts failed, last error: {last_error}")]
    AllAttemptsExhausted {
        attempts: u32,
        last_error: AttemptFailure,
    },
}

/// Knobs the forwarder reads on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwarderSettings {
    /// Upper bound on attempts per request, at least 1.
    pub max_retries: u32,
    /// Deadline for a single upstream call.
    pub timeout: Duration,
    pub performance_routing: bool,
    pub backoff: BackoffPolicy,
}

impl ForwarderSettings {
    pub fn from_config(config: &BalancerConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            timeout: config.timeout(),
            performance_routing: config.performance_based_routing,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl Default for ForwarderSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(5),
            performance_routing: false,
            backoff: BackoffPolicy::default(),
        }
    }
}
