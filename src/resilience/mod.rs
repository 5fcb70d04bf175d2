//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt against an endpoint:
//!     → timeouts.rs (bound the upstream call)
//!     → retries.rs (classify outcome: success / client error / transient)
//!     → On transient failure: backoff.rs (exponential delay + jitter)
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - Classification is pure; the forwarder owns the retry loop
//! - Client errors (4xx other than 408/429) are never retried
//! - Unknown failures default to retryable

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::BackoffPolicy;
pub use retries::{classify_status, StatusClass};
