//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Passive tracking (state.rs):
//!     Forwarder observes attempt outcome
//!     → selector feedback
//!     → consecutive failures / last failure / smoothed latency
//!
//! Reporting (report.rs):
//!     selector snapshot → HealthReport → GET /health
//! ```
//!
//! # Design Decisions
//! - Health is advisory: stale reads only cause suboptimal routing
//! - 4xx responses never count against an endpoint
//! - Unhealthy endpoints recover after a quiet period, no probe needed

pub mod report;
pub mod state;

pub use report::HealthReport;
pub use state::{EndpointHealth, EndpointSnapshot, HealthThresholds};
