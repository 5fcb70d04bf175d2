//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Selector / forwarder / server produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout log stream
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated messages, for endpoint and attempt data
//! - Metric calls are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
