//! Pool balancer library.
//!
//! Forwards HTTP requests to a fixed pool of backend endpoints with
//! health-aware round-robin or latency-weighted selection, bounded retry with
//! backoff, and an aggregate health report.

pub mod config;
pub mod forwarder;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;

pub use config::BalancerConfig;
pub use forwarder::{ForwardError, ForwarderSettings, RequestForwarder};
pub use health::HealthReport;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{Endpoint, EndpointSelector};
