//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, body limit, request ID)
//!     → request.rs (ProxyRequest record)
//!     → [forwarder picks endpoint, runs attempts]
//!     → client.rs (one outbound call per attempt)
//!     → response.rs (ProxyResponse → client)
//! ```

pub mod client;
pub mod health;
pub mod request;
pub mod response;
pub mod server;

pub use client::{HyperUpstreamClient, UpstreamCall, UpstreamClient, UpstreamError};
pub use request::ProxyRequest;
pub use response::ProxyResponse;
pub use server::HttpServer;

/// Upper bound for request and response bodies, in bytes.
pub const MAX_BODY_BYTES: usize = 1_000_000;
