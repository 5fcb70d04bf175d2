//! Per-request attempt state.

use axum::http::StatusCode;
use tokio::time::Instant;

use crate::http::{ProxyResponse, UpstreamError};
use crate::load_balancer::Endpoint;

/// Why a single attempt counted as a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptFailure {
    #[error("{endpoint} responded with {status}")]
    Status { endpoint: String, status: StatusCode },
    #[error("{endpoint}: {error}")]
    Transport { endpoint: String, error: UpstreamError },
}

impl AttemptFailure {
    pub fn status(endpoint: &Endpoint, status: StatusCode) -> Self {
        AttemptFailure::Status {
            endpoint: endpoint.to_string(),
            status,
        }
    }

    pub fn transport(endpoint: &Endpoint, error: UpstreamError) -> Self {
        AttemptFailure::Transport {
            endpoint: endpoint.to_string(),
            error,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptFailure::Status { .. } => "status",
            AttemptFailure::Transport { error, .. } => match error {
                UpstreamError::Timeout(_) => "timeout",
                UpstreamError::Connection(_) => "connection",
                _ => "transport",
            },
        }
    }
}

/// State of one `forward` call.
///
/// `Succeeded`, `ClientErrorReturned` and `Exhausted` are terminal.
#[derive(Debug)]
pub(crate) enum AttemptState {
    Selecting,
    Executing(Endpoint),
    Retrying(AttemptFailure),
    Succeeded(ProxyResponse),
    ClientErrorReturned(ProxyResponse),
    Exhausted(AttemptFailure),
}

/// Bookkeeping for one `forward` call.
#[derive(Debug)]
pub(crate) struct ForwardAttempt {
    pub attempts: u32,
    pub started: Instant,
}

impl ForwardAttempt {
    pub fn new() -> Self {
        Self {
            attempts: 0,
            started: Instant::now(),
        }
    }
}
