//! Retry classification.
//!
//! # Responsibilities
//! - Decide whether an upstream status is a success, a definitive client
//!   error, or a transient failure worth another endpoint
//!
//! # Design Decisions
//! - 5xx, 408 and 429 are transient
//! - Every other 4xx is the caller's problem; the endpoint did its job
//! - Transport failures (refused, reset, timeout, no response) are always
//!   transient, including ones that cannot be identified further

use axum::http::StatusCode;

/// How an upstream status code is treated by the forwarder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Returned to the caller; counts as a success for the endpoint.
    Success,
    /// Returned verbatim; endpoint health untouched.
    ClientError,
    /// Endpoint is marked failed and another attempt may follow.
    Transient,
}

pub fn classify_status(status: StatusCode) -> StatusClass {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => StatusClass::Transient,
        s if s.is_server_error() => StatusClass::Transient,
        s if s.is_client_error() => StatusClass::ClientError,
        _ => StatusClass::Success,
    }
}
