//! Upstream response record.
//!
//! # Responsibilities
//! - Carry status, headers and body back from the endpoint
//! - Convert into an Axum response for the client
//!
//! # Design Decisions
//! - Status, headers and body are passed through unchanged
//! - Hop-by-hop headers are stripped when handing the response to the client

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

const HOP_BY_HOP: [&str; 3] = ["connection", "transfer-encoding", "keep-alive"];

/// Response as produced by the upstream endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut headers = self.headers;
        for name in HOP_BY_HOP {
            headers.remove(name);
        }

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}
