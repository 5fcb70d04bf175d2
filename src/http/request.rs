//! Inbound request record.
//!
//! # Responsibilities
//! - Carry method, path+query, headers and body from the listener to the forwarder
//! - Prepare the outbound call for a chosen endpoint
//!
//! # Design Decisions
//! - Original request is never mutated; each attempt builds its own copy
//! - `host` is rewritten to the endpoint authority
//! - `content-length` is dropped; the client recomputes it from the body

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method};

use crate::http::client::UpstreamCall;
use crate::load_balancer::Endpoint;

/// Request as handed to the forwarder.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Path plus optional `?query`, exactly as received.
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequest {
    pub fn new(method: Method, path_and_query: impl Into<String>) -> Self {
        Self {
            method,
            path_and_query: path_and_query.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Build the call for one attempt against `endpoint`.
    pub fn upstream_call(&self, endpoint: &Endpoint, timeout: Duration) -> UpstreamCall {
        let mut headers = self.headers.clone();
        headers.remove(header::CONTENT_LENGTH);
        match HeaderValue::from_str(&endpoint.authority()) {
            Ok(host) => {
                headers.insert(header::HOST, host);
            }
            Err(_) => {
                headers.remove(header::HOST);
            }
        }

        UpstreamCall {
            method: self.method.clone(),
            url: endpoint.target_url(&self.path_and_query),
            headers,
            body: self.body.clone(),
            timeout,
        }
    }
}
