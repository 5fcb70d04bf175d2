//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Define the seam the forwarder calls through ([`UpstreamClient`])
//! - Execute one call against one endpoint with a deadline
//! - Report transport failures in a classified form
//! - Bound the response body size

use std::fmt;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::http::{ProxyResponse, MAX_BODY_BYTES};
use crate::resilience::timeouts::{with_timeout, Elapsed};

/// One outbound call, fully prepared for a specific endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamCall {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub timeout: Duration,
}

/// Kind of connection-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    Refused,
    Reset,
    Aborted,
    TimedOut,
    /// Connection closed before a complete response arrived.
    NoResponse,
}

impl fmt::Display for ConnectionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionErrorKind::Refused => "refused",
            ConnectionErrorKind::Reset => "reset",
            ConnectionErrorKind::Aborted => "aborted",
            ConnectionErrorKind::TimedOut => "timed out",
            ConnectionErrorKind::NoResponse => "closed without response",
        };
        f.write_str(s)
    }
}

/// Failure of a call that produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("connection {0}")]
    Connection(ConnectionErrorKind),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("response body exceeds {0} bytes")]
    BodyTooLarge(usize),
    #[error("invalid upstream request: {0}")]
    InvalidRequest(String),
    #[error("{0}")]
    Other(String),
}

/// Executes calls against endpoints.
///
/// Any HTTP status is a successful call at this layer; classification of
/// statuses happens in the forwarder.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn execute(&self, call: UpstreamCall) -> Result<ProxyResponse, UpstreamError>;
}

/// Production client on top of hyper-util's pooled client.
#[derive(Clone)]
pub struct HyperUpstreamClient {
    client: Client<HttpConnector, Body>,
}

impl HyperUpstreamClient {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }
}

impl Default for HyperUpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamClient for HyperUpstreamClient {
    async fn execute(&self, call: UpstreamCall) -> Result<ProxyResponse, UpstreamError> {
        let uri: Uri = call
            .url
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| UpstreamError::InvalidRequest(e.to_string()))?;

        let mut builder = Request::builder().method(call.method).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            *headers = call.headers;
        }
        let request = builder
            .body(Body::from(call.body))
            .map_err(|e| UpstreamError::InvalidRequest(e.to_string()))?;

        let exchange = async {
            let response = self.client.request(request).await.map_err(|e| classify_client_error(&e))?;
            let (parts, body) = response.into_parts();

            let declared = parts
                .headers
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok());
            if declared.is_some_and(|len| len > MAX_BODY_BYTES) {
                return Err(UpstreamError::BodyTooLarge(MAX_BODY_BYTES));
            }

            let body = axum::body::to_bytes(Body::new(body), MAX_BODY_BYTES)
                .await
                .map_err(|e| UpstreamError::Other(format!("failed to read response body: {}", e)))?;

            Ok::<_, UpstreamError>(ProxyResponse {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        };

        match with_timeout(call.timeout, exchange).await {
            Ok(result) => result,
            Err(Elapsed(limit)) => Err(UpstreamError::Timeout(limit)),
        }
    }
}

/// Map a hyper client error onto a connection failure kind where possible.
fn classify_client_error(err: &hyper_util::client::legacy::Error) -> UpstreamError {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            let kind = match io_err.kind() {
                io::ErrorKind::ConnectionRefused => Some(ConnectionErrorKind::Refused),
                io::ErrorKind::ConnectionReset => Some(ConnectionErrorKind::Reset),
                io::ErrorKind::ConnectionAborted => Some(ConnectionErrorKind::Aborted),
                io::ErrorKind::TimedOut => Some(ConnectionErrorKind::TimedOut),
                io::ErrorKind::UnexpectedEof => Some(ConnectionErrorKind::NoResponse),
                _ => None,
            };
            if let Some(kind) = kind {
                return UpstreamError::Connection(kind);
            }
        }
        if let Some(hyper_err) = cause.downcast_ref::<hyper::Error>() {
            if hyper_err.is_incomplete_message() || hyper_err.is_closed() || hyper_err.is_canceled() {
                return UpstreamError::Connection(ConnectionErrorKind::NoResponse);
            }
        }
        source = cause.source();
    }

    UpstreamError::Other(error_chain(err))
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn call(url: String) -> UpstreamCall {
        UpstreamCall {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_classified() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HyperUpstreamClient::new()
            .execute(call(format!("http://{}/", addr)))
            .await
            .unwrap_err();
        assert_eq!(err, UpstreamError::Connection(ConnectionErrorKind::Refused));
    }

    #[tokio::test]
    async fn test_reads_status_headers_and_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 404 Not Found\r\nX-Backend: b1\r\nContent-Length: 4\r\nConnection: close\r\n\r\nnope")
                .await;
            let _ = socket.shutdown().await;
        });

        let response = HyperUpstreamClient::new()
            .execute(call(format!("http://{}/missing", addr)))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.headers["x-backend"], "b1");
        assert_eq!(response.body, Bytes::from_static(b"nope"));
    }

    #[tokio::test]
    async fn test_silent_backend_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut c = call(format!("http://{}/", addr));
        c.timeout = Duration::from_millis(100);
        let err = HyperUpstreamClient::new().execute(c).await.unwrap_err();
        assert_eq!(err, UpstreamError::Timeout(Duration::from_millis(100)));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            UpstreamError::Connection(ConnectionErrorKind::Reset).to_string(),
            "connection reset"
        );
    }
}
