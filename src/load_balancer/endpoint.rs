//! Endpoint identity.
//!
//! # Responsibilities
//! - Represent a single backend instance by its base URL
//! - Serve as the map key for health tracking
//! - Produce the authority used to rewrite the `host` header
//! - Join an inbound path+query onto the base URL

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use url::Url;

/// Error returned when a configured endpoint cannot be used as a base URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("endpoint '{0}' must use plain http")]
    UnsupportedScheme(String),
    #[error("endpoint '{0}' has no host")]
    MissingHost(String),
    #[error("endpoint '{0}' must not carry a query or fragment")]
    QueryOrFragment(String),
}

/// One backend instance, identified by its base URL.
///
/// Cheap to clone; the parsed URL is shared.
///
/// Displays as configured. Equality follows the parsed URL, so
/// `http://h:1` and `http://h:1/` are the same endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    raw: Arc<str>,
    url: Arc<Url>,
}

impl Endpoint {
    /// Parse a base URL such as `http://10.0.0.5:3000` or `http://api.internal/v1`.
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        let url = Url::parse(raw).map_err(|e| EndpointError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" {
            return Err(EndpointError::UnsupportedScheme(raw.to_string()));
        }
        if url.host_str().is_none() {
            return Err(EndpointError::MissingHost(raw.to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(EndpointError::QueryOrFragment(raw.to_string()));
        }

        Ok(Self {
            raw: Arc::from(raw),
            url: Arc::new(url),
        })
    }

    /// The base URL exactly as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `host[:port]`, the value written into the outbound `host` header.
    ///
    /// Default ports are omitted, matching what clients send.
    pub fn authority(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Full outbound URL for an inbound `path?query`.
    ///
    /// The base path is kept as a prefix, so `http://h/api` + `/users?id=1`
    /// becomes `http://h/api/users?id=1`.
    pub fn target_url(&self, path_and_query: &str) -> String {
        let base = self.url.as_str().trim_end_matches('/');
        if path_and_query.is_empty() {
            return format!("{}/", base);
        }
        if path_and_query.starts_with('/') {
            format!("{}{}", base, path_and_query)
        } else {
            format!("{}/{}", base, path_and_query)
        }
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Endpoint {}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
