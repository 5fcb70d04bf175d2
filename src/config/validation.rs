//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, thresholds ≥ 1)
//! - Check endpoints are usable, distinct base URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::BalancerConfig;
use crate::load_balancer::{Endpoint, EndpointError};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one endpoint is required")]
    NoEndpoints,
    #[error("{0}")]
    InvalidEndpoint(EndpointError),
    #[error("endpoint '{0}' is listed more than once")]
    DuplicateEndpoint(String),
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field} '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
}

pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    let mut seen = HashSet::new();
    for raw in &config.endpoints {
        match Endpoint::parse(raw) {
            Ok(endpoint) => {
                if !seen.insert(endpoint) {
                    errors.push(ValidationError::DuplicateEndpoint(raw.clone()));
                }
            }
            Err(e) => errors.push(ValidationError::InvalidEndpoint(e)),
        }
    }

    if config.timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "timeout_ms" });
    }
    if config.max_retries == 0 {
        errors.push(ValidationError::Zero { field: "max_retries" });
    }
    if config.health_check.fail_threshold == 0 {
        errors.push(ValidationError::Zero { field: "health_check.fail_threshold" });
    }
    if config.health_check.recovery_time_ms == 0 {
        errors.push(ValidationError::Zero { field: "health_check.recovery_time_ms" });
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "listener.request_timeout_secs" });
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
