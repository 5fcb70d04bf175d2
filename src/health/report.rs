//! Aggregate health report served at `/health`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::health::state::EndpointSnapshot;
use crate::load_balancer::EndpointSelector;

/// Body of the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Always `"UP"` while the process serves requests.
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub endpoints: BTreeMap<String, EndpointSnapshot>,
}

impl HealthReport {
    pub fn from_selector(selector: &EndpointSelector) -> Self {
        Self {
            status: "UP",
            timestamp: Utc::now(),
            endpoints: selector.health_snapshot(),
        }
    }
}
