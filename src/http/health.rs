//! Health report handler.

use axum::{extract::State, Json};

use crate::health::HealthReport;
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn get_health(State(state): State<AppState>) -> Json<HealthReport> {
    let report = HealthReport::from_selector(state.forwarder.selector());
    for (endpoint, snapshot) in &report.endpoints {
        metrics::record_endpoint_health(endpoint, snapshot.healthy);
    }
    Json(report)
}
