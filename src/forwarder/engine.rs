//! The forwarding loop.

use std::sync::Arc;

use tokio::time::Instant;

use crate::forwarder::attempt::{AttemptFailure, AttemptState, ForwardAttempt};
use crate::forwarder::{ForwardError, ForwarderSettings};
use crate::http::{ProxyRequest, ProxyResponse, UpstreamClient};
use crate::load_balancer::{Endpoint, EndpointSelector};
use crate::observability::metrics;
use crate::resilience::retries::{classify_status, StatusClass};

/// Executes inbound requests against the endpoint pool with bounded retry.
#[derive(Clone)]
pub struct RequestForwarder {
    selector: Arc<EndpointSelector>,
    client: Arc<dyn UpstreamClient>,
    settings: ForwarderSettings,
}

impl RequestForwarder {
    pub fn new(
        selector: Arc<EndpointSelector>,
        client: Arc<dyn UpstreamClient>,
        settings: ForwarderSettings,
    ) -> Self {
        let settings = ForwarderSettings {
            max_retries: settings.max_retries.max(1),
            ..settings
        };
        Self {
            selector,
            client,
            settings,
        }
    }

    pub fn selector(&self) -> &Arc<EndpointSelector> {
        &self.selector
    }

    pub fn settings(&self) -> &ForwarderSettings {
        &self.settings
    }

    /// Forward one request.
    ///
    /// Returns the upstream response for 2xx/3xx and for client errors
    /// (4xx other than 408/429). Fails with `NoEndpointsAvailable` when the
    /// pool is empty and with `AllAttemptsExhausted` once `max_retries`
    /// transient failures have been seen.
    pub async fn forward(&self, request: &ProxyRequest) -> Result<ProxyResponse, ForwardError> {
        let mut record = ForwardAttempt::new();
        let mut state = AttemptState::Selecting;

        loop {
            state = match state {
                AttemptState::Selecting => {
                    let Some(endpoint) = self.selector.choose(self.settings.performance_routing) else {
                        tracing::error!(path = %request.path_and_query, "No endpoints configured");
                        metrics::record_forward("no_endpoints", record.started.elapsed());
                        return Err(ForwardError::NoEndpointsAvailable);
                    };
                    record.attempts += 1;
                    AttemptState::Executing(endpoint)
                }
                AttemptState::Executing(endpoint) => self.execute(request, endpoint, &record).await,
                AttemptState::Retrying(failure) => {
                    let delay = self.settings.backoff.delay(record.attempts);
                    tracing::info!(
                        attempt = record.attempts,
                        delay = ?delay,
                        error = %failure,
                        "Retrying request"
                    );
                    metrics::record_retry();
                    tokio::time::sleep(delay).await;
                    AttemptState::Selecting
                }
                AttemptState::Succeeded(response) => {
                    metrics::record_forward("success", record.started.elapsed());
                    return Ok(response);
                }
                AttemptState::ClientErrorReturned(response) => {
                    metrics::record_forward("client_error", record.started.elapsed());
                    return Ok(response);
                }
                AttemptState::Exhausted(last_error) => {
                    tracing::error!(
                        attempts = record.attempts,
                        error = %last_error,
                        path = %request.path_and_query,
                        "All attempts failed"
                    );
                    metrics::record_forward("exhausted", record.started.elapsed());
                    return Err(ForwardError::AllAttemptsExhausted {
                        attempts: record.attempts,
                        last_error,
                    });
                }
            };
        }
    }

    /// Run one attempt and decide the next state.
    async fn execute(
        &self,
        request: &ProxyRequest,
        endpoint: Endpoint,
        record: &ForwardAttempt,
    ) -> AttemptState {
        let call = request.upstream_call(&endpoint, self.settings.timeout);

        tracing::debug!(
            endpoint = %endpoint,
            attempt = record.attempts,
            method = %request.method,
            path = %request.path_and_query,
            "Forwarding request"
        );

        let started = Instant::now();
        let result = self.client.execute(call).await;
        let elapsed = started.elapsed();

        let failure = match result {
            Ok(response) => match classify_status(response.status) {
                StatusClass::Success => {
                    self.selector.record_success(&endpoint);
                    self.selector.record_response_time(&endpoint, elapsed);
                    metrics::record_attempt(endpoint.as_str(), "success", elapsed);
                    return AttemptState::Succeeded(response);
                }
                StatusClass::ClientError => {
                    tracing::debug!(
                        endpoint = %endpoint,
                        status = %response.status,
                        "Returning upstream client error"
                    );
                    metrics::record_attempt(endpoint.as_str(), "client_error", elapsed);
                    return AttemptState::ClientErrorReturned(response);
                }
                StatusClass::Transient => AttemptFailure::status(&endpoint, response.status),
            },
            Err(error) => AttemptFailure::transport(&endpoint, error),
        };

        self.selector.record_failure(&endpoint);
        metrics::record_attempt(endpoint.as_str(), failure.kind(), elapsed);
        tracing::warn!(
            endpoint = %endpoint,
            attempt = record.attempts,
            max_retries = self.settings.max_retries,
            error = %failure,
            "Upstream attempt failed"
        );

        if record.attempts >= self.settings.max_retries {
            AttemptState::Exhausted(failure)
        } else {
            AttemptState::Retrying(failure)
        }
    }
}
