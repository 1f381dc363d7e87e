//! Logging front for webhook providers.

use std::fmt;
use std::sync::Arc;

use crate::{Result, TRACING_TARGET, WebhookProvider, WebhookRequest, WebhookResponse};

/// Shared handle to a [`WebhookProvider`] that logs every delivery outcome.
///
/// 2xx answers are logged at debug, other statuses at warn and transport
/// failures at error. The outcome itself is returned untouched.
#[derive(Clone)]
pub struct WebhookService {
    provider: Arc<dyn WebhookProvider>,
}

impl fmt::Debug for WebhookService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookService").finish_non_exhaustive()
    }
}

impl WebhookService {
    pub fn new<P>(provider: P) -> Self
    where
        P: WebhookProvider + 'static,
    {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Delivers `request` through the wrapped provider.
    pub async fn deliver(&self, request: &WebhookRequest) -> Result<WebhookResponse> {
        let outcome = self.provider.deliver(request).await;
        log_outcome(request, &outcome);
        outcome
    }
}

fn log_outcome(request: &WebhookRequest, outcome: &Result<WebhookResponse>) {
    let response = match outcome {
        Ok(response) => response,
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET,
                request_id = %request.request_id,
                url = %request.url,
                op = %request.op,
                error = %error,
                "Webhook delivery failed"
            );
            return;
        }
    };

    if response.is_success() {
        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            url = %request.url,
            status_code = response.status_code,
            elapsed_ms = response.elapsed_ms(),
            body_bytes = request.body.len(),
            "Webhook delivered"
        );
    } else {
        tracing::warn!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            url = %request.url,
            status_code = response.status_code,
            elapsed_ms = response.elapsed_ms(),
            "Webhook endpoint answered with a non-success status"
        );
    }
}
