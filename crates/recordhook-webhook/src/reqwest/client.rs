//! Webhook delivery over reqwest.

use std::sync::Arc;

use jiff::Timestamp;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use super::{Error, ReqwestConfig, Result, TRACING_TARGET};
use crate::{WebhookProvider, WebhookRequest, WebhookResponse, WebhookService};

struct Shared {
    http: Client,
    config: ReqwestConfig,
}

/// [`WebhookProvider`] issuing one JSON `POST` per request.
///
/// The response body is never read and any status code counts as an answer.
/// Clones share one connection pool.
///
/// ```rust,ignore
/// let service = ReqwestClient::new(ReqwestConfig::default())?.into_service();
/// let response = service.deliver(&request).await?;
/// ```
#[derive(Clone)]
pub struct ReqwestClient {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Builds a client from validated settings.
    pub fn new(config: ReqwestConfig) -> Result<Self> {
        config.validate()?;

        let http = config.apply(Client::builder()).build()?;

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = ?config.timeout().map(|timeout| timeout.as_millis()),
            user_agent = %config.user_agent(),
            "HTTP client ready"
        );

        Ok(Self {
            shared: Arc::new(Shared { http, config }),
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(ReqwestConfig::default())
    }

    pub fn config(&self) -> &ReqwestConfig {
        &self.shared.config
    }

    /// Wraps this client in a logging [`WebhookService`].
    pub fn into_service(self) -> WebhookService {
        WebhookService::new(self)
    }

    fn post(&self, request: &WebhookRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .shared
            .http
            .post(request.url.clone())
            .header(CONTENT_TYPE, "application/json");

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        for (name, value) in &request.headers {
            // The body is always JSON.
            if name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                tracing::warn!(
                    target: TRACING_TARGET,
                    request_id = %request.request_id,
                    header = %name,
                    "Ignoring subscription Content-Type header"
                );
                continue;
            }
            builder = builder.header(name, value);
        }

        builder.body(request.body.clone())
    }
}

#[async_trait::async_trait]
impl WebhookProvider for ReqwestClient {
    async fn deliver(&self, request: &WebhookRequest) -> crate::Result<WebhookResponse> {
        let sent_at = Timestamp::now();
        let answer = self.post(request).send().await.map_err(Error::from)?;

        let response = WebhookResponse::new(request.request_id, answer.status().as_u16(), sent_at);

        tracing::trace!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            status_code = response.status_code,
            version = ?answer.version(),
            "Endpoint answered"
        );

        Ok(response)
    }
}
