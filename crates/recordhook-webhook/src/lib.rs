#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod service;

pub mod envelope;
pub mod request;
pub mod response;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest;

pub use envelope::DeliveryEnvelope;
pub use recordhook_core::{Error, ErrorKind, Result};
pub use request::WebhookRequest;
pub use response::WebhookResponse;
pub use service::WebhookService;

/// Tracing target for webhook operations.
pub const TRACING_TARGET: &str = "recordhook_webhook";

/// Sends a [`WebhookRequest`] to its endpoint.
///
/// Returns `Ok` whenever the endpoint answered, whatever the status code,
/// and `Err` only when the exchange could not be completed.
#[async_trait::async_trait]
pub trait WebhookProvider: Send + Sync {
    async fn deliver(&self, request: &WebhookRequest) -> Result<WebhookResponse>;
}
