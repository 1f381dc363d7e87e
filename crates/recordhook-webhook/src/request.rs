//! One outbound POST.

use std::collections::HashMap;
use std::time::Duration;

use recordhook_core::Operation;
use url::Url;
use uuid::Uuid;

/// A single outbound webhook delivery.
///
/// `body` is the serialized [`DeliveryEnvelope`] and is sent as-is with
/// `Content-Type: application/json`. `headers` come from the subscription;
/// `timeout` overrides the client-wide deadline for this request only.
///
/// [`DeliveryEnvelope`]: crate::DeliveryEnvelope
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub request_id: Uuid,
    pub url: Url,
    pub op: Operation,
    pub body: Vec<u8>,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl WebhookRequest {
    /// Creates a request with a fresh time-ordered id.
    pub fn new(url: Url, op: Operation, body: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            url,
            op,
            body,
            headers: HashMap::default(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Merges `headers` into the request; later values win.
    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let url = Url::parse("https://sink.example/hook").unwrap();
        let request = WebhookRequest::new(url.clone(), Operation::Insert, b"{}".to_vec())
            .with_header("X-Token", "abc")
            .with_headers(HashMap::from([("X-Env".to_owned(), "prod".to_owned())]));

        assert_eq!(request.url, url);
        assert_eq!(request.op, Operation::Insert);
        assert_eq!(request.headers.len(), 2);
        assert!(request.timeout.is_none());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let url = Url::parse("https://sink.example/hook").unwrap();
        let first = WebhookRequest::new(url.clone(), Operation::Delete, Vec::new());
        let second = WebhookRequest::new(url, Operation::Delete, Vec::new());

        assert_ne!(first.request_id, second.request_id);
    }
}
