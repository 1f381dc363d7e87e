//! What came back from a subscriber endpoint.

use std::time::Duration;

use jiff::Timestamp;
use uuid::Uuid;

/// Outcome of a delivery attempt that reached the destination.
///
/// A non-2xx status is still a response, not an error: only transport
/// failures are reported as errors. The body is never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    /// Identifier of the [`WebhookRequest`](crate::WebhookRequest) that was answered.
    pub request_id: Uuid,
    pub status_code: u16,
    /// When the POST was issued.
    pub sent_at: Timestamp,
    /// Wall-clock time until the status line arrived.
    pub elapsed: Duration,
}

impl WebhookResponse {
    /// Records an answer to a request issued at `sent_at`.
    pub fn new(request_id: Uuid, status_code: u16, sent_at: Timestamp) -> Self {
        let elapsed: Duration = Timestamp::now()
            .duration_since(sent_at)
            .try_into()
            .unwrap_or_default();

        Self {
            request_id,
            status_code,
            sent_at,
            elapsed,
        }
    }

    /// Returns whether the endpoint answered with a 2xx status code.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    #[inline]
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        let request_id = Uuid::now_v7();

        assert!(WebhookResponse::new(request_id, 204, Timestamp::now()).is_success());
        assert!(!WebhookResponse::new(request_id, 302, Timestamp::now()).is_success());
        assert!(!WebhookResponse::new(request_id, 500, Timestamp::now()).is_success());
    }

    #[test]
    fn test_elapsed_is_measured_from_send_time() {
        let sent_at = Timestamp::now() - jiff::SignedDuration::from_millis(250);
        let response = WebhookResponse::new(Uuid::now_v7(), 200, sent_at);

        assert!(response.elapsed_ms() >= 250);
        assert_eq!(response.sent_at, sent_at);
    }
}
