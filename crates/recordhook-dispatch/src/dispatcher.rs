//! Record change dispatcher.

use std::fmt;
use std::sync::Arc;

use recordhook_core::{ChangeEvent, Error, LOOKUP_CONTEXT, Operation, Record, Result};
use recordhook_store::{Subscription, SubscriptionStore};
use recordhook_webhook::{DeliveryEnvelope, WebhookRequest, WebhookResponse, WebhookService};

/// Tracing target for dispatch operations.
const TRACING_TARGET: &str = "recordhook_dispatch::dispatcher";

struct DispatcherInner {
    store: Arc<dyn SubscriptionStore>,
    webhook: WebhookService,
}

/// Forwards record changes to their webhook subscription.
///
/// Each call performs one subscription lookup and at most one delivery on
/// the caller's task. The dispatcher holds no mutable state and is cheap to
/// clone.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("webhook", &self.inner.webhook)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher over a subscription store and a delivery service.
    pub fn new<S>(store: S, webhook: WebhookService) -> Self
    where
        S: SubscriptionStore + 'static,
    {
        Self::from_shared(Arc::new(store), webhook)
    }

    /// Creates a dispatcher over an already shared subscription store.
    pub fn from_shared(store: Arc<dyn SubscriptionStore>, webhook: WebhookService) -> Self {
        Self {
            inner: Arc::new(DispatcherInner { store, webhook }),
        }
    }

    /// Handles one committed change to `record` in `collection`.
    ///
    /// The record must be the persisted state: post-commit for inserts and
    /// updates, the pre-removal snapshot for deletes.
    ///
    /// Returns the endpoint's response whatever its status code. Fails with
    /// a serialization error, a lookup failure (no subscription, or the store
    /// could not answer) or a transport error.
    pub async fn handle_change(
        &self,
        collection: &str,
        op: Operation,
        record: Record,
    ) -> Result<WebhookResponse> {
        let event = ChangeEvent::new(collection, op, record);
        self.dispatch(&event).await
    }

    /// Dispatches an already constructed change event.
    #[tracing::instrument(
        skip(self, event),
        fields(
            collection = %event.collection,
            op = %event.operation,
            record_id = %event.record.id,
        )
    )]
    pub async fn dispatch(&self, event: &ChangeEvent) -> Result<WebhookResponse> {
        let envelope = DeliveryEnvelope::from_event(event)?;
        let body = envelope.to_json_bytes()?;

        let subscription = self.resolve(&event.collection, event.operation).await?;

        let request = WebhookRequest::new(subscription.url, event.operation, body)
            .with_headers(subscription.headers);

        tracing::debug!(
            target: TRACING_TARGET,
            subscription_id = %subscription.id,
            request_id = %request.request_id,
            url = %request.url,
            time = envelope.time,
            "Dispatching record change"
        );

        let response = self.inner.webhook.deliver(&request).await?;

        tracing::info!(
            target: TRACING_TARGET,
            subscription_id = %subscription.id,
            request_id = %request.request_id,
            status_code = response.status_code,
            "Record change dispatched"
        );

        Ok(response)
    }

    /// Resolves the single subscription used for a (collection, operation) pair.
    async fn resolve(&self, collection: &str, op: Operation) -> Result<Subscription> {
        let subscriptions = self
            .inner
            .store
            .find(collection, op)
            .await
            .map_err(|err| err.within(LOOKUP_CONTEXT))?;

        if subscriptions.len() > 1 {
            tracing::debug!(
                target: TRACING_TARGET,
                candidates = subscriptions.len(),
                "Multiple subscriptions matched, using the first"
            );
        }

        subscriptions.into_iter().next().ok_or_else(|| {
            tracing::debug!(
                target: TRACING_TARGET,
                "No subscription for record change"
            );

            Error::not_found()
                .with_message(format!("no subscription for `{collection}` on {op}"))
                .with_context(LOOKUP_CONTEXT)
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use jiff::Timestamp;
    use recordhook_core::ErrorKind;
    use recordhook_store::MemoryStore;
    use recordhook_webhook::WebhookProvider;
    use serde_json::Value;
    use url::Url;

    use super::*;

    /// Records every request instead of sending it.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingProvider {
        requests: Arc<Mutex<Vec<WebhookRequest>>>,
        status_code: u16,
    }

    impl RecordingProvider {
        pub fn with_status(status_code: u16) -> Self {
            Self {
                requests: Arc::default(),
                status_code,
            }
        }

        pub fn sent(&self) -> Vec<WebhookRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl WebhookProvider for RecordingProvider {
        async fn deliver(&self, request: &WebhookRequest) -> Result<WebhookResponse> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(WebhookResponse::new(
                request.request_id,
                self.status_code,
                Timestamp::now(),
            ))
        }
    }

    struct FailingStore;

    #[async_trait::async_trait]
    impl SubscriptionStore for FailingStore {
        async fn find(&self, _collection: &str, _op: Operation) -> Result<Vec<Subscription>> {
            Err(Error::service_unavailable()
                .with_message("store offline")
                .with_context("subscriptions_table"))
        }
    }

    pub(crate) fn subscription(id: &str, table: &str, url: &str, op: Operation) -> Subscription {
        Subscription::new(table, Url::parse(url).unwrap(), op)
            .unwrap()
            .with_id(id)
    }

    fn order() -> Record {
        Record::new("o1", "orders")
            .with_field("status", "paid")
            .with_field("total", 42)
    }

    fn body(request: &WebhookRequest) -> Value {
        serde_json::from_slice(&request.body).unwrap()
    }

    async fn dispatcher(
        subscriptions: Vec<Subscription>,
        status_code: u16,
    ) -> (Dispatcher, RecordingProvider) {
        let store = MemoryStore::with_subscriptions(subscriptions).await.unwrap();
        let provider = RecordingProvider::with_status(status_code);
        let service = WebhookService::new(provider.clone());
        (Dispatcher::new(store, service), provider)
    }

    #[tokio::test]
    async fn test_every_operation_is_delivered_once() {
        for op in Operation::ALL {
            let sub = subscription("s", "orders", "http://sink.example/hook", op);
            let (dispatcher, provider) = dispatcher(vec![sub], 200).await;

            dispatcher.handle_change("orders", op, order()).await.unwrap();

            let sent = provider.sent();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].url.as_str(), "http://sink.example/hook");
            assert_eq!(body(&sent[0])["op"], op.as_str());
        }
    }

    #[tokio::test]
    async fn test_record_is_embedded_as_encoded_blob() {
        let sub = subscription("s", "orders", "http://sink.example/hook", Operation::Insert);
        let (dispatcher, provider) = dispatcher(vec![sub], 200).await;

        dispatcher
            .handle_change("orders", Operation::Insert, order())
            .await
            .unwrap();

        let body = body(&provider.sent()[0]);
        let encoded = body["record"].as_str().unwrap();
        let record: Value = serde_json::from_slice(&STANDARD.decode(encoded).unwrap()).unwrap();

        assert_eq!(record["id"], "o1");
        assert_eq!(record["collectionName"], "orders");
        assert_eq!(record["total"], 42);
    }

    #[tokio::test]
    async fn test_time_is_dispatch_time() {
        let sub = subscription("s", "orders", "http://sink.example/hook", Operation::Update);
        let (dispatcher, provider) = dispatcher(vec![sub], 200).await;

        let written: Timestamp = "2001-09-09T01:46:40Z".parse().unwrap();
        let record = order().with_created(written).with_updated(written);

        let before = Timestamp::now().as_second();
        dispatcher
            .handle_change("orders", Operation::Update, record)
            .await
            .unwrap();
        let after = Timestamp::now().as_second();

        let time = body(&provider.sent()[0])["time"].as_i64().unwrap();
        assert!(time >= before && time <= after);
        assert_ne!(time, written.as_second());
    }

    #[tokio::test]
    async fn test_no_subscription_is_lookup_failure() {
        let sub = subscription("s", "orders", "http://sink.example/hook", Operation::Insert);
        let (dispatcher, provider) = dispatcher(vec![sub], 200).await;

        let error = dispatcher
            .handle_change("orders", Operation::Delete, order())
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::NotFound);
        assert!(error.is_lookup_failure());
        assert!(provider.sent().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_lookup_failure() {
        let provider = RecordingProvider::with_status(200);
        let dispatcher = Dispatcher::new(FailingStore, WebhookService::new(provider.clone()));

        let error = dispatcher
            .handle_change("orders", Operation::Update, order())
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::ServiceUnavailable);
        assert!(error.is_lookup_failure());
        assert!(provider.sent().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_keeps_store_context() {
        let provider = RecordingProvider::with_status(200);
        let dispatcher = Dispatcher::new(FailingStore, WebhookService::new(provider));

        let error = dispatcher
            .handle_change("orders", Operation::Update, order())
            .await
            .unwrap_err();

        assert_eq!(error.context.as_deref(), Some(LOOKUP_CONTEXT));
        assert_eq!(
            error.message.as_deref(),
            Some("subscriptions_table: store offline")
        );
        assert!(error.to_string().contains("subscriptions_table"));
    }

    #[tokio::test]
    async fn test_only_first_subscription_receives_delivery() {
        let (dispatcher, provider) = dispatcher(
            vec![
                subscription("first", "orders", "http://first.example/", Operation::Update),
                subscription("second", "orders", "http://second.example/", Operation::Update),
            ],
            200,
        )
        .await;

        dispatcher
            .handle_change("orders", Operation::Update, order())
            .await
            .unwrap();

        let sent = provider.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url.as_str(), "http://first.example/");
    }

    #[tokio::test]
    async fn test_server_error_status_is_not_a_failure() {
        let sub = subscription("s", "orders", "http://sink.example/hook", Operation::Update);
        let (dispatcher, _provider) = dispatcher(vec![sub], 500).await;

        let response = dispatcher
            .handle_change("orders", Operation::Update, order())
            .await
            .unwrap();

        assert_eq!(response.status_code, 500);
    }

    #[tokio::test]
    async fn test_subscription_headers_are_applied() {
        let sub = subscription("s", "orders", "http://sink.example/hook", Operation::Update)
            .with_header("Authorization", "Bearer abc");
        let (dispatcher, provider) = dispatcher(vec![sub], 200).await;

        dispatcher
            .handle_change("orders", Operation::Update, order())
            .await
            .unwrap();

        let sent = provider.sent();
        assert_eq!(
            sent[0].headers.get("Authorization").map(String::as_str),
            Some("Bearer abc")
        );
    }
}
