//! In-process subscription store.

use std::fmt;
use std::sync::Arc;

use recordhook_core::{Error, Operation, Result};
use tokio::sync::RwLock;

use crate::{Subscription, SubscriptionStore, TRACING_TARGET};

/// Subscription store kept in memory.
///
/// Subscriptions are returned in insertion order, so the first registered
/// subscription for a (collection, operation) pair is the one a lookup
/// yields first. Cloning is cheap and clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Vec<Subscription>>>,
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given subscriptions.
    ///
    /// Fails if two subscriptions share an identifier.
    pub async fn with_subscriptions(
        subscriptions: impl IntoIterator<Item = Subscription>,
    ) -> Result<Self> {
        let store = Self::new();
        for subscription in subscriptions {
            store.insert(subscription).await?;
        }
        Ok(store)
    }

    /// Registers a new subscription.
    pub async fn insert(&self, subscription: Subscription) -> Result<()> {
        let mut subscriptions = self.inner.write().await;

        if subscriptions.iter().any(|s| s.id == subscription.id) {
            return Err(Error::invalid_input()
                .with_message(format!("subscription `{}` already exists", subscription.id)));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            subscription_id = %subscription.id,
            table_name = %subscription.table_name,
            op = %subscription.op,
            "Subscription registered"
        );

        subscriptions.push(subscription);
        Ok(())
    }

    /// Replaces an existing subscription, keeping its position.
    pub async fn update(&self, subscription: Subscription) -> Result<()> {
        let mut subscriptions = self.inner.write().await;

        let slot = subscriptions
            .iter_mut()
            .find(|s| s.id == subscription.id)
            .ok_or_else(|| {
                Error::not_found()
                    .with_message(format!("subscription `{}` does not exist", subscription.id))
            })?;

        *slot = subscription;
        Ok(())
    }

    /// Removes a subscription, returning it if it existed.
    pub async fn remove(&self, id: &str) -> Option<Subscription> {
        let mut subscriptions = self.inner.write().await;
        let index = subscriptions.iter().position(|s| s.id == id)?;
        Some(subscriptions.remove(index))
    }

    /// Returns a subscription by identifier.
    pub async fn get(&self, id: &str) -> Option<Subscription> {
        let subscriptions = self.inner.read().await;
        subscriptions.iter().find(|s| s.id == id).cloned()
    }

    /// Returns all subscriptions in insertion order.
    pub async fn list(&self) -> Vec<Subscription> {
        self.inner.read().await.clone()
    }

    /// Returns the number of stored subscriptions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl SubscriptionStore for MemoryStore {
    async fn find(&self, collection: &str, op: Operation) -> Result<Vec<Subscription>> {
        let subscriptions = self.inner.read().await;

        Ok(subscriptions
            .iter()
            .filter(|s| s.matches(collection, op))
            .cloned()
            .collect())
    }
}
