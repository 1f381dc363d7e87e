#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod file;
mod memory;
mod subscription;

pub mod schema;

pub use memory::MemoryStore;
pub use recordhook_core::{Error, ErrorKind, Operation, Result};
pub use schema::{CollectionSchema, SUBSCRIPTION_COLLECTION};
pub use subscription::Subscription;

/// Tracing target for subscription store operations.
pub const TRACING_TARGET: &str = "recordhook_store";

/// Read side of the subscription store consumed by the dispatcher.
///
/// Implementations may be backed by a database with arbitrary latency and
/// are called concurrently without coordination.
#[async_trait::async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Finds subscriptions registered for `collection` and `op`.
    ///
    /// An empty vector means nothing is subscribed; an error means the
    /// store itself could not answer.
    async fn find(&self, collection: &str, op: Operation) -> Result<Vec<Subscription>>;
}
