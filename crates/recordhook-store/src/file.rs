//! Loading subscriptions from a JSON file.
//!
//! The file holds an array of stored subscription records using the
//! persisted field names:
//!
//! ```json
//! [
//!   {"id": "sub1", "tableName": "orders", "url": "http://sink.example/hook", "op": "update"},
//!   {"tableName": "orders", "url": "http://sink.example/hook", "op": "delete",
//!    "header": {"Authorization": "Bearer abc"}}
//! ]
//! ```

use std::path::Path;

use recordhook_core::{Error, Result};
use serde_json::{Map, Value};

use crate::{MemoryStore, Subscription, TRACING_TARGET};

impl MemoryStore {
    /// Loads a store from a JSON file of subscription records.
    ///
    /// Every entry is validated; the first invalid one aborts loading.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            Error::configuration()
                .with_message(format!("cannot read subscriptions file `{}`", path.display()))
                .with_source(err)
        })?;

        let subscriptions = parse_subscriptions(&bytes)?;

        tracing::info!(
            target: TRACING_TARGET,
            path = %path.display(),
            count = subscriptions.len(),
            "Loaded subscriptions"
        );

        Self::with_subscriptions(subscriptions).await
    }
}

/// Parses a JSON array of subscription records.
pub(crate) fn parse_subscriptions(bytes: &[u8]) -> Result<Vec<Subscription>> {
    let entries: Vec<Map<String, Value>> = serde_json::from_slice(bytes).map_err(|err| {
        Error::configuration()
            .with_message("subscriptions file must hold a JSON array of objects")
            .with_source(err)
    })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            Subscription::try_from(entry)
                .map_err(|err| err.within(format!("subscription #{index}")))
        })
        .collect()
}
