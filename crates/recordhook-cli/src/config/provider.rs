//! Service construction from CLI configuration.

use anyhow::Context;
use recordhook_core::Record;
use recordhook_store::MemoryStore;
use recordhook_webhook::WebhookService;
use recordhook_webhook::reqwest::ReqwestClient;
use serde_json::{Map, Value};

use super::Cli;

/// Loads the subscription store from the configured file.
pub async fn create_store(cli: &Cli) -> anyhow::Result<MemoryStore> {
    MemoryStore::from_json_file(&cli.subscriptions)
        .await
        .with_context(|| format!("failed to load `{}`", cli.subscriptions.display()))
}

/// Creates the webhook service used for delivery.
pub fn create_webhook_service(cli: &Cli) -> anyhow::Result<WebhookService> {
    let client = ReqwestClient::new(cli.http.clone()).context("failed to create HTTP client")?;
    Ok(client.into_service())
}

/// Parses a record given on the command line.
///
/// The collection name is filled in from `collection` unless the JSON
/// already names one.
pub fn parse_record(collection: &str, raw: &str) -> anyhow::Result<Record> {
    let mut fields: Map<String, Value> =
        serde_json::from_str(raw).context("record must be a JSON object")?;

    fields
        .entry("collectionName")
        .or_insert_with(|| Value::String(collection.to_owned()));

    serde_json::from_value(Value::Object(fields)).context("record must carry a string `id`")
}
