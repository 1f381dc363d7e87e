//! Webhook subscription model.

use std::collections::HashMap;

use recordhook_core::{Error, Operation, Record, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

use crate::schema::{CollectionSchema, field_names, parse_url};

/// A webhook registration: deliver `op` events on `table_name` to `url`.
///
/// Subscriptions are read-only from the dispatcher's point of view. The
/// constructors enforce that the URL is an absolute `http`/`https` URL and
/// that the operation filter is one of the three mutation kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    /// Unique subscription identifier.
    pub id: String,
    /// Name of the collection whose records are watched.
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// Destination URL receiving the POST.
    pub url: Url,
    /// Operation the subscription fires on.
    pub op: Operation,
    /// Extra headers added to the outgoing request.
    #[serde(rename = "header", skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

impl Subscription {
    /// Creates a new subscription with a generated identifier.
    pub fn new(table_name: impl Into<String>, url: Url, op: Operation) -> Result<Self> {
        let table_name = table_name.into();
        if table_name.is_empty() {
            return Err(Error::invalid_input().with_message("table name cannot be empty"));
        }

        // Re-check the URL: `Url` also admits schemes we cannot POST to.
        let url = parse_url(url.as_str())?;

        Ok(Self {
            id: Uuid::now_v7().to_string(),
            table_name,
            url,
            op,
            headers: HashMap::new(),
        })
    }

    /// Builds a subscription from a stored record of the subscription collection.
    pub fn from_record(record: &Record) -> Result<Self> {
        Self::from_fields(Some(&record.id), &record.fields)
    }

    /// Builds a subscription from persisted field values.
    ///
    /// A missing or empty `id` gets a freshly generated identifier.
    pub fn from_fields(id: Option<&str>, fields: &Map<String, Value>) -> Result<Self> {
        CollectionSchema::subscriptions().validate(fields)?;

        let url = parse_url(text(fields, field_names::URL))?;
        let op = text(fields, field_names::OP).parse::<Operation>().map_err(|err| {
            Error::invalid_input()
                .with_message("invalid operation filter")
                .with_source(err)
        })?;
        let headers = parse_headers(fields.get(field_names::HEADER))?;

        let id = match id {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => Uuid::now_v7().to_string(),
        };

        Ok(Self {
            id,
            table_name: text(fields, field_names::TABLE_NAME).to_owned(),
            url,
            op,
            headers,
        })
    }

    /// Sets the subscription identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Adds a custom header to deliveries.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets multiple custom headers.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Returns whether this subscription fires for the given collection and operation.
    pub fn matches(&self, collection: &str, op: Operation) -> bool {
        self.table_name == collection && self.op == op
    }

    /// Returns whether the subscription carries custom headers.
    pub fn has_custom_headers(&self) -> bool {
        !self.headers.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for Subscription {
    type Error = Error;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self> {
        let id = match fields.remove(field_names::ID) {
            Some(Value::String(id)) => Some(id),
            None | Some(Value::Null) => None,
            Some(_) => {
                return Err(Error::invalid_input().with_message("field `id` must be a string"));
            }
        };

        Self::from_fields(id.as_deref(), &fields)
    }
}

/// Reads a string field; presence and type were checked by the schema.
fn text<'a>(fields: &'a Map<String, Value>, name: &str) -> &'a str {
    fields.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// Reads the optional header map; every value must be a string.
fn parse_headers(value: Option<&Value>) -> Result<HashMap<String, String>> {
    let object = match value {
        None | Some(Value::Null) => return Ok(HashMap::new()),
        Some(Value::Object(object)) => object,
        Some(_) => {
            return Err(Error::invalid_input().with_message("field `header` must be an object"));
        }
    };

    object
        .iter()
        .map(|(name, value)| match value.as_str() {
            Some(value) => Ok((name.clone(), value.to_owned())),
            None => Err(Error::invalid_input()
                .with_message(format!("header `{name}` must have a string value"))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use recordhook_core::ErrorKind;
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_new_generates_id() {
        let url = Url::parse("http://sink.example/hook").unwrap();
        let first = Subscription::new("orders", url.clone(), Operation::Update).unwrap();
        let second = Subscription::new("orders", url, Operation::Update).unwrap();

        assert!(!first.id.is_empty());
        assert_ne!(first.id, second.id);
        assert!(first.matches("orders", Operation::Update));
        assert!(!first.matches("orders", Operation::Insert));
        assert!(!first.matches("invoices", Operation::Update));
    }

    #[test]
    fn test_new_rejects_empty_table() {
        let url = Url::parse("http://sink.example/hook").unwrap();
        let error = Subscription::new("", url, Operation::Insert).unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_new_rejects_non_http_url() {
        let url = Url::parse("file:///tmp/hook").unwrap();
        assert!(Subscription::new("orders", url, Operation::Insert).is_err());
    }

    #[test]
    fn test_from_record() {
        let record = Record::new("sub1", "hooks")
            .with_field("tableName", "orders")
            .with_field("url", "http://sink.example/hook")
            .with_field("op", "update")
            .with_field("header", json!({"Authorization": "Bearer abc"}));

        let subscription = Subscription::from_record(&record).unwrap();

        assert_eq!(subscription.id, "sub1");
        assert_eq!(subscription.table_name, "orders");
        assert_eq!(subscription.url.as_str(), "http://sink.example/hook");
        assert_eq!(subscription.op, Operation::Update);
        assert_eq!(
            subscription.headers.get("Authorization").map(String::as_str),
            Some("Bearer abc")
        );
    }

    #[test]
    fn test_try_from_without_id() {
        let subscription = Subscription::try_from(fields(json!({
            "tableName": "orders",
            "url": "https://sink.example/hook",
            "op": "delete",
        })))
        .unwrap();

        assert!(!subscription.id.is_empty());
        assert!(!subscription.has_custom_headers());
    }

    #[test]
    fn test_rejects_non_string_header() {
        let error = Subscription::try_from(fields(json!({
            "tableName": "orders",
            "url": "https://sink.example/hook",
            "op": "insert",
            "header": {"X-Retries": 3},
        })))
        .unwrap_err();

        assert!(error.to_string().contains("X-Retries"));
    }

    #[test]
    fn test_rejects_invalid_url() {
        let error = Subscription::try_from(fields(json!({
            "tableName": "orders",
            "url": "sink.example/hook",
            "op": "insert",
        })))
        .unwrap_err();

        assert_eq!(error.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_serializes_persisted_names() {
        let url = Url::parse("http://sink.example/hook").unwrap();
        let subscription = Subscription::new("orders", url, Operation::Update)
            .unwrap()
            .with_id("sub1")
            .with_header("X-Token", "t");

        let value = serde_json::to_value(&subscription).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "sub1",
                "tableName": "orders",
                "url": "http://sink.example/hook",
                "op": "update",
                "header": {"X-Token": "t"},
            })
        );
    }
}
