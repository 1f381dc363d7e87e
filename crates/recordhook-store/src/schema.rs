//! Persisted layout of the subscription collection.
//!
//! The administration layer creates the collection from
//! [`CollectionSchema::subscriptions`] at bootstrap; the same description is
//! used to validate stored subscription records before they are handed to
//! the dispatcher.

use recordhook_core::{Error, Operation, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

/// Name of the collection holding webhook subscriptions.
pub const SUBSCRIPTION_COLLECTION: &str = "hooks";

/// Persisted field names of the subscription collection.
pub mod field_names {
    /// Subscription identifier.
    pub const ID: &str = "id";
    /// Target collection name.
    pub const TABLE_NAME: &str = "tableName";
    /// Destination URL.
    pub const URL: &str = "url";
    /// Operation filter.
    pub const OP: &str = "op";
    /// Extra request headers.
    pub const HEADER: &str = "header";
}

/// Storage type of a collection field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free-form string.
    Text,
    /// Absolute URL string.
    Url,
    /// One or more values out of a fixed list.
    Select,
    /// Arbitrary JSON value.
    Json,
}

/// Options of a [`FieldType::Select`] field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptions {
    /// Maximum number of values a record may pick.
    pub max_select: usize,
    /// Allowed values.
    pub values: Vec<&'static str>,
}

/// A single field of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    /// Persisted field name.
    pub name: &'static str,
    /// Storage type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether a record must carry a non-empty value.
    pub required: bool,
    /// Select options, for [`FieldType::Select`] fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SelectOptions>,
}

impl SchemaField {
    fn new(name: &'static str, field_type: FieldType, required: bool) -> Self {
        Self {
            name,
            field_type,
            required,
            options: None,
        }
    }

    fn with_options(mut self, options: SelectOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Checks a single value against this field's type and options.
    fn validate(&self, value: Option<&Value>) -> Result<()> {
        let value = match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(value) => Some(value),
        };

        let Some(value) = value else {
            if self.required {
                return Err(Error::invalid_input()
                    .with_message(format!("field `{}` is required", self.name)));
            }
            return Ok(());
        };

        match self.field_type {
            FieldType::Text => {
                value.as_str().ok_or_else(|| self.type_error("a string"))?;
            }
            FieldType::Url => {
                let raw = value.as_str().ok_or_else(|| self.type_error("a URL string"))?;
                parse_url(raw).map_err(|err| err.with_context(self.name))?;
            }
            FieldType::Select => {
                let picked = value.as_str().ok_or_else(|| self.type_error("a string"))?;
                let allowed = self
                    .options
                    .as_ref()
                    .is_some_and(|options| options.values.contains(&picked));
                if !allowed {
                    return Err(Error::invalid_input().with_message(format!(
                        "field `{}` does not allow value `{picked}`",
                        self.name
                    )));
                }
            }
            FieldType::Json => {}
        }

        Ok(())
    }

    fn type_error(&self, expected: &str) -> Error {
        Error::invalid_input().with_message(format!("field `{}` must be {expected}", self.name))
    }
}

/// Description of a persisted collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSchema {
    /// Collection name.
    pub name: &'static str,
    /// Field definitions, in declaration order.
    pub fields: Vec<SchemaField>,
}

impl CollectionSchema {
    /// Returns the schema of the subscription collection.
    pub fn subscriptions() -> Self {
        let operations = Operation::ALL.iter().map(Operation::as_str).collect();

        Self {
            name: SUBSCRIPTION_COLLECTION,
            fields: vec![
                SchemaField::new(field_names::ID, FieldType::Text, true),
                SchemaField::new(field_names::TABLE_NAME, FieldType::Text, true),
                SchemaField::new(field_names::URL, FieldType::Url, true),
                SchemaField::new(field_names::OP, FieldType::Select, true).with_options(
                    SelectOptions {
                        max_select: 1,
                        values: operations,
                    },
                ),
                SchemaField::new(field_names::HEADER, FieldType::Json, false),
            ],
        }
    }

    /// Returns the field with the given name.
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Validates the user-defined fields of a stored record.
    ///
    /// The `id` system field is skipped: the store assigns it when absent.
    pub fn validate(&self, fields: &Map<String, Value>) -> Result<()> {
        self.fields
            .iter()
            .filter(|field| field.name != field_names::ID)
            .try_for_each(|field| field.validate(fields.get(field.name)))
    }
}

/// Parses a destination URL, accepting only absolute `http`/`https` URLs with a host.
pub fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|err| {
        Error::invalid_input()
            .with_message(format!("invalid URL `{raw}`"))
            .with_source(err)
    })?;

    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(Error::invalid_input().with_message(format!("invalid URL `{raw}`")));
    }

    Ok(url)
}
