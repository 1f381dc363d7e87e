//! Data engine record representation.

use jiff::Timestamp;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::Result;

/// Keys owned by the record itself; user fields with these names are not emitted.
pub const SYSTEM_FIELDS: [&str; 4] = ["id", "collectionName", "created", "updated"];

/// A fully materialized record as handed over by the data engine.
///
/// Serializes to a flat JSON object: the system fields `id`,
/// `collectionName`, `created` and `updated` followed by the record's own
/// field values. A user field named like a system field is never written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    /// Record identifier, unique within its collection.
    pub id: String,
    /// Name of the collection the record belongs to.
    #[serde(rename = "collectionName")]
    pub collection: String,
    /// When the record was first written.
    #[serde(default)]
    pub created: Option<Timestamp>,
    /// When the record was last written.
    #[serde(default)]
    pub updated: Option<Timestamp>,
    /// User-defined field values.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Creates an empty record in the given collection.
    pub fn new(id: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
            created: None,
            updated: None,
            fields: Map::new(),
        }
    }

    /// Sets a field value. Names in [`SYSTEM_FIELDS`] are ignored.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if !is_system_field(&name) {
            self.fields.insert(name, value.into());
        }
        self
    }

    /// Sets the creation timestamp.
    pub fn with_created(mut self, created: Timestamp) -> Self {
        self.created = Some(created);
        self
    }

    /// Sets the last-modified timestamp.
    pub fn with_updated(mut self, updated: Timestamp) -> Self {
        self.updated = Some(updated);
        self
    }

    /// Returns a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns a field value if it is a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Serializes the record to its canonical JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

fn is_system_field(name: &str) -> bool {
    SYSTEM_FIELDS.contains(&name)
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("collectionName", &self.collection)?;
        if let Some(created) = &self.created {
            map.serialize_entry("created", created)?;
        }
        if let Some(updated) = &self.updated {
            map.serialize_entry("updated", updated)?;
        }

        for (name, value) in &self.fields {
            if !is_system_field(name) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}
