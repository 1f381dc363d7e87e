//! Change events handed to the dispatcher.

use jiff::Timestamp;

use crate::{Operation, Record};

/// A single create, update or delete occurrence on a record.
///
/// Built when a lifecycle hook fires and consumed by one dispatch. The
/// timestamp is taken at construction, not when the underlying write
/// happened.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Name of the collection the record belongs to.
    pub collection: String,
    /// Kind of mutation.
    pub operation: Operation,
    /// Post-commit state of the record, or its pre-removal snapshot for deletes.
    pub record: Record,
    /// When the event was handed to the dispatcher.
    pub dispatched_at: Timestamp,
}

impl ChangeEvent {
    /// Creates a new change event stamped with the current time.
    pub fn new(collection: impl Into<String>, operation: Operation, record: Record) -> Self {
        Self {
            collection: collection.into(),
            operation,
            record,
            dispatched_at: Timestamp::now(),
        }
    }

    /// Overrides the dispatch timestamp.
    pub fn with_dispatched_at(mut self, dispatched_at: Timestamp) -> Self {
        self.dispatched_at = dispatched_at;
        self
    }

    /// Returns the dispatch time as whole seconds since the Unix epoch.
    pub fn unix_time(&self) -> i64 {
        self.dispatched_at.as_second()
    }
}
