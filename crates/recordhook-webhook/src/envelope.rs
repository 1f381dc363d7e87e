//! Delivery envelope sent to subscribers.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jiff::Timestamp;
use recordhook_core::{ChangeEvent, Error, Operation, Result};
use serde::{Deserialize, Serialize};

/// JSON body POSTed to a subscriber.
///
/// ```json
/// {"op": "update", "record": "eyJpZCI6Im8xIiwi...", "time": 1718000000}
/// ```
///
/// `record` is the record's canonical JSON, base64 encoded (standard
/// alphabet, padded) and carried as an opaque string. `time` is the moment
/// the envelope was built, in whole seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEnvelope {
    /// Mutation kind.
    pub op: Operation,
    /// Encoded record payload.
    pub record: String,
    /// Envelope construction time.
    pub time: i64,
}

impl DeliveryEnvelope {
    /// Creates an envelope around an already serialized record.
    pub fn new(op: Operation, record: &[u8], time: Timestamp) -> Self {
        Self {
            op,
            record: STANDARD.encode(record),
            time: time.as_second(),
        }
    }

    /// Builds the envelope for a change event.
    ///
    /// The time is the event's dispatch time, never a timestamp carried by
    /// the record itself.
    pub fn from_event(event: &ChangeEvent) -> Result<Self> {
        let record = event.record.to_json_bytes()?;
        Ok(Self::new(event.operation, &record, event.dispatched_at))
    }

    /// Serializes the envelope to its wire format.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes the embedded record payload back into bytes.
    pub fn record_bytes(&self) -> Result<Vec<u8>> {
        STANDARD.decode(&self.record).map_err(|err| {
            Error::serialization()
                .with_message("record payload is not valid base64")
                .with_source(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use recordhook_core::Record;
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn test_wire_format() {
        let time: Timestamp = "2024-06-10T06:13:20Z".parse().unwrap();
        let envelope = DeliveryEnvelope::new(Operation::Insert, b"{\"id\":\"o1\"}", time);

        let value: Value = serde_json::from_slice(&envelope.to_json_bytes().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "op": "insert",
                "record": "eyJpZCI6Im8xIn0=",
                "time": 1718000000,
            })
        );
    }

    #[test]
    fn test_from_event_uses_dispatch_time() {
        let written: Timestamp = "2001-09-09T01:46:40Z".parse().unwrap();
        let record = Record::new("o1", "orders")
            .with_updated(written)
            .with_field("total", 10);
        let event = ChangeEvent::new("orders", Operation::Update, record.clone());

        let envelope = DeliveryEnvelope::from_event(&event).unwrap();

        assert_eq!(envelope.op, Operation::Update);
        assert_eq!(envelope.time, event.dispatched_at.as_second());
        assert_ne!(envelope.time, written.as_second());

        let decoded: Record = serde_json::from_slice(&envelope.record_bytes().unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_record_bytes_rejects_garbage() {
        let envelope = DeliveryEnvelope {
            op: Operation::Delete,
            record: "not base64!".to_owned(),
            time: 0,
        };

        assert!(envelope.record_bytes().is_err());
    }
}
