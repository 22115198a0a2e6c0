//! Trigger event envelope.
//!
//! One invocation is driven by one JSON event describing a stored
//! inbound message and its original recipients. The envelope is
//! validated strictly before any external I/O: exactly one record, with
//! the expected source and version tags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TriggerError;

/// Expected `source` tag on every record.
pub const EVENT_SOURCE: &str = "inbound-email";

/// Expected `version` tag on every record.
pub const EVENT_VERSION: &str = "1.0";

/// The raw event envelope as delivered by the trigger framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEvent {
    #[serde(default)]
    pub records: Vec<TriggerRecord>,
}

/// One inbound-message record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub source: String,
    pub version: String,
    /// Key of the raw message in the message store.
    pub message_id: String,
    /// Original envelope recipients.
    pub recipients: Vec<String>,
    /// CC addresses shared across all forwarded copies of this message.
    #[serde(default)]
    pub cc: Vec<String>,
    /// When the message was received (metadata only).
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

impl TriggerEvent {
    /// Deserialize an event from JSON without validating it.
    pub fn from_json(json: &str) -> Result<Self, TriggerError> {
        serde_json::from_str(json).map_err(|e| TriggerError::Malformed(e.to_string()))
    }

    /// Validate the envelope and take its single record.
    pub fn into_record(mut self) -> Result<TriggerRecord, TriggerError> {
        if self.records.len() != 1 {
            return Err(TriggerError::WrongRecordCount(self.records.len()));
        }
        let record = self.records.swap_remove(0);
        if record.source != EVENT_SOURCE {
            return Err(TriggerError::WrongSource(record.source));
        }
        if record.version != EVENT_VERSION {
            return Err(TriggerError::WrongVersion(record.version));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, version: &str) -> TriggerRecord {
        TriggerRecord {
            source: source.into(),
            version: version.into(),
            message_id: "msg-1".into(),
            recipients: vec!["info@example.com".into()],
            cc: vec![],
            received_at: None,
        }
    }

    #[test]
    fn valid_single_record() {
        let event = TriggerEvent {
            records: vec![record(EVENT_SOURCE, EVENT_VERSION)],
        };
        let rec = event.into_record().unwrap();
        assert_eq!(rec.message_id, "msg-1");
        assert_eq!(rec.recipients, vec!["info@example.com"]);
    }

    #[test]
    fn zero_records_rejected() {
        let event = TriggerEvent { records: vec![] };
        assert!(matches!(
            event.into_record(),
            Err(TriggerError::WrongRecordCount(0))
        ));
    }

    #[test]
    fn multiple_records_rejected() {
        let event = TriggerEvent {
            records: vec![
                record(EVENT_SOURCE, EVENT_VERSION),
                record(EVENT_SOURCE, EVENT_VERSION),
            ],
        };
        assert!(matches!(
            event.into_record(),
            Err(TriggerError::WrongRecordCount(2))
        ));
    }

    #[test]
    fn wrong_source_rejected() {
        let event = TriggerEvent {
            records: vec![record("webhook", EVENT_VERSION)],
        };
        assert!(matches!(
            event.into_record(),
            Err(TriggerError::WrongSource(_))
        ));
    }

    #[test]
    fn wrong_version_rejected() {
        let event = TriggerEvent {
            records: vec![record(EVENT_SOURCE, "2.0")],
        };
        assert!(matches!(
            event.into_record(),
            Err(TriggerError::WrongVersion(_))
        ));
    }

    #[test]
    fn parses_json_with_optional_fields_defaulted() {
        let event = TriggerEvent::from_json(
            r#"{"records": [{"source": "inbound-email", "version": "1.0",
                "message_id": "abc", "recipients": ["a@b.com"]}]}"#,
        )
        .unwrap();
        let rec = event.into_record().unwrap();
        assert!(rec.cc.is_empty());
        assert!(rec.received_at.is_none());
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(
            TriggerEvent::from_json("not json"),
            Err(TriggerError::Malformed(_))
        ));
    }
}
