//! Loosely-typed message records as delivered by message transports
//!
//! Transports hand over JSON with optional fields, mixed timestamp encodings
//! and free-form type/role names. Everything is validated into a [`Message`]
//! here so scoring and filtering only ever see well-formed data.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use super::message::{Message, MessageId, MessageType, Sender, SenderRole};

/// Reasons a raw record cannot become a [`Message`]
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MessageValidationError {
    #[error("message is missing an id")]
    MissingId,

    #[error("message {id} is missing a sender id")]
    MissingSender { id: String },

    #[error("message {id} has no valid timestamp")]
    InvalidTimestamp { id: String },

    #[error("message {id} has unknown type '{message_type}'")]
    UnknownType { id: String, message_type: String },

    #[error("malformed message record: {reason}")]
    Malformed { reason: String },
}

/// Message id as either a string or a bare number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s.trim().to_string(),
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Timestamp as epoch milliseconds (integral or fractional) or an RFC 3339 string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

impl RawTimestamp {
    fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            RawTimestamp::FractionalMillis(ms) if ms.is_finite() => {
                Utc.timestamp_millis_opt(ms.trunc() as i64).single()
            }
            RawTimestamp::FractionalMillis(_) => None,
            RawTimestamp::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSender {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "type")]
    pub message_type: Option<String>,
    #[serde(default)]
    pub sender: Option<RawSender>,
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default)]
    pub is_own: Option<bool>,
    #[serde(default)]
    pub is_recalled: Option<bool>,
}

impl TryFrom<RawMessage> for Message {
    type Error = MessageValidationError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .map(RawId::into_string)
            .filter(|id| !id.is_empty())
            .ok_or(MessageValidationError::MissingId)?;

        let sender = raw.sender.unwrap_or_default();
        let sender_id = sender
            .id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MessageValidationError::MissingSender { id: id.clone() })?;
        // Fall back to the id so sender sorting always has a name to compare
        let sender_name = sender
            .name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| sender_id.clone());
        let role = sender
            .role
            .as_deref()
            .map(SenderRole::parse)
            .unwrap_or(SenderRole::Customer);

        let sent_at = raw
            .timestamp
            .as_ref()
            .and_then(RawTimestamp::to_datetime)
            .ok_or_else(|| MessageValidationError::InvalidTimestamp { id: id.clone() })?;

        let message_type = match raw.message_type.as_deref() {
            None => MessageType::Text,
            Some(name) => MessageType::parse(name).ok_or_else(|| {
                MessageValidationError::UnknownType {
                    id: id.clone(),
                    message_type: name.to_string(),
                }
            })?,
        };

        Ok(Message {
            id: MessageId::new(id),
            content: raw.content.unwrap_or_default(),
            message_type,
            sender: Sender::new(sender_id, sender_name, role),
            sent_at,
            is_own: raw.is_own.unwrap_or(false),
            is_recalled: raw.is_recalled.unwrap_or(false),
        })
    }
}

impl TryFrom<serde_json::Value> for Message {
    type Error = MessageValidationError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let raw: RawMessage =
            serde_json::from_value(value).map_err(|e| MessageValidationError::Malformed {
                reason: e.to_string(),
            })?;
        Message::try_from(raw)
    }
}

/// Validate a batch of records, dropping (and logging) the ones that fail
///
/// Accepts typed [`RawMessage`]s or untyped JSON values; a value whose
/// fields have the wrong JSON types fails on its own without affecting the
/// rest of the batch.
pub fn validate_messages<R>(raw: Vec<R>) -> Vec<Message>
where
    Message: TryFrom<R, Error = MessageValidationError>,
{
    raw.into_iter()
        .filter_map(|r| match Message::try_from(r) {
            Ok(msg) => Some(msg),
            Err(e) => {
                log::warn!("Dropping malformed message: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Message, MessageValidationError> {
        let raw: RawMessage = serde_json::from_str(json).unwrap();
        Message::try_from(raw)
    }

    #[test]
    fn test_valid_message_with_millis() {
        let msg = parse(
            r#"{"id":"1","content":"hello","type":"text",
                "sender":{"id":"u1","name":"Alice","role":"merchant"},
                "timestamp":1700000000000,"isOwn":true}"#,
        )
        .unwrap();
        assert_eq!(msg.id.as_str(), "1");
        assert_eq!(msg.sender.role, SenderRole::Merchant);
        assert_eq!(msg.sent_at.timestamp_millis(), 1_700_000_000_000);
        assert!(msg.is_own);
        assert!(!msg.is_recalled);
    }

    #[test]
    fn test_valid_message_with_rfc3339() {
        let msg = parse(
            r#"{"id":"2","sender":{"id":"u1"},"timestamp":"2024-05-01T08:30:00+08:00"}"#,
        )
        .unwrap();
        assert_eq!(msg.content, "");
        assert_eq!(msg.message_type, MessageType::Text);
        assert_eq!(msg.sender.name, "u1");
        assert_eq!(msg.sent_at.format("%H:%M").to_string(), "00:30");
    }

    #[test]
    fn test_missing_id_rejected() {
        let err = parse(r#"{"sender":{"id":"u1"},"timestamp":1}"#).unwrap_err();
        assert_eq!(err, MessageValidationError::MissingId);
    }

    #[test]
    fn test_missing_sender_rejected() {
        let err = parse(r#"{"id":"3","timestamp":1}"#).unwrap_err();
        assert!(matches!(err, MessageValidationError::MissingSender { .. }));
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let err = parse(r#"{"id":"4","sender":{"id":"u"},"timestamp":"yesterday"}"#).unwrap_err();
        assert!(matches!(err, MessageValidationError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err =
            parse(r#"{"id":"5","type":"video","sender":{"id":"u"},"timestamp":1}"#).unwrap_err();
        assert!(matches!(err, MessageValidationError::UnknownType { .. }));
    }

    #[test]
    fn test_numeric_id_accepted() {
        let msg = parse(r#"{"id":42,"sender":{"id":"u"},"timestamp":1}"#).unwrap();
        assert_eq!(msg.id.as_str(), "42");
    }

    #[test]
    fn test_fractional_millis_accepted() {
        let msg = parse(r#"{"id":"6","sender":{"id":"u"},"timestamp":1700000000000.5}"#).unwrap();
        assert_eq!(msg.sent_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_wrongly_typed_value_dropped_alone() {
        let values: Vec<serde_json::Value> = serde_json::from_str(
            r#"[{"id":"1","sender":{"id":"u"},"timestamp":1},
                {"id":"2","sender":{"id":"u"},"timestamp":1,"isOwn":"true"},
                {"id":["x"],"sender":{"id":"u"},"timestamp":1}]"#,
        )
        .unwrap();
        let messages = validate_messages(values);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id.as_str(), "1");
    }

    #[test]
    fn test_wrong_types_are_malformed() {
        let value = serde_json::json!({"id": "1", "isOwn": "true"});
        let err = Message::try_from(value).unwrap_err();
        assert!(matches!(err, MessageValidationError::Malformed { .. }));
    }

    #[test]
    fn test_validate_messages_drops_invalid() {
        let raw: Vec<RawMessage> = serde_json::from_str(
            r#"[{"id":"1","sender":{"id":"u"},"timestamp":1},
                {"sender":{"id":"u"},"timestamp":1}]"#,
        )
        .unwrap();
        let messages = validate_messages(raw);
        assert_eq!(messages.len(), 1);
    }
}
