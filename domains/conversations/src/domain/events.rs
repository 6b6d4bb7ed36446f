//! Webhook event envelope and the typed events parsed out of it
//!
//! The envelope is checked for shape by `validator`; each event kind then
//! parses its own `data` object. Nothing here touches storage.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use threadline_common::{Error, Result};

use crate::domain::entities::MessageDirection;

/// ISO-8601 layouts with an offset that RFC 3339 rejects (`+0000`, `+00`)
const OFFSET_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];

/// Naive layouts, interpreted as UTC
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Raw webhook body: `{type, timestamp, data}`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WebhookEnvelope {
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type must not be empty"))]
    pub event_type: String,

    #[validate(length(min = 1, message = "timestamp must not be empty"))]
    pub timestamp: String,

    #[validate(custom(function = "validate_data_object"))]
    pub data: serde_json::Value,
}

fn validate_data_object(data: &serde_json::Value) -> std::result::Result<(), ValidationError> {
    if data.is_object() {
        Ok(())
    } else {
        let mut err = ValidationError::new("data_not_object");
        err.message = Some("data must be a JSON object".into());
        Err(err)
    }
}

/// The event kinds the dispatcher understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    NewConversation,
    NewMessage,
    CloseConversation,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::NewConversation => "NEW_CONVERSATION",
            EventType::NewMessage => "NEW_MESSAGE",
            EventType::CloseConversation => "CLOSE_CONVERSATION",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NEW_CONVERSATION" => Ok(EventType::NewConversation),
            "NEW_MESSAGE" => Ok(EventType::NewMessage),
            "CLOSE_CONVERSATION" => Ok(EventType::CloseConversation),
            other => Err(Error::InvalidPayload(format!(
                "Unknown event type: '{}'",
                other
            ))),
        }
    }
}

/// `data` of a NEW_CONVERSATION event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewConversationData {
    pub id: Uuid,
}

/// `data` of a NEW_MESSAGE event
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessageData {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub direction: MessageDirection,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct RawNewMessageData {
    id: Uuid,
    conversation_id: Uuid,
    direction: String,
    content: String,
}

/// `data` of a CLOSE_CONVERSATION event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CloseConversationData {
    pub id: Uuid,
}

/// A fully validated webhook event
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    NewConversation {
        timestamp: DateTime<Utc>,
        data: NewConversationData,
    },
    NewMessage {
        timestamp: DateTime<Utc>,
        data: NewMessageData,
    },
    CloseConversation {
        timestamp: DateTime<Utc>,
        data: CloseConversationData,
    },
}

impl WebhookEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            WebhookEvent::NewConversation { .. } => EventType::NewConversation,
            WebhookEvent::NewMessage { .. } => EventType::NewMessage,
            WebhookEvent::CloseConversation { .. } => EventType::CloseConversation,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            WebhookEvent::NewConversation { timestamp, .. }
            | WebhookEvent::NewMessage { timestamp, .. }
            | WebhookEvent::CloseConversation { timestamp, .. } => *timestamp,
        }
    }
}

impl TryFrom<WebhookEnvelope> for WebhookEvent {
    type Error = Error;

    /// Expects an envelope that already passed `validate()`, as `ValidatedJson` guarantees.
    fn try_from(envelope: WebhookEnvelope) -> Result<Self> {
        let event_type: EventType = envelope.event_type.parse()?;
        let timestamp = parse_event_timestamp(&envelope.timestamp)?;

        let event = match event_type {
            EventType::NewConversation => WebhookEvent::NewConversation {
                timestamp,
                data: parse_data(event_type, envelope.data)?,
            },
            EventType::NewMessage => {
                let raw: RawNewMessageData = parse_data(event_type, envelope.data)?;
                WebhookEvent::NewMessage {
                    timestamp,
                    data: NewMessageData {
                        id: raw.id,
                        conversation_id: raw.conversation_id,
                        direction: raw.direction.parse()?,
                        content: raw.content,
                    },
                }
            }
            EventType::CloseConversation => WebhookEvent::CloseConversation {
                timestamp,
                data: parse_data(event_type, envelope.data)?,
            },
        };

        Ok(event)
    }
}

fn parse_data<T: DeserializeOwned>(event_type: EventType, data: serde_json::Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| Error::InvalidPayload(format!("Invalid {} data: {}", event_type, e)))
}

/// Parse an ISO-8601 event timestamp.
///
/// Offsets are honoured; timestamps without an offset are taken as UTC.
pub fn parse_event_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    if let Some(ts) = OFFSET_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Ok(ts.with_timezone(&Utc));
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            Error::InvalidPayload(format!(
                "timestamp must be an ISO-8601 date-time, got '{}'",
                raw
            ))
        })
}
