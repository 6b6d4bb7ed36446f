//! Domain entities for Conversations domain
//!
//! Conversations and messages are keyed by identifiers issued by the upstream
//! messaging platform; nothing in here generates an id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use threadline_common::{Error, Result};

use crate::domain::state::{ConversationEvent, ConversationState, ConversationStateMachine};

/// Conversation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "conversation_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ConversationStatus {
    #[default]
    Open,
    Closed,
}

impl ConversationStatus {
    /// Convert to state machine state
    pub fn to_state(self) -> ConversationState {
        match self {
            Self::Open => ConversationState::Open,
            Self::Closed => ConversationState::Closed,
        }
    }

    /// Convert from state machine state
    pub fn from_state(state: ConversationState) -> Self {
        match state {
            ConversationState::Open => Self::Open,
            ConversationState::Closed => Self::Closed,
        }
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationStatus::Open => write!(f, "OPEN"),
            ConversationStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Message direction relative to the platform account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_direction", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageDirection {
    Sent,
    Received,
}

impl std::fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageDirection::Sent => write!(f, "SENT"),
            MessageDirection::Received => write!(f, "RECEIVED"),
        }
    }
}

impl FromStr for MessageDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SENT" => Ok(MessageDirection::Sent),
            "RECEIVED" => Ok(MessageDirection::Received),
            other => Err(Error::InvalidPayload(format!(
                "direction must be SENT or RECEIVED, got '{}'",
                other
            ))),
        }
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub status: ConversationStatus,
    /// Timestamp of the NEW_CONVERSATION event
    pub initiated_at: DateTime<Utc>,
    /// When this row was first persisted locally
    pub record_created_at: DateTime<Utc>,
}

impl Conversation {
    /// Open a new conversation under the upstream identifier
    pub fn open(id: Uuid, initiated_at: DateTime<Utc>) -> Self {
        Conversation {
            id,
            status: ConversationStatus::default(),
            initiated_at,
            record_created_at: Utc::now(),
        }
    }

    /// Reject if the conversation no longer accepts messages
    pub fn ensure_accepts_messages(&self) -> Result<()> {
        ConversationStateMachine::transition(self.status.to_state(), ConversationEvent::AppendMessage)
            .map(|_| ())
            .map_err(|_| {
                Error::ClosedConversation(format!(
                    "Conversation {} is closed and does not accept new messages",
                    self.id
                ))
            })
    }

    /// Close the conversation.
    ///
    /// Returns `false` when the conversation was already closed and nothing changed.
    pub fn close(&mut self) -> Result<bool> {
        let current = self.status.to_state();
        let next = ConversationStateMachine::transition(current, ConversationEvent::Close)
            .map_err(|e| Error::Internal(e.to_string()))?;

        self.status = ConversationStatus::from_state(next);
        Ok(current != next)
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    /// Timestamp of the NEW_MESSAGE event, used for ordering
    pub event_timestamp: DateTime<Utc>,
    pub direction: MessageDirection,
    pub content: String,
    pub record_created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message bound to an existing conversation
    pub fn new(
        id: Uuid,
        conversation_id: Uuid,
        event_timestamp: DateTime<Utc>,
        direction: MessageDirection,
        content: String,
    ) -> Self {
        Message {
            id,
            conversation_id,
            event_timestamp,
            direction,
            content,
            record_created_at: Utc::now(),
        }
    }
}
