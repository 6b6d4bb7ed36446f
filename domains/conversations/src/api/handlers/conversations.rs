//! Conversation read API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use threadline_common::{Error, Result};
use uuid::Uuid;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::{Conversation, ConversationStatus, Message, MessageDirection};

/// Conversation list item
#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub status: ConversationStatus,
    pub initiated_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationSummary {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            status: c.status,
            initiated_at: c.initiated_at,
        }
    }
}

/// Message as nested in a conversation detail
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub direction: MessageDirection,
    pub content: String,
}

impl From<Message> for MessageView {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            timestamp: m.event_timestamp,
            direction: m.direction,
            content: m.content,
        }
    }
}

/// Conversation with its messages
#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    pub id: Uuid,
    pub status: ConversationStatus,
    pub initiated_at: DateTime<Utc>,
    pub messages: Vec<MessageView>,
}

impl ConversationDetail {
    pub fn new(conversation: Conversation, messages: Vec<Message>) -> Self {
        Self {
            id: conversation.id,
            status: conversation.status,
            initiated_at: conversation.initiated_at,
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }
}

/// List all conversations, most recently recorded first
pub async fn list_conversations(
    State(state): State<ConversationsState>,
) -> Result<Json<Vec<ConversationSummary>>> {
    let convs = state.store.list_conversations().await?;

    let responses: Vec<ConversationSummary> = convs.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Get a single conversation with its messages
pub async fn get_conversation(
    State(state): State<ConversationsState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ConversationDetail>> {
    let not_found = || Error::NotFound(format!("Conversation {} not found", raw_id));

    // A malformed id cannot name a conversation
    let id = Uuid::parse_str(&raw_id).map_err(|_| not_found())?;

    let conv = state
        .store
        .find_conversation(id)
        .await?
        .ok_or_else(not_found)?;

    let messages = state.store.list_messages(id).await?;

    Ok(Json(ConversationDetail::new(conv, messages)))
}
