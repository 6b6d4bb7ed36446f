//! Webhook event dispatcher
//!
//! Routes each [`WebhookEvent`] to its handler, applies the conversation
//! rules, and persists through the injected [`ConversationStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use threadline_common::{Error, RepositoryError, Result};
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message};
use crate::domain::events::{
    CloseConversationData, EventType, NewConversationData, NewMessageData, WebhookEvent,
};
use crate::repository::ConversationStore;

/// Result of a successfully handled event
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub event_type: EventType,
    /// Identifier of the conversation or message acted on
    pub id: Uuid,
    pub message: String,
    /// Whether a new record was created
    pub created: bool,
}

#[derive(Clone)]
pub struct EventDispatcher {
    store: Arc<dyn ConversationStore>,
}

impl EventDispatcher {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Route an event to its handler
    pub async fn dispatch(&self, event: WebhookEvent) -> Result<DispatchOutcome> {
        match event {
            WebhookEvent::NewConversation { timestamp, data } => {
                self.handle_new_conversation(data, timestamp).await
            }
            WebhookEvent::NewMessage { timestamp, data } => {
                self.handle_new_message(data, timestamp).await
            }
            WebhookEvent::CloseConversation { timestamp, data } => {
                self.handle_close_conversation(data, timestamp).await
            }
        }
    }

    /// NEW_CONVERSATION: open a conversation under the upstream id
    pub async fn handle_new_conversation(
        &self,
        data: NewConversationData,
        event_timestamp: DateTime<Utc>,
    ) -> Result<DispatchOutcome> {
        let conversation = Conversation::open(data.id, event_timestamp);

        let created = self
            .store
            .create_conversation(&conversation)
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists => {
                    Error::Conflict(format!("Conversation {} already exists", data.id))
                }
                other => other.into(),
            })?;

        info!(conversation_id = %created.id, initiated_at = %created.initiated_at, "Conversation opened");

        Ok(DispatchOutcome {
            event_type: EventType::NewConversation,
            id: created.id,
            message: "Conversation created".to_string(),
            created: true,
        })
    }

    /// NEW_MESSAGE: append a message to an open conversation
    pub async fn handle_new_message(
        &self,
        data: NewMessageData,
        event_timestamp: DateTime<Utc>,
    ) -> Result<DispatchOutcome> {
        let conversation_id = data.conversation_id;
        let not_found = || Error::NotFound(format!("Conversation {} not found", conversation_id));

        let conversation = self
            .store
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(not_found)?;

        conversation.ensure_accepts_messages()?;

        let message = Message::new(
            data.id,
            conversation_id,
            event_timestamp,
            data.direction,
            data.content,
        );

        // The store re-checks the parent atomically; a close racing this insert lands here
        let created = self
            .store
            .create_message(&message)
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists => {
                    Error::Conflict(format!("Message {} already exists", data.id))
                }
                RepositoryError::NotFound => not_found(),
                RepositoryError::Closed => Error::ClosedConversation(format!(
                    "Conversation {} is closed and does not accept new messages",
                    conversation_id
                )),
                other => other.into(),
            })?;

        info!(
            message_id = %created.id,
            conversation_id = %conversation_id,
            direction = %created.direction,
            "Message recorded"
        );

        Ok(DispatchOutcome {
            event_type: EventType::NewMessage,
            id: created.id,
            message: "Message created".to_string(),
            created: true,
        })
    }

    /// CLOSE_CONVERSATION: move the conversation to CLOSED
    ///
    /// Closing an already-closed conversation succeeds without writing.
    pub async fn handle_close_conversation(
        &self,
        data: CloseConversationData,
        event_timestamp: DateTime<Utc>,
    ) -> Result<DispatchOutcome> {
        let not_found = || Error::NotFound(format!("Conversation {} not found", data.id));

        let mut conversation = self
            .store
            .find_conversation(data.id)
            .await?
            .ok_or_else(not_found)?;

        if !conversation.close()? {
            info!(conversation_id = %data.id, "Conversation already closed");
            return Ok(DispatchOutcome {
                event_type: EventType::CloseConversation,
                id: data.id,
                message: "Conversation already closed".to_string(),
                created: false,
            });
        }

        self.store
            .update_status(data.id, conversation.status)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => not_found(),
                other => other.into(),
            })?;

        info!(conversation_id = %data.id, closed_at = %event_timestamp, "Conversation closed");

        Ok(DispatchOutcome {
            event_type: EventType::CloseConversation,
            id: data.id,
            message: "Conversation closed".to_string(),
            created: false,
        })
    }
}
