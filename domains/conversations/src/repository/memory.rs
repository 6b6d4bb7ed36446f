//! In-memory conversation store
//!
//! Used by `STORAGE_BACKEND=memory` local runs and by tests. Honours the same
//! contract as the Postgres store: unique ids, the closed-conversation check
//! on message insert, and the read orderings.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use threadline_common::RepositoryError;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{Conversation, ConversationStatus, Message};

use super::{ConversationStore, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    conversations: HashMap<Uuid, Conversation>,
    /// Conversation ids in insertion order
    conversation_order: Vec<Uuid>,
    /// Messages in insertion order
    messages: Vec<Message>,
    message_ids: HashSet<Uuid>,
}

/// Conversation store backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    tables: RwLock<Tables>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages across all conversations
    pub async fn message_count(&self) -> usize {
        self.tables.read().await.messages.len()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn find_conversation(&self, id: Uuid) -> StoreResult<Option<Conversation>> {
        Ok(self.tables.read().await.conversations.get(&id).cloned())
    }

    async fn list_conversations(&self) -> StoreResult<Vec<Conversation>> {
        let tables = self.tables.read().await;

        // Newest insert first, so the stable sort breaks timestamp ties by recency
        let mut convs: Vec<Conversation> = tables
            .conversation_order
            .iter()
            .rev()
            .filter_map(|id| tables.conversations.get(id).cloned())
            .collect();
        convs.sort_by(|a, b| b.record_created_at.cmp(&a.record_created_at));

        Ok(convs)
    }

    async fn create_conversation(&self, conversation: &Conversation) -> StoreResult<Conversation> {
        let mut tables = self.tables.write().await;

        if tables.conversations.contains_key(&conversation.id) {
            return Err(RepositoryError::AlreadyExists);
        }

        tables
            .conversations
            .insert(conversation.id, conversation.clone());
        tables.conversation_order.push(conversation.id);

        Ok(conversation.clone())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ConversationStatus,
    ) -> StoreResult<Conversation> {
        let mut tables = self.tables.write().await;

        let conv = tables
            .conversations
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        conv.status = status;

        Ok(conv.clone())
    }

    async fn create_message(&self, message: &Message) -> StoreResult<Message> {
        let mut tables = self.tables.write().await;

        match tables.conversations.get(&message.conversation_id) {
            None => return Err(RepositoryError::NotFound),
            Some(conv) if conv.status == ConversationStatus::Closed => {
                return Err(RepositoryError::Closed)
            }
            Some(_) => {}
        }

        if !tables.message_ids.insert(message.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        tables.messages.push(message.clone());

        Ok(message.clone())
    }

    async fn list_messages(&self, conversation_id: Uuid) -> StoreResult<Vec<Message>> {
        let tables = self.tables.read().await;

        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.event_timestamp);

        Ok(messages)
    }
}
