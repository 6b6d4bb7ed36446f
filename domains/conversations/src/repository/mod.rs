//! Storage for the Conversations domain
//!
//! Handlers and the dispatcher only see [`ConversationStore`]; the Postgres
//! and in-memory backends both honour the same contract.

pub mod conversations;
pub mod memory;
pub mod messages;

use async_trait::async_trait;
use sqlx::PgPool;
use threadline_common::RepositoryError;
use uuid::Uuid;

use crate::domain::entities::{Conversation, ConversationStatus, Message};

pub use conversations::ConversationRepository;
pub use memory::InMemoryConversationStore;
pub use messages::MessageRepository;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, RepositoryError>;

/// Persistence contract for conversations and their messages
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Find conversation by ID
    async fn find_conversation(&self, id: Uuid) -> StoreResult<Option<Conversation>>;

    /// All conversations, most recently persisted first
    async fn list_conversations(&self) -> StoreResult<Vec<Conversation>>;

    /// Insert a conversation; an existing id yields `AlreadyExists`
    async fn create_conversation(&self, conversation: &Conversation) -> StoreResult<Conversation>;

    /// Set a conversation's status; a missing id yields `NotFound`
    async fn update_status(&self, id: Uuid, status: ConversationStatus)
        -> StoreResult<Conversation>;

    /// Insert a message.
    ///
    /// Fails with `NotFound` if the parent conversation is missing, `Closed` if
    /// it is closed, and `AlreadyExists` on a duplicate message id. The parent
    /// check and the insert happen atomically.
    async fn create_message(&self, message: &Message) -> StoreResult<Message>;

    /// Messages for a conversation ordered by event timestamp ascending
    async fn list_messages(&self, conversation_id: Uuid) -> StoreResult<Vec<Message>>;
}

/// PostgreSQL-backed store composed of the per-table repositories
#[derive(Clone)]
pub struct PgConversationStore {
    pub conversations: ConversationRepository,
    pub messages: MessageRepository,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            conversations: ConversationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
        }
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn find_conversation(&self, id: Uuid) -> StoreResult<Option<Conversation>> {
        self.conversations.find(id).await
    }

    async fn list_conversations(&self) -> StoreResult<Vec<Conversation>> {
        self.conversations.list().await
    }

    async fn create_conversation(&self, conversation: &Conversation) -> StoreResult<Conversation> {
        self.conversations.create(conversation).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ConversationStatus,
    ) -> StoreResult<Conversation> {
        self.conversations
            .update_status(id, status)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_message(&self, message: &Message) -> StoreResult<Message> {
        self.messages.create(message).await
    }

    async fn list_messages(&self, conversation_id: Uuid) -> StoreResult<Vec<Message>> {
        self.messages.list_by_conversation(conversation_id).await
    }
}
