//! Conversation repository

use crate::domain::entities::{Conversation, ConversationStatus};
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreResult;

/// Column list shared by every conversation query
const CONVERSATION_COLUMNS: &str = "id, status, initiated_at, record_created_at";

#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find conversation by ID
    pub async fn find(&self, id: Uuid) -> StoreResult<Option<Conversation>> {
        let query = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1");
        let conv = sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(conv)
    }

    /// List all conversations, most recently recorded first
    pub async fn list(&self) -> StoreResult<Vec<Conversation>> {
        let query = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations \
             ORDER BY record_created_at DESC, id DESC"
        );
        let convs = sqlx::query_as::<_, Conversation>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(convs)
    }

    /// Create a new conversation
    ///
    /// Relies on the primary key to reject a second conversation with the same id.
    pub async fn create(&self, conv: &Conversation) -> StoreResult<Conversation> {
        let query = format!(
            "INSERT INTO conversations ({CONVERSATION_COLUMNS}) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CONVERSATION_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Conversation>(&query)
            .bind(conv.id)
            .bind(conv.status)
            .bind(conv.initiated_at)
            .bind(conv.record_created_at)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(conversation_id = %created.id, "Conversation row inserted");
        Ok(created)
    }

    /// Update conversation status in a single statement
    pub async fn update_status(
        &self,
        id: Uuid,
        status: ConversationStatus,
    ) -> StoreResult<Option<Conversation>> {
        let query = format!(
            "UPDATE conversations SET status = $2 \
             WHERE id = $1 \
             RETURNING {CONVERSATION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }
}
