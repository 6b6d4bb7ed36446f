//! Message repository

use crate::domain::entities::{ConversationStatus, Message};
use sqlx::PgPool;
use threadline_common::RepositoryError;
use uuid::Uuid;

use super::StoreResult;

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, event_timestamp, direction, content, record_created_at";

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List messages for a conversation, ordered by event timestamp ASC
    pub async fn list_by_conversation(&self, conversation_id: Uuid) -> StoreResult<Vec<Message>> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE conversation_id = $1 \
             ORDER BY event_timestamp ASC, record_created_at ASC"
        );
        let messages = sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }

    /// Create a new message
    ///
    /// The parent row is share-locked for the duration of the insert so a
    /// concurrent close either lands before the status check or waits for commit.
    pub async fn create(&self, msg: &Message) -> StoreResult<Message> {
        let mut tx = self.pool.begin().await?;

        let status = sqlx::query_scalar::<_, ConversationStatus>(
            "SELECT status FROM conversations WHERE id = $1 FOR SHARE",
        )
        .bind(msg.conversation_id)
        .fetch_optional(&mut *tx)
        .await?;

        match status {
            None => return Err(RepositoryError::NotFound),
            Some(ConversationStatus::Closed) => return Err(RepositoryError::Closed),
            Some(ConversationStatus::Open) => {}
        }

        let query = format!(
            "INSERT INTO messages ({MESSAGE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {MESSAGE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Message>(&query)
            .bind(msg.id)
            .bind(msg.conversation_id)
            .bind(msg.event_timestamp)
            .bind(msg.direction)
            .bind(&msg.content)
            .bind(msg.record_created_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            message_id = %created.id,
            conversation_id = %created.conversation_id,
            "Message row inserted"
        );
        Ok(created)
    }
}
