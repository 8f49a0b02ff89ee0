//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `coach-core` using sqlx with split read/write pools.
//! The log is append-only.

use coach_core::repository::chat::ChatRepository;
use coach_types::chat::{ChatMessage, ChatRole};
use coach_types::error::RepositoryError;
use coach_types::user::UserId;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Debug, Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain ChatMessage.
struct ChatMessageRow {
    id: String,
    user_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;
        let role: ChatRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatMessage {
            id,
            user_id: UserId::from_uuid(user_id),
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl ChatRepository for SqliteChatRepository {
    async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO chat_messages (id, user_id, role, content, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.user_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn get_messages(
        &self,
        user_id: &UserId,
        limit: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        // Newest N first, then flipped back to chronological order.
        // LIMIT -1 means no limit in SQLite.
        let rows = sqlx::query(
            "SELECT * FROM (
                 SELECT * FROM chat_messages WHERE user_id = ?
                 ORDER BY created_at DESC, id DESC LIMIT ?
             ) ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id.to_string())
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = ChatMessageRow::from_row(row).map_err(query_error)?;
            messages.push(msg_row.into_message()?);
        }
        Ok(messages)
    }

    async fn get_message(&self, message_id: &Uuid) -> Result<Option<ChatMessage>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_messages WHERE id = ?")
            .bind(message_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let msg_row = ChatMessageRow::from_row(&row).map_err(query_error)?;
                Ok(Some(msg_row.into_message()?))
            }
            None => Ok(None),
        }
    }
}
