//! SQLite user note repository implementation.
//!
//! Every statement filters on `(user_id, id)`, so a note owned by another
//! user is indistinguishable from a missing one.

use coach_core::repository::note::NoteRepository;
use coach_types::error::RepositoryError;
use coach_types::note::UserNote;
use coach_types::user::UserId;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `NoteRepository`.
#[derive(Debug, Clone)]
pub struct SqliteNoteRepository {
    pool: DatabasePool,
}

impl SqliteNoteRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserNoteRow {
    id: String,
    user_id: String,
    note: String,
    created_at: String,
    updated_at: String,
}

impl UserNoteRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            note: row.try_get("note")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_note(self) -> Result<UserNote, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid note id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;

        Ok(UserNote {
            id,
            user_id: UserId::from_uuid(user_id),
            note: self.note,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl NoteRepository for SqliteNoteRepository {
    async fn create(&self, note: &UserNote) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO user_notes (id, user_id, note, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(note.id.to_string())
        .bind(note.user_id.to_string())
        .bind(&note.note)
        .bind(format_datetime(&note.created_at))
        .bind(format_datetime(&note.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<UserNote>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM user_notes WHERE user_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut notes = Vec::with_capacity(rows.len());
        for row in &rows {
            let note_row = UserNoteRow::from_row(row).map_err(query_error)?;
            notes.push(note_row.into_note()?);
        }
        Ok(notes)
    }

    async fn get(&self, user_id: &UserId, note_id: &Uuid) -> Result<Option<UserNote>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM user_notes WHERE user_id = ? AND id = ?")
            .bind(user_id.to_string())
            .bind(note_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let note_row = UserNoteRow::from_row(&row).map_err(query_error)?;
                Ok(Some(note_row.into_note()?))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, user_id: &UserId, note_id: &Uuid, note: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE user_notes SET note = ?, updated_at = ? WHERE user_id = ? AND id = ?",
        )
        .bind(note)
        .bind(format_datetime(&Utc::now()))
        .bind(user_id.to_string())
        .bind(note_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId, note_id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM user_notes WHERE user_id = ? AND id = ?")
            .bind(user_id.to_string())
            .bind(note_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
