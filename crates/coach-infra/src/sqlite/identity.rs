//! SQLite identity repository implementation.
//!
//! Identity notes are stored as a JSON array in a TEXT column.

use coach_core::repository::identity::IdentityRepository;
use coach_types::error::RepositoryError;
use coach_types::identity::{Identity, IdentityCategory, IdentityState};
use coach_types::user::UserId;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `IdentityRepository`.
#[derive(Debug, Clone)]
pub struct SqliteIdentityRepository {
    pool: DatabasePool,
}

impl SqliteIdentityRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct IdentityRow {
    id: String,
    user_id: String,
    name: String,
    category: String,
    state: String,
    i_am_statement: String,
    visualization: String,
    notes: String,
    created_at: String,
}

impl IdentityRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            state: row.try_get("state")?,
            i_am_statement: row.try_get("i_am_statement")?,
            visualization: row.try_get("visualization")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_identity(self) -> Result<Identity, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid identity id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;
        let category: IdentityCategory = self
            .category
            .parse()
            .map_err(RepositoryError::Query)?;
        let state: IdentityState = self
            .state
            .parse()
            .map_err(RepositoryError::Query)?;
        let notes: Vec<String> = serde_json::from_str(&self.notes)
            .map_err(|e| RepositoryError::Query(format!("invalid identity notes: {e}")))?;

        Ok(Identity {
            id,
            user_id: UserId::from_uuid(user_id),
            name: self.name,
            category,
            state,
            i_am_statement: self.i_am_statement,
            visualization: self.visualization,
            notes,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl IdentityRepository for SqliteIdentityRepository {
    async fn create(&self, identity: &Identity) -> Result<(), RepositoryError> {
        let notes = serde_json::to_string(&identity.notes)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO identities (id, user_id, name, category, state, i_am_statement, visualization, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(identity.id.to_string())
        .bind(identity.user_id.to_string())
        .bind(&identity.name)
        .bind(identity.category.as_str())
        .bind(identity.state.to_string())
        .bind(&identity.i_am_statement)
        .bind(&identity.visualization)
        .bind(notes)
        .bind(format_datetime(&identity.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<Identity>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM identities WHERE user_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut identities = Vec::with_capacity(rows.len());
        for row in &rows {
            let identity_row = IdentityRow::from_row(row).map_err(query_error)?;
            identities.push(identity_row.into_identity()?);
        }
        Ok(identities)
    }

    async fn get(
        &self,
        user_id: &UserId,
        identity_id: &Uuid,
    ) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM identities WHERE user_id = ? AND id = ?")
            .bind(user_id.to_string())
            .bind(identity_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let identity_row = IdentityRow::from_row(&row).map_err(query_error)?;
                Ok(Some(identity_row.into_identity()?))
            }
            None => Ok(None),
        }
    }

    async fn update_state(
        &self,
        user_id: &UserId,
        identity_id: &Uuid,
        state: IdentityState,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE identities SET state = ? WHERE user_id = ? AND id = ?")
            .bind(state.to_string())
            .bind(user_id.to_string())
            .bind(identity_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
