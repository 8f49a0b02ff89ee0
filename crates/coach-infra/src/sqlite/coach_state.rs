//! SQLite coach state repository implementation.
//!
//! Saves are optimistic: `UPDATE ... WHERE version = ?` succeeds only if no
//! other writer got there first.

use coach_core::repository::coach_state::CoachStateRepository;
use coach_types::coach::{CoachState, CoachingPhase};
use coach_types::error::RepositoryError;
use coach_types::user::UserId;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `CoachStateRepository`.
#[derive(Debug, Clone)]
pub struct SqliteCoachStateRepository {
    pool: DatabasePool,
}

impl SqliteCoachStateRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct CoachStateRow {
    user_id: String,
    current_phase: String,
    current_identity: Option<String>,
    skipped_identity_categories: String,
    version: i64,
    updated_at: String,
}

impl CoachStateRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            current_phase: row.try_get("current_phase")?,
            current_identity: row.try_get("current_identity")?,
            skipped_identity_categories: row.try_get("skipped_identity_categories")?,
            version: row.try_get("version")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_state(self) -> Result<CoachState, RepositoryError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;
        let current_phase: CoachingPhase = self
            .current_phase
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let current_identity = self
            .current_identity
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid current_identity: {e}")))?;
        let skipped_identity_categories: Vec<String> =
            serde_json::from_str(&self.skipped_identity_categories).map_err(|e| {
                RepositoryError::Query(format!("invalid skipped_identity_categories: {e}"))
            })?;

        Ok(CoachState {
            user_id: UserId::from_uuid(user_id),
            current_phase,
            current_identity,
            skipped_identity_categories,
            version: self.version,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn encode_skipped(state: &CoachState) -> Result<String, RepositoryError> {
    serde_json::to_string(&state.skipped_identity_categories)
        .map_err(|e| RepositoryError::Query(e.to_string()))
}

impl CoachStateRepository for SqliteCoachStateRepository {
    async fn create(&self, state: &CoachState) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO coach_states (user_id, current_phase, current_identity, skipped_identity_categories, version, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(state.user_id.to_string())
        .bind(state.current_phase.as_str())
        .bind(state.current_identity.map(|id| id.to_string()))
        .bind(encode_skipped(state)?)
        .bind(state.version)
        .bind(format_datetime(&state.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.message().contains("UNIQUE") {
                    return RepositoryError::Conflict(format!(
                        "coach state already exists for user {}",
                        state.user_id
                    ));
                }
            }
            query_error(e)
        })?;

        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<CoachState>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM coach_states WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let state_row = CoachStateRow::from_row(&row).map_err(query_error)?;
                Ok(Some(state_row.into_state()?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, state: &CoachState) -> Result<CoachState, RepositoryError> {
        let mut saved = state.clone();
        saved.version = state.version + 1;
        saved.updated_at = Utc::now();

        let result = sqlx::query(
            "UPDATE coach_states
             SET current_phase = ?, current_identity = ?, skipped_identity_categories = ?,
                 version = ?, updated_at = ?
             WHERE user_id = ? AND version = ?",
        )
        .bind(saved.current_phase.as_str())
        .bind(saved.current_identity.map(|id| id.to_string()))
        .bind(encode_skipped(&saved)?)
        .bind(saved.version)
        .bind(format_datetime(&saved.updated_at))
        .bind(state.user_id.to_string())
        .bind(state.version)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return match self.get(&state.user_id).await? {
                Some(current) => Err(RepositoryError::Conflict(format!(
                    "stale coach state for user {}: version {} (current {})",
                    state.user_id, state.version, current.version
                ))),
                None => Err(RepositoryError::NotFound),
            };
        }

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_support::{seed_user, test_pool};

    #[tokio::test]
    async fn test_save_increments_version() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "Ada").await;
        let repo = SqliteCoachStateRepository::new(pool);

        let mut state = repo.get(&user).await.unwrap().unwrap();
        state.current_phase = CoachingPhase::ActionPlanning;
        state.skipped_identity_categories = vec!["spiritual".to_string()];
        let saved = repo.save(&state).await.unwrap();
        assert_eq!(saved.version, 1);

        let loaded = repo.get(&user).await.unwrap().unwrap();
        assert_eq!(loaded.current_phase, CoachingPhase::ActionPlanning);
        assert_eq!(loaded.skipped_identity_categories, vec!["spiritual".to_string()]);
        assert_eq!(loaded.version, 1);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "Ada").await;
        let repo = SqliteCoachStateRepository::new(pool);

        let stale = repo.get(&user).await.unwrap().unwrap();
        repo.save(&stale).await.unwrap();

        let err = repo.save(&stale).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_save_missing_state_not_found() {
        let pool = test_pool().await;
        let repo = SqliteCoachStateRepository::new(pool);
        let err = repo.save(&CoachState::initial(UserId::new())).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "Ada").await;
        let repo = SqliteCoachStateRepository::new(pool);
        let err = repo.create(&CoachState::initial(user)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
