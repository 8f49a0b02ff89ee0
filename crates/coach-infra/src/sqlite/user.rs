//! SQLite user repository implementation.
//!
//! A user row and its initial coach state are inserted in one transaction.

use coach_core::repository::user::UserRepository;
use coach_types::coach::CoachState;
use coach_types::error::RepositoryError;
use coach_types::user::{User, UserId};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `UserRepository`.
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserRow {
    id: String,
    display_name: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            display_name: row.try_get("display_name")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        Ok(User {
            id: UserId::from_uuid(id),
            display_name: self.display_name,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create_with_state(&self, user: &User, state: &CoachState) -> Result<(), RepositoryError> {
        let skipped = serde_json::to_string(&state.skipped_identity_categories)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query("INSERT INTO users (id, display_name, created_at) VALUES (?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.display_name)
            .bind(format_datetime(&user.created_at))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e {
                    if db_err.message().contains("UNIQUE") {
                        return RepositoryError::Conflict(format!("user {} already exists", user.id));
                    }
                }
                query_error(e)
            })?;

        sqlx::query(
            "INSERT INTO coach_states (user_id, current_phase, current_identity, skipped_identity_categories, version, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(state.user_id.to_string())
        .bind(state.current_phase.as_str())
        .bind(state.current_identity.map(|id| id.to_string()))
        .bind(skipped)
        .bind(state.version)
        .bind(format_datetime(&state.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let user_row = UserRow::from_row(&row).map_err(query_error)?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::coach_state::SqliteCoachStateRepository;
    use crate::sqlite::test_support::test_pool;
    use coach_core::repository::coach_state::CoachStateRepository;
    use coach_types::coach::CoachingPhase;

    #[tokio::test]
    async fn test_create_with_state_and_get() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool.clone());

        let user = User::new("Ada".to_string());
        repo.create_with_state(&user, &CoachState::initial(user.id))
            .await
            .unwrap();

        let loaded = repo.get(&user.id).await.unwrap().unwrap();
        assert_eq!(loaded.display_name, "Ada");
        assert_eq!(loaded.created_at, user.created_at);

        let state = SqliteCoachStateRepository::new(pool)
            .get(&user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.current_phase, CoachingPhase::Introduction);
        assert_eq!(state.version, 0);
    }

    #[tokio::test]
    async fn test_duplicate_user_conflicts_and_rolls_back() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool.clone());

        let user = User::new("Ada".to_string());
        repo.create_with_state(&user, &CoachState::initial(user.id))
            .await
            .unwrap();
        let err = repo
            .create_with_state(&user, &CoachState::initial(user.id))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM coach_states")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);
        assert!(repo.get(&UserId::new()).await.unwrap().is_none());
    }
}
