use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserId;

/// A durable fact about a user, written by the coach or the Sentinel.
///
/// Notes are only ever mutated through dispatched actions, always scoped
/// to the owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNote {
    pub id: Uuid,
    pub user_id: UserId,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserNote {
    pub fn new(user_id: UserId, note: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            note,
            created_at: now,
            updated_at: now,
        }
    }
}
