//! Chat log types.
//!
//! The chat log is append-only: messages are created by the inbound-message
//! path (role `user`) or after an oracle reply (role `coach`) and are never
//! updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::user::UserId;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Coach,
}

impl ChatRole {
    /// Speaker label used when rendering a transcript into a prompt.
    pub fn speaker(&self) -> &'static str {
        match self {
            ChatRole::User => "User",
            ChatRole::Coach => "Coach",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Coach => write!(f, "coach"),
        }
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(ChatRole::User),
            "coach" => Ok(ChatRole::Coach),
            other => Err(format!("invalid chat role: '{other}'")),
        }
    }
}

/// A single immutable turn in a user's conversation with the coach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: UserId,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Build a new message stamped with the current time.
    pub fn new(user_id: UserId, role: ChatRole, content: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            role,
            content,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_role_roundtrip() {
        for role in [ChatRole::User, ChatRole::Coach] {
            let parsed: ChatRole = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_chat_role_serde() {
        let json = serde_json::to_string(&ChatRole::Coach).unwrap();
        assert_eq!(json, "\"coach\"");
    }

    #[test]
    fn test_speaker_labels() {
        assert_eq!(ChatRole::User.speaker(), "User");
        assert_eq!(ChatRole::Coach.speaker(), "Coach");
    }
}
