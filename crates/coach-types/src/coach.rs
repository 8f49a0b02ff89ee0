//! Per-user coaching state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::user::UserId;

/// Named stage in a user's guided conversation.
///
/// Variants are declared in display order; `Ord` follows that order. The
/// ordering is for presentation only: transitions may jump anywhere.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    schemars::JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoachingPhase {
    Introduction,
    IdentityBrainstorming,
    IdentityRefinement,
    IdentityVisualization,
    ActionPlanning,
    Accountability,
}

impl CoachingPhase {
    pub const ALL: [CoachingPhase; 6] = [
        CoachingPhase::Introduction,
        CoachingPhase::IdentityBrainstorming,
        CoachingPhase::IdentityRefinement,
        CoachingPhase::IdentityVisualization,
        CoachingPhase::ActionPlanning,
        CoachingPhase::Accountability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoachingPhase::Introduction => "INTRODUCTION",
            CoachingPhase::IdentityBrainstorming => "IDENTITY_BRAINSTORMING",
            CoachingPhase::IdentityRefinement => "IDENTITY_REFINEMENT",
            CoachingPhase::IdentityVisualization => "IDENTITY_VISUALIZATION",
            CoachingPhase::ActionPlanning => "ACTION_PLANNING",
            CoachingPhase::Accountability => "ACCOUNTABILITY",
        }
    }
}

impl Default for CoachingPhase {
    fn default() -> Self {
        CoachingPhase::Introduction
    }
}

impl fmt::Display for CoachingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoachingPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoachingPhase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown coaching phase: '{s}'"))
    }
}

/// Versioned coaching state, one per user.
///
/// `version` increases by one on every persisted change and guards
/// concurrent writers (a save against a stale version is rejected).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachState {
    pub user_id: UserId,
    pub current_phase: CoachingPhase,
    /// Identity being refined. Always one of `user_id`'s own identities.
    pub current_identity: Option<Uuid>,
    /// Raw category values the user chose to skip during refinement.
    pub skipped_identity_categories: Vec<String>,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl CoachState {
    /// Initial state for a freshly created user.
    pub fn initial(user_id: UserId) -> Self {
        Self {
            user_id,
            current_phase: CoachingPhase::Introduction,
            current_identity: None,
            skipped_identity_categories: Vec::new(),
            version: 0,
            updated_at: Utc::now(),
        }
    }

    /// Whether the refinement-specific identity context applies.
    pub fn is_refining(&self) -> bool {
        self.current_phase == CoachingPhase::IdentityRefinement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_roundtrip() {
        for phase in CoachingPhase::ALL {
            let parsed: CoachingPhase = phase.to_string().parse().unwrap();
            assert_eq!(phase, parsed);
        }
    }

    #[test]
    fn test_phase_serde_screaming_snake() {
        let json = serde_json::to_string(&CoachingPhase::IdentityRefinement).unwrap();
        assert_eq!(json, "\"IDENTITY_REFINEMENT\"");
        let parsed: CoachingPhase = serde_json::from_str("\"INTRODUCTION\"").unwrap();
        assert_eq!(parsed, CoachingPhase::Introduction);
    }

    #[test]
    fn test_unknown_phase_rejected() {
        assert!("NOT_A_PHASE".parse::<CoachingPhase>().is_err());
        assert!(serde_json::from_str::<CoachingPhase>("\"NOT_A_PHASE\"").is_err());
    }

    #[test]
    fn test_phases_totally_ordered_starting_at_introduction() {
        let mut sorted = CoachingPhase::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, CoachingPhase::ALL.to_vec());
        assert_eq!(sorted[0], CoachingPhase::Introduction);
    }

    #[test]
    fn test_initial_state() {
        let state = CoachState::initial(UserId::new());
        assert_eq!(state.current_phase, CoachingPhase::Introduction);
        assert!(state.current_identity.is_none());
        assert_eq!(state.version, 0);
        assert!(!state.is_refining());
    }
}
