//! Identity records and their refinement lifecycle.
//!
//! An identity is a user-authored self-concept ("I am a maker of music")
//! that the coach helps refine. Identities are created outside the coaching
//! core; the core reads them, picks which one to refine next, and advances
//! their `state`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::user::UserId;

/// Life area an identity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityCategory {
    PassionsAndTalents,
    MakerOfMoney,
    KeeperOfMoney,
    Spiritual,
    PersonalAppearance,
    PhysicalExpression,
    FamilialRelations,
    RomanticRelation,
    DoerOfThings,
}

impl IdentityCategory {
    /// Every category, in display order.
    pub const ALL: [IdentityCategory; 9] = [
        IdentityCategory::PassionsAndTalents,
        IdentityCategory::MakerOfMoney,
        IdentityCategory::KeeperOfMoney,
        IdentityCategory::Spiritual,
        IdentityCategory::PersonalAppearance,
        IdentityCategory::PhysicalExpression,
        IdentityCategory::FamilialRelations,
        IdentityCategory::RomanticRelation,
        IdentityCategory::DoerOfThings,
    ];

    /// Stored/serialized value.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityCategory::PassionsAndTalents => "passions_and_talents",
            IdentityCategory::MakerOfMoney => "maker_of_money",
            IdentityCategory::KeeperOfMoney => "keeper_of_money",
            IdentityCategory::Spiritual => "spiritual",
            IdentityCategory::PersonalAppearance => "personal_appearance",
            IdentityCategory::PhysicalExpression => "physical_expression",
            IdentityCategory::FamilialRelations => "familial_relations",
            IdentityCategory::RomanticRelation => "romantic_relation",
            IdentityCategory::DoerOfThings => "doer_of_things",
        }
    }

    /// Human-readable label shown to the model and in UIs.
    pub fn label(&self) -> &'static str {
        match self {
            IdentityCategory::PassionsAndTalents => "Passions and Talents",
            IdentityCategory::MakerOfMoney => "Maker of Money",
            IdentityCategory::KeeperOfMoney => "Keeper of Money",
            IdentityCategory::Spiritual => "Spiritual",
            IdentityCategory::PersonalAppearance => "Personal Appearance",
            IdentityCategory::PhysicalExpression => "Physical Expression",
            IdentityCategory::FamilialRelations => "Familial Relations",
            IdentityCategory::RomanticRelation => "Romantic Relation",
            IdentityCategory::DoerOfThings => "Doer of Things",
        }
    }
}

/// Label for a raw category value, falling back to the value itself when it
/// is not a known category. Never fails.
pub fn category_label(raw: &str) -> String {
    raw.parse::<IdentityCategory>()
        .map(|c| c.label().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

impl fmt::Display for IdentityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        IdentityCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("invalid identity category: '{s}'"))
    }
}

/// Refinement lifecycle of an identity.
///
/// `Pending` → `Refinement` → `RefinementComplete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityState {
    Pending,
    Refinement,
    RefinementComplete,
}

impl Default for IdentityState {
    fn default() -> Self {
        IdentityState::Pending
    }
}

impl fmt::Display for IdentityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityState::Pending => write!(f, "pending"),
            IdentityState::Refinement => write!(f, "refinement"),
            IdentityState::RefinementComplete => write!(f, "refinement_complete"),
        }
    }
}

impl FromStr for IdentityState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(IdentityState::Pending),
            "refinement" => Ok(IdentityState::Refinement),
            "refinement_complete" => Ok(IdentityState::RefinementComplete),
            other => Err(format!("invalid identity state: '{other}'")),
        }
    }
}

/// A user-authored identity under refinement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub category: IdentityCategory,
    pub state: IdentityState,
    /// "I am ..." affirmation; empty until written.
    pub i_am_statement: String,
    /// Free-form visualization text; empty until written.
    pub visualization: String,
    /// Ordered free-text notes attached to this identity.
    pub notes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Create a fresh pending identity with no statement or notes.
    pub fn new(user_id: UserId, name: String, category: IdentityCategory) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            name,
            category,
            state: IdentityState::Pending,
            i_am_statement: String::new(),
            visualization: String::new(),
            notes: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether this identity still needs refinement work.
    pub fn needs_refinement(&self) -> bool {
        self.state != IdentityState::RefinementComplete
    }
}
