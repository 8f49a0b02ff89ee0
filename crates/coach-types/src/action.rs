//! Structured oracle response shapes and the typed actions decoded from them.
//!
//! The oracle answers with a JSON object whose optional fields each map to
//! one [`Action`]. The params structs below double as the source of the JSON
//! schemas sent to the oracle (via `schemars`), so the schema and the decoder
//! can never drift apart.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::coach::CoachingPhase;

/// Response field names recognised by the dispatcher, in execution order.
pub const ADD_USER_NOTE: &str = "add_user_note";
pub const UPDATE_USER_NOTE: &str = "update_user_note";
pub const DELETE_USER_NOTE: &str = "delete_user_note";
pub const TRANSITION_STATE: &str = "transition_state";

/// Params for `add_user_note`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AddUserNoteParams {
    /// New notes to record about the user, one fact per entry.
    pub notes: Vec<String>,
}

/// A single note rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NoteUpdate {
    /// Id of an existing note.
    pub id: String,
    /// Replacement text.
    pub note: String,
}

/// Params for `update_user_note`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserNoteParams {
    pub items: Vec<NoteUpdate>,
}

/// Params for `delete_user_note`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeleteUserNoteParams {
    /// Ids of notes to remove.
    pub ids: Vec<String>,
}

/// Params for `transition_state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TransitionStateParams {
    /// Coaching phase to move the user to.
    pub to_state: CoachingPhase,
}

/// Kind of interactive element the client should render under a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Buttons,
    IdentityChoice,
}

/// Optional UI hint attached to a coach reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CoachComponent {
    pub component_type: ComponentType,
    /// Labels of the choices offered to the user.
    pub options: Vec<String>,
}

/// Structured output of an interactive coach turn.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CoachResponse {
    /// Text shown to the user.
    pub message: String,
    #[serde(default)]
    pub component: Option<CoachComponent>,
    #[serde(default)]
    pub add_user_note: Option<AddUserNoteParams>,
    #[serde(default)]
    pub update_user_note: Option<UpdateUserNoteParams>,
    #[serde(default)]
    pub delete_user_note: Option<DeleteUserNoteParams>,
    #[serde(default)]
    pub transition_state: Option<TransitionStateParams>,
}

/// Structured output of a Sentinel extraction run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SentinelResponse {
    #[serde(default)]
    pub add_user_note: Option<AddUserNoteParams>,
    #[serde(default)]
    pub update_user_note: Option<UpdateUserNoteParams>,
    #[serde(default)]
    pub delete_user_note: Option<DeleteUserNoteParams>,
}

/// A validated instruction decoded from an oracle response.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddUserNote(Vec<String>),
    UpdateUserNote(Vec<NoteUpdate>),
    DeleteUserNote(Vec<String>),
    TransitionState(CoachingPhase),
}

impl Action {
    /// Response field this action was decoded from.
    pub fn field(&self) -> &'static str {
        match self {
            Action::AddUserNote(_) => ADD_USER_NOTE,
            Action::UpdateUserNote(_) => UPDATE_USER_NOTE,
            Action::DeleteUserNote(_) => DELETE_USER_NOTE,
            Action::TransitionState(_) => TRANSITION_STATE,
        }
    }

    /// Whether this action touches only the note store.
    pub fn is_note_mutation(&self) -> bool {
        !matches!(self, Action::TransitionState(_))
    }
}

/// Which actions a dispatch is allowed to decode and apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionScope {
    /// Coach turns: note CRUD plus state transitions.
    All,
    /// Background extraction: note CRUD only.
    NotesOnly,
}
