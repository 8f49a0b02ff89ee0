//! Applying decoded actions to the note store and coach state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use coach_types::action::{
    ADD_USER_NOTE, Action, ActionScope, DELETE_USER_NOTE, TRANSITION_STATE, UPDATE_USER_NOTE,
};
use coach_types::coach::CoachingPhase;
use coach_types::error::{DispatchError, RepositoryError};
use coach_types::note::UserNote;
use coach_types::user::UserId;

use super::decode::ActionBatch;
use crate::coach::CoachStateMachine;
use crate::repository::coach_state::CoachStateRepository;
use crate::repository::identity::IdentityRepository;
use crate::repository::note::NoteRepository;

/// One action item that was not applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedItem {
    /// Response field the item came from.
    pub field: &'static str,
    /// Note id, note text or phase the item targeted.
    pub target: String,
    pub reason: String,
}

/// What a dispatch actually changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchReport {
    pub notes_added: usize,
    pub notes_updated: usize,
    pub notes_deleted: usize,
    pub skipped: Vec<SkippedItem>,
    pub transitioned_to: Option<CoachingPhase>,
}

impl DispatchReport {
    pub fn is_noop(&self) -> bool {
        self.notes_added == 0
            && self.notes_updated == 0
            && self.notes_deleted == 0
            && self.transitioned_to.is_none()
    }

    fn skip(&mut self, field: &'static str, target: impl Into<String>, err: &RepositoryError) {
        let target = target.into();
        match err {
            RepositoryError::NotFound => {
                warn!(field, %target, "action target not found for user; skipping")
            }
            other => error!(field, %target, error = %other, "action item failed; skipping"),
        }
        self.skipped.push(SkippedItem {
            field,
            target,
            reason: err.to_string(),
        });
    }
}

/// Decodes oracle responses and applies them for one user at a time.
pub struct ActionDispatcher<N: NoteRepository, S: CoachStateRepository, I: IdentityRepository> {
    notes: N,
    machine: Arc<CoachStateMachine<S, I>>,
}

impl<N, S, I> ActionDispatcher<N, S, I>
where
    N: NoteRepository,
    S: CoachStateRepository,
    I: IdentityRepository,
{
    pub fn new(notes: N, machine: Arc<CoachStateMachine<S, I>>) -> Self {
        Self { notes, machine }
    }

    pub fn notes(&self) -> &N {
        &self.notes
    }

    pub fn machine(&self) -> &Arc<CoachStateMachine<S, I>> {
        &self.machine
    }

    /// Decode `response` and apply the resulting actions.
    ///
    /// A decode failure returns the error with nothing applied. Once
    /// decoded, per-item failures never abort the remaining items; they are
    /// reported in [`DispatchReport::skipped`].
    #[tracing::instrument(
        name = "dispatcher.dispatch",
        skip(self, response),
        fields(user_id = %user_id, scope = ?scope)
    )]
    pub async fn dispatch(
        &self,
        user_id: UserId,
        response: &serde_json::Value,
        scope: ActionScope,
    ) -> Result<DispatchReport, DispatchError> {
        let batch = ActionBatch::decode(response, scope)
            .inspect_err(|e| warn!(error = %e, "rejected oracle actions"))?;
        Ok(self.apply(user_id, batch).await)
    }

    /// Apply an already-validated batch under the user's lock.
    pub async fn apply(&self, user_id: UserId, batch: ActionBatch) -> DispatchReport {
        let mut report = DispatchReport::default();
        if batch.is_empty() {
            return report;
        }

        let _guard = self.machine.locks().lock(user_id).await;

        for action in batch.into_actions() {
            match action {
                Action::AddUserNote(notes) => {
                    for text in notes {
                        let note = UserNote::new(user_id, text);
                        match self.notes.create(&note).await {
                            Ok(()) => report.notes_added += 1,
                            Err(e) => report.skip(ADD_USER_NOTE, note.note, &e),
                        }
                    }
                }
                Action::UpdateUserNote(items) => {
                    for item in items {
                        let result = match parse_note_id(&item.id) {
                            Some(id) => self.notes.update(&user_id, &id, &item.note).await,
                            None => Err(RepositoryError::NotFound),
                        };
                        match result {
                            Ok(()) => report.notes_updated += 1,
                            Err(e) => report.skip(UPDATE_USER_NOTE, item.id, &e),
                        }
                    }
                }
                Action::DeleteUserNote(ids) => {
                    for raw in ids {
                        let result = match parse_note_id(&raw) {
                            Some(id) => self.notes.delete(&user_id, &id).await,
                            None => Err(RepositoryError::NotFound),
                        };
                        match result {
                            Ok(()) => report.notes_deleted += 1,
                            Err(e) => report.skip(DELETE_USER_NOTE, raw, &e),
                        }
                    }
                }
                Action::TransitionState(phase) => {
                    match self.machine.transition_to_locked(user_id, phase).await {
                        Ok(state) => report.transitioned_to = Some(state.current_phase),
                        Err(e) => report.skip(TRANSITION_STATE, phase.as_str(), &e),
                    }
                }
            }
        }

        info!(
            added = report.notes_added,
            updated = report.notes_updated,
            deleted = report.notes_deleted,
            skipped = report.skipped.len(),
            transitioned_to = ?report.transitioned_to,
            "applied oracle actions"
        );
        report
    }
}

/// Ids that are not UUIDs can never name a stored note.
fn parse_note_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}
