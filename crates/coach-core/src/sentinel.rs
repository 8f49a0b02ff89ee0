//! Sentinel: background note extraction.
//!
//! Reads a user's whole chat history plus existing notes, asks the oracle
//! which notes to add, update or delete, and applies only note actions.
//! Every failure ends in [`SentinelOutcome::Skipped`]; extraction never
//! surfaces an error to whoever triggered it.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use coach_types::action::ActionScope;
use coach_types::user::UserId;

use crate::action::{ActionDispatcher, DispatchReport};
use crate::jobs::{Job, JobHandler};
use crate::oracle::Oracle;
use crate::prompt::PromptManager;
use crate::repository::chat::ChatRepository;
use crate::repository::coach_state::CoachStateRepository;
use crate::repository::identity::IdentityRepository;
use crate::repository::note::NoteRepository;

/// Result of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SentinelOutcome {
    Applied(DispatchReport),
    Skipped { reason: String },
}

impl SentinelOutcome {
    fn skipped(reason: impl Into<String>) -> Self {
        SentinelOutcome::Skipped {
            reason: reason.into(),
        }
    }
}

pub struct Sentinel<C, N, S, I>
where
    C: ChatRepository,
    N: NoteRepository,
    S: CoachStateRepository,
    I: IdentityRepository,
{
    chat: C,
    dispatcher: Arc<ActionDispatcher<N, S, I>>,
    oracle: Arc<Oracle>,
    prompts: Arc<PromptManager>,
}

impl<C, N, S, I> Sentinel<C, N, S, I>
where
    C: ChatRepository,
    N: NoteRepository,
    S: CoachStateRepository,
    I: IdentityRepository,
{
    pub fn new(
        chat: C,
        dispatcher: Arc<ActionDispatcher<N, S, I>>,
        oracle: Arc<Oracle>,
        prompts: Arc<PromptManager>,
    ) -> Self {
        Self {
            chat,
            dispatcher,
            oracle,
            prompts,
        }
    }

    /// Run one extraction pass for `user_id`.
    ///
    /// The oracle call is made without holding the user lock; only the
    /// resulting note mutations are serialized.
    #[tracing::instrument(name = "sentinel.extract_notes", skip(self), fields(user_id = %user_id))]
    pub async fn extract_notes(&self, user_id: UserId) -> SentinelOutcome {
        let messages = match self.chat.get_messages(&user_id, None).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(error = %e, "failed to load chat history");
                return SentinelOutcome::skipped(format!("failed to load chat history: {e}"));
            }
        };
        if messages.is_empty() {
            return SentinelOutcome::skipped("no chat history");
        }

        let notes = match self.dispatcher.notes().list(&user_id).await {
            Ok(notes) => notes,
            Err(e) => {
                warn!(error = %e, "failed to load user notes");
                return SentinelOutcome::skipped(format!("failed to load user notes: {e}"));
            }
        };

        let prompt = self.prompts.build_sentinel_prompt(&messages, &notes);

        let response = match self.oracle.invoke(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "sentinel oracle call failed");
                return SentinelOutcome::skipped(e.to_string());
            }
        };

        match self
            .dispatcher
            .dispatch(user_id, &response, ActionScope::NotesOnly)
            .await
        {
            Ok(report) => {
                info!(
                    messages = messages.len(),
                    existing_notes = notes.len(),
                    added = report.notes_added,
                    updated = report.notes_updated,
                    deleted = report.notes_deleted,
                    "sentinel extraction applied"
                );
                SentinelOutcome::Applied(report)
            }
            Err(e) => {
                warn!(error = %e, "sentinel response rejected");
                SentinelOutcome::skipped(e.to_string())
            }
        }
    }
}

impl<C, N, S, I> JobHandler for Sentinel<C, N, S, I>
where
    C: ChatRepository + 'static,
    N: NoteRepository + 'static,
    S: CoachStateRepository + 'static,
    I: IdentityRepository + 'static,
{
    async fn handle(&self, job: Job) {
        match job {
            Job::ExtractUserNotes {
                user_id,
                chat_message_id,
            } => {
                tracing::debug!(%user_id, %chat_message_id, "running note extraction job");
                self.extract_notes(user_id).await;
            }
        }
    }
}
