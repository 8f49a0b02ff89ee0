//! Coach turn service.
//!
//! Runs one interactive turn: persist the user's message, build the coach
//! prompt from the user's state and history, ask the oracle, apply the
//! returned actions and persist the coach's reply. Note extraction is
//! queued as soon as the user's message is stored.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use coach_types::action::{ActionScope, CoachComponent};
use coach_types::chat::{ChatMessage, ChatRole};
use coach_types::coach::CoachState;
use coach_types::identity::IdentityCategory;
use coach_types::note::UserNote;
use coach_types::user::UserId;

use super::error::CoachError;
use crate::action::{ActionDispatcher, DispatchReport};
use crate::jobs::{Job, JobQueue};
use crate::oracle::{Oracle, OracleError};
use crate::prompt::{CoachContext, NotesPlacement, PromptManager};
use crate::repository::chat::ChatRepository;
use crate::repository::coach_state::CoachStateRepository;
use crate::repository::identity::IdentityRepository;
use crate::repository::note::NoteRepository;
use crate::repository::user::UserRepository;
use crate::sentinel::{Sentinel, SentinelOutcome};

/// Outcome of one coach turn.
#[derive(Debug, Clone, Serialize)]
pub struct CoachReply {
    /// The persisted coach message.
    pub message: ChatMessage,
    /// Exact prompt text sent to the oracle.
    pub final_prompt: String,
    pub component: Option<CoachComponent>,
    pub report: DispatchReport,
}

pub struct CoachService<U, C, N, S, I, Q>
where
    U: UserRepository,
    C: ChatRepository,
    N: NoteRepository,
    S: CoachStateRepository,
    I: IdentityRepository,
    Q: JobQueue,
{
    users: U,
    chat: C,
    dispatcher: Arc<ActionDispatcher<N, S, I>>,
    sentinel: Arc<Sentinel<C, N, S, I>>,
    oracle: Arc<Oracle>,
    prompts: Arc<PromptManager>,
    jobs: Q,
}

impl<U, C, N, S, I, Q> CoachService<U, C, N, S, I, Q>
where
    U: UserRepository,
    C: ChatRepository,
    N: NoteRepository,
    S: CoachStateRepository,
    I: IdentityRepository,
    Q: JobQueue,
{
    pub fn new(
        users: U,
        chat: C,
        dispatcher: Arc<ActionDispatcher<N, S, I>>,
        sentinel: Arc<Sentinel<C, N, S, I>>,
        oracle: Arc<Oracle>,
        prompts: Arc<PromptManager>,
        jobs: Q,
    ) -> Self {
        Self {
            users,
            chat,
            dispatcher,
            sentinel,
            oracle,
            prompts,
            jobs,
        }
    }

    /// Handle an inbound user message and produce the coach's reply.
    #[tracing::instrument(name = "coach.handle_user_message", skip(self, text), fields(user_id = %user_id))]
    pub async fn handle_user_message(
        &self,
        user_id: UserId,
        text: &str,
    ) -> Result<CoachReply, CoachError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoachError::Validation("message text cannot be empty".to_string()));
        }
        self.ensure_user(user_id).await?;

        let user_message = ChatMessage::new(user_id, ChatRole::User, text.to_string());
        self.chat.append(&user_message).await?;

        // Extraction runs for every stored user message, even when the
        // rest of the turn fails.
        let job = Job::ExtractUserNotes {
            user_id,
            chat_message_id: user_message.id,
        };
        if let Err(e) = self.jobs.enqueue(job) {
            warn!(error = %e, "failed to enqueue note extraction");
        }

        let machine = self.dispatcher.machine();
        let state = machine.load(user_id).await?;
        let identities = machine.identities().list(&user_id).await?;
        let limit = self.prompts.settings().recent_message_limit as i64;
        let messages = self.chat.get_messages(&user_id, Some(limit)).await?;
        let notes = self.dispatcher.notes().list(&user_id).await?;

        let prompt = self.prompts.build_coach_prompt(
            &CoachContext {
                state: &state,
                identities: &identities,
                messages: &messages,
                notes: &notes,
            },
            NotesPlacement::Append,
        );

        let response = self.oracle.invoke(&prompt).await?;
        let reply_text = reply_text(&response)?;
        let component = reply_component(&response);

        let report = self
            .dispatcher
            .dispatch(user_id, &response, ActionScope::All)
            .await?;

        let coach_message = ChatMessage::new(user_id, ChatRole::Coach, reply_text);
        self.chat.append(&coach_message).await?;

        info!(
            phase = %state.current_phase,
            transitioned_to = ?report.transitioned_to,
            "coach turn complete"
        );

        Ok(CoachReply {
            message: coach_message,
            final_prompt: prompt.text,
            component,
            report,
        })
    }

    /// Run note extraction for `user_id` now, bypassing the job queue.
    pub async fn run_sentinel_extraction(
        &self,
        user_id: UserId,
    ) -> Result<SentinelOutcome, CoachError> {
        self.ensure_user(user_id).await?;
        Ok(self.sentinel.extract_notes(user_id).await)
    }

    pub async fn get_state(&self, user_id: UserId) -> Result<CoachState, CoachError> {
        self.ensure_user(user_id).await?;
        Ok(self.dispatcher.machine().load(user_id).await?)
    }

    /// Record that the user chose to skip an identity category. The
    /// refinement prompt lists skipped categories so the coach does not
    /// raise them again.
    pub async fn skip_category(
        &self,
        user_id: UserId,
        category: &str,
    ) -> Result<CoachState, CoachError> {
        let category: IdentityCategory = category.parse().map_err(CoachError::Validation)?;
        self.ensure_user(user_id).await?;
        let state = self
            .dispatcher
            .machine()
            .skip_category(user_id, category.as_str())
            .await?;
        info!(%category, "identity category skipped");
        Ok(state)
    }

    pub async fn list_messages(
        &self,
        user_id: UserId,
        limit: Option<i64>,
    ) -> Result<Vec<ChatMessage>, CoachError> {
        self.ensure_user(user_id).await?;
        Ok(self.chat.get_messages(&user_id, limit).await?)
    }

    pub async fn list_notes(&self, user_id: UserId) -> Result<Vec<UserNote>, CoachError> {
        self.ensure_user(user_id).await?;
        Ok(self.dispatcher.notes().list(&user_id).await?)
    }

    async fn ensure_user(&self, user_id: UserId) -> Result<(), CoachError> {
        match self.users.get(&user_id).await? {
            Some(_) => Ok(()),
            None => Err(CoachError::UserNotFound(user_id)),
        }
    }
}

fn reply_text(response: &serde_json::Value) -> Result<String, OracleError> {
    response
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .ok_or_else(|| OracleError::Malformed("coach response has no message".to_string()))
}

/// A malformed component only costs the UI hint, never the turn.
fn reply_component(response: &serde_json::Value) -> Option<CoachComponent> {
    let value = response.get("component").filter(|v| !v.is_null())?;
    serde_json::from_value(value.clone())
        .inspect_err(|e| warn!(error = %e, "ignoring malformed component"))
        .ok()
}
