//! In-memory fakes for unit tests.
//!
//! `InMemoryStore` implements every repository port over one shared set of
//! tables. Note updates and deletes do a read/yield/write cycle so that
//! unserialized concurrent writers would lose updates, which lets tests
//! observe whether callers hold the user lock.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use coach_types::chat::ChatMessage;
use coach_types::coach::CoachState;
use coach_types::error::RepositoryError;
use coach_types::identity::{Identity, IdentityState};
use coach_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, Usage,
};
use coach_types::note::UserNote;
use coach_types::user::{User, UserId};
use uuid::Uuid;

use crate::jobs::{Job, JobError, JobQueue};
use crate::llm::provider::LlmProvider;
use crate::repository::chat::ChatRepository;
use crate::repository::coach_state::CoachStateRepository;
use crate::repository::identity::IdentityRepository;
use crate::repository::note::NoteRepository;
use crate::repository::user::UserRepository;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    states: HashMap<UserId, CoachState>,
    messages: Vec<ChatMessage>,
    notes: Vec<UserNote>,
    identities: Vec<Identity>,
    fail_identity_list: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user with its initial coaching state.
    pub fn seed_user(&self, display_name: &str) -> UserId {
        let user = User::new(display_name.to_string());
        let id = user.id;
        let mut t = self.tables.lock().unwrap();
        t.states.insert(id, CoachState::initial(id));
        t.users.push(user);
        id
    }

    pub fn add_identity(&self, identity: Identity) {
        self.tables.lock().unwrap().identities.push(identity);
    }

    /// Make every subsequent identity listing fail with a query error.
    pub fn fail_identity_listing(&self) {
        self.tables.lock().unwrap().fail_identity_list = true;
    }

    pub fn identity(&self, id: Uuid) -> Option<Identity> {
        let t = self.tables.lock().unwrap();
        t.identities.iter().find(|i| i.id == id).cloned()
    }

    pub fn add_note(&self, user_id: UserId, text: &str) -> UserNote {
        let note = UserNote::new(user_id, text.to_string());
        self.tables.lock().unwrap().notes.push(note.clone());
        note
    }

    pub fn notes(&self, user_id: UserId) -> Vec<UserNote> {
        let t = self.tables.lock().unwrap();
        t.notes.iter().filter(|n| n.user_id == user_id).cloned().collect()
    }

    pub fn messages(&self, user_id: UserId) -> Vec<ChatMessage> {
        let t = self.tables.lock().unwrap();
        t.messages
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn state(&self, user_id: UserId) -> Option<CoachState> {
        self.tables.lock().unwrap().states.get(&user_id).cloned()
    }

    fn snapshot_notes(&self) -> Vec<UserNote> {
        self.tables.lock().unwrap().notes.clone()
    }

    fn replace_notes(&self, notes: Vec<UserNote>) {
        self.tables.lock().unwrap().notes = notes;
    }
}

impl UserRepository for InMemoryStore {
    async fn create_with_state(&self, user: &User, state: &CoachState) -> Result<(), RepositoryError> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.id == user.id) {
            return Err(RepositoryError::Conflict(format!("user {} exists", user.id)));
        }
        t.users.push(user.clone());
        t.states.insert(user.id, state.clone());
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<User>, RepositoryError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == *user_id).cloned())
    }
}

impl ChatRepository for InMemoryStore {
    async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.tables.lock().unwrap().messages.push(message.clone());
        Ok(())
    }

    async fn get_messages(
        &self,
        user_id: &UserId,
        limit: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let all = self.messages(*user_id);
        let skip = match limit {
            Some(n) => all.len().saturating_sub(n.max(0) as usize),
            None => 0,
        };
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn get_message(&self, message_id: &Uuid) -> Result<Option<ChatMessage>, RepositoryError> {
        let t = self.tables.lock().unwrap();
        Ok(t.messages.iter().find(|m| m.id == *message_id).cloned())
    }
}

impl NoteRepository for InMemoryStore {
    async fn create(&self, note: &UserNote) -> Result<(), RepositoryError> {
        self.tables.lock().unwrap().notes.push(note.clone());
        Ok(())
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<UserNote>, RepositoryError> {
        Ok(self.notes(*user_id))
    }

    async fn get(&self, user_id: &UserId, note_id: &Uuid) -> Result<Option<UserNote>, RepositoryError> {
        let t = self.tables.lock().unwrap();
        Ok(t.notes
            .iter()
            .find(|n| n.user_id == *user_id && n.id == *note_id)
            .cloned())
    }

    async fn update(&self, user_id: &UserId, note_id: &Uuid, note: &str) -> Result<(), RepositoryError> {
        let mut notes = self.snapshot_notes();
        tokio::task::yield_now().await;
        let target = notes
            .iter_mut()
            .find(|n| n.user_id == *user_id && n.id == *note_id)
            .ok_or(RepositoryError::NotFound)?;
        target.note = note.to_string();
        target.updated_at = Utc::now();
        self.replace_notes(notes);
        Ok(())
    }

    async fn delete(&self, user_id: &UserId, note_id: &Uuid) -> Result<(), RepositoryError> {
        let mut notes = self.snapshot_notes();
        tokio::task::yield_now().await;
        let before = notes.len();
        notes.retain(|n| !(n.user_id == *user_id && n.id == *note_id));
        if notes.len() == before {
            return Err(RepositoryError::NotFound);
        }
        self.replace_notes(notes);
        Ok(())
    }
}

impl IdentityRepository for InMemoryStore {
    async fn create(&self, identity: &Identity) -> Result<(), RepositoryError> {
        self.add_identity(identity.clone());
        Ok(())
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<Identity>, RepositoryError> {
        let t = self.tables.lock().unwrap();
        if t.fail_identity_list {
            return Err(RepositoryError::Query("identities unavailable".to_string()));
        }
        let mut list: Vec<Identity> = t
            .identities
            .iter()
            .filter(|i| i.user_id == *user_id)
            .cloned()
            .collect();
        list.sort_by_key(|i| (i.created_at, i.id));
        Ok(list)
    }

    async fn get(&self, user_id: &UserId, identity_id: &Uuid) -> Result<Option<Identity>, RepositoryError> {
        let t = self.tables.lock().unwrap();
        Ok(t.identities
            .iter()
            .find(|i| i.user_id == *user_id && i.id == *identity_id)
            .cloned())
    }

    async fn update_state(
        &self,
        user_id: &UserId,
        identity_id: &Uuid,
        state: IdentityState,
    ) -> Result<(), RepositoryError> {
        let mut t = self.tables.lock().unwrap();
        let identity = t
            .identities
            .iter_mut()
            .find(|i| i.user_id == *user_id && i.id == *identity_id)
            .ok_or(RepositoryError::NotFound)?;
        identity.state = state;
        Ok(())
    }
}

impl CoachStateRepository for InMemoryStore {
    async fn create(&self, state: &CoachState) -> Result<(), RepositoryError> {
        let mut t = self.tables.lock().unwrap();
        if t.states.contains_key(&state.user_id) {
            return Err(RepositoryError::Conflict("coach state exists".to_string()));
        }
        t.states.insert(state.user_id, state.clone());
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<CoachState>, RepositoryError> {
        Ok(self.state(*user_id))
    }

    async fn save(&self, state: &CoachState) -> Result<CoachState, RepositoryError> {
        let mut t = self.tables.lock().unwrap();
        let stored = t
            .states
            .get_mut(&state.user_id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != state.version {
            return Err(RepositoryError::Conflict(format!(
                "stale coach state version {} (current {})",
                state.version, stored.version
            )));
        }
        let mut saved = state.clone();
        saved.version += 1;
        saved.updated_at = Utc::now();
        *stored = saved.clone();
        Ok(saved)
    }
}

/// LLM provider that replays queued results and records every request.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Option<Duration>,
    capabilities: ProviderCapabilities,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            capabilities: ProviderCapabilities {
                structured_output: true,
                max_output_tokens: 8_192,
            },
        }
    }

    /// Reply with raw JSON text.
    pub fn json(values: Vec<serde_json::Value>) -> Self {
        Self::new(values.into_iter().map(|v| Ok(v.to_string())).collect())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_structured_output(mut self, supported: bool) -> Self {
        self.capabilities.structured_output = supported;
        self
    }

    /// Shared handle to the recorded requests.
    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Provider {
                    message: "no scripted response left".to_string(),
                })
            });
        let delay = self.delay;
        let model = request.model.clone();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            next.map(|content| CompletionResponse {
                id: format!("msg_{}", Uuid::now_v7()),
                content,
                model,
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }
}

/// Job queue that records submissions, or rejects them all.
#[derive(Debug, Clone, Default)]
pub struct RecordingJobQueue {
    jobs: Arc<Mutex<Vec<Job>>>,
    reject: bool,
}

impl RecordingJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().clone()
    }
}

impl JobQueue for RecordingJobQueue {
    fn enqueue(&self, job: Job) -> Result<(), JobError> {
        if self.reject {
            return Err(JobError::QueueFull);
        }
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}
