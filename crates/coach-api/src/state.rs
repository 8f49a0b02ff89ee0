//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and
//! the REST API. Services are generic over repository and queue traits;
//! AppState pins them to the SQLite and tokio implementations.

use std::path::PathBuf;
use std::sync::Arc;

use coach_core::action::ActionDispatcher;
use coach_core::coach::CoachStateMachine;
use coach_core::llm::box_provider::BoxLlmProvider;
use coach_core::lock::UserLocks;
use coach_core::oracle::{Oracle, OracleSettings};
use coach_core::prompt::{PromptManager, PromptSettings};
use coach_core::sentinel::Sentinel;
use coach_core::service::{CoachService, UserService};
use coach_infra::config::{database_url, load_config, resolve_api_key, resolve_data_dir};
use coach_infra::jobs::{JobReceiver, TokioJobQueue, job_channel};
use coach_infra::llm::create_provider;
use coach_infra::sqlite::chat::SqliteChatRepository;
use coach_infra::sqlite::coach_state::SqliteCoachStateRepository;
use coach_infra::sqlite::identity::SqliteIdentityRepository;
use coach_infra::sqlite::note::SqliteNoteRepository;
use coach_infra::sqlite::pool::DatabasePool;
use coach_infra::sqlite::user::SqliteUserRepository;
use coach_types::config::CoachConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteDispatcher =
    ActionDispatcher<SqliteNoteRepository, SqliteCoachStateRepository, SqliteIdentityRepository>;

pub type ConcreteSentinel = Sentinel<
    SqliteChatRepository,
    SqliteNoteRepository,
    SqliteCoachStateRepository,
    SqliteIdentityRepository,
>;

pub type ConcreteCoachService = CoachService<
    SqliteUserRepository,
    SqliteChatRepository,
    SqliteNoteRepository,
    SqliteCoachStateRepository,
    SqliteIdentityRepository,
    TokioJobQueue,
>;

pub type ConcreteUserService = UserService<SqliteUserRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<ConcreteUserService>,
    pub coach_service: Arc<ConcreteCoachService>,
    /// Also the handler the background job worker drains into.
    pub sentinel: Arc<ConcreteSentinel>,
    pub config: Arc<CoachConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, resolve the API key,
    /// connect to the DB, wire services.
    ///
    /// Returns the receiving end of the job queue; the caller decides
    /// whether to run a worker on it.
    pub async fn init() -> anyhow::Result<(Self, JobReceiver)> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await?;
        let api_key = resolve_api_key(&config)?;

        let db_url = database_url(&config, &data_dir);
        let db_pool = DatabasePool::new(&db_url).await?;

        let provider = create_provider(&config.oracle, api_key)?;
        tracing::debug!(
            provider = provider.name(),
            model = %config.oracle.model,
            "oracle provider ready"
        );

        Self::from_parts(config, data_dir, db_pool, provider)
    }

    /// Wire services from already-built parts.
    ///
    /// Fails when the provider cannot produce structured output.
    pub fn from_parts(
        config: CoachConfig,
        data_dir: PathBuf,
        db_pool: DatabasePool,
        provider: BoxLlmProvider,
    ) -> anyhow::Result<(Self, JobReceiver)> {
        let machine = Arc::new(CoachStateMachine::new(
            SqliteCoachStateRepository::new(db_pool.clone()),
            SqliteIdentityRepository::new(db_pool.clone()),
            UserLocks::new(),
        ));
        let dispatcher: Arc<ConcreteDispatcher> = Arc::new(ActionDispatcher::new(
            SqliteNoteRepository::new(db_pool.clone()),
            machine,
        ));

        let oracle = Arc::new(Oracle::new(provider, OracleSettings::from(&config.oracle))?);
        let prompts = Arc::new(PromptManager::new(PromptSettings::from(&config.prompt)));
        if prompts.settings().dev_mode {
            tracing::warn!("prompt dev mode is on, every prompt carries cache-bust lines");
        }

        let chat_repo = SqliteChatRepository::new(db_pool.clone());
        let sentinel = Arc::new(Sentinel::new(
            chat_repo.clone(),
            dispatcher.clone(),
            oracle.clone(),
            prompts.clone(),
        ));

        let (queue, receiver) = job_channel(config.jobs.queue_capacity);
        let user_repo = SqliteUserRepository::new(db_pool.clone());
        let coach_service = CoachService::new(
            user_repo.clone(),
            chat_repo,
            dispatcher,
            sentinel.clone(),
            oracle,
            prompts,
            queue,
        );

        let state = Self {
            user_service: Arc::new(UserService::new(user_repo)),
            coach_service: Arc::new(coach_service),
            sentinel,
            config: Arc::new(config),
            data_dir,
            db_pool,
        };
        Ok((state, receiver))
    }
}
