//! Dependency initialization and wiring for the forum votes service.
use std::sync::Arc;

use forum_votes_engine::{VotingEngine, VotingEngineConfig};
use forum_votes_repository::{
    ForumRepository, InMemoryRepository, PostgresForumRepository, PostgresVotesRepository,
    VotesRepository,
};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::config::{Settings, StorageBackend};
use crate::errors::ServerError;
use crate::identity::{HeaderIdentityProvider, IdentityProvider};

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub votes_repository: Arc<dyn VotesRepository>,
    pub forum_repository: Arc<dyn ForumRepository>,
    pub engine: Arc<VotingEngine>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl Dependencies {
    /// Initialize all dependencies from the service settings.
    ///
    /// For the postgres backend this connects the pool and, unless disabled,
    /// applies the bundled migrations before anything else touches the database.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ServerError)` - If the database is unreachable or migrations fail
    pub async fn new(settings: &Settings) -> Result<Self, ServerError> {
        match settings.storage_backend {
            StorageBackend::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .ok_or(ServerError::MissingSetting("DATABASE_URL"))?;

                info!(
                    max_connections = settings.database_max_connections,
                    "Connecting to PostgreSQL"
                );
                let pool = PgPoolOptions::new()
                    .max_connections(settings.database_max_connections)
                    .connect(database_url)
                    .await?;

                let votes = PostgresVotesRepository::new(pool.clone()).await?;
                if settings.run_migrations {
                    votes.migrate().await?;
                    info!("Database migrations applied");
                } else if !votes.check_tables_created().await? {
                    warn!("Database tables are missing and RUN_MIGRATIONS is disabled");
                }
                let forum = PostgresForumRepository::new(pool).await?;

                Ok(Self::wire(Arc::new(votes), Arc::new(forum), settings))
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage, all data is lost on shutdown");
                Ok(Self::in_memory(InMemoryRepository::new(), settings))
            }
        }
    }

    /// Wires the service over an existing in-memory repository.
    pub fn in_memory(repository: InMemoryRepository, settings: &Settings) -> Self {
        Self::wire(Arc::new(repository.clone()), Arc::new(repository), settings)
    }

    fn wire(
        votes_repository: Arc<dyn VotesRepository>,
        forum_repository: Arc<dyn ForumRepository>,
        settings: &Settings,
    ) -> Self {
        let engine = VotingEngine::with_config(
            votes_repository.clone(),
            VotingEngineConfig::with_conflict_retries(settings.vote_conflict_retries),
        );
        let identity = HeaderIdentityProvider::new(settings.user_id_header.clone());

        info!(
            backend = ?settings.storage_backend,
            identity_header = %settings.user_id_header,
            conflict_retries = engine.config().conflict_retries,
            "Dependencies initialized"
        );

        Self {
            votes_repository,
            forum_repository,
            engine: Arc::new(engine),
            identity: Arc::new(identity),
        }
    }
}
