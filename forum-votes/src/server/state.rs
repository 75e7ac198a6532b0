// App state for Axum server
use std::sync::Arc;

use forum_votes_engine::VotingEngine;
use forum_votes_repository::{ForumRepository, VotesRepository};

use crate::config::Dependencies;
use crate::identity::IdentityProvider;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<VotingEngine>,
    pub votes: Arc<dyn VotesRepository>,
    pub forum: Arc<dyn ForumRepository>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl From<&Dependencies> for AppState {
    fn from(dependencies: &Dependencies) -> Self {
        Self {
            engine: dependencies.engine.clone(),
            votes: dependencies.votes_repository.clone(),
            forum: dependencies.forum_repository.clone(),
            identity: dependencies.identity.clone(),
        }
    }
}
