//! Error types for the Forum Votes service.
//! `ServerError` covers start-up failures; `ApiError` is what handlers return
//! and is rendered into an HTTP response.
mod api;

pub use api::ApiError;

/// Errors that can occur while configuring or running the service.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),
    #[error("Invalid value for {name}: {value}")]
    InvalidSetting { name: &'static str, value: String },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] forum_votes_repository::VotesRepositoryError),
    #[error("Tracing initialization failed: {0}")]
    Tracing(String),
    #[error("Server error: {0}")]
    Serve(String),
}

impl ServerError {
    pub fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidSetting { name, value: value.into() }
    }
}
