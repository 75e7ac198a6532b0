use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use forum_votes_engine::VotingError;
use forum_votes_repository::VotesRepositoryError;
use serde_json::json;
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong";

/// Errors returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Voting(#[from] VotingError),
    #[error(transparent)]
    Repository(#[from] VotesRepositoryError),
    #[error("Unauthorized")]
    Unauthorized,
    /// Malformed request: bad JSON, bad id, failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn invalid_input(details: impl Into<String>) -> Self {
        Self::InvalidInput(details.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::Voting(VotingError::Unauthorized) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::InvalidInput(_) | ApiError::Voting(VotingError::InvalidInput(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_)
            | ApiError::Voting(VotingError::TargetNotFound(_))
            | ApiError::Voting(VotingError::VoteNotFound(_))
            | ApiError::Repository(VotesRepositoryError::TargetNotFound(_))
            | ApiError::Repository(VotesRepositoryError::UserNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Voting(_) | ApiError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            ApiError::InvalidInput(details)
            | ApiError::Voting(VotingError::InvalidInput(details)) => {
                json!({ "error": "Invalid input", "details": details })
            }
            ApiError::Repository(VotesRepositoryError::TargetNotFound(target)) => {
                json!({ "error": format!("{} not found", target.target_type.label()) })
            }
            ApiError::Repository(VotesRepositoryError::UserNotFound(_)) => {
                json!({ "error": "User not found" })
            }
            _ if self.status() == StatusCode::INTERNAL_SERVER_ERROR => {
                json!({ "error": INTERNAL_ERROR_MESSAGE })
            }
            _ => json!({ "error": self.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
