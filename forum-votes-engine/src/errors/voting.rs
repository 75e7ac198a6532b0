//! Error types for the voting engine.
//! Defines the error taxonomy of a single vote operation.
use forum_votes_repository::VotesRepositoryError;
use forum_votes_shared::types::{TargetRef, VoteValueError};
use thiserror::Error;

/// Represents errors that can occur within a vote operation.
///
/// Every error is local to one operation. Nothing is rolled back across
/// requests: a failed operation leaves storage exactly as it found it.
#[derive(Debug, Error)]
pub enum VotingError {
    /// No verified identity was supplied.
    #[error("Unauthorized")]
    Unauthorized,

    /// The request was malformed, e.g. an unknown vote type.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{} not found", .0.target_type.label())]
    TargetNotFound(TargetRef),

    /// Retraction was requested but the voter holds no vote on the target.
    #[error("Vote not found")]
    VoteNotFound(TargetRef),

    /// A concurrent writer won the race on the same vote row.
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Storage failure: {0}")]
    Storage(VotesRepositoryError),
}

impl From<VotesRepositoryError> for VotingError {
    fn from(err: VotesRepositoryError) -> Self {
        match err {
            VotesRepositoryError::Conflict(reason) => VotingError::ConcurrencyConflict(reason),
            other => VotingError::Storage(other),
        }
    }
}

impl From<VoteValueError> for VotingError {
    fn from(err: VoteValueError) -> Self {
        VotingError::InvalidInput(err.to_string())
    }
}
