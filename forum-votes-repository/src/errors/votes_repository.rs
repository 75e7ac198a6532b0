//! Error types for the forum votes repository.
//! Defines specific errors that can occur during storage operations on votes,
//! targets and reputation.
use forum_votes_shared::types::{TargetRef, UserId};
use thiserror::Error;

/// SQLSTATE codes that indicate a lost race with a concurrent writer.
///
/// `23505` unique violation, `40001` serialization failure, `40P01` deadlock.
const CONFLICT_SQLSTATES: [&str; 3] = ["23505", "40001", "40P01"];

/// Represents errors that can occur within the forum votes repository.
///
/// `Conflict` is the only variant a caller is expected to recover from, by
/// retrying the whole operation.
#[derive(Debug, Error)]
pub enum VotesRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Concurrent write conflict: {0}")]
    Conflict(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid vote type: {0}")]
    InvalidVoteType(i16),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Target not found: {0}")]
    TargetNotFound(TargetRef),
}

impl From<sqlx::Error> for VotesRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        let is_conflict = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .is_some_and(|code| CONFLICT_SQLSTATES.contains(&code.as_ref()));

        if is_conflict {
            VotesRepositoryError::Conflict(err.to_string())
        } else {
            VotesRepositoryError::DatabaseError(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_conflicts() {
        let err = VotesRepositoryError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, VotesRepositoryError::DatabaseError(_)));
    }

    #[test]
    fn test_conflict_display() {
        let err = VotesRepositoryError::Conflict("duplicate key".to_string());
        assert_eq!(err.to_string(), "Concurrent write conflict: duplicate key");
    }
}
