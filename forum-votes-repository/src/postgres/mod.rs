//! PostgreSQL implementation of the forum votes repository.
//!
//! ## Database Tables
//!
//! - `users`: Forum users and their reputation counters
//! - `posts`, `comments`: Votable targets with a denormalized `votes` column
//! - `votes`: One row per voter and target, unique on `(voter_id, target_id, target_type)`
//!
//! The schema lives in `src/postgres/migrations` and is applied with
//! [`PostgresVotesRepository::migrate`].
mod forum_repository;
mod votes_repository;

pub use forum_repository::PostgresForumRepository;
pub use votes_repository::{PostgresVotesRepository, PostgresVotesTransaction};

use forum_votes_shared::types::{TargetType, VoteValue};
use crate::VotesRepositoryError;

/// Table holding the rows of a target type. Only ever returns static names.
pub(crate) fn target_table(target_type: TargetType) -> &'static str {
    match target_type {
        TargetType::Post => "posts",
        TargetType::Comment => "comments",
    }
}

pub(crate) fn encode_vote_value(value: VoteValue) -> i16 {
    match value {
        VoteValue::Up => 0,
        VoteValue::Down => 1,
    }
}

pub(crate) fn decode_vote_value(value: i16) -> Result<VoteValue, VotesRepositoryError> {
    match value {
        0 => Ok(VoteValue::Up),
        1 => Ok(VoteValue::Down),
        other => Err(VotesRepositoryError::InvalidVoteType(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_value_codec() {
        for value in [VoteValue::Up, VoteValue::Down] {
            assert_eq!(decode_vote_value(encode_vote_value(value)).unwrap(), value);
        }
        assert!(matches!(
            decode_vote_value(2),
            Err(VotesRepositoryError::InvalidVoteType(2))
        ));
    }
}
