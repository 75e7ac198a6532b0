//! The reputation ledger.
//!
//! Reputation is a derived running total: each vote transition adds its signed
//! delta to the target author's reputation. The delta is taken from the same
//! [`VoteTransition`] as the vote-count change.
use forum_votes_repository::{VotesRepositoryError, VotesTransaction};
use forum_votes_shared::types::{UserId, VoteTransition};

/// Reputation change caused by a transition on one of the author's targets.
pub fn reputation_delta(transition: &VoteTransition) -> i64 {
    transition.delta()
}

/// Adds `delta` to the author's reputation and returns the new total.
///
/// A zero delta still reads the author back so the caller always gets the
/// current total.
pub async fn apply_reputation_delta(
    tx: &mut dyn VotesTransaction,
    author_id: UserId,
    delta: i64,
) -> Result<i64, VotesRepositoryError> {
    tx.apply_reputation_delta(author_id, delta).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use forum_votes_shared::types::VoteValue::{Down, Up};

    #[test]
    fn test_reputation_follows_vote_delta() {
        assert_eq!(reputation_delta(&VoteTransition::new(None, Some(Up))), 1);
        assert_eq!(reputation_delta(&VoteTransition::new(Some(Up), Some(Down))), -2);
        assert_eq!(reputation_delta(&VoteTransition::new(Some(Down), None)), 1);
        assert_eq!(reputation_delta(&VoteTransition::new(None, None)), 0);
    }
}
