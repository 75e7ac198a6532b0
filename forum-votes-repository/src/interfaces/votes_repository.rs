//! This module defines the `VotesRepository` and `VotesTransaction` traits, which
//! provide an interface for the vote store, the denormalized target vote counts
//! and the author reputation ledger.
//! A vote operation runs entirely inside one `VotesTransaction` so that the vote
//! row, the recomputed count and the reputation change are applied together.
use forum_votes_shared::types::{Target, TargetRef, UserId, VoteValue, VotesCount};
use crate::errors::VotesRepositoryError;

/// A trait that defines the interface for the votes data repository.
///
/// Implementors hand out transactions for vote mutations and provide
/// non-transactional reads for presentation.
#[async_trait::async_trait]
pub trait VotesRepository: Send + Sync {
    /// Starts a new transaction.
    ///
    /// Dropping the returned transaction without calling
    /// [`VotesTransaction::commit`] discards every change made through it.
    async fn begin(&self) -> Result<Box<dyn VotesTransaction>, VotesRepositoryError>;

    /// Reads the votable projection of a post or comment, if it exists.
    async fn get_target(&self, target: &TargetRef) -> Result<Option<Target>, VotesRepositoryError>;

    /// Reads a voter's current vote on a target.
    async fn get_vote(
        &self,
        voter_id: UserId,
        target: &TargetRef,
    ) -> Result<Option<VoteValue>, VotesRepositoryError>;

    /// Checks if the tables backing the repository exist.
    async fn check_tables_created(&self) -> Result<bool, VotesRepositoryError>;
}

/// One unit of work over the vote store, targets and reputation.
///
/// Implementations serialise transactions that touch the same target: once
/// [`lock_target`](VotesTransaction::lock_target) returns, no other transaction
/// can mutate votes on that target until this one commits or is dropped.
#[async_trait::async_trait]
pub trait VotesTransaction: Send {
    /// Resolves a target and locks it for the rest of the transaction.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Target))` - The target exists and is now locked
    /// * `Ok(None)` - No such post or comment
    async fn lock_target(
        &mut self,
        target: &TargetRef,
    ) -> Result<Option<Target>, VotesRepositoryError>;

    /// Reads the voter's current vote on the target.
    async fn get_vote(
        &mut self,
        voter_id: UserId,
        target: &TargetRef,
    ) -> Result<Option<VoteValue>, VotesRepositoryError>;

    /// Inserts the vote, or overwrites the value of the existing one.
    ///
    /// # Returns
    ///
    /// The value held before the write, `None` when the row was inserted.
    async fn upsert_vote(
        &mut self,
        voter_id: UserId,
        target: &TargetRef,
        value: VoteValue,
    ) -> Result<Option<VoteValue>, VotesRepositoryError>;

    /// Deletes the voter's vote on the target.
    ///
    /// # Returns
    ///
    /// The deleted value, `None` when there was no vote.
    async fn delete_vote(
        &mut self,
        voter_id: UserId,
        target: &TargetRef,
    ) -> Result<Option<VoteValue>, VotesRepositoryError>;

    /// Counts the live upvotes and downvotes of a target.
    async fn count_votes(&mut self, target: &TargetRef) -> Result<VotesCount, VotesRepositoryError>;

    /// Writes the denormalized vote count of a target.
    async fn set_vote_count(
        &mut self,
        target: &TargetRef,
        count: i64,
    ) -> Result<(), VotesRepositoryError>;

    /// Adds `delta` to the user's reputation and returns the new value.
    ///
    /// Fails with [`VotesRepositoryError::UserNotFound`] if the user does not exist.
    async fn apply_reputation_delta(
        &mut self,
        user_id: UserId,
        delta: i64,
    ) -> Result<i64, VotesRepositoryError>;

    /// Makes every change of this transaction durable and visible.
    async fn commit(self: Box<Self>) -> Result<(), VotesRepositoryError>;
}
