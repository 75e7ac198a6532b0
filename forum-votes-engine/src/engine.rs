//! This module defines the `VotingEngine` responsible for coordinating a
//! vote operation.
//! It integrates the vote state machine, the aggregate recomputation and the
//! reputation ledger, running all of them inside a single repository
//! transaction so that a vote, its target's count and its author's reputation
//! change together or not at all.
use std::sync::Arc;

use forum_votes_repository::VotesRepository;
use forum_votes_shared::types::{
    CurrentVote, TargetRef, UserId, UserIdentity, VoteOutcome, VoteValue,
};
use tracing::{debug, error, info, warn};

use crate::aggregate::recompute_vote_count;
use crate::config::VotingEngineConfig;
use crate::errors::VotingError;
use crate::ledger::{apply_reputation_delta, reputation_delta};
use crate::state::VoteCommand;

/// `VotingEngine` applies vote commands against a [`VotesRepository`].
///
/// It is cheap to share: every operation opens its own transaction, and the
/// repository serialises transactions that touch the same target.
pub struct VotingEngine {
    repository: Arc<dyn VotesRepository>,
    config: VotingEngineConfig,
}

impl VotingEngine {
    /// Creates a new `VotingEngine` with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `repository` - The repository holding votes, targets and reputation
    pub fn new(repository: Arc<dyn VotesRepository>) -> Self {
        Self::with_config(repository, VotingEngineConfig::default())
    }

    pub fn with_config(repository: Arc<dyn VotesRepository>, config: VotingEngineConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &VotingEngineConfig {
        &self.config
    }

    /// Casts an up or down vote on a target.
    ///
    /// Casting the vote the voter already holds retracts it. Casting the
    /// opposite vote switches it.
    ///
    /// # Arguments
    ///
    /// * `voter` - The verified identity of the caller, `None` if anonymous
    /// * `target` - The post or comment being voted on
    /// * `value` - The vote to cast
    ///
    /// # Returns
    ///
    /// The recomputed count, the transition applied and the author's new reputation.
    pub async fn cast_vote(
        &self,
        voter: Option<UserIdentity>,
        target: TargetRef,
        value: VoteValue,
    ) -> Result<VoteOutcome, VotingError> {
        let voter = voter.ok_or(VotingError::Unauthorized)?;
        self.execute(voter.id, target, VoteCommand::Cast(value)).await
    }

    /// Removes the voter's vote on a target.
    ///
    /// Fails with [`VotingError::VoteNotFound`] when the voter has no vote on it.
    pub async fn retract_vote(
        &self,
        voter: Option<UserIdentity>,
        target: TargetRef,
    ) -> Result<VoteOutcome, VotingError> {
        let voter = voter.ok_or(VotingError::Unauthorized)?;
        self.execute(voter.id, target, VoteCommand::Retract).await
    }

    /// Reads the caller's vote on a target and the target's current count.
    ///
    /// Anonymous callers get the count with no vote.
    pub async fn current_vote(
        &self,
        voter: Option<UserIdentity>,
        target: TargetRef,
    ) -> Result<CurrentVote, VotingError> {
        let stored = self
            .repository
            .get_target(&target)
            .await?
            .ok_or(VotingError::TargetNotFound(target))?;
        let vote = match voter {
            Some(voter) => self.repository.get_vote(voter.id, &target).await?,
            None => None,
        };
        Ok(CurrentVote { target, vote, votes: stored.vote_count })
    }

    /// Runs a command, re-running it when it loses a race to a concurrent writer.
    async fn execute(
        &self,
        voter_id: UserId,
        target: TargetRef,
        command: VoteCommand,
    ) -> Result<VoteOutcome, VotingError> {
        let retries = self.config.conflict_retries;
        let mut attempt = 0;
        loop {
            match self.execute_once(voter_id, target, command).await {
                Err(VotingError::ConcurrencyConflict(reason)) if attempt < retries => {
                    attempt += 1;
                    warn!(
                        voter_id = %voter_id,
                        target = %target,
                        attempt,
                        reason = %reason,
                        "Vote operation conflicted with a concurrent writer, retrying"
                    );
                }
                Err(VotingError::ConcurrencyConflict(reason)) => {
                    error!(
                        voter_id = %voter_id,
                        target = %target,
                        reason = %reason,
                        "Vote operation kept conflicting, giving up"
                    );
                    return Err(VotingError::ConcurrencyConflict(reason));
                }
                Err(VotingError::Storage(e)) => {
                    error!(
                        voter_id = %voter_id,
                        target = %target,
                        error = %e,
                        "Vote operation failed"
                    );
                    return Err(VotingError::Storage(e));
                }
                result => return result,
            }
        }
    }

    /// Runs a command inside one transaction.
    ///
    /// Any early return drops the transaction, which rolls back every write it made.
    async fn execute_once(
        &self,
        voter_id: UserId,
        target: TargetRef,
        command: VoteCommand,
    ) -> Result<VoteOutcome, VotingError> {
        let mut tx = self.repository.begin().await?;

        let locked = tx
            .lock_target(&target)
            .await?
            .ok_or(VotingError::TargetNotFound(target))?;

        let previous = tx.get_vote(voter_id, &target).await?;
        let transition = command
            .transition_from(previous.into())
            .ok_or(VotingError::VoteNotFound(target))?;

        let stored_previous = match transition.next {
            Some(value) => tx.upsert_vote(voter_id, &target, value).await?,
            None => tx.delete_vote(voter_id, &target).await?,
        };
        if stored_previous != previous {
            return Err(VotingError::ConcurrencyConflict(format!(
                "vote of {voter_id} on {target} changed while it was being written"
            )));
        }

        let votes = recompute_vote_count(tx.as_mut(), &target).await?;
        let expected = locked.vote_count + transition.delta();
        if votes != expected {
            warn!(
                target = %target,
                stored = locked.vote_count,
                recounted = votes,
                "Stored vote count had drifted from the vote store, replaced by recount"
            );
        }

        let delta = reputation_delta(&transition);
        let author_reputation = apply_reputation_delta(tx.as_mut(), locked.author_id, delta).await?;

        tx.commit().await?;

        info!(
            voter_id = %voter_id,
            target = %target,
            removed = transition.is_removal(),
            from = ?transition.from_state(),
            to = ?transition.to_state(),
            votes,
            author_id = %locked.author_id,
            author_reputation,
            "Vote applied"
        );
        debug!(delta, "Reputation delta applied");

        Ok(VoteOutcome { target, votes, transition, author_reputation })
    }
}
