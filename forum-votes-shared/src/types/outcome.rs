use serde::{Deserialize, Serialize};
use crate::types::{TargetRef, VoteTransition, VoteValue};

/// Result of a committed vote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub target: TargetRef,
    /// Recomputed net vote count of the target.
    pub votes: i64,
    pub transition: VoteTransition,
    /// Reputation of the target's author after the delta was applied.
    pub author_reputation: i64,
}

/// A voter's current vote on a target together with the target's count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentVote {
    pub target: TargetRef,
    pub vote: Option<VoteValue>,
    pub votes: i64,
}
