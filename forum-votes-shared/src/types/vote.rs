use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::{TargetRef, UserId, VoteId, VoteValue};

/// Represents a user's live vote on a post or comment.
///
/// At most one `Vote` exists per `(voter_id, target)`. The row is created on
/// the first vote, its value is flipped on a switch, and it is deleted on
/// retraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub id: VoteId,
    pub voter_id: UserId,
    pub target: TargetRef,
    pub value: VoteValue,
    pub created_at: DateTime<Utc>,
}
