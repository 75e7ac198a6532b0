use serde::{Deserialize, Serialize};

/// Represents the aggregated live votes of a single target.
///
/// This struct is the result of a full recount over the vote store: the
/// number of live upvotes and downvotes for a particular post or comment.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VotesCount {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VotesCount {
    /// Net vote count: upvotes minus downvotes.
    pub fn net(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}
