mod forum;
mod identity;
mod outcome;
mod target;
mod transition;
mod vote;
mod vote_value;
mod votes_count;

pub use forum::{Comment, NewComment, NewPost, Post, User, UserProfile};
pub use identity::UserIdentity;
pub use outcome::{CurrentVote, VoteOutcome};
pub use target::{Target, TargetRef, TargetType, TargetTypeError};
pub use transition::{VoteState, VoteTransition};
pub use vote::Vote;
pub use vote_value::{VoteValue, VoteValueError};
pub use votes_count::VotesCount;

/// Identifier of a forum user (voter or author).
pub type UserId = uuid::Uuid;
/// Identifier of a votable target (post or comment).
pub type TargetId = uuid::Uuid;
/// Identifier of a stored vote row.
pub type VoteId = uuid::Uuid;
