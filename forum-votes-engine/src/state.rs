//! The vote state machine of a single `(voter, target)` pair.
//!
//! ```text
//! NoVote    --cast(Up)-->   VotedUp      NoVote    --cast(Down)--> VotedDown
//! VotedUp   --cast(Up)-->   NoVote       VotedDown --cast(Down)--> NoVote
//! VotedUp   --cast(Down)--> VotedDown    VotedDown --cast(Up)-->   VotedUp
//! VotedUp   --retract-->    NoVote       VotedDown --retract-->    NoVote
//! ```
//!
//! Casting the vote already held retracts it. Retracting from `NoVote` is an error.
use forum_votes_shared::types::{VoteState, VoteTransition, VoteValue};

/// A request against the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteCommand {
    Cast(VoteValue),
    Retract,
}

impl VoteCommand {
    /// Computes the transition this command causes from `current`.
    ///
    /// Returns `None` when the command is a retraction and there is no vote to retract.
    pub fn transition_from(self, current: VoteState) -> Option<VoteTransition> {
        let previous = current.value();
        let next = match self {
            VoteCommand::Cast(value) if previous == Some(value) => None,
            VoteCommand::Cast(value) => Some(value),
            VoteCommand::Retract => {
                previous?;
                None
            }
        };
        Some(VoteTransition::new(previous, next))
    }
}
