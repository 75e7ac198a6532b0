use serde::{Deserialize, Serialize};
use crate::types::VoteValue;

/// State of a single `(voter, target)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteState {
    NoVote,
    VotedUp,
    VotedDown,
}

impl From<Option<VoteValue>> for VoteState {
    fn from(value: Option<VoteValue>) -> Self {
        match value {
            None => VoteState::NoVote,
            Some(VoteValue::Up) => VoteState::VotedUp,
            Some(VoteValue::Down) => VoteState::VotedDown,
        }
    }
}

impl VoteState {
    pub fn value(self) -> Option<VoteValue> {
        match self {
            VoteState::NoVote => None,
            VoteState::VotedUp => Some(VoteValue::Up),
            VoteState::VotedDown => Some(VoteValue::Down),
        }
    }
}

/// A change of one voter's vote on one target.
///
/// Both the vote-count change and the reputation change of an operation are
/// derived from the same `VoteTransition`, so they can never diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTransition {
    pub previous: Option<VoteValue>,
    pub next: Option<VoteValue>,
}

impl VoteTransition {
    pub fn new(previous: Option<VoteValue>, next: Option<VoteValue>) -> Self {
        Self { previous, next }
    }

    /// Signed change in net vote value caused by this transition.
    ///
    /// New up `+1`, new down `-1`, down to up `+2`, up to down `-2`,
    /// retracting up `-1`, retracting down `+1`.
    pub fn delta(&self) -> i64 {
        let signed = |value: Option<VoteValue>| value.map(VoteValue::signed).unwrap_or(0);
        signed(self.next) - signed(self.previous)
    }

    pub fn from_state(&self) -> VoteState {
        self.previous.into()
    }

    pub fn to_state(&self) -> VoteState {
        self.next.into()
    }

    /// True when the transition removes the voter's row from the vote store.
    pub fn is_removal(&self) -> bool {
        self.previous.is_some() && self.next.is_none()
    }
}
