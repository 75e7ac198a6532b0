use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Represents the type of vote cast by a user.
///
/// Retraction is not a vote value: a retracted vote has no row in the
/// vote store at all.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoteValue {
    /// Indicates an upvote or positive endorsement.
    Up,
    /// Indicates a downvote or negative endorsement.
    Down,
}

/// Error returned when a vote type cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid vote type: {0} (expected \"up\" or \"down\")")]
pub struct VoteValueError(pub String);

impl VoteValue {
    /// Signed contribution of this vote to a target's net count.
    pub fn signed(self) -> i64 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VoteValue::Up => "up",
            VoteValue::Down => "down",
        }
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteValue {
    type Err = VoteValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteValue::Up),
            "down" => Ok(VoteValue::Down),
            other => Err(VoteValueError(other.to_string())),
        }
    }
}
