use crate::types::{TargetId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The kind of content a vote is cast on.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Post,
    Comment,
}

/// Error returned when a persisted target type discriminant is unknown.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid target type: {0}")]
pub struct TargetTypeError(pub i16);

impl TargetType {
    /// Small-integer encoding used by the storage layer.
    pub fn as_i16(self) -> i16 {
        match self {
            TargetType::Post => 0,
            TargetType::Comment => 1,
        }
    }

    /// Human readable name, capitalised for error messages ("Post not found").
    pub fn label(self) -> &'static str {
        match self {
            TargetType::Post => "Post",
            TargetType::Comment => "Comment",
        }
    }
}

impl TryFrom<i16> for TargetType {
    type Error = TargetTypeError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TargetType::Post),
            1 => Ok(TargetType::Comment),
            other => Err(TargetTypeError(other)),
        }
    }
}

/// Identifies a votable item: the pair `(target_id, target_type)`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TargetRef {
    pub id: TargetId,
    pub target_type: TargetType,
}

impl TargetRef {
    pub fn post(id: TargetId) -> Self {
        Self { id, target_type: TargetType::Post }
    }

    pub fn comment(id: TargetId) -> Self {
        Self { id, target_type: TargetType::Comment }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target_type.label().to_lowercase(), self.id)
    }
}

/// The votable projection of a post or comment.
///
/// `vote_count` is the denormalized net count; it is only ever written by the
/// aggregate recomputation step of the voting engine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    pub target: TargetRef,
    pub author_id: UserId,
    pub vote_count: i64,
}
