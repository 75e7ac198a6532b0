//! Forum entities that own vote counts and reputation.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::{Target, TargetId, TargetRef, UserId};

/// A forum user with its reputation counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub reputation: i64,
    pub created_at: DateTime<Utc>,
}

/// Profile data used to register or rename a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: TargetId,
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPost {
    pub author_id: UserId,
    pub title: String,
    pub content: String,
}

/// A comment on a post. Replies carry the id of their parent comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: TargetId,
    pub post_id: TargetId,
    pub parent_id: Option<TargetId>,
    pub author_id: UserId,
    pub content: String,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: TargetId,
    pub parent_id: Option<TargetId>,
    pub author_id: UserId,
    pub content: String,
}

impl From<&Post> for Target {
    fn from(post: &Post) -> Self {
        Target {
            target: TargetRef::post(post.id),
            author_id: post.author_id,
            vote_count: post.votes,
        }
    }
}

impl From<&Comment> for Target {
    fn from(comment: &Comment) -> Self {
        Target {
            target: TargetRef::comment(comment.id),
            author_id: comment.author_id,
            vote_count: comment.votes,
        }
    }
}
