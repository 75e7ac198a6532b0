// Request and response bodies of the HTTP API
use std::collections::HashMap;

use forum_votes_engine::VotingError;
use forum_votes_shared::types::{Comment, Post, TargetId, User, VoteValue};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

const TITLE_MIN_CHARS: usize = 5;
const TITLE_MAX_CHARS: usize = 100;
const POST_CONTENT_MIN_CHARS: usize = 10;
const DEFAULT_PAGE_LIMIT: i64 = 10;
const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub vote_type: String,
}

impl VoteRequest {
    pub fn vote_value(&self) -> Result<VoteValue, ApiError> {
        let value = self.vote_type.parse::<VoteValue>().map_err(VotingError::from)?;
        Ok(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResponse {
    pub message: String,
    pub votes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentVoteResponse {
    pub vote: Option<VoteValue>,
    pub votes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
}

impl UpdateProfileRequest {
    pub fn validated_name(&self) -> Result<String, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::invalid_input("Name cannot be empty"));
        }
        Ok(name.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let title_len = self.title.chars().count();
        if title_len < TITLE_MIN_CHARS {
            return Err(ApiError::invalid_input(format!(
                "Title must be at least {TITLE_MIN_CHARS} characters"
            )));
        }
        if title_len > TITLE_MAX_CHARS {
            return Err(ApiError::invalid_input(format!(
                "Title must be at most {TITLE_MAX_CHARS} characters"
            )));
        }
        if self.content.chars().count() < POST_CONTENT_MIN_CHARS {
            return Err(ApiError::invalid_input(format!(
                "Content must be at least {POST_CONTENT_MIN_CHARS} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub message: String,
    pub post: Post,
}

/// Query of the post listing. Pages start at 1.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostsQuery {
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

impl PostsQuery {
    /// Resolves the defaults and checks the bounds.
    ///
    /// # Returns
    ///
    /// The `(limit, page, offset)` to query with.
    pub fn resolve(&self) -> Result<(i64, i64, i64), ApiError> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(ApiError::invalid_input(format!(
                "Limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        let page = self.page.unwrap_or(1);
        let offset = page
            .checked_sub(1)
            .filter(|skipped| *skipped >= 0)
            .and_then(|skipped| skipped.checked_mul(limit))
            .ok_or_else(|| ApiError::invalid_input("Page must be a positive number"))?;
        Ok((limit, page, offset))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: i64,
    pub pages: i64,
    pub current: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(total: i64, current: i64, limit: i64) -> Self {
        Self { total, pages: (total + limit - 1) / limit, current, limit }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

/// A comment with its replies, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

/// Nests the flat comments of a post under their parents.
///
/// Sibling order is the order of `comments`.
pub fn comment_tree(comments: Vec<Comment>) -> Vec<CommentNode> {
    fn attach(
        parent: Option<TargetId>,
        children: &mut HashMap<Option<TargetId>, Vec<Comment>>,
    ) -> Vec<CommentNode> {
        children
            .remove(&parent)
            .unwrap_or_default()
            .into_iter()
            .map(|comment| {
                let replies = attach(Some(comment.id), children);
                CommentNode { comment, replies }
            })
            .collect()
    }

    let mut children: HashMap<Option<TargetId>, Vec<Comment>> = HashMap::new();
    for comment in comments {
        children.entry(comment.parent_id).or_default().push(comment);
    }
    attach(None, &mut children)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: Post,
    pub comments: Vec<CommentNode>,
}

/// Body of both comment and reply creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

impl CreateCommentRequest {
    pub fn validate(&self, empty_message: &str) -> Result<(), ApiError> {
        if self.content.is_empty() {
            return Err(ApiError::invalid_input(empty_message));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub message: String,
    pub comment: Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub message: String,
    pub reply: Comment,
}
