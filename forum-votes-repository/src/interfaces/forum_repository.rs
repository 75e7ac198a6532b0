use forum_votes_shared::types::{
    Comment, NewComment, NewPost, Post, TargetId, User, UserId, UserProfile,
};
use crate::errors::VotesRepositoryError;

/// Trait for interacting with the forum's users, posts and comments.
///
/// This trait provides the target repository capabilities the voting engine relies on:
/// targets must exist before they can be voted on, and authors must exist to receive
/// reputation.
#[async_trait::async_trait]
pub trait ForumRepository: Send + Sync {
    /// Creates the user or renames it if it already exists. Reputation is preserved.
    async fn upsert_user(&self, profile: &UserProfile) -> Result<User, VotesRepositoryError>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>, VotesRepositoryError>;
    async fn create_post(&self, post: &NewPost) -> Result<Post, VotesRepositoryError>;
    async fn get_post(&self, id: TargetId) -> Result<Option<Post>, VotesRepositoryError>;

    /// Lists posts newest first.
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of posts returned
    /// * `offset` - Number of newer posts skipped
    async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>, VotesRepositoryError>;

    /// Total number of posts.
    async fn count_posts(&self) -> Result<i64, VotesRepositoryError>;

    /// Creates a comment or a reply. Fails with `TargetNotFound` if the post does not exist.
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, VotesRepositoryError>;
    async fn get_comment(&self, id: TargetId) -> Result<Option<Comment>, VotesRepositoryError>;

    /// Lists every comment and reply of a post, oldest first.
    async fn list_comments(&self, post_id: TargetId) -> Result<Vec<Comment>, VotesRepositoryError>;
}
