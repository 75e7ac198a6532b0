//! PostgreSQL implementation of the forum repository.
//!
//! Stores users, posts and comments. Vote counts and reputation are only read
//! here; they are written by the votes repository inside vote transactions.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forum_votes_shared::types::{
    Comment, NewComment, NewPost, Post, TargetId, TargetRef, User, UserId, UserProfile,
};
use uuid::Uuid;

use crate::{ForumRepository, VotesRepositoryError};

/// PostgreSQL-backed forum repository.
#[derive(Clone)]
pub struct PostgresForumRepository {
    /// PostgreSQL connection pool
    pool: sqlx::PgPool,
}

type UserRow = (Uuid, String, i64, DateTime<Utc>);
type PostRow = (Uuid, Uuid, String, String, i64, DateTime<Utc>);
type CommentRow = (Uuid, Uuid, Option<Uuid>, Uuid, String, i64, DateTime<Utc>);

fn user_from_row((id, name, reputation, created_at): UserRow) -> User {
    User { id, name, reputation, created_at }
}

fn post_from_row((id, author_id, title, content, votes, created_at): PostRow) -> Post {
    Post { id, author_id, title, content, votes, created_at }
}

fn comment_from_row(
    (id, post_id, parent_id, author_id, content, votes, created_at): CommentRow,
) -> Comment {
    Comment { id, post_id, parent_id, author_id, content, votes, created_at }
}

impl PostgresForumRepository {
    /// Creates a new PostgreSQL forum repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with required schema
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresForumRepository)` - Ready-to-use repository instance
    /// * `Err(VotesRepositoryError)` - Future validation errors (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, VotesRepositoryError> {
        Ok(Self { pool })
    }
}

#[async_trait]
impl ForumRepository for PostgresForumRepository {
    async fn upsert_user(&self, profile: &UserProfile) -> Result<User, VotesRepositoryError> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, reputation, created_at
            "#,
        )
        .bind(profile.id)
        .bind(&profile.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user_from_row(row))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, VotesRepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, reputation, created_at FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(user_from_row))
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, VotesRepositoryError> {
        let row: PostRow = sqlx::query_as(
            r#"
            INSERT INTO posts (id, author_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, author_id, title, content, votes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(post_from_row(row))
    }

    async fn get_post(&self, id: TargetId) -> Result<Option<Post>, VotesRepositoryError> {
        let row: Option<PostRow> = sqlx::query_as(
            "SELECT id, author_id, title, content, votes, created_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(post_from_row))
    }

    async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>, VotesRepositoryError> {
        let rows: Vec<PostRow> = sqlx::query_as(
            r#"
            SELECT id, author_id, title, content, votes, created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(post_from_row).collect())
    }

    async fn count_posts(&self) -> Result<i64, VotesRepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, VotesRepositoryError> {
        let row: Option<CommentRow> = sqlx::query_as(
            r#"
            INSERT INTO comments (id, post_id, parent_id, author_id, content)
            SELECT $1, $2, $3, $4, $5
            WHERE EXISTS (SELECT 1 FROM posts WHERE id = $2)
            RETURNING id, post_id, parent_id, author_id, content, votes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(comment.post_id)
        .bind(comment.parent_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .fetch_optional(&self.pool)
        .await?;

        row.map(comment_from_row)
            .ok_or(VotesRepositoryError::TargetNotFound(TargetRef::post(comment.post_id)))
    }

    async fn get_comment(&self, id: TargetId) -> Result<Option<Comment>, VotesRepositoryError> {
        let row: Option<CommentRow> = sqlx::query_as(
            r#"
            SELECT id, post_id, parent_id, author_id, content, votes, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(comment_from_row))
    }

    async fn list_comments(&self, post_id: TargetId) -> Result<Vec<Comment>, VotesRepositoryError> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            r#"
            SELECT id, post_id, parent_id, author_id, content, votes, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(comment_from_row).collect())
    }
}
