// HTTP request handlers
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use forum_votes_shared::types::{NewComment, NewPost, TargetRef, UserIdentity, UserProfile};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::{
    comment_tree, CommentResponse, CreateCommentRequest, CreatePostRequest, CurrentVoteResponse,
    Pagination, PostDetailResponse, PostListResponse, PostResponse, PostsQuery, ReplyResponse,
    UpdateProfileRequest, UserResponse, VoteRequest, VoteResponse,
};
use crate::server::state::AppState;

type IdPath = Result<Path<Uuid>, PathRejection>;
type JsonBody<T> = Result<Json<T>, JsonRejection>;

fn path_id(path: IdPath) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::invalid_input(rejection.body_text()))
}

fn json_body<T>(body: JsonBody<T>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid_input(rejection.body_text()))
}

fn require_user(state: &AppState, headers: &HeaderMap) -> Result<UserIdentity, ApiError> {
    state.identity.current_user(headers).ok_or(ApiError::Unauthorized)
}

/// Rejects callers that never registered a profile.
async fn require_registered(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<UserIdentity, ApiError> {
    let identity = require_user(state, headers)?;
    match state.forum.get_user(identity.id).await? {
        Some(_) => Ok(identity),
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.votes.check_tables_created().await {
        Ok(true) => (StatusCode::OK, "Forum votes service is running"),
        Ok(false) => (StatusCode::SERVICE_UNAVAILABLE, "Storage is not initialized"),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "Storage is unavailable")
        }
    }
}

// ============================================================================
// Votes
// ============================================================================

async fn cast_vote(
    state: &AppState,
    headers: &HeaderMap,
    target: TargetRef,
    body: JsonBody<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let voter = require_user(state, headers)?;
    let value = json_body(body)?.vote_value()?;

    info!(voter_id = %voter.id, target = %target, vote = %value, "Received vote request");
    let outcome = state.engine.cast_vote(Some(voter), target, value).await?;

    Ok(Json(VoteResponse {
        message: "Vote recorded successfully".to_string(),
        votes: outcome.votes,
    }))
}

async fn retract_vote(
    state: &AppState,
    headers: &HeaderMap,
    target: TargetRef,
) -> Result<Json<VoteResponse>, ApiError> {
    let voter = require_user(state, headers)?;

    info!(voter_id = %voter.id, target = %target, "Received vote removal request");
    let outcome = state.engine.retract_vote(Some(voter), target).await?;

    Ok(Json(VoteResponse {
        message: "Vote removed successfully".to_string(),
        votes: outcome.votes,
    }))
}

async fn current_vote(
    state: &AppState,
    headers: &HeaderMap,
    target: TargetRef,
) -> Result<Json<CurrentVoteResponse>, ApiError> {
    let voter = state.identity.current_user(headers);
    let current = state.engine.current_vote(voter, target).await?;
    Ok(Json(CurrentVoteResponse { vote: current.vote, votes: current.votes }))
}

pub async fn cast_post_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: IdPath,
    body: JsonBody<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    cast_vote(&state, &headers, TargetRef::post(path_id(path)?), body).await
}

pub async fn cast_comment_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: IdPath,
    body: JsonBody<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    cast_vote(&state, &headers, TargetRef::comment(path_id(path)?), body).await
}

pub async fn retract_post_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: IdPath,
) -> Result<Json<VoteResponse>, ApiError> {
    retract_vote(&state, &headers, TargetRef::post(path_id(path)?)).await
}

pub async fn retract_comment_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: IdPath,
) -> Result<Json<VoteResponse>, ApiError> {
    retract_vote(&state, &headers, TargetRef::comment(path_id(path)?)).await
}

pub async fn get_post_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: IdPath,
) -> Result<Json<CurrentVoteResponse>, ApiError> {
    current_vote(&state, &headers, TargetRef::post(path_id(path)?)).await
}

pub async fn get_comment_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: IdPath,
) -> Result<Json<CurrentVoteResponse>, ApiError> {
    current_vote(&state, &headers, TargetRef::comment(path_id(path)?)).await
}

// ============================================================================
// Users, posts and comments
// ============================================================================

/// Registers the caller or renames them. Reputation is kept.
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: JsonBody<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let identity = require_user(&state, &headers)?;
    let name = json_body(body)?.validated_name()?;

    let user = state.forum.upsert_user(&UserProfile { id: identity.id, name }).await?;
    info!(user_id = %user.id, "Profile updated");
    Ok(Json(UserResponse { user }))
}

pub async fn get_user(
    State(state): State<AppState>,
    path: IdPath,
) -> Result<Json<UserResponse>, ApiError> {
    let id = path_id(path)?;
    let user = state
        .forum
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse { user }))
}

pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: JsonBody<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let author = require_registered(&state, &headers).await?;
    let request = json_body(body)?;
    request.validate()?;

    let new_post = NewPost { author_id: author.id, title: request.title, content: request.content };
    let post = state.forum.create_post(&new_post).await?;
    info!(post_id = %post.id, author_id = %author.id, "Post created");

    Ok((
        StatusCode::CREATED,
        Json(PostResponse { message: "Post created successfully".to_string(), post }),
    ))
}

/// Lists posts newest first, one page at a time.
pub async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<PostsQuery>, QueryRejection>,
) -> Result<Json<PostListResponse>, ApiError> {
    let Query(query) =
        query.map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;
    let (limit, page, offset) = query.resolve()?;

    let posts = state.forum.list_posts(limit, offset).await?;
    let total = state.forum.count_posts().await?;

    Ok(Json(PostListResponse { posts, pagination: Pagination::new(total, page, limit) }))
}

/// Reads a post with its comments nested under their parents.
pub async fn get_post(
    State(state): State<AppState>,
    path: IdPath,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let id = path_id(path)?;
    let post = state
        .forum
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
    let comments = comment_tree(state.forum.list_comments(id).await?);
    Ok(Json(PostDetailResponse { post, comments }))
}

pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: IdPath,
    body: JsonBody<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let author = require_registered(&state, &headers).await?;
    let post_id = path_id(path)?;
    let request = json_body(body)?;
    request.validate("Comment cannot be empty")?;

    let comment = state
        .forum
        .create_comment(&NewComment {
            post_id,
            parent_id: None,
            author_id: author.id,
            content: request.content,
        })
        .await?;
    info!(comment_id = %comment.id, post_id = %post_id, author_id = %author.id, "Comment created");

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse { message: "Comment created successfully".to_string(), comment }),
    ))
}

pub async fn create_reply(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: IdPath,
    body: JsonBody<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ReplyResponse>), ApiError> {
    let author = require_registered(&state, &headers).await?;
    let parent_id = path_id(path)?;
    let request = json_body(body)?;
    request.validate("Reply cannot be empty")?;

    let parent = state
        .forum
        .get_comment(parent_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    let reply = state
        .forum
        .create_comment(&NewComment {
            post_id: parent.post_id,
            parent_id: Some(parent.id),
            author_id: author.id,
            content: request.content,
        })
        .await?;
    info!(comment_id = %reply.id, parent_id = %parent.id, author_id = %author.id, "Reply created");

    Ok((
        StatusCode::CREATED,
        Json(ReplyResponse { message: "Reply created successfully".to_string(), reply }),
    ))
}
