//! Integration tests for PostgreSQL votes repository implementation.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup.
//!
//! Run with: `DATABASE_URL=postgres://... cargo test --features postgres-tests --test postgres_integration`

use forum_votes_repository::{
    ForumRepository, PostgresForumRepository, PostgresVotesRepository, VotesRepository,
    VotesRepositoryError,
};
use forum_votes_shared::types::{NewPost, Post, TargetRef, User, UserProfile, VoteValue, VotesCount};
use uuid::Uuid;

/// Creates an author and a post owned by it.
async fn seed_post(pool: &sqlx::PgPool) -> (User, Post) {
    let forum = PostgresForumRepository::new(pool.clone()).await.unwrap();
    let author = forum
        .upsert_user(&UserProfile { id: Uuid::new_v4(), name: "author".to_string() })
        .await
        .unwrap();
    let post = forum
        .create_post(&NewPost {
            author_id: author.id,
            title: "Getting started".to_string(),
            content: "Some content for the post".to_string(),
        })
        .await
        .unwrap();
    (author, post)
}

// ============================================================================
// Vote Store Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "requires a PostgreSQL database")]
async fn test_upsert_vote_inserts_then_overwrites(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (_, post) = seed_post(&pool).await;
    let target = TargetRef::post(post.id);
    let voter = Uuid::new_v4();

    let mut tx = repository.begin().await.unwrap();
    assert!(tx.lock_target(&target).await.unwrap().is_some());
    assert_eq!(tx.upsert_vote(voter, &target, VoteValue::Up).await.unwrap(), None);
    assert_eq!(
        tx.upsert_vote(voter, &target, VoteValue::Down).await.unwrap(),
        Some(VoteValue::Up)
    );
    tx.commit().await.unwrap();

    let rows: Vec<(i16,)> = sqlx::query_as("SELECT value FROM votes WHERE voter_id = $1")
        .bind(voter)
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(rows, vec![(1,)]);
    assert_eq!(repository.get_vote(voter, &target).await.unwrap(), Some(VoteValue::Down));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "requires a PostgreSQL database")]
async fn test_delete_vote_returns_deleted_value(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (_, post) = seed_post(&pool).await;
    let target = TargetRef::post(post.id);
    let voter = Uuid::new_v4();

    let mut tx = repository.begin().await.unwrap();
    tx.upsert_vote(voter, &target, VoteValue::Down).await.unwrap();
    assert_eq!(tx.delete_vote(voter, &target).await.unwrap(), Some(VoteValue::Down));
    assert_eq!(tx.delete_vote(voter, &target).await.unwrap(), None);
    tx.commit().await.unwrap();

    assert_eq!(repository.get_vote(voter, &target).await.unwrap(), None);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "requires a PostgreSQL database")]
async fn test_uncommitted_transaction_is_rolled_back(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (author, post) = seed_post(&pool).await;
    let target = TargetRef::post(post.id);

    {
        let mut tx = repository.begin().await.unwrap();
        tx.upsert_vote(Uuid::new_v4(), &target, VoteValue::Up).await.unwrap();
        tx.set_vote_count(&target, 1).await.unwrap();
        tx.apply_reputation_delta(author.id, 1).await.unwrap();
    }

    let stored = repository.get_target(&target).await.unwrap().unwrap();
    assert_eq!(stored.vote_count, 0);
    let forum = PostgresForumRepository::new(pool.clone()).await.unwrap();
    assert_eq!(forum.get_user(author.id).await.unwrap().unwrap().reputation, 0);
}

// ============================================================================
// Aggregate and Reputation Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "requires a PostgreSQL database")]
async fn test_count_and_set_vote_count(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (_, post) = seed_post(&pool).await;
    let target = TargetRef::post(post.id);

    let mut tx = repository.begin().await.unwrap();
    tx.upsert_vote(Uuid::new_v4(), &target, VoteValue::Up).await.unwrap();
    tx.upsert_vote(Uuid::new_v4(), &target, VoteValue::Up).await.unwrap();
    tx.upsert_vote(Uuid::new_v4(), &target, VoteValue::Down).await.unwrap();
    let count = tx.count_votes(&target).await.unwrap();
    assert_eq!(count, VotesCount { upvotes: 2, downvotes: 1 });
    tx.set_vote_count(&target, count.net()).await.unwrap();
    tx.commit().await.unwrap();

    let stored = repository.get_target(&target).await.unwrap().unwrap();
    assert_eq!(stored.vote_count, 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "requires a PostgreSQL database")]
async fn test_apply_reputation_delta(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (author, _) = seed_post(&pool).await;

    let mut tx = repository.begin().await.unwrap();
    assert_eq!(tx.apply_reputation_delta(author.id, 2).await.unwrap(), 2);
    assert_eq!(tx.apply_reputation_delta(author.id, -3).await.unwrap(), -1);
    let missing = tx.apply_reputation_delta(Uuid::new_v4(), 1).await;
    assert!(matches!(missing, Err(VotesRepositoryError::UserNotFound(_))));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "requires a PostgreSQL database")]
async fn test_set_vote_count_on_missing_target(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let missing = TargetRef::comment(Uuid::new_v4());

    let mut tx = repository.begin().await.unwrap();
    assert!(tx.lock_target(&missing).await.unwrap().is_none());
    let result = tx.set_vote_count(&missing, 4).await;
    assert!(matches!(result, Err(VotesRepositoryError::TargetNotFound(_))));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[cfg_attr(not(feature = "postgres-tests"), ignore = "requires a PostgreSQL database")]
async fn test_check_tables_created(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    assert!(repository.check_tables_created().await.unwrap());
}
