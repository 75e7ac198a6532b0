//! Concurrent vote operations against the in-memory repository.
//!
//! The stored count must always equal the tally of live votes, and the
//! author's reputation must equal the sum of every applied delta.

use std::sync::Arc;

use forum_votes_engine::VotingEngine;
use forum_votes_repository::{ForumRepository, InMemoryRepository, VotesRepository};
use forum_votes_shared::types::{NewPost, TargetRef, UserIdentity, UserProfile, VoteValue};
use futures::future::join_all;
use uuid::Uuid;

async fn seed(repository: &InMemoryRepository) -> (Uuid, TargetRef) {
    let author = repository
        .upsert_user(&UserProfile { id: Uuid::new_v4(), name: "author".to_string() })
        .await
        .unwrap();
    let post = repository
        .create_post(&NewPost {
            author_id: author.id,
            title: "Hot thread".to_string(),
            content: "Everyone votes at once".to_string(),
        })
        .await
        .unwrap();
    (author.id, TargetRef::post(post.id))
}

async fn tally(repository: &InMemoryRepository, target: &TargetRef) -> i64 {
    repository.votes_on(target).await.iter().map(|vote| vote.value.signed()).sum()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_voters_at_once() {
    let repository = InMemoryRepository::new();
    let (author_id, target) = seed(&repository).await;
    let engine = Arc::new(VotingEngine::new(Arc::new(repository.clone())));

    let tasks = (0..50).map(|i| {
        let engine = engine.clone();
        let value = if i < 30 { VoteValue::Up } else { VoteValue::Down };
        tokio::spawn(async move {
            engine.cast_vote(Some(UserIdentity::from(Uuid::new_v4())), target, value).await
        })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let stored = repository.get_target(&target).await.unwrap().unwrap();
    assert_eq!(stored.vote_count, 10);
    assert_eq!(tally(&repository, &target).await, 10);
    assert_eq!(repository.get_user(author_id).await.unwrap().unwrap().reputation, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_voter_racing_toggles() {
    let repository = InMemoryRepository::new();
    let (author_id, target) = seed(&repository).await;
    let engine = Arc::new(VotingEngine::new(Arc::new(repository.clone())));
    let voter = Some(UserIdentity::from(Uuid::new_v4()));

    let tasks = (0..21).map(|i| {
        let engine = engine.clone();
        let value = if i % 3 == 0 { VoteValue::Down } else { VoteValue::Up };
        tokio::spawn(async move { engine.cast_vote(voter, target, value).await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let votes = repository.votes_on(&target).await;
    assert!(votes.len() <= 1);
    let stored = repository.get_target(&target).await.unwrap().unwrap();
    let expected = tally(&repository, &target).await;
    assert_eq!(stored.vote_count, expected);
    assert_eq!(repository.get_user(author_id).await.unwrap().unwrap().reputation, expected);
}
