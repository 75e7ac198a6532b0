//! Recomputation of the denormalized vote count of a target.
use forum_votes_repository::{VotesRepositoryError, VotesTransaction};
use forum_votes_shared::types::TargetRef;

/// Recounts every live vote on `target` and stores the net value.
///
/// The stored count is replaced, never incremented, so a count that drifted
/// from the vote store is corrected by the next vote on the target.
///
/// # Returns
///
/// The net count written, `upvotes - downvotes`.
pub async fn recompute_vote_count(
    tx: &mut dyn VotesTransaction,
    target: &TargetRef,
) -> Result<i64, VotesRepositoryError> {
    let count = tx.count_votes(target).await?;
    let net = count.net();
    tx.set_vote_count(target, net).await?;
    Ok(net)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forum_votes_repository::{ForumRepository, InMemoryRepository, VotesRepository};
    use forum_votes_shared::types::{NewPost, UserProfile, VoteValue};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_recompute_replaces_stale_count() {
        let repository = InMemoryRepository::new();
        let author = repository
            .upsert_user(&UserProfile { id: Uuid::new_v4(), name: "author".to_string() })
            .await
            .unwrap();
        let post = repository
            .create_post(&NewPost {
                author_id: author.id,
                title: "A post".to_string(),
                content: "Post content body".to_string(),
            })
            .await
            .unwrap();
        let target = TargetRef::post(post.id);

        let mut tx = repository.begin().await.unwrap();
        tx.set_vote_count(&target, 42).await.unwrap();
        tx.upsert_vote(Uuid::new_v4(), &target, VoteValue::Up).await.unwrap();
        tx.upsert_vote(Uuid::new_v4(), &target, VoteValue::Down).await.unwrap();
        tx.upsert_vote(Uuid::new_v4(), &target, VoteValue::Down).await.unwrap();

        assert_eq!(recompute_vote_count(tx.as_mut(), &target).await.unwrap(), -1);
        tx.commit().await.unwrap();

        let stored = repository.get_target(&target).await.unwrap().unwrap();
        assert_eq!(stored.vote_count, -1);
    }
}
