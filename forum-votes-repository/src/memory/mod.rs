//! In-process implementation of the forum votes repository.
//!
//! Committed state lives behind a `tokio::sync::RwLock` that is only held for
//! the duration of a single read or of a commit, never across a whole
//! transaction. Transactions are serialised per target: `lock_target` takes a
//! mutex owned by that target and keeps it until the transaction ends.
//!
//! A transaction buffers its writes in a write set holding only the votes,
//! counts and reputation deltas it touched. Commit applies the write set in one
//! critical section; dropping the transaction discards it.
//!
//! Intended for tests and single-process deployments without PostgreSQL.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use forum_votes_shared::types::{
    Comment, NewComment, NewPost, Post, Target, TargetId, TargetRef, TargetType, User, UserId,
    UserProfile, Vote, VoteValue, VotesCount,
};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use crate::{ForumRepository, VotesRepository, VotesRepositoryError, VotesTransaction};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    posts: HashMap<TargetId, Post>,
    /// Post ids in creation order.
    post_order: Vec<TargetId>,
    comments: HashMap<TargetId, Comment>,
    /// Comment ids of each post in creation order.
    post_comments: HashMap<TargetId, Vec<TargetId>>,
    /// Live votes, indexed by target and then by voter.
    votes: HashMap<TargetRef, HashMap<UserId, Vote>>,
}

impl MemoryState {
    fn target(&self, target: &TargetRef) -> Option<Target> {
        match target.target_type {
            TargetType::Post => self.posts.get(&target.id).map(Target::from),
            TargetType::Comment => self.comments.get(&target.id).map(Target::from),
        }
    }

    fn vote(&self, voter_id: UserId, target: &TargetRef) -> Option<&Vote> {
        self.votes.get(target).and_then(|votes| votes.get(&voter_id))
    }

    fn vote_count_mut(&mut self, target: &TargetRef) -> Option<&mut i64> {
        match target.target_type {
            TargetType::Post => self.posts.get_mut(&target.id).map(|post| &mut post.votes),
            TargetType::Comment => {
                self.comments.get_mut(&target.id).map(|comment| &mut comment.votes)
            }
        }
    }
}

/// Writes buffered by an uncommitted transaction.
#[derive(Debug, Default)]
struct WriteSet {
    /// `None` marks a deleted vote.
    votes: HashMap<(TargetRef, UserId), Option<Vote>>,
    vote_counts: HashMap<TargetRef, i64>,
    /// Pending reputation deltas, added to the committed value on commit.
    reputation: HashMap<UserId, i64>,
}

impl WriteSet {
    fn apply(self, state: &mut MemoryState) {
        for ((target, voter_id), vote) in self.votes {
            match vote {
                Some(vote) => {
                    state.votes.entry(target).or_default().insert(voter_id, vote);
                }
                None => {
                    if let Some(votes) = state.votes.get_mut(&target) {
                        votes.remove(&voter_id);
                        if votes.is_empty() {
                            state.votes.remove(&target);
                        }
                    }
                }
            }
        }
        for (target, count) in self.vote_counts {
            if let Some(votes) = state.vote_count_mut(&target) {
                *votes = count;
            }
        }
        for (user_id, delta) in self.reputation {
            if let Some(user) = state.users.get_mut(&user_id) {
                user.reputation += delta;
            }
        }
    }
}

type TargetLocks = Arc<Mutex<HashMap<TargetRef, Arc<Mutex<()>>>>>;

/// Memory-backed implementation of both [`VotesRepository`] and [`ForumRepository`].
///
/// Cloning the repository shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<RwLock<MemoryState>>,
    target_locks: TargetLocks,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every live vote on a target, in no particular order.
    pub async fn votes_on(&self, target: &TargetRef) -> Vec<Vote> {
        let state = self.state.read().await;
        state
            .votes
            .get(target)
            .map(|votes| votes.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VotesRepository for InMemoryRepository {
    async fn begin(&self) -> Result<Box<dyn VotesTransaction>, VotesRepositoryError> {
        Ok(Box::new(InMemoryTransaction {
            state: self.state.clone(),
            target_locks: self.target_locks.clone(),
            held: HashMap::new(),
            writes: WriteSet::default(),
        }))
    }

    async fn get_target(&self, target: &TargetRef) -> Result<Option<Target>, VotesRepositoryError> {
        Ok(self.state.read().await.target(target))
    }

    async fn get_vote(
        &self,
        voter_id: UserId,
        target: &TargetRef,
    ) -> Result<Option<VoteValue>, VotesRepositoryError> {
        Ok(self.state.read().await.vote(voter_id, target).map(|vote| vote.value))
    }

    async fn check_tables_created(&self) -> Result<bool, VotesRepositoryError> {
        Ok(true)
    }
}

/// A unit of work over the in-memory state.
///
/// Reads see the committed state overlaid with this transaction's own writes.
pub struct InMemoryTransaction {
    state: Arc<RwLock<MemoryState>>,
    target_locks: TargetLocks,
    held: HashMap<TargetRef, OwnedMutexGuard<()>>,
    writes: WriteSet,
}

impl InMemoryTransaction {
    async fn current_vote(&self, voter_id: UserId, target: &TargetRef) -> Option<Vote> {
        match self.writes.votes.get(&(*target, voter_id)) {
            Some(staged) => staged.clone(),
            None => self.state.read().await.vote(voter_id, target).cloned(),
        }
    }

    async fn read_target(&self, target: &TargetRef) -> Option<Target> {
        let mut stored = self.state.read().await.target(target)?;
        if let Some(count) = self.writes.vote_counts.get(target) {
            stored.vote_count = *count;
        }
        Some(stored)
    }
}

fn tally(count: &mut VotesCount, value: VoteValue) {
    match value {
        VoteValue::Up => count.upvotes += 1,
        VoteValue::Down => count.downvotes += 1,
    }
}

#[async_trait]
impl VotesTransaction for InMemoryTransaction {
    async fn lock_target(
        &mut self,
        target: &TargetRef,
    ) -> Result<Option<Target>, VotesRepositoryError> {
        if self.held.contains_key(target) {
            return Ok(self.read_target(target).await);
        }
        // Targets are never deleted, so a missing one needs no lock.
        if self.state.read().await.target(target).is_none() {
            return Ok(None);
        }

        let lock = self.target_locks.lock().await.entry(*target).or_default().clone();
        let guard = lock.lock_owned().await;
        self.held.insert(*target, guard);

        Ok(self.read_target(target).await)
    }

    async fn get_vote(
        &mut self,
        voter_id: UserId,
        target: &TargetRef,
    ) -> Result<Option<VoteValue>, VotesRepositoryError> {
        Ok(self.current_vote(voter_id, target).await.map(|vote| vote.value))
    }

    async fn upsert_vote(
        &mut self,
        voter_id: UserId,
        target: &TargetRef,
        value: VoteValue,
    ) -> Result<Option<VoteValue>, VotesRepositoryError> {
        let existing = self.current_vote(voter_id, target).await;
        let previous = existing.as_ref().map(|vote| vote.value);
        let vote = match existing {
            Some(vote) => Vote { value, ..vote },
            None => Vote {
                id: Uuid::new_v4(),
                voter_id,
                target: *target,
                value,
                created_at: Utc::now(),
            },
        };
        self.writes.votes.insert((*target, voter_id), Some(vote));
        Ok(previous)
    }

    async fn delete_vote(
        &mut self,
        voter_id: UserId,
        target: &TargetRef,
    ) -> Result<Option<VoteValue>, VotesRepositoryError> {
        let deleted = self.current_vote(voter_id, target).await.map(|vote| vote.value);
        if deleted.is_some() {
            self.writes.votes.insert((*target, voter_id), None);
        }
        Ok(deleted)
    }

    async fn count_votes(
        &mut self,
        target: &TargetRef,
    ) -> Result<VotesCount, VotesRepositoryError> {
        let mut count = VotesCount::default();
        {
            let state = self.state.read().await;
            let stored = state.votes.get(target).into_iter().flat_map(|votes| votes.values());
            for vote in stored {
                if !self.writes.votes.contains_key(&(*target, vote.voter_id)) {
                    tally(&mut count, vote.value);
                }
            }
        }
        let staged = self
            .writes
            .votes
            .iter()
            .filter(|((voted, _), _)| voted == target)
            .filter_map(|(_, vote)| vote.as_ref());
        for vote in staged {
            tally(&mut count, vote.value);
        }
        Ok(count)
    }

    async fn set_vote_count(
        &mut self,
        target: &TargetRef,
        count: i64,
    ) -> Result<(), VotesRepositoryError> {
        if self.state.read().await.target(target).is_none() {
            return Err(VotesRepositoryError::TargetNotFound(*target));
        }
        self.writes.vote_counts.insert(*target, count);
        Ok(())
    }

    async fn apply_reputation_delta(
        &mut self,
        user_id: UserId,
        delta: i64,
    ) -> Result<i64, VotesRepositoryError> {
        let committed = self
            .state
            .read()
            .await
            .users
            .get(&user_id)
            .map(|user| user.reputation)
            .ok_or(VotesRepositoryError::UserNotFound(user_id))?;
        let pending = self.writes.reputation.entry(user_id).or_insert(0);
        *pending += delta;
        Ok(committed + *pending)
    }

    async fn commit(self: Box<Self>) -> Result<(), VotesRepositoryError> {
        let InMemoryTransaction { state, held, writes, .. } = *self;
        writes.apply(&mut *state.write().await);
        drop(held);
        Ok(())
    }
}

#[async_trait]
impl ForumRepository for InMemoryRepository {
    async fn upsert_user(&self, profile: &UserProfile) -> Result<User, VotesRepositoryError> {
        let mut state = self.state.write().await;
        let user = state.users.entry(profile.id).or_insert_with(|| User {
            id: profile.id,
            name: profile.name.clone(),
            reputation: 0,
            created_at: Utc::now(),
        });
        user.name = profile.name.clone();
        Ok(user.clone())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, VotesRepositoryError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, VotesRepositoryError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&post.author_id) {
            return Err(VotesRepositoryError::UserNotFound(post.author_id));
        }
        let created = Post {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            title: post.title.clone(),
            content: post.content.clone(),
            votes: 0,
            created_at: Utc::now(),
        };
        state.posts.insert(created.id, created.clone());
        state.post_order.push(created.id);
        Ok(created)
    }

    async fn get_post(&self, id: TargetId) -> Result<Option<Post>, VotesRepositoryError> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>, VotesRepositoryError> {
        let state = self.state.read().await;
        let posts = state
            .post_order
            .iter()
            .rev()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .filter_map(|id| state.posts.get(id).cloned())
            .collect();
        Ok(posts)
    }

    async fn count_posts(&self) -> Result<i64, VotesRepositoryError> {
        Ok(self.state.read().await.posts.len() as i64)
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, VotesRepositoryError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&comment.post_id) {
            return Err(VotesRepositoryError::TargetNotFound(TargetRef::post(comment.post_id)));
        }
        if let Some(parent_id) = comment.parent_id {
            if !state.comments.contains_key(&parent_id) {
                return Err(VotesRepositoryError::TargetNotFound(TargetRef::comment(parent_id)));
            }
        }
        if !state.users.contains_key(&comment.author_id) {
            return Err(VotesRepositoryError::UserNotFound(comment.author_id));
        }
        let created = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            author_id: comment.author_id,
            content: comment.content.clone(),
            votes: 0,
            created_at: Utc::now(),
        };
        state.comments.insert(created.id, created.clone());
        state.post_comments.entry(created.post_id).or_default().push(created.id);
        Ok(created)
    }

    async fn get_comment(&self, id: TargetId) -> Result<Option<Comment>, VotesRepositoryError> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn list_comments(&self, post_id: TargetId) -> Result<Vec<Comment>, VotesRepositoryError> {
        let state = self.state.read().await;
        let comments = state
            .post_comments
            .get(&post_id)
            .into_iter()
            .flatten()
            .filter_map(|id| state.comments.get(id).cloned())
            .collect();
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn seed_post(repository: &InMemoryRepository) -> (User, Post) {
        let author = repository
            .upsert_user(&UserProfile { id: Uuid::new_v4(), name: "author".to_string() })
            .await
            .unwrap();
        let post = repository
            .create_post(&NewPost {
                author_id: author.id,
                title: "A post title".to_string(),
                content: "Some post content".to_string(),
            })
            .await
            .unwrap();
        (author, post)
    }

    async fn add_post(repository: &InMemoryRepository, author: &User, title: &str) -> Post {
        repository
            .create_post(&NewPost {
                author_id: author.id,
                title: title.to_string(),
                content: "Some post content".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_vote_returns_previous_value() {
        let repository = InMemoryRepository::new();
        let (_, post) = seed_post(&repository).await;
        let target = TargetRef::post(post.id);
        let voter = Uuid::new_v4();

        let mut tx = repository.begin().await.unwrap();
        assert_eq!(tx.upsert_vote(voter, &target, VoteValue::Up).await.unwrap(), None);
        assert_eq!(
            tx.upsert_vote(voter, &target, VoteValue::Down).await.unwrap(),
            Some(VoteValue::Up)
        );
        tx.commit().await.unwrap();

        let votes = repository.votes_on(&target).await;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].value, VoteValue::Down);
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let repository = InMemoryRepository::new();
        let (author, post) = seed_post(&repository).await;
        let target = TargetRef::post(post.id);

        {
            let mut tx = repository.begin().await.unwrap();
            tx.lock_target(&target).await.unwrap();
            tx.upsert_vote(Uuid::new_v4(), &target, VoteValue::Up).await.unwrap();
            tx.set_vote_count(&target, 1).await.unwrap();
            tx.apply_reputation_delta(author.id, 1).await.unwrap();
        }

        assert!(repository.votes_on(&target).await.is_empty());
        assert_eq!(repository.get_target(&target).await.unwrap().unwrap().vote_count, 0);
        assert_eq!(repository.get_user(author.id).await.unwrap().unwrap().reputation, 0);

        // The dropped transaction released its lock.
        let mut tx = repository.begin().await.unwrap();
        let locked = timeout(Duration::from_secs(1), tx.lock_target(&target)).await;
        assert!(locked.unwrap().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_only_visible_to_their_transaction() {
        let repository = InMemoryRepository::new();
        let (author, post) = seed_post(&repository).await;
        let target = TargetRef::post(post.id);
        let voter = Uuid::new_v4();

        let mut tx = repository.begin().await.unwrap();
        tx.lock_target(&target).await.unwrap();
        tx.upsert_vote(voter, &target, VoteValue::Up).await.unwrap();
        tx.set_vote_count(&target, 1).await.unwrap();
        assert_eq!(tx.apply_reputation_delta(author.id, 1).await.unwrap(), 1);

        assert_eq!(tx.get_vote(voter, &target).await.unwrap(), Some(VoteValue::Up));
        assert_eq!(tx.lock_target(&target).await.unwrap().unwrap().vote_count, 1);
        assert_eq!(repository.get_vote(voter, &target).await.unwrap(), None);
        assert_eq!(repository.get_target(&target).await.unwrap().unwrap().vote_count, 0);

        tx.commit().await.unwrap();

        assert_eq!(repository.get_vote(voter, &target).await.unwrap(), Some(VoteValue::Up));
        assert_eq!(repository.get_target(&target).await.unwrap().unwrap().vote_count, 1);
        assert_eq!(repository.get_user(author.id).await.unwrap().unwrap().reputation, 1);
    }

    #[tokio::test]
    async fn test_delete_and_count_votes() {
        let repository = InMemoryRepository::new();
        let (_, post) = seed_post(&repository).await;
        let target = TargetRef::post(post.id);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let mut tx = repository.begin().await.unwrap();
        tx.upsert_vote(a, &target, VoteValue::Up).await.unwrap();
        tx.upsert_vote(b, &target, VoteValue::Up).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = repository.begin().await.unwrap();
        tx.upsert_vote(c, &target, VoteValue::Down).await.unwrap();
        assert_eq!(
            tx.count_votes(&target).await.unwrap(),
            VotesCount { upvotes: 2, downvotes: 1 }
        );

        assert_eq!(tx.delete_vote(b, &target).await.unwrap(), Some(VoteValue::Up));
        assert_eq!(tx.delete_vote(b, &target).await.unwrap(), None);
        assert_eq!(tx.count_votes(&target).await.unwrap().net(), 0);
        tx.commit().await.unwrap();

        let mut voters: Vec<_> =
            repository.votes_on(&target).await.iter().map(|vote| vote.voter_id).collect();
        voters.sort();
        let mut expected = vec![a, c];
        expected.sort();
        assert_eq!(voters, expected);
    }

    #[tokio::test]
    async fn test_missing_rows() {
        let repository = InMemoryRepository::new();
        let missing = TargetRef::comment(Uuid::new_v4());

        let mut tx = repository.begin().await.unwrap();
        assert!(tx.lock_target(&missing).await.unwrap().is_none());
        assert!(matches!(
            tx.set_vote_count(&missing, 3).await,
            Err(VotesRepositoryError::TargetNotFound(_))
        ));
        assert!(matches!(
            tx.apply_reputation_delta(Uuid::new_v4(), 1).await,
            Err(VotesRepositoryError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_same_target_is_locked_until_commit() {
        let repository = InMemoryRepository::new();
        let (_, post) = seed_post(&repository).await;
        let target = TargetRef::post(post.id);

        let mut first = repository.begin().await.unwrap();
        first.lock_target(&target).await.unwrap();

        let mut second = repository.begin().await.unwrap();
        let blocked = timeout(Duration::from_millis(50), second.lock_target(&target)).await;
        assert!(blocked.is_err());

        first.commit().await.unwrap();
        let locked = timeout(Duration::from_secs(1), second.lock_target(&target)).await;
        assert!(locked.unwrap().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_other_targets_and_reads_are_not_blocked() {
        let repository = InMemoryRepository::new();
        let (author, post) = seed_post(&repository).await;
        let other = add_post(&repository, &author, "Another post").await;
        let (busy, free) = (TargetRef::post(post.id), TargetRef::post(other.id));

        let mut first = repository.begin().await.unwrap();
        first.lock_target(&busy).await.unwrap();
        first.upsert_vote(Uuid::new_v4(), &busy, VoteValue::Up).await.unwrap();

        let mut second = repository.begin().await.unwrap();
        timeout(Duration::from_secs(1), second.lock_target(&free)).await.unwrap().unwrap();
        second.upsert_vote(Uuid::new_v4(), &free, VoteValue::Down).await.unwrap();
        second.set_vote_count(&free, -1).await.unwrap();
        timeout(Duration::from_secs(1), second.commit()).await.unwrap().unwrap();

        let read = timeout(Duration::from_secs(1), repository.get_target(&busy)).await;
        assert_eq!(read.unwrap().unwrap().unwrap().vote_count, 0);
        let created = add_post(&repository, &author, "Third post");
        assert!(timeout(Duration::from_secs(1), created).await.is_ok());

        first.commit().await.unwrap();
        assert_eq!(repository.get_target(&free).await.unwrap().unwrap().vote_count, -1);
        assert_eq!(repository.votes_on(&busy).await.len(), 1);
    }

    #[tokio::test]
    async fn test_reputation_deltas_on_different_targets_add_up() {
        let repository = InMemoryRepository::new();
        let (author, post) = seed_post(&repository).await;
        let other = add_post(&repository, &author, "Another post").await;

        let mut first = repository.begin().await.unwrap();
        first.lock_target(&TargetRef::post(post.id)).await.unwrap();
        first.apply_reputation_delta(author.id, 1).await.unwrap();

        let mut second = repository.begin().await.unwrap();
        second.lock_target(&TargetRef::post(other.id)).await.unwrap();
        second.apply_reputation_delta(author.id, -2).await.unwrap();

        second.commit().await.unwrap();
        first.commit().await.unwrap();

        assert_eq!(repository.get_user(author.id).await.unwrap().unwrap().reputation, -1);
    }

    #[tokio::test]
    async fn test_comment_requires_existing_post_and_parent() {
        let repository = InMemoryRepository::new();
        let (author, post) = seed_post(&repository).await;

        let orphan = repository
            .create_comment(&NewComment {
                post_id: Uuid::new_v4(),
                parent_id: None,
                author_id: author.id,
                content: "hello".to_string(),
            })
            .await;
        assert!(matches!(orphan, Err(VotesRepositoryError::TargetNotFound(_))));

        let comment = repository
            .create_comment(&NewComment {
                post_id: post.id,
                parent_id: None,
                author_id: author.id,
                content: "hello".to_string(),
            })
            .await
            .unwrap();
        let reply = repository
            .create_comment(&NewComment {
                post_id: post.id,
                parent_id: Some(comment.id),
                author_id: author.id,
                content: "a reply".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(reply.parent_id, Some(comment.id));
        assert_eq!(repository.get_comment(reply.id).await.unwrap(), Some(reply.clone()));
        assert_eq!(repository.list_comments(post.id).await.unwrap(), vec![comment, reply]);
    }

    #[tokio::test]
    async fn test_list_posts_newest_first() {
        let repository = InMemoryRepository::new();
        let (author, first) = seed_post(&repository).await;
        let second = add_post(&repository, &author, "Second post").await;
        let third = add_post(&repository, &author, "Third post").await;

        assert_eq!(repository.count_posts().await.unwrap(), 3);
        assert_eq!(repository.list_posts(2, 0).await.unwrap(), vec![third, second]);
        assert_eq!(repository.list_posts(2, 2).await.unwrap(), vec![first]);
        assert!(repository.list_posts(2, 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_user_keeps_reputation() {
        let repository = InMemoryRepository::new();
        let (author, post) = seed_post(&repository).await;

        let mut tx = repository.begin().await.unwrap();
        tx.lock_target(&TargetRef::post(post.id)).await.unwrap();
        tx.apply_reputation_delta(author.id, 5).await.unwrap();
        tx.commit().await.unwrap();

        let renamed = repository
            .upsert_user(&UserProfile { id: author.id, name: "renamed".to_string() })
            .await
            .unwrap();
        assert_eq!(renamed.name, "renamed");
        assert_eq!(renamed.reputation, 5);
    }
}
