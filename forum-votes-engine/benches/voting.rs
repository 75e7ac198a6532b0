use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use forum_votes_engine::VotingEngine;
use forum_votes_repository::{ForumRepository, InMemoryRepository};
use forum_votes_shared::types::{NewPost, TargetRef, UserIdentity, UserProfile, VoteValue};
use std::sync::Arc;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Creates an engine over a fresh in-memory repository holding one post.
fn make_engine(rt: &Runtime) -> (VotingEngine, TargetRef) {
    rt.block_on(async {
        let repository = InMemoryRepository::new();
        let author = repository
            .upsert_user(&UserProfile { id: Uuid::new_v4(), name: "author".to_string() })
            .await
            .expect("seed author");
        let post = repository
            .create_post(&NewPost {
                author_id: author.id,
                title: "Benchmark post".to_string(),
                content: "Voted on in a loop".to_string(),
            })
            .await
            .expect("seed post");
        (VotingEngine::new(Arc::new(repository)), TargetRef::post(post.id))
    })
}

fn make_voters(count: usize) -> Vec<UserIdentity> {
    (0..count).map(|_| UserIdentity::from(Uuid::new_v4())).collect()
}

/// Benchmark one voter toggling the same vote
fn single_voter_toggle(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let (engine, target) = make_engine(&rt);
    let voter = Some(UserIdentity::from(Uuid::new_v4()));

    c.bench_function("cast_vote_toggle", |b| {
        b.iter(|| {
            rt.block_on(engine.cast_vote(voter, black_box(target), VoteValue::Up))
                .expect("cast vote")
        })
    });
}

/// Benchmark casting votes from many distinct voters on a growing target
fn distinct_voters(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("distinct_voters");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(format!("voters_{}", size), size, |b, &size| {
            b.iter_batched(
                || (make_engine(&rt), make_voters(size)),
                |((engine, target), voters)| {
                    rt.block_on(async {
                        for voter in voters {
                            engine
                                .cast_vote(Some(voter), target, VoteValue::Up)
                                .await
                                .expect("cast vote");
                        }
                    })
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark one vote while the forum holds many unrelated posts
fn unrelated_posts(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("unrelated_posts");

    for size in [10, 10_000].iter() {
        let repository = InMemoryRepository::new();
        let target = rt.block_on(async {
            let author = repository
                .upsert_user(&UserProfile { id: Uuid::new_v4(), name: "author".to_string() })
                .await
                .expect("seed author");
            let mut last = None;
            for i in 0..*size {
                let post = repository
                    .create_post(&NewPost {
                        author_id: author.id,
                        title: format!("Unrelated post {i}"),
                        content: "Never voted on".to_string(),
                    })
                    .await
                    .expect("seed post");
                last = Some(post.id);
            }
            TargetRef::post(last.expect("at least one post"))
        });
        let engine = VotingEngine::new(Arc::new(repository));
        let voter = Some(UserIdentity::from(Uuid::new_v4()));

        group.bench_with_input(format!("posts_{}", size), size, |b, _| {
            b.iter(|| {
                rt.block_on(engine.cast_vote(voter, black_box(target), VoteValue::Up))
                    .expect("cast vote")
            })
        });
    }

    group.finish();
}

criterion_group!(benches, single_voter_toggle, distinct_voters, unrelated_posts);
criterion_main!(benches);
