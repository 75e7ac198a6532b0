//! PostgreSQL implementation of the votes repository.
//!
//! Provides a PostgreSQL backend for the `VotesRepository` trait with
//! connection pooling and one database transaction per vote operation.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - Row-level locking of the voted target with `SELECT ... FOR UPDATE`
//! - Upsert support with `ON CONFLICT DO UPDATE`
//! - Full recount of a target's votes with `COUNT(*) FILTER`
//! - Automatic rollback when a transaction is dropped uncommitted
use async_trait::async_trait;
use forum_votes_shared::types::{Target, TargetRef, UserId, VoteValue, VotesCount};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{decode_vote_value, encode_vote_value, target_table};
use crate::{VotesRepository, VotesRepositoryError, VotesTransaction};

/// PostgreSQL implementation of the votes repository.
#[derive(Clone)]
pub struct PostgresVotesRepository {
    pool: sqlx::PgPool,
}

impl PostgresVotesRepository {
    /// Creates a new PostgreSQL repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with required schema
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresVotesRepository)` - Ready-to-use repository instance
    /// * `Err(VotesRepositoryError)` - Future validation errors (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, VotesRepositoryError> {
        Ok(Self { pool })
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), VotesRepositoryError> {
        sqlx::migrate!("src/postgres/migrations").run(&self.pool).await?;
        Ok(())
    }
}

async fn fetch_target<'e, E>(
    executor: E,
    target: &TargetRef,
    lock: bool,
) -> Result<Option<Target>, VotesRepositoryError>
where
    E: sqlx::PgExecutor<'e>,
{
    let query = format!(
        "SELECT author_id, votes FROM {} WHERE id = $1{}",
        target_table(target.target_type),
        if lock { " FOR UPDATE" } else { "" }
    );

    let row: Option<(Uuid, i64)> = sqlx::query_as(&query)
        .bind(target.id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(|(author_id, vote_count)| Target {
        target: *target,
        author_id,
        vote_count,
    }))
}

async fn fetch_vote<'e, E>(
    executor: E,
    voter_id: UserId,
    target: &TargetRef,
    lock: bool,
) -> Result<Option<VoteValue>, VotesRepositoryError>
where
    E: sqlx::PgExecutor<'e>,
{
    let query = format!(
        "SELECT value FROM votes WHERE voter_id = $1 AND target_id = $2 AND target_type = $3{}",
        if lock { " FOR UPDATE" } else { "" }
    );

    let value: Option<i16> = sqlx::query_scalar(&query)
        .bind(voter_id)
        .bind(target.id)
        .bind(target.target_type.as_i16())
        .fetch_optional(executor)
        .await?;

    value.map(decode_vote_value).transpose()
}

#[async_trait]
impl VotesRepository for PostgresVotesRepository {
    async fn begin(&self) -> Result<Box<dyn VotesTransaction>, VotesRepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresVotesTransaction { tx }))
    }

    async fn get_target(&self, target: &TargetRef) -> Result<Option<Target>, VotesRepositoryError> {
        fetch_target(&self.pool, target, false).await
    }

    async fn get_vote(
        &self,
        voter_id: UserId,
        target: &TargetRef,
    ) -> Result<Option<VoteValue>, VotesRepositoryError> {
        fetch_vote(&self.pool, voter_id, target, false).await
    }

    /// Checks if the tables are created in the database.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If every table of the schema exists
    async fn check_tables_created(&self) -> Result<bool, VotesRepositoryError> {
        let tables = ["users", "posts", "comments", "votes"];
        for table in tables {
            let table_exists: Option<bool> = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
            if !table_exists.unwrap_or(false) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// A vote operation running inside one PostgreSQL transaction.
///
/// The transaction uses the default `READ COMMITTED` isolation level; the
/// `FOR UPDATE` lock taken by [`lock_target`](VotesTransaction::lock_target)
/// is what serialises concurrent operations on the same target.
pub struct PostgresVotesTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl VotesTransaction for PostgresVotesTransaction {
    async fn lock_target(
        &mut self,
        target: &TargetRef,
    ) -> Result<Option<Target>, VotesRepositoryError> {
        fetch_target(&mut *self.tx, target, true).await
    }

    async fn get_vote(
        &mut self,
        voter_id: UserId,
        target: &TargetRef,
    ) -> Result<Option<VoteValue>, VotesRepositoryError> {
        fetch_vote(&mut *self.tx, voter_id, target, false).await
    }

    async fn upsert_vote(
        &mut self,
        voter_id: UserId,
        target: &TargetRef,
        value: VoteValue,
    ) -> Result<Option<VoteValue>, VotesRepositoryError> {
        let previous = fetch_vote(&mut *self.tx, voter_id, target, true).await?;

        sqlx::query(
            r#"
            INSERT INTO votes (id, voter_id, target_id, target_type, value)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (voter_id, target_id, target_type)
            DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = NOW()
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(voter_id)
        .bind(target.id)
        .bind(target.target_type.as_i16())
        .bind(encode_vote_value(value))
        .execute(&mut *self.tx)
        .await?;

        Ok(previous)
    }

    async fn delete_vote(
        &mut self,
        voter_id: UserId,
        target: &TargetRef,
    ) -> Result<Option<VoteValue>, VotesRepositoryError> {
        let deleted: Option<i16> = sqlx::query_scalar(
            r#"
            DELETE FROM votes
            WHERE voter_id = $1 AND target_id = $2 AND target_type = $3
            RETURNING value
            "#,
        )
        .bind(voter_id)
        .bind(target.id)
        .bind(target.target_type.as_i16())
        .fetch_optional(&mut *self.tx)
        .await?;

        deleted.map(decode_vote_value).transpose()
    }

    async fn count_votes(
        &mut self,
        target: &TargetRef,
    ) -> Result<VotesCount, VotesRepositoryError> {
        let (upvotes, downvotes): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE value = $3) AS upvotes,
                COUNT(*) FILTER (WHERE value = $4) AS downvotes
            FROM votes
            WHERE target_id = $1 AND target_type = $2
            "#,
        )
        .bind(target.id)
        .bind(target.target_type.as_i16())
        .bind(encode_vote_value(VoteValue::Up))
        .bind(encode_vote_value(VoteValue::Down))
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(VotesCount { upvotes, downvotes })
    }

    async fn set_vote_count(
        &mut self,
        target: &TargetRef,
        count: i64,
    ) -> Result<(), VotesRepositoryError> {
        let query =
            format!("UPDATE {} SET votes = $2 WHERE id = $1", target_table(target.target_type));
        let result = sqlx::query(&query)
            .bind(target.id)
            .bind(count)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(VotesRepositoryError::TargetNotFound(*target));
        }
        Ok(())
    }

    async fn apply_reputation_delta(
        &mut self,
        user_id: UserId,
        delta: i64,
    ) -> Result<i64, VotesRepositoryError> {
        let reputation: Option<i64> = sqlx::query_scalar(
            "UPDATE users SET reputation = reputation + $2 WHERE id = $1 RETURNING reputation",
        )
        .bind(user_id)
        .bind(delta)
        .fetch_optional(&mut *self.tx)
        .await?;

        reputation.ok_or(VotesRepositoryError::UserNotFound(user_id))
    }

    async fn commit(self: Box<Self>) -> Result<(), VotesRepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
