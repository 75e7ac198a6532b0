//! # Forum Votes Engine
//! This crate implements the voting and reputation consistency engine.
//! It includes the per-voter vote state machine, the aggregate recomputation of
//! target vote counts, the reputation ledger, and the `VotingEngine` that
//! composes them into one transaction per vote request.
//!
//! `tests/postgres_engine.rs` exercises the engine against PostgreSQL and only
//! runs with `cargo test --features postgres-tests` and a `DATABASE_URL`.
pub mod aggregate;
pub mod config;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod state;

pub use config::VotingEngineConfig;
pub use engine::VotingEngine;
pub use errors::VotingError;
pub use state::VoteCommand;
