//! Error types for the forum votes repository.
//! Consolidates and re-exports error types related to repository operations.
mod votes_repository;

pub use votes_repository::VotesRepositoryError;
