//! This module defines and re-exports the interfaces for the forum votes repository.
//! It serves as a central point for accessing traits related to data interaction.
mod forum_repository;
mod votes_repository;

pub use forum_repository::ForumRepository;
pub use votes_repository::{VotesRepository, VotesTransaction};
