//! # Forum Votes Shared
//! This crate defines shared data structures and types used across the forum votes crates.
//! It includes common definitions for votes, votable targets, vote counts, vote transitions
//! and the forum entities (users, posts, comments) that own reputation and vote counts.
pub mod types;
