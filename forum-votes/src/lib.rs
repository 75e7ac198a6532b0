//! Forum Votes Library
//!
//! This library provides the HTTP surface of the forum voting service,
//! including configuration management, error handling, identity resolution
//! and dependency injection.

pub mod config;
pub mod errors;
pub mod identity;
pub mod models;
pub mod server;

pub use config::{Dependencies, Settings};
pub use errors::{ApiError, ServerError};
