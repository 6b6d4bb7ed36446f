//! Shared utilities, configuration, and error handling for Threadline
//!
//! This crate provides common functionality used across the Threadline service:
//! - Configuration management following 12-factor principles
//! - The webhook/read API error taxonomy and its HTTP mapping
//! - Repository and state machine error types
//! - Request extractors

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::{Config, StorageBackend};
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
pub use state::StateError;
