//! Shared database types for Threadline
//!
//! This module provides the error type every storage backend reports through,
//! along with the classification of raw `sqlx` failures into it.

use crate::error::Error;
use thiserror::Error;

/// Database-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Record already exists")]
    AlreadyExists,

    #[error("Record is closed to further writes")]
    Closed,

    #[error("Database connection error: {0}")]
    Connection(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::AlreadyExists
            }
            // A dangling parent reference means the parent is gone
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            _ => RepositoryError::Connection(err),
        }
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Error::NotFound("Record not found".to_string()),
            RepositoryError::AlreadyExists => Error::Conflict("Record already exists".to_string()),
            RepositoryError::Closed => {
                Error::ClosedConversation("Record is closed to further writes".to_string())
            }
            RepositoryError::Connection(e) => Error::Database(e),
        }
    }
}
