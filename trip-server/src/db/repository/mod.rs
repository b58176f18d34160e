//! Repository Module
//!
//! CRUD operations over the SQLite pool. Multi-step writes run inside a
//! transaction. Ordering is the placement engine's business: repositories
//! never write `order_key`, they only sort by it.

pub mod day;
pub mod schedule;
pub mod trip;

use thiserror::Error;

use crate::placement::PlacementError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<PlacementError> for RepoError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::ScheduleNotFound(id) => {
                RepoError::NotFound(format!("Schedule {id} not found"))
            }
            PlacementError::BucketNotFound(bucket) => {
                RepoError::NotFound(format!("Bucket {bucket} not found"))
            }
            other => RepoError::Database(other.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
