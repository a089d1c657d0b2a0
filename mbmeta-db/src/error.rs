//! Common error types for the metadata lookup layer

use thiserror::Error;

/// Common result type for metadata lookup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the lookup facades
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested include token is not valid for the entity type.
    /// Raised before any query executes.
    #[error("Invalid include: {0}")]
    InvalidInclude(String),

    /// An MBID stored in the database failed to parse as a UUID
    #[error("Invalid MBID in database: {0}")]
    InvalidMbid(#[from] uuid::Error),
}
