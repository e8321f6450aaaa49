//! Storage layer errors

use thiserror::Error;

/// Errors that can occur in the storage layer.
///
/// "Not found" is not an error here: lookups return `Ok(None)` and deletes
/// return `Ok(0)`; the HTTP layer decides what a miss means.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Domain error passthrough (malformed row data)
    #[error("Domain error: {0}")]
    Domain(#[from] atlas_domain::DomainError),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Connection(err.to_string())
            },
            _ => StoreError::Database(err.to_string()),
        }
    }
}
