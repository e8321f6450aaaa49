//! Daemon error types.

use atlas_engine::RefreshError;
use atlas_store::StoreError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Refresh workflow error
    #[error("Refresh error: {0}")]
    Refresh(#[from] RefreshError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (binding the listener, serving)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
