//! Reconciliation error types.

use crate::ports::{SourceError, SourceKind};
use atlas_store::StoreError;
use thiserror::Error;

/// Errors the refresh workflow can surface.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// An external fetch failed; nothing was written.
    #[error("{kind} unavailable: {cause}")]
    SourceUnavailable {
        kind: SourceKind,
        cause: SourceError,
    },

    /// Store failure during reconciliation; the whole cycle rolled back.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RefreshError {
    /// Tag a source error with the source it came from.
    pub fn source(kind: SourceKind, cause: SourceError) -> Self {
        Self::SourceUnavailable { kind, cause }
    }
}
