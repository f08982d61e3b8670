//! Storage error types.

use thiserror::Error;
use tollgate_types::ErrorCode;

/// Errors raised by [`RecordStore`](super::RecordStore) backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend failed or is unreachable. The triggering operation
    /// was not applied.
    #[error("storage backend failed: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn backend(detail: impl Into<String>) -> Self {
        StorageError::Backend(detail.into())
    }
}

impl ErrorCode for StorageError {
    fn code(&self) -> &'static str {
        match self {
            StorageError::Backend(_) => "STORAGE_BACKEND_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // backends may come back; callers can retry the same request
        true
    }
}
