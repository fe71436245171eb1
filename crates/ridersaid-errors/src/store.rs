//! Record store errors.

use crate::common::{ErrorKind, ErrorSeverity};

/// Failures reported by a record store implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Backend unreachable or refusing requests
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// Snapshot file could not be read or written
    #[error("Snapshot I/O failed for {path}: {reason}")]
    Snapshot {
        /// Snapshot path
        path: String,
        /// Failure reason
        reason: String,
    },

    /// Stored data could not be decoded
    #[error("Corrupt store data: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// The user-facing outcome of this error.
    ///
    /// Every store failure is surfaced as an outage. None of them means the
    /// requested record does not exist.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::StoreUnavailable
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StoreError::Unavailable(_) => ErrorSeverity::Error,
            StoreError::Snapshot { .. } => ErrorSeverity::Error,
            StoreError::Corrupt(_) => ErrorSeverity::Critical,
        }
    }

    /// Create an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreError::Unavailable(reason.into())
    }

    /// Create a snapshot I/O error.
    pub fn snapshot(path: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Snapshot {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
