//! Identity and ownership errors.
//!
//! Rows that belong to another owner are reported as not found rather than
//! forbidden, so a caller cannot discover ids that exist elsewhere.

use crate::common::{ErrorKind, ErrorSeverity};

/// Identity, ownership and token errors.
///
/// # Examples
///
/// ```
/// use ridersaid_errors::{AccessError, ErrorKind};
///
/// let err = AccessError::record_not_found("allergies", "4b1d");
/// assert_eq!(err.kind(), ErrorKind::NotFound);
///
/// assert_eq!(AccessError::Unauthenticated.kind(), ErrorKind::Unauthenticated);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// A mutation was attempted with no current identity
    #[error("Not authenticated")]
    Unauthenticated,

    /// Sign-in with an unknown email or a wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Sign-up with an email that already has an account
    #[error("An account for this email already exists")]
    AccountExists,

    /// The acting identity has no profile row
    #[error("Profile not found")]
    ProfileNotFound,

    /// The targeted record does not exist or belongs to someone else
    #[error("Record {id} not found in {collection}")]
    RecordNotFound {
        /// Collection name
        collection: String,
        /// Record identifier
        id: String,
    },

    /// Every generated token collided with an existing one
    #[error("Could not issue a unique access token after {attempts} attempts")]
    TokenCollision {
        /// Number of generated candidates
        attempts: u32,
    },
}

impl AccessError {
    /// The user-facing outcome of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccessError::Unauthenticated | AccessError::InvalidCredentials => {
                ErrorKind::Unauthenticated
            }
            AccessError::ProfileNotFound | AccessError::RecordNotFound { .. } => {
                ErrorKind::NotFound
            }
            AccessError::TokenCollision { .. } | AccessError::AccountExists => {
                ErrorKind::Conflict
            }
        }
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AccessError::Unauthenticated | AccessError::AccountExists => ErrorSeverity::Info,
            AccessError::InvalidCredentials => ErrorSeverity::Warning,
            AccessError::ProfileNotFound => ErrorSeverity::Warning,
            AccessError::RecordNotFound { .. } => ErrorSeverity::Warning,
            AccessError::TokenCollision { .. } => ErrorSeverity::Error,
        }
    }

    /// Create a record not found error.
    pub fn record_not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        AccessError::RecordNotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }
}
