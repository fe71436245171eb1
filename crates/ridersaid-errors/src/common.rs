//! Top-level error type and classification shared by all RidersAid crates.

use core::fmt;

use crate::{AccessError, StoreError, ValidationError};

/// Top-level error type wrapping every RidersAid sub-error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RidersAidError {
    /// Identity and ownership errors
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    /// Record store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl RidersAidError {
    /// The user-facing outcome this error maps to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RidersAidError::Access(e) => e.kind(),
            RidersAidError::Store(e) => e.kind(),
            RidersAidError::Validation(_) => ErrorKind::ValidationFailed,
            RidersAidError::Config(_) => ErrorKind::Config,
            RidersAidError::Other(_) => ErrorKind::Internal,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RidersAidError::Access(e) => e.severity(),
            RidersAidError::Store(e) => e.severity(),
            RidersAidError::Validation(_) => ErrorSeverity::Info,
            RidersAidError::Config(_) => ErrorSeverity::Critical,
            RidersAidError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Whether repeating the same request later may succeed.
    ///
    /// Only store outages are transient. A missing record stays missing.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::StoreUnavailable
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        RidersAidError::Config(msg.into())
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        RidersAidError::Other(msg.into())
    }
}

/// User-facing outcome of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    /// Mutation attempted without a current identity
    Unauthenticated = 0,
    /// Token, profile or record does not exist for this caller
    NotFound = 1,
    /// Input rejected before any store call
    ValidationFailed = 2,
    /// Record store unreachable or failing
    StoreUnavailable = 3,
    /// Write rejected because it would break a uniqueness invariant
    Conflict = 4,
    /// Invalid service configuration
    Config = 5,
    /// Anything else
    Internal = 255,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unauthenticated => write!(f, "unauthenticated"),
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::ValidationFailed => write!(f, "validation_failed"),
            ErrorKind::StoreUnavailable => write!(f, "store_unavailable"),
            ErrorKind::Conflict => write!(f, "conflict"),
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the service cannot do its job
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Context information attached to an error message.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The operation that was being performed
    pub operation: String,
    /// Additional context key-value pairs
    pub context: Vec<(String, String)>,
}

impl ErrorContext {
    /// Create a new error context for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            context: Vec::new(),
        }
    }

    /// Add a context key-value pair.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation: {}", self.operation)?;
        for (key, value) in &self.context {
            write!(f, ", {key}: {value}")?;
        }
        Ok(())
    }
}

/// Extension trait for adding context to errors.
///
/// Unlike a plain string wrapper, the context is only added to errors that
/// are not already user-facing outcomes, so a `NotFound` stays a `NotFound`.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, ctx: ErrorContext) -> Result<T, RidersAidError>;

    /// Add context with an operation name.
    fn with_context(self, operation: impl Into<String>) -> Result<T, RidersAidError>;
}

impl<T, E: Into<RidersAidError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, ctx: ErrorContext) -> Result<T, RidersAidError> {
        self.map_err(|e| match e.into() {
            RidersAidError::Other(msg) => RidersAidError::Other(format!("{ctx}: {msg}")),
            RidersAidError::Store(StoreError::Unavailable(msg)) => {
                RidersAidError::Store(StoreError::Unavailable(format!("{ctx}: {msg}")))
            }
            other => other,
        })
    }

    fn with_context(self, operation: impl Into<String>) -> Result<T, RidersAidError> {
        self.context(ErrorContext::new(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Unauthenticated.to_string(), "unauthenticated");
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::StoreUnavailable.to_string(), "store_unavailable");
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn test_error_context() {
        let ctx = ErrorContext::new("delete_allergy")
            .with("profile_id", "u-1")
            .with("record_id", "r-9");
        let text = ctx.to_string();
        assert!(text.contains("delete_allergy"));
        assert!(text.contains("record_id: r-9"));
    }

    #[test]
    fn test_store_outage_is_transient_but_not_found_is_not() {
        let outage: RidersAidError = StoreError::unavailable("connection refused").into();
        assert!(outage.is_transient());

        let missing: RidersAidError = AccessError::ProfileNotFound.into();
        assert!(!missing.is_transient());
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_context_keeps_user_facing_kind() {
        let result: std::result::Result<(), AccessError> = Err(AccessError::Unauthenticated);
        let err = result.with_context("add_allergy").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn test_context_prefixes_store_outage() {
        let result: std::result::Result<(), StoreError> =
            Err(StoreError::unavailable("timeout"));
        let err = result.with_context("list_allergies").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert!(err.to_string().contains("list_allergies"));
    }
}
