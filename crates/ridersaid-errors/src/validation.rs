//! Input validation error types.
//!
//! Validation runs before any network or store call, so these errors never
//! imply a partial write.

/// Validation error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Value is required but missing or blank
    #[error("Required field '{0}' is missing")]
    Required(String),

    /// Invalid format
    #[error("Invalid format for field '{field}': {reason}")]
    InvalidFormat {
        /// Field name
        field: String,
        /// Reason for the format error
        reason: String,
    },

    /// Value too short
    #[error("Field '{field}' value is too short: {actual} characters (min: {min})")]
    TooShort {
        /// Field name
        field: String,
        /// Actual length
        actual: usize,
        /// Minimum required length
        min: usize,
    },

    /// Value out of range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Minimum allowed value
        min: String,
        /// Maximum allowed value
        max: String,
    },

    /// Invalid enum value
    #[error("Invalid value '{value}' for field '{field}', expected one of: {expected}")]
    InvalidEnumValue {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Expected values
        expected: String,
    },
}

impl ValidationError {
    /// Create a required field error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required(field.into())
    }

    /// Create an invalid format error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a too short error.
    pub fn too_short(field: impl Into<String>, actual: usize, min: usize) -> Self {
        ValidationError::TooShort {
            field: field.into(),
            actual,
            min,
        }
    }

    /// Create an out of range error.
    pub fn out_of_range<T: ToString>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Create an invalid enum value error.
    pub fn invalid_enum(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: &[&str],
    ) -> Self {
        ValidationError::InvalidEnumValue {
            field: field.into(),
            value: value.into(),
            expected: expected.join(", "),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required(field) => field,
            ValidationError::InvalidFormat { field, .. }
            | ValidationError::TooShort { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidEnumValue { field, .. } => field,
        }
    }
}
