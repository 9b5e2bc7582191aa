//! Unified error type for the common utilities
//!
//! CSV decoding is total and the predicates return `bool`, so the only
//! fallible operations are the timestamp codec and the validated newtypes.

use thiserror::Error;

/// Unified error type for common utility operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Timestamp string does not match `YYYY-MM-DD HH:MM:SS.mmm`
    /// or one of its components is outside its calendar range
    #[error("Invalid timestamp format: {0}")]
    InvalidFormat(String),

    /// Millisecond count has no calendar representation
    #[error("Timestamp out of range: {0} ms")]
    OutOfRange(i64),

    /// Validated newtype constructed from a rejected value
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CommonError {
    /// Creates an invalid format error for timestamp strings.
    ///
    /// Callers should treat this as bad input rather than a transient
    /// condition; retrying with the same string fails the same way.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create an out of range error
    pub fn out_of_range(millis: i64) -> Self {
        Self::OutOfRange(millis)
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
