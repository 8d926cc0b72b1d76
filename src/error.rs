//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// A missing key is not an error: lookups return `Option` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is longer than the configured bound
    #[error("Key too long: {len} bytes exceeds maximum of {max}")]
    KeyTooLong { len: usize, max: usize },

    /// Value is longer than the configured bound
    #[error("Value too long: {len} bytes exceeds maximum of {max}")]
    ValueTooLong { len: usize, max: usize },

    /// Entry storage could not be grown
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    /// Configuration rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A key transform mapped two live entries onto the same key
    #[error("Key collision: {0}")]
    KeyCollision(String),

    /// Index and ordered sequence disagree; indicates a bug in the engine
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl CacheError {
    /// Returns true for errors caused by bad input that leave the cache untouched.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CacheError::KeyTooLong { .. }
                | CacheError::ValueTooLong { .. }
                | CacheError::KeyCollision(_)
        )
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::KeyTooLong { len: 40, max: 31 };
        assert_eq!(
            err.to_string(),
            "Key too long: 40 bytes exceeds maximum of 31"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(CacheError::ValueTooLong { len: 300, max: 255 }.is_recoverable());
        assert!(CacheError::KeyCollision("a".to_string()).is_recoverable());
        assert!(!CacheError::InvariantViolation("x".to_string()).is_recoverable());
        assert!(!CacheError::AllocationFailure("oom".to_string()).is_recoverable());
    }
}
