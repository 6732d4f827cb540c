//! Error types for the bcrypt job dispatcher
//!
//! Submission-time failures (bad arguments, bad cost, spawn failure) are the
//! only errors that leave this crate. Verification never fails: a malformed
//! reference hash is a negative result, not an error.

use std::io;

// ----------------------------------------------------------------------------
// Dispatcher Errors
// ----------------------------------------------------------------------------

/// Core error type for job submission and plugin lifecycle
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid work factor (cost) {cost}. Allowed range: 4-31")]
    InvalidCost { cost: i64 },

    #[error("Incorrect number of parameters ({expected} required, got {actual})")]
    ArgumentCount {
        native: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown native function: {name}")]
    UnknownNative { name: String },

    /// The execution unit could not be started; the request is dropped
    #[error("Failed to spawn execution unit: {0}")]
    Spawn(#[from] io::Error),

    #[error("Hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

// ----------------------------------------------------------------------------
// Host Callback Errors
// ----------------------------------------------------------------------------

/// Error reported by a host instance while executing one of its callbacks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Callback {callback} failed: {reason}")]
pub struct CallbackError {
    pub callback: String,
    pub reason: String,
}

impl CallbackError {
    pub fn new<C: Into<String>, R: Into<String>>(callback: C, reason: R) -> Self {
        Self {
            callback: callback.into(),
            reason: reason.into(),
        }
    }
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl DispatchError {
    /// Create a configuration error with a reason
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        DispatchError::Configuration {
            reason: reason.into(),
        }
    }

    /// Create an invalid cost error from any integer width the host hands us
    pub fn invalid_cost<T: Into<i64>>(cost: T) -> Self {
        DispatchError::InvalidCost { cost: cost.into() }
    }

    /// Create an argument count error for a native call
    pub fn argument_count(native: &'static str, expected: usize, actual: usize) -> Self {
        DispatchError::ArgumentCount {
            native,
            expected,
            actual,
        }
    }

    /// Whether the error was caused by the caller's input rather than by
    /// resource exhaustion
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DispatchError::InvalidCost { .. }
                | DispatchError::ArgumentCount { .. }
                | DispatchError::UnknownNative { .. }
        )
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(DispatchError::invalid_cost(3u16).is_validation());
        assert!(DispatchError::argument_count("bcrypt_hash", 4, 3).is_validation());
        assert!(!DispatchError::Spawn(io::Error::new(io::ErrorKind::Other, "no threads"))
            .is_validation());
        assert!(!DispatchError::config_error("bad").is_validation());
    }

    #[test]
    fn test_error_messages() {
        let err = DispatchError::invalid_cost(40u16);
        assert_eq!(
            err.to_string(),
            "Invalid work factor (cost) 40. Allowed range: 4-31"
        );

        let err = DispatchError::argument_count("bcrypt_check", 4, 2);
        assert_eq!(
            err.to_string(),
            "Incorrect number of parameters (4 required, got 2)"
        );
    }
}
