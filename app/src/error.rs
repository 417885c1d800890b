//! Error types for the tasknest client.

use tasknest_runtime::StoreError;
use thiserror::Error;

/// Input rejected on the login or register screen before any remote call.
///
/// The display text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email or password left empty
    #[error("Please fill in all fields")]
    MissingFields,

    /// Password shorter than the registration minimum
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Required length
        min: usize,
    },
}

/// Errors surfaced by the binary.
#[derive(Error, Debug)]
pub enum AppError {
    /// An environment variable held a value that could not be parsed
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidConfig {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },

    /// The store rejected an action or failed to shut down
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages() {
        assert_eq!(ValidationError::MissingFields.to_string(), "Please fill in all fields");
        assert_eq!(
            ValidationError::PasswordTooShort { min: 6 }.to_string(),
            "Password must be at least 6 characters"
        );
    }

    #[test]
    fn store_errors_convert() {
        let err: AppError = StoreError::ShutdownInProgress.into();
        assert_eq!(err.to_string(), "Store error: Store is shutting down");
    }
}
