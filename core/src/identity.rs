//! Identity provider abstraction.
//!
//! Account management and sessions are delegated to an external identity
//! provider. The client signs users in and up with an email and password,
//! signs them out, and asks whether a session currently exists.
//!
//! The current session is queried through the injected [`IdentityClient`]
//! rather than read from global state, so every screen that depends on it
//! can be tested with a mock.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of an account at the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw user id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Email and password submitted on the login or register screen.
///
/// `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email (already trimmed by the screen).
    pub email: String,
    /// Account password, verbatim.
    pub password: String,
}

impl Credentials {
    /// Creates a new credentials pair.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Signed-in account.
    pub user_id: UserId,
    /// Email of the signed-in account.
    pub email: String,
    /// When the session was established.
    pub signed_in_at: DateTime<Utc>,
}

/// Errors reported by the identity provider.
///
/// The display text is the provider's raw message, shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The provider rejected the request (bad password, unknown account,
    /// email already in use, weak password).
    #[error("{0}")]
    Rejected(String),

    /// The provider could not be reached.
    #[error("{0}")]
    Network(String),
}

/// External identity provider.
pub trait IdentityClient: Send + Sync {
    /// Sign in with an existing account.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] carrying the provider's message if the
    /// credentials are rejected or the provider is unreachable.
    fn sign_in(&self, credentials: Credentials) -> BoxFuture<'_, Result<Session, IdentityError>>;

    /// Create an account and sign into it.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] carrying the provider's message if the
    /// account cannot be created.
    fn sign_up(&self, credentials: Credentials) -> BoxFuture<'_, Result<Session, IdentityError>>;

    /// End the current session, if any.
    fn sign_out(&self) -> BoxFuture<'_, ()>;

    /// The session the provider currently holds, if any.
    fn current_session(&self) -> Option<Session>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("ada@example.com", "hunter22");
        let debug = format!("{creds:?}");
        assert!(debug.contains("ada@example.com"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn identity_error_shows_provider_text() {
        let err = IdentityError::Rejected("The password is invalid.".to_string());
        assert_eq!(err.to_string(), "The password is invalid.");
    }
}
