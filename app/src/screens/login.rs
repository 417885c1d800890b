//! Login screen.

use super::navigate;
use crate::app::{AppAction, AppEnvironment, AppState, Notice, Screen};
use crate::error::ValidationError;
use std::sync::Arc;
use tasknest_core::effect::{Effect, IdentityOperation};
use tasknest_core::identity::{Credentials, Session};
use tasknest_core::{SmallVec, smallvec};

/// Login screen intents and outcomes.
#[derive(Clone, Debug, PartialEq)]
pub enum LoginAction {
    /// "Log in" pressed with the fields as typed
    Submit {
        /// Raw field contents
        credentials: Credentials,
    },
    /// "Create an account" link
    OpenRegister,
    /// The provider accepted the credentials
    SignedIn {
        /// New session
        session: Session,
    },
    /// The provider rejected the credentials or could not be reached
    Failed {
        /// Provider message
        error: String,
    },
}

impl LoginAction {
    /// Whether the user originated this action (as opposed to a remote
    /// outcome).
    #[must_use]
    pub const fn is_intent(&self) -> bool {
        matches!(self, Self::Submit { .. } | Self::OpenRegister)
    }
}

/// Trim the email and require both fields.
///
/// # Errors
///
/// Returns [`ValidationError::MissingFields`] if either field is empty.
pub fn validate_login(credentials: Credentials) -> Result<Credentials, ValidationError> {
    let email = credentials.email.trim();
    if email.is_empty() || credentials.password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    Ok(Credentials::new(email, credentials.password))
}

/// Login screen controller.
pub struct LoginScreen;

impl LoginScreen {
    pub(crate) fn reduce(
        state: &mut AppState,
        action: LoginAction,
        env: &AppEnvironment,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        match action {
            LoginAction::Submit { credentials } => {
                let credentials = match validate_login(credentials) {
                    Ok(credentials) => credentials,
                    Err(error) => {
                        state.notice = Some(Notice::error(error.to_string()));
                        return SmallVec::new();
                    },
                };

                state.pending = true;
                smallvec![Effect::Identity(IdentityOperation::SignIn {
                    identity: Arc::clone(&env.identity),
                    credentials,
                    on_success: Box::new(|session| {
                        Some(AppAction::Login(LoginAction::SignedIn { session }))
                    }),
                    on_error: Box::new(|error| {
                        Some(AppAction::Login(LoginAction::Failed {
                            error: error.to_string(),
                        }))
                    }),
                })]
            },

            LoginAction::OpenRegister => navigate(state, Screen::Register, env),

            LoginAction::SignedIn { session } => {
                state.pending = false;
                state.session = Some(session);
                navigate(state, Screen::Main, env)
            },

            LoginAction::Failed { error } => {
                state.pending = false;
                state.notice = Some(Notice::error(format!("Login failed: {error}")));
                SmallVec::new()
            },
        }
    }
}
