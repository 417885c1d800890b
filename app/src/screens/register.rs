//! Register screen.

use super::navigate;
use crate::app::{AppAction, AppEnvironment, AppState, Notice, Screen};
use crate::error::ValidationError;
use std::sync::Arc;
use tasknest_core::effect::{Effect, IdentityOperation};
use tasknest_core::identity::{Credentials, Session};
use tasknest_core::{SmallVec, smallvec};

/// Shortest password accepted for a new account, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Register screen intents and outcomes.
#[derive(Clone, Debug, PartialEq)]
pub enum RegisterAction {
    /// "Register" pressed with the fields as typed
    Submit {
        /// Raw field contents
        credentials: Credentials,
    },
    /// "Already have an account" link
    OpenLogin,
    /// The account was created and signed in
    SignedUp {
        /// New session
        session: Session,
    },
    /// The provider refused to create the account
    Failed {
        /// Provider message
        error: String,
    },
}

impl RegisterAction {
    /// Whether the user originated this action.
    #[must_use]
    pub const fn is_intent(&self) -> bool {
        matches!(self, Self::Submit { .. } | Self::OpenLogin)
    }
}

/// Trim the email, require both fields and a password of at least
/// [`MIN_PASSWORD_LENGTH`] characters.
///
/// # Errors
///
/// Returns [`ValidationError::MissingFields`] or
/// [`ValidationError::PasswordTooShort`].
pub fn validate_registration(credentials: Credentials) -> Result<Credentials, ValidationError> {
    let email = credentials.email.trim();
    if email.is_empty() || credentials.password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if credentials.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(Credentials::new(email, credentials.password))
}

/// Register screen controller.
pub struct RegisterScreen;

impl RegisterScreen {
    pub(crate) fn reduce(
        state: &mut AppState,
        action: RegisterAction,
        env: &AppEnvironment,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        match action {
            RegisterAction::Submit { credentials } => {
                let credentials = match validate_registration(credentials) {
                    Ok(credentials) => credentials,
                    Err(error) => {
                        state.notice = Some(Notice::error(error.to_string()));
                        return SmallVec::new();
                    },
                };

                state.pending = true;
                smallvec![Effect::Identity(IdentityOperation::SignUp {
                    identity: Arc::clone(&env.identity),
                    credentials,
                    on_success: Box::new(|session| {
                        Some(AppAction::Register(RegisterAction::SignedUp { session }))
                    }),
                    on_error: Box::new(|error| {
                        Some(AppAction::Register(RegisterAction::Failed {
                            error: error.to_string(),
                        }))
                    }),
                })]
            },

            RegisterAction::OpenLogin => navigate(state, Screen::Login, env),

            RegisterAction::SignedUp { session } => {
                state.pending = false;
                state.session = Some(session);
                state.notice = Some(Notice::info("Registration successful"));
                navigate(state, Screen::Main, env)
            },

            RegisterAction::Failed { error } => {
                state.pending = false;
                state.notice = Some(Notice::error(format!("Registration failed: {error}")));
                SmallVec::new()
            },
        }
    }
}
