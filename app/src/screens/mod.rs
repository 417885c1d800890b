//! Screen controllers.
//!
//! Each screen turns its intents into state changes and remote calls on the
//! shared [`AppState`]. Moving between screens goes through [`navigate`], which
//! runs the main screen's session guard every time it becomes visible.

use crate::app::{AppAction, AppEnvironment, AppState, Screen};
use tasknest_core::{SmallVec, effect::Effect};

mod login;
mod main_screen;
mod register;

pub use login::{LoginAction, LoginScreen, validate_login};
pub use main_screen::{MainAction, MainScreen};
pub use register::{MIN_PASSWORD_LENGTH, RegisterAction, RegisterScreen, validate_registration};

/// Show `to`.
pub(crate) fn navigate(
    state: &mut AppState,
    to: Screen,
    env: &AppEnvironment,
) -> SmallVec<[Effect<AppAction>; 4]> {
    if state.screen != to {
        tracing::info!(from = %state.screen, to = %to, "Navigating");
    }
    if to != Screen::Main {
        state.add_dialog_open = false;
    }
    state.screen = to;

    match to {
        Screen::Main => MainScreen::appeared(state, env),
        Screen::Login | Screen::Register => SmallVec::new(),
    }
}
