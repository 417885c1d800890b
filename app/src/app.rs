//! App composition.
//!
//! [`AppReducer`] owns the whole client state: which screen is showing, the
//! session, the task list and the current notice. Screen intents are handed
//! to the screen controllers in [`crate::screens`]; task list actions go to
//! the [`TaskListReducer`], whose effects are lifted into [`AppAction`]s.

use crate::list_view::ListView;
use crate::screens::{LoginAction, LoginScreen, MainAction, MainScreen, RegisterAction, RegisterScreen};
use crate::task_list::{TaskListAction, TaskListEnvironment, TaskListReducer, TaskListState};
use std::fmt;
use std::sync::Arc;
use tasknest_core::identity::{IdentityClient, Session};
use tasknest_core::{SmallVec, effect::Effect, reducer::Reducer};

/// Screens of the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    /// Email and password sign-in
    #[default]
    Login,
    /// Account creation
    Register,
    /// The task list
    Main,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Main => "main",
        })
    }
}

/// Severity of a notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Confirmation
    Info,
    /// Something was rejected or failed
    Error,
}

/// A transient message for the user, replaced by the next one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text shown to the user
    pub text: String,
}

impl Notice {
    /// An informational notice
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    /// An error notice
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{}", self.text),
            NoticeLevel::Error => write!(f, "error: {}", self.text),
        }
    }
}

/// Whole-client state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// Screen currently showing
    pub screen: Screen,
    /// Session as last reported by the identity provider
    pub session: Option<Session>,
    /// The task list presenter
    pub tasks: TaskListState,
    /// The "add task" dialog is open
    pub add_dialog_open: bool,
    /// Current notice, if any
    pub notice: Option<Notice>,
    /// A sign-in or sign-up request is in flight
    pub pending: bool,
}

impl AppState {
    /// Creates the initial state: on the login screen, signed out
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Row model of the task list
    #[must_use]
    pub fn list_view(&self) -> ListView {
        ListView::render(&self.tasks)
    }

    /// Whether a session is held
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }
}

/// Everything the client reacts to.
#[derive(Clone, Debug, PartialEq)]
pub enum AppAction {
    /// The client was launched
    Started,
    /// Login screen
    Login(LoginAction),
    /// Register screen
    Register(RegisterAction),
    /// Main screen
    Main(MainAction),
    /// Task list presenter
    Tasks(TaskListAction),
    /// Clear the current notice
    DismissNotice,
}

/// Collaborators of the client.
#[derive(Clone)]
pub struct AppEnvironment {
    /// Identity provider
    pub identity: Arc<dyn IdentityClient>,
    /// Task list collaborators
    pub tasks: TaskListEnvironment,
}

impl AppEnvironment {
    /// Creates a new `AppEnvironment`
    #[must_use]
    pub const fn new(identity: Arc<dyn IdentityClient>, tasks: TaskListEnvironment) -> Self {
        Self { identity, tasks }
    }
}

/// Run a task list action and lift its effects into app actions.
pub(crate) fn reduce_tasks(
    state: &mut AppState,
    action: TaskListAction,
    env: &AppEnvironment,
) -> SmallVec<[Effect<AppAction>; 4]> {
    TaskListReducer::new()
        .reduce(&mut state.tasks, action, &env.tasks)
        .into_iter()
        .map(|effect| effect.map(AppAction::Tasks))
        .collect()
}

/// Root reducer.
#[derive(Clone, Debug, Default)]
pub struct AppReducer;

impl AppReducer {
    /// Creates a new `AppReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Started => {
                tracing::info!("Client started");
                crate::screens::navigate(state, Screen::Main, env)
            },

            AppAction::Login(action) => {
                if action.is_intent() && state.screen != Screen::Login {
                    tracing::debug!(screen = %state.screen, ?action, "Ignoring login intent off screen");
                    return SmallVec::new();
                }
                LoginScreen::reduce(state, action, env)
            },

            AppAction::Register(action) => {
                if action.is_intent() && state.screen != Screen::Register {
                    tracing::debug!(screen = %state.screen, ?action, "Ignoring register intent off screen");
                    return SmallVec::new();
                }
                RegisterScreen::reduce(state, action, env)
            },

            AppAction::Main(action) => {
                if action.is_intent() && state.screen != Screen::Main {
                    tracing::debug!(screen = %state.screen, ?action, "Ignoring main intent off screen");
                    return SmallVec::new();
                }
                if action.is_intent() && state.pending {
                    tracing::debug!(?action, "Ignoring main intent while signing out");
                    return SmallVec::new();
                }
                MainScreen::reduce(state, action, env)
            },

            AppAction::Tasks(action) => {
                // A signed-out client never shows or changes a task list.
                if !state.is_signed_in() {
                    tracing::debug!(?action, "Dropping task action without a session");
                    return SmallVec::new();
                }
                let failure = match &action {
                    TaskListAction::WriteFailed { error } => Some(error.clone()),
                    _ => None,
                };
                let effects = reduce_tasks(state, action, env);
                if let Some(error) = failure {
                    state.notice = Some(Notice::error(error));
                }
                effects
            },

            AppAction::DismissNotice => {
                state.notice = None;
                SmallVec::new()
            },
        }
    }
}
