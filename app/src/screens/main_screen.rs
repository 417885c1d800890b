//! Main screen: the task list, the "add task" dialog and log-out.

use super::navigate;
use crate::app::{AppAction, AppEnvironment, AppState, Screen, reduce_tasks};
use crate::list_view::{RowIntent, TaskRow};
use crate::task::TaskId;
use crate::task_list::TaskListAction;
use std::sync::Arc;
use tasknest_core::effect::{Effect, IdentityOperation};
use tasknest_core::SmallVec;

/// Main screen intents and outcomes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MainAction {
    /// The screen became visible again (resume, foreground)
    Appeared,
    /// "+" pressed
    OpenAddDialog,
    /// Dialog confirmed with this title
    ConfirmAdd {
        /// Title as typed
        title: String,
    },
    /// Dialog dismissed
    CancelAdd,
    /// A control on a row was pressed
    RowPressed {
        /// Task behind the row as it was shown
        id: TaskId,
        /// Control pressed
        intent: RowIntent,
    },
    /// "Log out" pressed
    Logout,
    /// The provider finished ending the session
    SignedOut,
}

impl MainAction {
    /// Whether the user originated this action (as opposed to a remote
    /// outcome).
    #[must_use]
    pub const fn is_intent(&self) -> bool {
        !matches!(self, Self::SignedOut)
    }
}

/// Main screen controller.
pub struct MainScreen;

impl MainScreen {
    /// Session guard, run every time the screen becomes visible: without a
    /// session, go back to login without touching the task store; with one,
    /// reload the list.
    pub(crate) fn appeared(
        state: &mut AppState,
        env: &AppEnvironment,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        state.session = env.identity.current_session();

        if state.session.is_none() {
            tracing::info!("No session, redirecting to login");
            let mut effects = reduce_tasks(state, TaskListAction::ClearTasks, env);
            effects.extend(navigate(state, Screen::Login, env));
            return effects;
        }

        reduce_tasks(state, TaskListAction::Load, env)
    }

    pub(crate) fn reduce(
        state: &mut AppState,
        action: MainAction,
        env: &AppEnvironment,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        match action {
            MainAction::Appeared => Self::appeared(state, env),

            MainAction::OpenAddDialog => {
                state.add_dialog_open = true;
                SmallVec::new()
            },

            MainAction::ConfirmAdd { title } => {
                state.add_dialog_open = false;
                reduce_tasks(state, TaskListAction::Add { title }, env)
            },

            MainAction::CancelAdd => {
                state.add_dialog_open = false;
                SmallVec::new()
            },

            MainAction::RowPressed { id, intent } => {
                let Some(row) = state.tasks.get(&id).map(TaskRow::new) else {
                    tracing::debug!(%id, ?intent, "Pressed row is gone");
                    return SmallVec::new();
                };
                let action = match intent {
                    RowIntent::MarkDone if !row.mark_done_enabled => {
                        tracing::debug!(%id, "Mark done is disabled");
                        return SmallVec::new();
                    },
                    RowIntent::MarkDone => TaskListAction::MarkDone { id },
                    RowIntent::Delete => TaskListAction::Delete { id },
                };
                reduce_tasks(state, action, env)
            },

            // Login is shown only after the provider has ended the session.
            MainAction::Logout => {
                tracing::info!("Logging out");
                state.session = None;
                state.add_dialog_open = false;
                state.pending = true;
                let mut effects = reduce_tasks(state, TaskListAction::ClearTasks, env);
                effects.push(Effect::Identity(IdentityOperation::SignOut {
                    identity: Arc::clone(&env.identity),
                    on_complete: Box::new(|()| Some(AppAction::Main(MainAction::SignedOut))),
                }));
                effects
            },

            MainAction::SignedOut => {
                state.pending = false;
                navigate(state, Screen::Login, env)
            },
        }
    }
}
