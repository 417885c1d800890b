//! Line commands for the interactive shell.
//!
//! A command is translated into the screen intents a user would produce by
//! tapping through the screens, so `register` typed on the login screen first
//! follows the "create an account" link.

use crate::app::{AppAction, AppState, Screen};
use crate::list_view::{ListView, RowIntent};
use crate::screens::{LoginAction, MainAction, RegisterAction};
use crate::task_list::TaskListAction;
use std::fmt::Write as _;
use tasknest_core::identity::Credentials;
use thiserror::Error;

/// Shell help text.
pub const HELP: &str = "\
commands:
  register <email> <password>   create an account and sign in
  login <email> <password>      sign in
  add <title>                   add a task
  done <n>                      mark task n as done
  delete <n>                    delete task n
  reload                        fetch the task list again
  logout                        sign out
  list                          show the current screen
  help                          show this help
  quit                          exit";

/// A parsed shell command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `register <email> <password>`
    Register {
        /// Email as typed
        email: String,
        /// Password as typed
        password: String,
    },
    /// `login <email> <password>`
    Login {
        /// Email as typed
        email: String,
        /// Password as typed
        password: String,
    },
    /// `add <title>`; the rest of the line, verbatim
    Add {
        /// Title
        title: String,
    },
    /// `done <n>`, 1-based
    Done {
        /// Row number
        row: usize,
    },
    /// `delete <n>`, 1-based
    Delete {
        /// Row number
        row: usize,
    },
    /// `reload`
    Reload,
    /// `logout`
    Logout,
    /// `list`
    List,
    /// `help`
    Help,
    /// `quit` or `exit`
    Quit,
}

/// Why a line could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line
    #[error("empty command")]
    Empty,

    /// First word is not a command
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    /// Wrong arguments for a known command
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Command {
    /// Parse one input line.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for blank lines, unknown commands and bad
    /// arguments.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_start();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        match word.trim_end() {
            "" => Err(ParseError::Empty),
            "register" => {
                let (email, password) = two_args(rest, "register <email> <password>")?;
                Ok(Self::Register { email, password })
            },
            "login" => {
                let (email, password) = two_args(rest, "login <email> <password>")?;
                Ok(Self::Login { email, password })
            },
            "add" => Ok(Self::Add {
                title: rest.trim_end_matches(['\r', '\n']).to_string(),
            }),
            "done" => Ok(Self::Done {
                row: row_number(rest, "done <n>")?,
            }),
            "delete" | "rm" => Ok(Self::Delete {
                row: row_number(rest, "delete <n>")?,
            }),
            "reload" => Ok(Self::Reload),
            "logout" => Ok(Self::Logout),
            "list" | "ls" => Ok(Self::List),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }

    /// The actions this command sends, given the screen currently showing and
    /// the task list as last printed. Row numbers refer to `shown`; a number
    /// past its last row sends nothing.
    #[must_use]
    pub fn actions(&self, screen: Screen, shown: &ListView) -> Vec<AppAction> {
        match self {
            Self::Register { email, password } => {
                let mut actions = Vec::new();
                if screen == Screen::Login {
                    actions.push(AppAction::Login(LoginAction::OpenRegister));
                }
                actions.push(AppAction::Register(RegisterAction::Submit {
                    credentials: Credentials::new(email.clone(), password.clone()),
                }));
                actions
            },
            Self::Login { email, password } => {
                let mut actions = Vec::new();
                if screen == Screen::Register {
                    actions.push(AppAction::Register(RegisterAction::OpenLogin));
                }
                actions.push(AppAction::Login(LoginAction::Submit {
                    credentials: Credentials::new(email.clone(), password.clone()),
                }));
                actions
            },
            Self::Add { title } => vec![
                AppAction::Main(MainAction::OpenAddDialog),
                AppAction::Main(MainAction::ConfirmAdd {
                    title: title.clone(),
                }),
            ],
            Self::Done { row } => row_action(shown, *row, RowIntent::MarkDone),
            Self::Delete { row } => row_action(shown, *row, RowIntent::Delete),
            Self::Reload => vec![AppAction::Tasks(TaskListAction::Load)],
            Self::Logout => vec![AppAction::Main(MainAction::Logout)],
            Self::List | Self::Help | Self::Quit => Vec::new(),
        }
    }
}

fn two_args(rest: &str, usage: &'static str) -> Result<(String, String), ParseError> {
    let mut words = rest.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(first), Some(second), None) => Ok((first.to_string(), second.to_string())),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn row_number(rest: &str, usage: &'static str) -> Result<usize, ParseError> {
    match rest.trim().parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn row_action(shown: &ListView, row: usize, intent: RowIntent) -> Vec<AppAction> {
    row.checked_sub(1)
        .and_then(|index| shown.press(index, intent))
        .map(AppAction::Main)
        .into_iter()
        .collect()
}

/// Text shown for the current state, with the task list it printed.
#[must_use]
pub fn render(state: &AppState) -> (String, ListView) {
    let view = state.list_view();
    let mut out = String::new();
    match state.screen {
        Screen::Login => out.push_str("== login ==\n"),
        Screen::Register => out.push_str("== register ==\n"),
        Screen::Main => {
            let who = state.session.as_ref().map_or("?", |session| session.email.as_str());
            let _ = writeln!(out, "== tasks ({who}) ==");
            let _ = write!(out, "{view}");
        },
    }
    if state.pending {
        out.push_str("(waiting for the identity provider...)\n");
    }
    if let Some(notice) = &state.notice {
        let _ = writeln!(out, "{notice}");
    }
    (out, view)
}
