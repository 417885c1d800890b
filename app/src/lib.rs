//! # tasknest
//!
//! A personal to-do client. Users register or sign in with an identity
//! provider, then create, list, complete and delete tasks stored in a remote
//! document collection.
//!
//! The client is a tree of reducers run by a
//! [`Store`](tasknest_runtime::Store):
//!
//! - [`AppReducer`] owns the screen, the session and notices
//! - the screen controllers in [`screens`] turn user input into identity
//!   calls and navigation
//! - [`TaskListReducer`] mirrors the task collection and only changes the
//!   list after the store confirms a write
//! - [`ListView`] renders the list into rows and maps row clicks back to
//!   task ids
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tasknest::{AppAction, AppEnvironment, AppReducer, AppState, TaskListEnvironment};
//! use tasknest_runtime::Store;
//! use tasknest_testing::{InMemoryDocumentStore, MockIdentityClient};
//!
//! # async fn run() -> Result<(), tasknest_runtime::StoreError> {
//! let env = AppEnvironment::new(
//!     Arc::new(MockIdentityClient::new()),
//!     TaskListEnvironment::new(Arc::new(InMemoryDocumentStore::new()), "tasks"),
//! );
//! let store = Store::new(AppState::new(), AppReducer::new(), env);
//! store.send(AppAction::Started).await?.wait().await;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod list_view;
pub mod screens;
pub mod task;
pub mod task_list;

pub use app::{AppAction, AppEnvironment, AppReducer, AppState, Notice, NoticeLevel, Screen};
pub use config::AppConfig;
pub use error::{AppError, ValidationError};
pub use list_view::{ListView, RowIntent, TaskRow};
pub use screens::{LoginAction, MainAction, RegisterAction};
pub use task::{Task, TaskId};
pub use task_list::{LoadStatus, TaskListAction, TaskListEnvironment, TaskListReducer, TaskListState};
