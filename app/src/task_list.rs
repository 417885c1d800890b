//! Task list presenter.
//!
//! Mirrors the remote task collection into an ordered in-memory list. The
//! list only changes once the store confirms a write: an add is appended
//! after the create succeeds, a completion replaces the entry after the
//! write succeeds, a delete removes it after the delete succeeds. Failed
//! writes leave the list untouched and are not retried.
//!
//! Entries are matched by id when a confirmation arrives, so a row that was
//! removed or replaced in the meantime is simply skipped.

use crate::task::{Task, TaskId};
use std::collections::HashSet;
use std::sync::Arc;
use tasknest_core::document::{Document, DocumentStore};
use tasknest_core::{SmallVec, delete_document, effect::Effect, list_documents, reducer::Reducer, set_document, smallvec};

/// Collaborators the presenter talks to.
#[derive(Clone)]
pub struct TaskListEnvironment {
    /// Remote document store
    pub store: Arc<dyn DocumentStore>,
    /// Collection holding the tasks
    pub collection: String,
}

impl TaskListEnvironment {
    /// Creates a new `TaskListEnvironment`
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }
}

/// Progress of the most recent load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A load is in flight
    Loading,
    /// The last load succeeded
    Loaded,
    /// The last load failed with this message; the previous list is kept
    Failed(String),
}

/// The in-memory task list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskListState {
    /// Tasks in store order
    pub tasks: Vec<Task>,
    /// Outcome of the most recent load
    pub status: LoadStatus,
    /// Message of the most recent failed write, cleared by the next
    /// confirmed one
    pub last_error: Option<String>,
}

impl TaskListState {
    /// Creates an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task with this id, if present
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == *id)
    }

    /// Index of the task with this id, if present
    #[must_use]
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == *id)
    }

    /// Number of completed tasks
    #[must_use]
    pub fn done_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.done).count()
    }
}

/// Intents and remote outcomes handled by the presenter.
#[derive(Clone, Debug, PartialEq)]
pub enum TaskListAction {
    // ========== Intents ==========
    /// Fetch every task and replace the list
    Load,
    /// Create a task with this title (ignored if blank)
    Add {
        /// Title, stored verbatim
        title: String,
    },
    /// Mark the task with this id as done
    MarkDone {
        /// Task to complete
        id: TaskId,
    },
    /// Delete the task with this id
    Delete {
        /// Task to delete
        id: TaskId,
    },
    /// Forget every task locally (sign-out)
    ClearTasks,

    // ========== Outcomes ==========
    /// The store returned these documents
    Loaded {
        /// Raw task documents in store order
        documents: Vec<Document>,
    },
    /// The fetch failed
    LoadFailed {
        /// Collaborator message
        error: String,
    },
    /// The create was confirmed
    TaskAdded {
        /// Task as written
        task: Task,
    },
    /// The replacement write was confirmed
    TaskUpdated {
        /// Task as written
        task: Task,
    },
    /// The delete was confirmed
    TaskDeleted {
        /// Deleted task
        id: TaskId,
    },
    /// A create, update or delete failed
    WriteFailed {
        /// Collaborator message
        error: String,
    },
}

/// Reducer for the task list.
#[derive(Clone, Debug, Default)]
pub struct TaskListReducer;

impl TaskListReducer {
    /// Creates a new `TaskListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode fetched documents, skipping those that fail to decode and
    /// keeping the first of any duplicated id.
    fn decode(documents: Vec<Document>) -> Vec<Task> {
        let mut seen = HashSet::new();
        let mut tasks = Vec::with_capacity(documents.len());

        for document in documents {
            match Task::from_document(document) {
                Ok(task) if seen.insert(task.id.clone()) => tasks.push(task),
                Ok(task) => {
                    tracing::warn!(id = %task.id, "Skipping duplicate task document");
                },
                Err(error) => {
                    tracing::warn!(error = %error, "Skipping undecodable task document");
                },
            }
        }

        tasks
    }

    /// Write `task` and report the outcome with `confirmed`.
    fn write(
        state: &mut TaskListState,
        task: Task,
        env: &TaskListEnvironment,
        confirmed: fn(Task) -> TaskListAction,
    ) -> SmallVec<[Effect<TaskListAction>; 4]> {
        let document = match task.to_document() {
            Ok(document) => document,
            Err(error) => {
                tracing::warn!(id = %task.id, error = %error, "Cannot encode task");
                state.last_error = Some(error.to_string());
                return SmallVec::new();
            },
        };

        smallvec![set_document! {
            store: env.store,
            collection: env.collection,
            id: task.id.document_id(),
            document: document,
            on_success: || Some(confirmed(task)),
            on_error: |error| Some(TaskListAction::WriteFailed { error: error.to_string() })
        }]
    }
}

impl Reducer for TaskListReducer {
    type State = TaskListState;
    type Action = TaskListAction;
    type Environment = TaskListEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Intents ==========
            TaskListAction::Load => {
                state.status = LoadStatus::Loading;
                smallvec![list_documents! {
                    store: env.store,
                    collection: env.collection,
                    on_success: |documents| Some(TaskListAction::Loaded { documents }),
                    on_error: |error| Some(TaskListAction::LoadFailed { error: error.to_string() })
                }]
            },

            TaskListAction::Add { title } => {
                if title.trim().is_empty() {
                    tracing::debug!("Ignoring blank task title");
                    return SmallVec::new();
                }
                let id = env.store.create_id(&env.collection);
                let task = Task::new(id.into(), title);
                Self::write(state, task, env, |task| TaskListAction::TaskAdded { task })
            },

            TaskListAction::MarkDone { id } => {
                let Some(task) = state.get(&id) else {
                    tracing::debug!(id = %id, "Mark done on a task that is no longer listed");
                    return SmallVec::new();
                };
                let task = task.completed();
                Self::write(state, task, env, |task| TaskListAction::TaskUpdated { task })
            },

            TaskListAction::Delete { id } => {
                smallvec![delete_document! {
                    store: env.store,
                    collection: env.collection,
                    id: id.document_id(),
                    on_success: || Some(TaskListAction::TaskDeleted { id }),
                    on_error: |error| Some(TaskListAction::WriteFailed { error: error.to_string() })
                }]
            },

            TaskListAction::ClearTasks => {
                *state = TaskListState::new();
                SmallVec::new()
            },

            // ========== Outcomes ==========
            TaskListAction::Loaded { documents } => {
                state.tasks = Self::decode(documents);
                state.status = LoadStatus::Loaded;
                tracing::debug!(count = state.tasks.len(), "Task list loaded");
                SmallVec::new()
            },

            TaskListAction::LoadFailed { error } => {
                state.status = LoadStatus::Failed(error);
                SmallVec::new()
            },

            TaskListAction::TaskAdded { task } => {
                if state.position(&task.id).is_none() {
                    state.tasks.push(task);
                }
                state.last_error = None;
                SmallVec::new()
            },

            TaskListAction::TaskUpdated { task } => {
                if let Some(index) = state.position(&task.id) {
                    state.tasks[index] = task;
                }
                state.last_error = None;
                SmallVec::new()
            },

            TaskListAction::TaskDeleted { id } => {
                if let Some(index) = state.position(&id) {
                    state.tasks.remove(index);
                }
                state.last_error = None;
                SmallVec::new()
            },

            TaskListAction::WriteFailed { error } => {
                state.last_error = Some(error);
                SmallVec::new()
            },
        }
    }
}
