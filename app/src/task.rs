//! The task entity.

use serde::{Deserialize, Serialize};
use tasknest_core::document::{self, Document, DocumentId, DocumentStoreError};

/// Identifier of a task, allocated by the remote store when the task is
/// created.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps a raw id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id of the document that stores this task.
    #[must_use]
    pub fn document_id(&self) -> DocumentId {
        DocumentId::new(self.0.clone())
    }
}

impl From<DocumentId> for TaskId {
    fn from(id: DocumentId) -> Self {
        Self(id.into_inner())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A to-do item.
///
/// Stored as a document with the fields `id`, `title` and `done`. Missing
/// fields decode to their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    /// Store-assigned id
    pub id: TaskId,
    /// Title, exactly as entered
    pub title: String,
    /// Whether the task has been completed
    pub done: bool,
}

impl Task {
    /// A new, not yet completed task.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
        }
    }

    /// A copy of this task marked as done.
    #[must_use]
    pub fn completed(&self) -> Self {
        Self {
            done: true,
            ..self.clone()
        }
    }

    /// Encode as a store document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Serialization`] if encoding fails.
    pub fn to_document(&self) -> Result<Document, DocumentStoreError> {
        document::to_document(self)
    }

    /// Decode from a store document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Serialization`] if a field has the
    /// wrong type.
    pub fn from_document(document: Document) -> Result<Self, DocumentStoreError> {
        document::from_document(document)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn new_task_is_not_done() {
        let task = Task::new(TaskId::new("a1"), "Buy milk");
        assert!(!task.done);
        assert_eq!(task.title, "Buy milk");
    }

    #[test]
    fn completed_only_flips_done() {
        let task = Task::new(TaskId::new("a1"), "Buy milk");
        let done = task.completed();
        assert!(done.done);
        assert_eq!(done.id, task.id);
        assert_eq!(done.title, task.title);
        assert!(!task.done);
    }

    #[test]
    fn document_uses_field_names() {
        let task = Task::new(TaskId::new("a1"), "Buy milk");
        assert_eq!(
            task.to_document().unwrap(),
            doc(json!({"id": "a1", "title": "Buy milk", "done": false}))
        );
    }

    #[test]
    fn missing_fields_take_defaults() {
        let task = Task::from_document(doc(json!({"title": "Untitled"}))).unwrap();
        assert_eq!(task.id, TaskId::default());
        assert_eq!(task.title, "Untitled");
        assert!(!task.done);
    }

    #[test]
    fn wrong_field_type_is_an_error() {
        let result = Task::from_document(doc(json!({"id": "a1", "done": "yes"})));
        assert!(matches!(result, Err(DocumentStoreError::Serialization(_))));
    }

    #[test]
    fn ids_round_through_document_ids() {
        let id = TaskId::from(DocumentId::new("xyz"));
        assert_eq!(id.document_id().as_str(), "xyz");
        assert_eq!(id.to_string(), "xyz");
    }
}
