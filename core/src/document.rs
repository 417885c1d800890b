//! Remote document store abstraction.
//!
//! Tasks live in an external document database. The client only ever needs
//! four operations on a collection: list every document, allocate a fresh
//! document id, write a whole document, and delete one by id. There is no
//! partial update, query language, or version check; a `set` replaces the
//! stored document outright (last write wins).
//!
//! # Dyn Compatibility
//!
//! Async methods return [`BoxFuture`] instead of using `async fn` so the
//! trait can be used as `Arc<dyn DocumentStore>`. Effects capture the store
//! by `Arc` and are executed later by the runtime.

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored document: a JSON object keyed by field name.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Identifier of a document within a collection.
///
/// Ids are allocated by the store ([`DocumentStore::create_id`]), never by
/// the client.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wraps a raw id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors reported by a document store.
///
/// The display text is the collaborator's raw message; it is shown to the
/// user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreError {
    /// The store refused the operation (rules, missing auth).
    #[error("{0}")]
    PermissionDenied(String),

    /// The store could not be reached.
    #[error("{0}")]
    Unavailable(String),

    /// A value could not be converted to or from a document.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Remote document database used to persist tasks.
pub trait DocumentStore: Send + Sync {
    /// Fetch every document in `collection`, in the store's return order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or refuses the read.
    fn list_all(&self, collection: &str) -> BoxFuture<'_, Result<Vec<Document>, DocumentStoreError>>;

    /// Allocate a new, unused document id in `collection`.
    ///
    /// Allocation is local to the client library and cannot fail.
    fn create_id(&self, collection: &str) -> DocumentId;

    /// Write `document` at `id`, replacing any existing document.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or refuses the write.
    fn set(
        &self,
        collection: &str,
        id: &DocumentId,
        document: Document,
    ) -> BoxFuture<'_, Result<(), DocumentStoreError>>;

    /// Delete the document at `id`. Deleting a missing document succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or refuses the delete.
    fn delete(&self, collection: &str, id: &DocumentId) -> BoxFuture<'_, Result<(), DocumentStoreError>>;
}

/// Convert a value into a document, field for field by name.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`] if the value does not
/// serialize to a JSON object.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, DocumentStoreError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(DocumentStoreError::Serialization(format!(
            "expected an object, found {other}"
        ))),
        Err(e) => Err(DocumentStoreError::Serialization(e.to_string())),
    }
}

/// Decode a document into a value, field for field by name.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`] if the document's fields
/// do not match `T`.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, DocumentStoreError> {
    serde_json::from_value(serde_json::Value::Object(document))
        .map_err(|e| DocumentStoreError::Serialization(e.to_string()))
}
