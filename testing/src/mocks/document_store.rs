//! In-memory document store for fast, deterministic tests.

use super::lock;
use futures::future::BoxFuture;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tasknest_core::document::{Document, DocumentId, DocumentStore, DocumentStoreError};

/// Length of generated document ids.
const ID_LENGTH: usize = 20;

/// A call received by [`InMemoryDocumentStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentCall {
    /// `list_all(collection)`
    ListAll {
        /// Collection read
        collection: String,
    },
    /// `create_id(collection)`
    CreateId {
        /// Collection the id was allocated in
        collection: String,
    },
    /// `set(collection, id, _)`
    Set {
        /// Collection written
        collection: String,
        /// Document id written
        id: DocumentId,
    },
    /// `delete(collection, id)`
    Delete {
        /// Collection deleted from
        collection: String,
        /// Document id deleted
        id: DocumentId,
    },
}

impl DocumentCall {
    /// Whether this call reached the network (id allocation is local).
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        !matches!(self, Self::CreateId { .. })
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Documents per collection, kept in insertion order.
    collections: HashMap<String, Vec<(DocumentId, Document)>>,
    calls: Vec<DocumentCall>,
    /// Errors returned by the next remote calls, oldest first.
    injected_failures: VecDeque<DocumentStoreError>,
    offline: bool,
    latency: Option<Duration>,
}

impl Inner {
    /// The error the next remote call should fail with, if any.
    fn take_failure(&mut self) -> Option<DocumentStoreError> {
        if self.offline {
            return Some(DocumentStoreError::Unavailable(
                "Failed to get documents because the client is offline.".to_string(),
            ));
        }
        self.injected_failures.pop_front()
    }
}

/// In-memory document store.
///
/// Documents keep the order they were first written in, which is the order
/// `list_all` returns them. Overwriting a document keeps its position.
///
/// # Example
///
/// ```
/// use tasknest_core::document::{Document, DocumentStore};
/// use tasknest_testing::InMemoryDocumentStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryDocumentStore::new();
/// let id = store.create_id("tasks");
/// store.set("tasks", &id, Document::new()).await?;
/// assert_eq!(store.list_all("tasks").await?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with documents, bypassing the call log.
    #[must_use]
    pub fn with_documents(self, collection: &str, documents: Vec<(DocumentId, Document)>) -> Self {
        {
            let mut inner = lock(&self.inner);
            let entries = inner.collections.entry(collection.to_string()).or_default();
            for (id, document) in documents {
                upsert(entries, id, document);
            }
        }
        self
    }

    /// Delay every remote call by `latency`.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        lock(&self.inner).latency = Some(latency);
        self
    }

    /// Make the next remote call fail with `error`. Calls queue up: each
    /// injected error is used once.
    pub fn fail_next(&self, error: DocumentStoreError) {
        lock(&self.inner).injected_failures.push_back(error);
    }

    /// While offline, every remote call fails with
    /// [`DocumentStoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        lock(&self.inner).offline = offline;
    }

    /// Documents currently stored in `collection`, in list order.
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        lock(&self.inner)
            .collections
            .get(collection)
            .map(|entries| entries.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default()
    }

    /// The document stored at `id`, if any.
    #[must_use]
    pub fn get(&self, collection: &str, id: &DocumentId) -> Option<Document> {
        lock(&self.inner)
            .collections
            .get(collection)?
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, doc)| doc.clone())
    }

    /// Number of documents in `collection`.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        lock(&self.inner).collections.get(collection).map_or(0, Vec::len)
    }

    /// Whether `collection` holds no documents.
    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<DocumentCall> {
        lock(&self.inner).calls.clone()
    }

    /// Number of calls that reached the network.
    #[must_use]
    pub fn remote_call_count(&self) -> usize {
        lock(&self.inner)
            .calls
            .iter()
            .filter(|call| call.is_remote())
            .count()
    }

    /// Start a remote call: log it and pick up its latency and any
    /// injected failure.
    fn begin(&self, call: DocumentCall) -> (Option<Duration>, Option<DocumentStoreError>) {
        let mut inner = lock(&self.inner);
        inner.calls.push(call);
        let failure = inner.take_failure();
        (inner.latency, failure)
    }
}

fn upsert(entries: &mut Vec<(DocumentId, Document)>, id: DocumentId, document: Document) {
    if let Some(slot) = entries.iter_mut().find(|(existing, _)| *existing == id) {
        slot.1 = document;
    } else {
        entries.push((id, document));
    }
}

async fn delay(latency: Option<Duration>) {
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn list_all(&self, collection: &str) -> BoxFuture<'_, Result<Vec<Document>, DocumentStoreError>> {
        let collection = collection.to_string();
        let (latency, failure) = self.begin(DocumentCall::ListAll {
            collection: collection.clone(),
        });

        Box::pin(async move {
            delay(latency).await;
            if let Some(error) = failure {
                return Err(error);
            }
            Ok(self.documents(&collection))
        })
    }

    fn create_id(&self, collection: &str) -> DocumentId {
        let mut inner = lock(&self.inner);
        inner.calls.push(DocumentCall::CreateId {
            collection: collection.to_string(),
        });

        loop {
            let candidate: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(ID_LENGTH)
                .map(char::from)
                .collect();
            let id = DocumentId::new(candidate);

            let taken = inner
                .collections
                .get(collection)
                .is_some_and(|entries| entries.iter().any(|(existing, _)| *existing == id));
            if !taken {
                return id;
            }
        }
    }

    fn set(
        &self,
        collection: &str,
        id: &DocumentId,
        document: Document,
    ) -> BoxFuture<'_, Result<(), DocumentStoreError>> {
        let collection = collection.to_string();
        let id = id.clone();
        let (latency, failure) = self.begin(DocumentCall::Set {
            collection: collection.clone(),
            id: id.clone(),
        });

        Box::pin(async move {
            delay(latency).await;
            if let Some(error) = failure {
                return Err(error);
            }
            let mut inner = lock(&self.inner);
            upsert(inner.collections.entry(collection).or_default(), id, document);
            Ok(())
        })
    }

    fn delete(&self, collection: &str, id: &DocumentId) -> BoxFuture<'_, Result<(), DocumentStoreError>> {
        let collection = collection.to_string();
        let id = id.clone();
        let (latency, failure) = self.begin(DocumentCall::Delete {
            collection: collection.clone(),
            id: id.clone(),
        });

        Box::pin(async move {
            delay(latency).await;
            if let Some(error) = failure {
                return Err(error);
            }
            if let Some(entries) = lock(&self.inner).collections.get_mut(&collection) {
                entries.retain(|(existing, _)| *existing != id);
            }
            Ok(())
        })
    }
}
