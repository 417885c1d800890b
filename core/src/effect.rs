//! Effect module - Side effect descriptions
//!
//! Effects describe side effects to be performed by the runtime. They are
//! values (not execution): a reducer returns them, the `Store` runs them and
//! feeds whatever action they produce back into the reducer.
//!
//! Every remote call of the client is one of two operation families:
//!
//! - [`DocumentOperation`]: list, write or delete task documents
//! - [`IdentityOperation`]: sign in, sign up, sign out
//!
//! Each operation carries an `on_success` and an `on_error` callback that map
//! the collaborator's outcome into the next action, which is how a
//! request/response pair is expressed without nested callback registration.

use crate::document::{Document, DocumentId, DocumentStore, DocumentStoreError};
use crate::identity::{Credentials, IdentityClient, IdentityError, Session};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Maps the outcome of a remote call to the next action (if any).
pub type Callback<T, Action> = Box<dyn FnOnce(T) -> Option<Action> + Send>;

/// Shared action mapper used when lifting effects into a parent action type.
type ActionMapper<A, B> = Arc<dyn Fn(A) -> B + Send + Sync>;

/// Effect type - describes a side effect to be executed
///
/// # Type Parameters
///
/// - `Action`: The action type that effects can produce (feedback loop)
pub enum Effect<Action> {
    /// No-op effect
    None,

    /// Run effects in parallel
    Parallel(Vec<Effect<Action>>),

    /// Run effects sequentially
    Sequential(Vec<Effect<Action>>),

    /// Arbitrary async computation
    ///
    /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
    Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

    /// Remote document store call
    Document(DocumentOperation<Action>),

    /// Identity provider call
    Identity(IdentityOperation<Action>),
}

/// A call against the remote document store.
pub enum DocumentOperation<Action> {
    /// Fetch every document of a collection.
    ListAll {
        /// Store to read from
        store: Arc<dyn DocumentStore>,
        /// Collection name
        collection: String,
        /// Maps the fetched documents to an action
        on_success: Callback<Vec<Document>, Action>,
        /// Maps a failure to an action
        on_error: Callback<DocumentStoreError, Action>,
    },

    /// Write a whole document, replacing what is stored at `id`.
    Set {
        /// Store to write to
        store: Arc<dyn DocumentStore>,
        /// Collection name
        collection: String,
        /// Target document id
        id: DocumentId,
        /// Full replacement document
        document: Document,
        /// Produces an action once the write is confirmed
        on_success: Callback<(), Action>,
        /// Maps a failure to an action
        on_error: Callback<DocumentStoreError, Action>,
    },

    /// Delete the document at `id`.
    Delete {
        /// Store to delete from
        store: Arc<dyn DocumentStore>,
        /// Collection name
        collection: String,
        /// Target document id
        id: DocumentId,
        /// Produces an action once the delete is confirmed
        on_success: Callback<(), Action>,
        /// Maps a failure to an action
        on_error: Callback<DocumentStoreError, Action>,
    },
}

/// A call against the identity provider.
pub enum IdentityOperation<Action> {
    /// Sign in with an existing account.
    SignIn {
        /// Provider to call
        identity: Arc<dyn IdentityClient>,
        /// Submitted credentials
        credentials: Credentials,
        /// Maps the new session to an action
        on_success: Callback<Session, Action>,
        /// Maps the provider's rejection to an action
        on_error: Callback<IdentityError, Action>,
    },

    /// Create an account and sign into it.
    SignUp {
        /// Provider to call
        identity: Arc<dyn IdentityClient>,
        /// Submitted credentials
        credentials: Credentials,
        /// Maps the new session to an action
        on_success: Callback<Session, Action>,
        /// Maps the provider's rejection to an action
        on_error: Callback<IdentityError, Action>,
    },

    /// End the current session.
    SignOut {
        /// Provider to call
        identity: Arc<dyn IdentityClient>,
        /// Produces an action once the provider has signed out
        on_complete: Callback<(), Action>,
    },
}

// Manual Debug implementations since futures and callbacks don't implement Debug
impl<Action> std::fmt::Debug for Effect<Action>
where
    Action: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Parallel(effects) => f.debug_tuple("Effect::Parallel").field(effects).finish(),
            Effect::Sequential(effects) => {
                f.debug_tuple("Effect::Sequential").field(effects).finish()
            },
            Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            Effect::Document(op) => f.debug_tuple("Effect::Document").field(op).finish(),
            Effect::Identity(op) => f.debug_tuple("Effect::Identity").field(op).finish(),
        }
    }
}

impl<Action> std::fmt::Debug for DocumentOperation<Action> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListAll { collection, .. } => f
                .debug_struct("ListAll")
                .field("collection", collection)
                .finish_non_exhaustive(),
            Self::Set {
                collection,
                id,
                document,
                ..
            } => f
                .debug_struct("Set")
                .field("collection", collection)
                .field("id", id)
                .field("document", document)
                .finish_non_exhaustive(),
            Self::Delete { collection, id, .. } => f
                .debug_struct("Delete")
                .field("collection", collection)
                .field("id", id)
                .finish_non_exhaustive(),
        }
    }
}

impl<Action> std::fmt::Debug for IdentityOperation<Action> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignIn { credentials, .. } => f
                .debug_struct("SignIn")
                .field("credentials", credentials)
                .finish_non_exhaustive(),
            Self::SignUp { credentials, .. } => f
                .debug_struct("SignUp")
                .field("credentials", credentials)
                .finish_non_exhaustive(),
            Self::SignOut { .. } => f.debug_struct("SignOut").finish_non_exhaustive(),
        }
    }
}

impl<Action> Effect<Action> {
    /// Combine effects to run in parallel
    #[must_use]
    pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Parallel(effects)
    }

    /// Chain effects to run sequentially
    #[must_use]
    pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Sequential(effects)
    }

    /// Short name of the effect kind, used for logs and metrics labels.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Effect::None => "none",
            Effect::Parallel(_) => "parallel",
            Effect::Sequential(_) => "sequential",
            Effect::Future(_) => "future",
            Effect::Document(_) => "document",
            Effect::Identity(_) => "identity",
        }
    }
}

impl<Action: Send + 'static> Effect<Action> {
    /// Lift an effect into another action type.
    ///
    /// Used by a parent reducer that embeds a child reducer: the child's
    /// effects produce child actions, which `f` wraps into parent actions.
    #[must_use]
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        B: Send + 'static,
        F: Fn(Action) -> B + Send + Sync + 'static,
    {
        self.map_with(Arc::new(f))
    }

    fn map_with<B: Send + 'static>(self, f: ActionMapper<Action, B>) -> Effect<B> {
        match self {
            Effect::None => Effect::None,
            Effect::Parallel(effects) => Effect::Parallel(
                effects
                    .into_iter()
                    .map(|effect| effect.map_with(Arc::clone(&f)))
                    .collect(),
            ),
            Effect::Sequential(effects) => Effect::Sequential(
                effects
                    .into_iter()
                    .map(|effect| effect.map_with(Arc::clone(&f)))
                    .collect(),
            ),
            Effect::Future(fut) => Effect::Future(Box::pin(async move { fut.await.map(&*f) })),
            Effect::Document(op) => Effect::Document(op.map_with(f)),
            Effect::Identity(op) => Effect::Identity(op.map_with(f)),
        }
    }
}

fn map_callback<T, A, B>(callback: Callback<T, A>, f: ActionMapper<A, B>) -> Callback<T, B>
where
    T: 'static,
    A: 'static,
    B: 'static,
{
    Box::new(move |outcome| callback(outcome).map(&*f))
}

impl<Action: Send + 'static> DocumentOperation<Action> {
    fn map_with<B: Send + 'static>(self, f: ActionMapper<Action, B>) -> DocumentOperation<B> {
        match self {
            Self::ListAll {
                store,
                collection,
                on_success,
                on_error,
            } => DocumentOperation::ListAll {
                store,
                collection,
                on_success: map_callback(on_success, Arc::clone(&f)),
                on_error: map_callback(on_error, f),
            },
            Self::Set {
                store,
                collection,
                id,
                document,
                on_success,
                on_error,
            } => DocumentOperation::Set {
                store,
                collection,
                id,
                document,
                on_success: map_callback(on_success, Arc::clone(&f)),
                on_error: map_callback(on_error, f),
            },
            Self::Delete {
                store,
                collection,
                id,
                on_success,
                on_error,
            } => DocumentOperation::Delete {
                store,
                collection,
                id,
                on_success: map_callback(on_success, Arc::clone(&f)),
                on_error: map_callback(on_error, f),
            },
        }
    }
}

impl<Action: Send + 'static> IdentityOperation<Action> {
    fn map_with<B: Send + 'static>(self, f: ActionMapper<Action, B>) -> IdentityOperation<B> {
        match self {
            Self::SignIn {
                identity,
                credentials,
                on_success,
                on_error,
            } => IdentityOperation::SignIn {
                identity,
                credentials,
                on_success: map_callback(on_success, Arc::clone(&f)),
                on_error: map_callback(on_error, f),
            },
            Self::SignUp {
                identity,
                credentials,
                on_success,
                on_error,
            } => IdentityOperation::SignUp {
                identity,
                credentials,
                on_success: map_callback(on_success, Arc::clone(&f)),
                on_error: map_callback(on_error, f),
            },
            Self::SignOut {
                identity,
                on_complete,
            } => IdentityOperation::SignOut {
                identity,
                on_complete: map_callback(on_complete, f),
            },
        }
    }
}
