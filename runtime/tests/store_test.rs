//! Integration tests for the Store: feedback loop, remote-call effects,
//! cascade tracking, observation and shutdown.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tasknest_core::document::{Document, DocumentStore, DocumentStoreError};
use tasknest_core::identity::{Credentials, IdentityClient};
use tasknest_core::{
    delete_document, effect::Effect, effect::IdentityOperation, list_documents, reducer::Reducer,
    set_document, smallvec, SmallVec,
};
use tasknest_runtime::{Store, StoreConfig, StoreError};
use tasknest_testing::{DocumentCall, InMemoryDocumentStore, MockIdentityClient};

const NOTES: &str = "notes";

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum NoteAction {
    Write { body: String },
    Written,
    Refresh,
    Refreshed { count: usize },
    Remove { id: String },
    Removed,
    Failed { message: String },
    WriteThenRefresh { body: String },
    SignIn { email: String, password: String },
    SignedIn { email: String },
    Slow,
    SlowDone,
}

#[derive(Debug, Clone, Default)]
struct NoteState {
    visible: usize,
    writes: usize,
    errors: Vec<String>,
    signed_in: Option<String>,
    slow_done: bool,
}

struct NoteEnv {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityClient>,
}

struct NoteReducer;

impl NoteReducer {
    fn write(body: &str, env: &NoteEnv) -> Effect<NoteAction> {
        let id = env.store.create_id(NOTES);
        let mut document = Document::new();
        document.insert("body".to_string(), json!(body));
        set_document! {
            store: env.store,
            collection: NOTES,
            id: id,
            document: document,
            on_success: || Some(NoteAction::Written),
            on_error: |error| Some(NoteAction::Failed { message: error.to_string() })
        }
    }

    fn refresh(env: &NoteEnv) -> Effect<NoteAction> {
        list_documents! {
            store: env.store,
            collection: NOTES,
            on_success: |documents| Some(NoteAction::Refreshed { count: documents.len() }),
            on_error: |error| Some(NoteAction::Failed { message: error.to_string() })
        }
    }
}

impl Reducer for NoteReducer {
    type State = NoteState;
    type Action = NoteAction;
    type Environment = NoteEnv;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            NoteAction::Write { body } => smallvec![Self::write(&body, env)],
            NoteAction::Written => {
                state.writes += 1;
                smallvec![Self::refresh(env)]
            },
            NoteAction::Refresh => smallvec![Self::refresh(env)],
            NoteAction::Refreshed { count } => {
                state.visible = count;
                smallvec![]
            },
            NoteAction::Remove { id } => smallvec![delete_document! {
                store: env.store,
                collection: NOTES,
                id: tasknest_core::document::DocumentId::new(id),
                on_success: || Some(NoteAction::Removed),
                on_error: |error| Some(NoteAction::Failed { message: error.to_string() })
            }],
            NoteAction::Removed => smallvec![Self::refresh(env)],
            NoteAction::Failed { message } => {
                state.errors.push(message);
                smallvec![]
            },
            NoteAction::WriteThenRefresh { body } => {
                smallvec![Effect::chain(vec![Self::write(&body, env), Self::refresh(env)])]
            },
            NoteAction::SignIn { email, password } => {
                smallvec![Effect::Identity(IdentityOperation::SignIn {
                    identity: Arc::clone(&env.identity),
                    credentials: Credentials::new(email, password),
                    on_success: Box::new(|session| Some(NoteAction::SignedIn {
                        email: session.email
                    })),
                    on_error: Box::new(|error| Some(NoteAction::Failed {
                        message: error.to_string()
                    })),
                })]
            },
            NoteAction::SignedIn { email } => {
                state.signed_in = Some(email);
                smallvec![]
            },
            NoteAction::Slow => smallvec![Effect::Future(Box::pin(async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Some(NoteAction::SlowDone)
            }))],
            NoteAction::SlowDone => {
                state.slow_done = true;
                smallvec![]
            },
        }
    }
}

fn setup(
    documents: InMemoryDocumentStore,
    identity: MockIdentityClient,
) -> Store<NoteState, NoteAction, NoteEnv, NoteReducer> {
    let env = NoteEnv {
        store: Arc::new(documents),
        identity: Arc::new(identity),
    };
    Store::new(NoteState::default(), NoteReducer, env)
}

// ============================================================================
// Feedback loop
// ============================================================================

#[tokio::test]
async fn handle_waits_for_whole_cascade() {
    let documents = InMemoryDocumentStore::new();
    let store = setup(documents.clone(), MockIdentityClient::new());

    let mut handle = store
        .send(NoteAction::Write {
            body: "buy milk".into(),
        })
        .await
        .unwrap();
    handle
        .wait_with_timeout(Duration::from_secs(1))
        .await
        .unwrap();

    // Write -> Written -> list_all -> Refreshed
    assert_eq!(store.state(|s| s.writes).await, 1);
    assert_eq!(store.state(|s| s.visible).await, 1);
    assert_eq!(documents.len(NOTES), 1);
    assert_eq!(store.pending_effects(), 0);
}

#[tokio::test]
async fn remote_failure_is_fed_back_as_action() {
    let documents = InMemoryDocumentStore::new();
    documents.fail_next(DocumentStoreError::PermissionDenied(
        "Missing or insufficient permissions.".into(),
    ));
    let store = setup(documents.clone(), MockIdentityClient::new());

    let mut handle = store
        .send(NoteAction::Write { body: "x".into() })
        .await
        .unwrap();
    handle.wait().await;

    let errors = store.state(|s| s.errors.clone()).await;
    assert_eq!(errors, vec!["Missing or insufficient permissions.".to_string()]);
    assert_eq!(store.state(|s| s.writes).await, 0);
    assert!(documents.is_empty(NOTES));
}

#[tokio::test]
async fn delete_runs_against_the_store() {
    let documents = InMemoryDocumentStore::new();
    let store = setup(documents.clone(), MockIdentityClient::new());

    store
        .send(NoteAction::Write { body: "a".into() })
        .await
        .unwrap()
        .wait()
        .await;
    let id = documents
        .calls()
        .into_iter()
        .find_map(|call| match call {
            DocumentCall::Set { id, .. } => Some(id),
            _ => None,
        })
        .unwrap();

    store
        .send(NoteAction::Remove {
            id: id.into_inner(),
        })
        .await
        .unwrap()
        .wait()
        .await;

    assert!(documents.is_empty(NOTES));
    assert_eq!(store.state(|s| s.visible).await, 0);
}

#[tokio::test]
async fn sequential_effects_run_in_order() {
    let documents = InMemoryDocumentStore::new();
    let store = setup(documents.clone(), MockIdentityClient::new());

    store
        .send(NoteAction::WriteThenRefresh { body: "a".into() })
        .await
        .unwrap()
        .wait()
        .await;

    let remote: Vec<_> = documents
        .calls()
        .into_iter()
        .filter(DocumentCall::is_remote)
        .collect();
    // set, then the refresh triggered by Written, then the chained refresh
    assert!(matches!(remote[0], DocumentCall::Set { .. }));
    assert_eq!(remote.len(), 3);
    assert_eq!(store.state(|s| s.visible).await, 1);
}

#[tokio::test]
async fn identity_effect_reaches_provider() {
    let identity = MockIdentityClient::new().with_account("ada@example.com", "secret1");
    let store = setup(InMemoryDocumentStore::new(), identity.clone());

    store
        .send(NoteAction::SignIn {
            email: "ada@example.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap()
        .wait()
        .await;

    assert_eq!(
        store.state(|s| s.signed_in.clone()).await.as_deref(),
        Some("ada@example.com")
    );
    assert!(identity.current_session().is_some());
}

// ============================================================================
// Observation
// ============================================================================

#[tokio::test]
async fn send_and_wait_for_returns_matching_outcome() {
    let store = setup(InMemoryDocumentStore::new(), MockIdentityClient::new());

    let outcome = store
        .send_and_wait_for(
            NoteAction::Write { body: "a".into() },
            |action| matches!(action, NoteAction::Refreshed { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(outcome, NoteAction::Refreshed { count: 1 });
}

#[tokio::test]
async fn send_and_wait_for_times_out() {
    let store = setup(InMemoryDocumentStore::new(), MockIdentityClient::new());

    let result = store
        .send_and_wait_for(
            NoteAction::Refresh,
            |action| matches!(action, NoteAction::Removed),
            Duration::from_millis(50),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}

#[tokio::test]
async fn subscribers_see_effect_outcomes_only() {
    let store = setup(InMemoryDocumentStore::new(), MockIdentityClient::new());
    let mut rx = store.subscribe_actions();

    store.send(NoteAction::Refresh).await.unwrap().wait().await;

    assert_eq!(rx.recv().await.unwrap(), NoteAction::Refreshed { count: 0 });
    assert!(rx.try_recv().is_err());
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn shutdown_rejects_new_actions() {
    let store = setup(InMemoryDocumentStore::new(), MockIdentityClient::new());

    store.shutdown(Duration::from_millis(100)).await.unwrap();

    let result = store.send(NoteAction::Refresh).await;
    assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
}

#[tokio::test]
async fn shutdown_waits_for_running_effects() {
    let documents = InMemoryDocumentStore::new().with_latency(Duration::from_millis(100));
    let store = setup(documents.clone(), MockIdentityClient::new());

    store
        .send(NoteAction::Write { body: "late".into() })
        .await
        .unwrap();
    store.shutdown(Duration::from_secs(2)).await.unwrap();

    // The write lands remotely; its outcome arrives after shutdown and is dropped.
    assert_eq!(documents.len(NOTES), 1);
    assert_eq!(store.pending_effects(), 0);
    assert_eq!(store.state(|s| s.writes).await, 0);
}

#[tokio::test]
async fn shutdown_times_out_on_slow_effects() {
    let env = NoteEnv {
        store: Arc::new(InMemoryDocumentStore::new()),
        identity: Arc::new(MockIdentityClient::new()),
    };
    let store = Store::with_config(
        NoteState::default(),
        NoteReducer,
        env,
        StoreConfig::default().with_shutdown_timeout(Duration::from_millis(10)),
    );

    store.send(NoteAction::Slow).await.unwrap();
    let result = store.shutdown(store.default_shutdown_timeout()).await;

    assert!(matches!(result, Err(StoreError::ShutdownTimeout(1))));
    assert!(!store.state(|s| s.slow_done).await);
}
