//! Execution of remote-call effects.
//!
//! Each operation is awaited exactly once. Failures are handed to the
//! operation's `on_error` callback; nothing is retried.

use tasknest_core::effect::{DocumentOperation, IdentityOperation};

/// Run a document store operation and map its outcome to the next action.
pub(crate) async fn run_document_operation<A>(op: DocumentOperation<A>) -> Option<A> {
    match op {
        DocumentOperation::ListAll {
            store,
            collection,
            on_success,
            on_error,
        } => {
            tracing::debug!(collection = %collection, "Executing list_all");
            match store.list_all(&collection).await {
                Ok(documents) => {
                    tracing::debug!(
                        collection = %collection,
                        document_count = documents.len(),
                        "list_all succeeded"
                    );
                    on_success(documents)
                },
                Err(error) => {
                    tracing::warn!(collection = %collection, error = %error, "list_all failed");
                    on_error(error)
                },
            }
        },
        DocumentOperation::Set {
            store,
            collection,
            id,
            document,
            on_success,
            on_error,
        } => {
            tracing::debug!(collection = %collection, id = %id, "Executing set");
            match store.set(&collection, &id, document).await {
                Ok(()) => {
                    tracing::debug!(id = %id, "set succeeded");
                    on_success(())
                },
                Err(error) => {
                    tracing::warn!(id = %id, error = %error, "set failed");
                    on_error(error)
                },
            }
        },
        DocumentOperation::Delete {
            store,
            collection,
            id,
            on_success,
            on_error,
        } => {
            tracing::debug!(collection = %collection, id = %id, "Executing delete");
            match store.delete(&collection, &id).await {
                Ok(()) => {
                    tracing::debug!(id = %id, "delete succeeded");
                    on_success(())
                },
                Err(error) => {
                    tracing::warn!(id = %id, error = %error, "delete failed");
                    on_error(error)
                },
            }
        },
    }
}

/// Run an identity provider operation and map its outcome to the next action.
pub(crate) async fn run_identity_operation<A>(op: IdentityOperation<A>) -> Option<A> {
    match op {
        IdentityOperation::SignIn {
            identity,
            credentials,
            on_success,
            on_error,
        } => {
            let email = credentials.email.clone();
            tracing::debug!(email = %email, "Executing sign_in");
            match identity.sign_in(credentials).await {
                Ok(session) => {
                    tracing::info!(user_id = %session.user_id, "sign_in succeeded");
                    on_success(session)
                },
                Err(error) => {
                    tracing::warn!(email = %email, error = %error, "sign_in failed");
                    on_error(error)
                },
            }
        },
        IdentityOperation::SignUp {
            identity,
            credentials,
            on_success,
            on_error,
        } => {
            let email = credentials.email.clone();
            tracing::debug!(email = %email, "Executing sign_up");
            match identity.sign_up(credentials).await {
                Ok(session) => {
                    tracing::info!(user_id = %session.user_id, "sign_up succeeded");
                    on_success(session)
                },
                Err(error) => {
                    tracing::warn!(email = %email, error = %error, "sign_up failed");
                    on_error(error)
                },
            }
        },
        IdentityOperation::SignOut {
            identity,
            on_complete,
        } => {
            tracing::debug!("Executing sign_out");
            identity.sign_out().await;
            on_complete(())
        },
    }
}
