//! # Tasknest Testing
//!
//! Testing utilities and helpers for the tasknest client.
//!
//! This crate provides:
//! - In-memory implementations of the remote collaborators, with failure
//!   injection and call logs ([`InMemoryDocumentStore`], [`MockIdentityClient`])
//! - A fixed clock for deterministic session timestamps
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - proptest strategies for user input ([`properties`])
//!
//! ## Example
//!
//! ```ignore
//! use tasknest_testing::{InMemoryDocumentStore, MockIdentityClient};
//! use tasknest_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_add_task() {
//!     let documents = InMemoryDocumentStore::new();
//!     let identity = MockIdentityClient::new().signed_in_as("ada@example.com", "secret1");
//!     let store = Store::new(AppState::default(), AppReducer::new(), env(documents, identity));
//!
//!     store.send(AppAction::Started).await.unwrap().wait().await;
//!     assert_eq!(store.state(|s| s.screen).await, Screen::Main);
//! }
//! ```

pub mod mocks;
pub mod properties;
mod reducer_test;

// Re-export commonly used items
pub use mocks::{
    DocumentCall, FixedClock, IdentityCall, InMemoryDocumentStore, MockIdentityClient, test_clock,
};
pub use reducer_test::{ReducerTest, assertions};
