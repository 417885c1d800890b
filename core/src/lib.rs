//! # Tasknest Core
//!
//! Core traits and types for the tasknest to-do client.
//!
//! The client is built as a set of reducers: pure functions
//! `(State, Action, Environment) → (State, Effects)`. Every remote call the
//! client makes is described by an [`Effect`](effect::Effect) value and run by
//! the `Store` in `tasknest-runtime`, which feeds the outcome back in as a new
//! action.
//!
//! ## Core Concepts
//!
//! - **State**: what a screen or the task list currently shows
//! - **Action**: user intents and the outcomes of remote calls
//! - **Reducer**: the only place state changes
//! - **Effect**: a description of a remote call, never its execution
//! - **Environment**: the injected collaborators ([`DocumentStore`](document::DocumentStore),
//!   [`IdentityClient`](identity::IdentityClient), [`Clock`](environment::Clock))
//!
//! ## Example
//!
//! ```
//! use tasknest_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Debug, Default)]
//! struct DraftState {
//!     title: String,
//! }
//!
//! enum DraftAction {
//!     Typed(char),
//!     Cleared,
//! }
//!
//! struct DraftReducer;
//!
//! impl Reducer for DraftReducer {
//!     type State = DraftState;
//!     type Action = DraftAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut DraftState,
//!         action: DraftAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<DraftAction>; 4]> {
//!         match action {
//!             DraftAction::Typed(c) => state.title.push(c),
//!             DraftAction::Cleared => state.title.clear(),
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut draft = DraftState::default();
//! DraftReducer.reduce(&mut draft, DraftAction::Typed('a'), &());
//! let effects = DraftReducer.reduce(&mut draft, DraftAction::Typed('b'), &());
//! assert_eq!(draft.title, "ab");
//! assert!(effects.is_empty());
//! ```

pub use smallvec::{smallvec, SmallVec};

pub mod document;
pub mod effect;
mod effect_macros;
pub mod environment;
pub mod identity;

/// The [`Reducer`](reducer::Reducer) trait
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// Client logic for one slice of state.
    ///
    /// A reducer mutates `State` in response to an `Action` and describes
    /// any remote work as effects. It never performs I/O itself; the
    /// `Environment` is passed in only so effects can capture collaborators.
    /// Parent reducers embed children by calling their `reduce` and lifting
    /// the effects with [`Effect::map`].
    pub trait Reducer {
        /// Slice of client state this reducer owns
        type State;

        /// Intents and remote-call outcomes it handles
        type Action;

        /// Collaborators captured by its effects
        type Environment;

        /// Apply `action` to `state` and return the remote work it requires.
        ///
        /// Most actions yield zero or one effect, which the `SmallVec` keeps
        /// off the heap.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}
