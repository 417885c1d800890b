//! Given-When-Then harness for reducers.
//!
//! A reducer is a pure function, so most behavior can be pinned down without
//! a runtime: set up a state, feed one action, then inspect the new state and
//! the effect descriptions that came back.

#![allow(clippy::module_name_repetitions)]

use tasknest_core::{effect::Effect, reducer::Reducer};

type StateCheck<S> = Box<dyn FnOnce(&S)>;
type EffectCheck<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent reducer test.
///
/// # Example
///
/// ```ignore
/// use tasknest_testing::{ReducerTest, assertions};
///
/// ReducerTest::new(TaskListReducer::new())
///     .with_env(env)
///     .given_state(TaskListState::default())
///     .when_action(TaskListAction::Add { title: "   ".into() })
///     .then_state(|state| assert!(state.tasks.is_empty()))
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateCheck<S>>,
    effect_assertions: Vec<EffectCheck<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Start a test for `reducer`.
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Environment the reducer reads collaborators from.
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Given
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// When. Calling this more than once reduces the actions in order;
    /// effect assertions see only the effects of the last one.
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Then, on the final state.
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Then, on the effects returned by the last action.
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Reduce the actions and run every assertion.
    ///
    /// # Panics
    ///
    /// Panics if the state, the environment or at least one action is
    /// missing, or if an assertion fails.
    #[allow(clippy::panic)]
    #[allow(clippy::expect_used)]
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("given_state() was not called");
        let env = self
            .environment
            .expect("with_env() was not called");
        assert!(
            !self.actions.is_empty(),
            "when_action() was not called"
        );

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }
        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Effect assertions.
///
/// Nested `Parallel` and `Sequential` effects are searched too.
pub mod assertions {
    use tasknest_core::effect::Effect;

    /// Kinds of every leaf effect, depth first.
    #[must_use]
    pub fn effect_kinds<A>(effects: &[Effect<A>]) -> Vec<&'static str> {
        let mut kinds = Vec::new();
        for effect in effects {
            collect_kinds(effect, &mut kinds);
        }
        kinds
    }

    fn collect_kinds<A>(effect: &Effect<A>, kinds: &mut Vec<&'static str>) {
        match effect {
            Effect::None => {},
            Effect::Parallel(children) | Effect::Sequential(children) => {
                for child in children {
                    collect_kinds(child, kinds);
                }
            },
            other => kinds.push(other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if anything other than `Effect::None` was returned.
    #[allow(clippy::panic)]
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effect_kinds(effects).is_empty(),
            "expected no effects, got {effects:?}"
        );
    }

    /// # Panics
    ///
    /// Panics if the top-level effect count differs from `expected`.
    #[allow(clippy::panic)]
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "wrong number of top-level effects"
        );
    }

    /// # Panics
    ///
    /// Panics if no `Future` effect is present.
    #[allow(clippy::panic)]
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effect_kinds(effects).contains(&"future"),
            "no future effect in {:?}", effect_kinds(effects)
        );
    }

    /// # Panics
    ///
    /// Panics if no document store call is present.
    #[allow(clippy::panic)]
    pub fn assert_has_document_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effect_kinds(effects).contains(&"document"),
            "no document call in {:?}", effect_kinds(effects)
        );
    }

    /// # Panics
    ///
    /// Panics if no identity provider call is present.
    #[allow(clippy::panic)]
    pub fn assert_has_identity_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effect_kinds(effects).contains(&"identity"),
            "no identity call in {:?}", effect_kinds(effects)
        );
    }

    /// # Panics
    ///
    /// Panics if any remote call (document or identity) is present.
    #[allow(clippy::panic)]
    pub fn assert_no_remote_calls<A>(effects: &[Effect<A>]) {
        let kinds = effect_kinds(effects);
        assert!(
            !kinds.iter().any(|kind| *kind == "document" || *kind == "identity"),
            "unexpected remote calls: {kinds:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasknest_core::effect::Effect;
    use tasknest_core::reducer::Reducer;
    use tasknest_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default)]
    struct Draft {
        lines: Vec<String>,
    }

    #[derive(Clone, Debug)]
    enum DraftAction {
        Append(String),
        Publish,
        Published,
    }

    struct DraftReducer;

    impl Reducer for DraftReducer {
        type State = Draft;
        type Action = DraftAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                DraftAction::Append(line) => {
                    state.lines.push(line);
                    smallvec![Effect::None]
                },
                DraftAction::Publish => smallvec![Effect::Parallel(vec![
                    Effect::None,
                    Effect::Future(Box::pin(async { Some(DraftAction::Published) })),
                ])],
                DraftAction::Published => smallvec![],
            }
        }
    }

    #[test]
    fn single_action() {
        ReducerTest::new(DraftReducer)
            .with_env(())
            .given_state(Draft::default())
            .when_action(DraftAction::Append("hello".into()))
            .then_state(|state| assert_eq!(state.lines, vec!["hello".to_string()]))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn actions_are_reduced_in_order() {
        ReducerTest::new(DraftReducer)
            .with_env(())
            .given_state(Draft::default())
            .when_action(DraftAction::Append("a".into()))
            .when_action(DraftAction::Append("b".into()))
            .when_action(DraftAction::Publish)
            .then_state(|state| assert_eq!(state.lines.len(), 2))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
                assertions::assert_no_remote_calls(effects);
            })
            .run();
    }

    #[test]
    fn kinds_flatten_nested_effects() {
        let effects: Vec<Effect<DraftAction>> = vec![Effect::Sequential(vec![
            Effect::None,
            Effect::Parallel(vec![Effect::Future(Box::pin(async { None }))]),
        ])];
        assert_eq!(assertions::effect_kinds(&effects), vec!["future"]);
    }
}
