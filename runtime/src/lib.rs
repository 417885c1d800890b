//! # Tasknest Runtime
//!
//! The [`Store`] owns the client state, runs the reducer one action at a
//! time, and turns the effects it returns into remote calls whose outcomes
//! come back as actions.
//!
//! - **Store**: state behind a lock, the reducer, and the injected
//!   collaborators
//! - **Effect execution**: each remote call runs in its own task, so a slow
//!   provider never blocks the reducer
//! - **Effect handle**: resolves once an action and everything it cascaded
//!   into has settled
//!
//! ## Example
//!
//! ```ignore
//! use tasknest_runtime::Store;
//!
//! let store = Store::new(AppState::default(), AppReducer::new(), environment);
//!
//! // Sign-in resolves after the provider answered and the list loaded
//! let mut handle = store.send(AppAction::Started).await?;
//! handle.wait().await;
//!
//! let screen = store.state(|s| s.screen).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tasknest_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{Notify, RwLock, watch};

mod remote;

/// Store errors
pub mod error {
    use thiserror::Error;

    /// Why the store refused or gave up on a request.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// `shutdown` has started; no action is reduced after this point,
        /// including outcomes of calls that were already running.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Remote calls were still running when the shutdown deadline passed.
        #[error("Shutdown gave up with {0} remote calls still running")]
        ShutdownTimeout(usize),

        /// The wait deadline passed first.
        #[error("Timed out waiting for the store")]
        Timeout,

        /// No more outcome actions can be observed.
        #[error("Outcome channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Runtime settings for a [`Store`].
///
/// ```
/// use std::time::Duration;
/// use tasknest_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(64)
///     .with_shutdown_timeout(Duration::from_secs(2));
/// assert_eq!(config.broadcast_capacity, 64);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Outcome actions buffered for each slow observer
    pub broadcast_capacity: usize,
    /// Deadline the binary passes to [`Store::shutdown`]
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Set the outcome buffer size
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the shutdown deadline
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Completion handle returned by [`Store::send()`].
///
/// Counts the action's effects plus, transitively, the effects of every
/// outcome action they fed back. Waiting on it means "until this user intent
/// has fully settled": a sign-in resolves only after the navigation it
/// caused has loaded the task list.
///
/// ```ignore
/// let mut handle = store.send(AppAction::Tasks(TaskListAction::Load)).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    running: Arc<AtomicUsize>,
    settled: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, Cascade) {
        let running = Arc::new(AtomicUsize::new(0));
        let (settled_tx, settled) = watch::channel(());
        let cascade = Cascade {
            running: Arc::clone(&running),
            settled: Arc::new(settled_tx),
        };
        (Self { running, settled }, cascade)
    }

    /// A handle with nothing to wait for
    #[must_use]
    pub fn completed() -> Self {
        Self::new().0
    }

    /// Effects of this cascade still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Wait until the cascade has settled
    pub async fn wait(&mut self) {
        while self.pending() > 0 {
            if self.settled.changed().await.is_err() {
                // No cascade clone is left to finish anything
                break;
            }
        }
    }

    /// [`wait`](Self::wait) with a deadline
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running when
    /// `timeout` elapses.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Writer side of an [`EffectHandle`], carried through effect execution.
#[derive(Clone)]
struct Cascade {
    running: Arc<AtomicUsize>,
    settled: Arc<watch::Sender<()>>,
}

impl Cascade {
    fn start(&self) {
        self.running.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        if self.running.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.settled.send(());
        }
    }
}

/// Store-wide count of running effects, watched by shutdown.
#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    fn start(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }

    async fn until_idle(&self) {
        loop {
            // Registered before the check so a finish in between is not lost
            let idle = self.idle.notified();
            if self.count() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// One running effect. Dropping it finishes the effect in both its cascade
/// and the store-wide count, including when the task panics.
struct Ticket {
    cascade: Cascade,
    in_flight: Arc<InFlight>,
}

impl Ticket {
    fn issue(cascade: &Cascade, in_flight: &Arc<InFlight>) -> Self {
        cascade.start();
        in_flight.start();
        Self {
            cascade: cascade.clone(),
            in_flight: Arc::clone(in_flight),
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.in_flight.finish();
        self.cascade.finish();
    }
}

/// The store: reducer execution plus the effect feedback loop.
pub mod store {
    use super::{
        Arc, AtomicBool, Cascade, Duration, Effect, EffectHandle, InFlight, Ordering, Reducer,
        RwLock, StoreConfig, StoreError, Ticket, remote,
    };
    use std::future::Future;
    use tokio::sync::broadcast;

    /// Runs a reducer against its state and environment.
    ///
    /// Actions are reduced one at a time under the state's write lock, in the
    /// order they arrive. Effects never block the reducer: each remote call
    /// runs in its own task and reports back by sending its outcome action.
    /// Nothing is cancelled, de-duplicated or retried, so two quick adds are
    /// two writes.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        closing: Arc<AtomicBool>,
        in_flight: Arc<InFlight>,
        default_shutdown_timeout: Duration,
        outcomes: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Store with [`StoreConfig::default()`]
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Store with explicit runtime settings
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            let (outcomes, _) = broadcast::channel(config.broadcast_capacity.max(1));
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                closing: Arc::new(AtomicBool::new(false)),
                in_flight: Arc::new(InFlight::default()),
                default_shutdown_timeout: config.default_shutdown_timeout,
                outcomes,
            }
        }

        /// Collaborators the reducer runs with
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.environment
        }

        /// Deadline from the [`StoreConfig`]
        #[must_use]
        pub const fn default_shutdown_timeout(&self) -> Duration {
            self.default_shutdown_timeout
        }

        /// Effects running across every handle
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.in_flight.count()
        }

        /// Stop accepting actions and wait for running effects.
        ///
        /// Outcomes of calls that finish after this point are dropped, so the
        /// state is frozen as of the call.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
        /// still running if `timeout` elapses first.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!(pending = self.pending_effects(), "Store shutting down");
            metrics::counter!("store.shutdown.initiated").increment(1);
            self.closing.store(true, Ordering::Release);

            if tokio::time::timeout(timeout, self.in_flight.until_idle())
                .await
                .is_ok()
            {
                tracing::info!("Store shut down cleanly");
                metrics::counter!("store.shutdown.completed").increment(1);
                return Ok(());
            }

            let pending = self.pending_effects();
            tracing::error!(pending, "Store shutdown deadline passed");
            metrics::counter!("store.shutdown.timeout").increment(1);
            Err(StoreError::ShutdownTimeout(pending))
        }

        /// Reduce `action` and start the effects it returned.
        ///
        /// Returns once the reducer has run; the effects are started, not
        /// finished. Wait on the returned [`EffectHandle`] to observe the
        /// settled state.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            let (handle, cascade) = EffectHandle::new();
            self.reduce(action, &cascade).await?;
            Ok(handle)
        }

        /// Send `action`, then return the first outcome action matching
        /// `predicate`.
        ///
        /// The subscription is taken before sending, so an outcome produced
        /// immediately is not missed.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: nothing matched within `timeout`
        /// - [`StoreError::ChannelClosed`]: the outcome channel closed
        /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut outcomes = self.outcomes.subscribe();
            self.send(action).await?;

            let matching = async {
                loop {
                    match outcomes.recv().await {
                        Ok(outcome) if predicate(&outcome) => return Ok(outcome),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Outcome observer fell behind");
                        },
                        Err(broadcast::error::RecvError::Closed) => return Err(StoreError::ChannelClosed),
                    }
                }
            };
            tokio::time::timeout(timeout, matching)
                .await
                .map_err(|_| StoreError::Timeout)?
        }

        /// Observe every action produced by an effect.
        ///
        /// Actions passed to [`send`](Self::send) are not included.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.outcomes.subscribe()
        }

        /// Read the state through `f`
        ///
        /// ```ignore
        /// let open = store.state(|s| s.tasks.len() - s.tasks.done_count()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        async fn reduce(&self, action: A, cascade: &Cascade) -> Result<(), StoreError> {
            if self.closing.load(Ordering::Acquire) {
                tracing::warn!(?action, "Store is shutting down, action rejected");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!(?action, "Reducing");
            metrics::counter!("store.commands.total").increment(1);

            let effects = {
                let mut state = self.state.write().await;
                let started = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::trace!(effects = effects.len(), "Reduced");
                effects
            };

            for effect in effects {
                self.execute(effect, cascade);
            }
            Ok(())
        }

        /// Start `effect` as part of `cascade`.
        ///
        /// Remote calls and futures each get a task whose outcome action is
        /// reduced before the effect counts as finished. `Parallel` starts
        /// everything at once. `Sequential` starts each effect only after the
        /// previous one and its whole cascade settled.
        fn execute(&self, effect: Effect<A>, cascade: &Cascade) {
            metrics::counter!("store.effects.executed", "type" => effect.kind()).increment(1);

            match effect {
                Effect::None => {},
                Effect::Future(fut) => self.spawn_effect(fut, cascade),
                Effect::Document(op) => {
                    tracing::trace!(operation = ?op, "Starting document call");
                    self.spawn_effect(remote::run_document_operation(op), cascade);
                },
                Effect::Identity(op) => {
                    tracing::trace!(operation = ?op, "Starting identity call");
                    self.spawn_effect(remote::run_identity_operation(op), cascade);
                },
                Effect::Parallel(effects) => {
                    for effect in effects {
                        self.execute(effect, cascade);
                    }
                },
                Effect::Sequential(effects) => {
                    let ticket = Ticket::issue(cascade, &self.in_flight);
                    let store = self.clone();
                    tokio::spawn(async move {
                        let _ticket = ticket;
                        for effect in effects {
                            let (mut step, step_cascade) = EffectHandle::new();
                            store.execute(effect, &step_cascade);
                            drop(step_cascade);
                            step.wait().await;
                        }
                    });
                },
            }
        }

        fn spawn_effect<F>(&self, fut: F, cascade: &Cascade)
        where
            F: Future<Output = Option<A>> + Send + 'static,
        {
            let ticket = Ticket::issue(cascade, &self.in_flight);
            let store = self.clone();

            tokio::spawn(async move {
                let Some(outcome) = fut.await else {
                    return;
                };
                let _ = store.outcomes.send(outcome.clone());
                // The outcome joins this cascade while the ticket still holds it open
                if let Err(error) = store.reduce(outcome, &ticket.cascade).await {
                    tracing::warn!(%error, "Outcome dropped");
                }
                drop(ticket);
            });
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                closing: Arc::clone(&self.closing),
                in_flight: Arc::clone(&self.in_flight),
                default_shutdown_timeout: self.default_shutdown_timeout,
                outcomes: self.outcomes.clone(),
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completed_handle_does_not_block() {
        let mut handle = EffectHandle::completed();
        assert_eq!(handle.pending(), 0);
        assert!(
            handle
                .wait_with_timeout(Duration::from_millis(50))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn handle_waits_for_every_ticket() {
        let (mut handle, cascade) = EffectHandle::new();
        let in_flight = Arc::new(InFlight::default());
        let first = Ticket::issue(&cascade, &in_flight);
        let second = Ticket::issue(&cascade, &in_flight);
        assert_eq!(handle.pending(), 2);
        assert_eq!(in_flight.count(), 2);

        drop(first);
        assert!(
            handle
                .wait_with_timeout(Duration::from_millis(20))
                .await
                .is_err()
        );

        drop(second);
        assert!(
            handle
                .wait_with_timeout(Duration::from_millis(50))
                .await
                .is_ok()
        );
        assert_eq!(in_flight.count(), 0);
    }

    #[tokio::test]
    async fn idle_wait_wakes_on_last_finish() {
        let in_flight = Arc::new(InFlight::default());
        let ticket = Ticket::issue(&EffectHandle::new().1, &in_flight);

        let waiter = {
            let in_flight = Arc::clone(&in_flight);
            tokio::spawn(async move { in_flight.until_idle().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(ticket);
        assert!(
            tokio::time::timeout(Duration::from_millis(100), waiter)
                .await
                .is_ok()
        );
    }

    #[test]
    fn config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.broadcast_capacity, 16);
        assert_eq!(config.default_shutdown_timeout, Duration::from_secs(30));
    }
}
