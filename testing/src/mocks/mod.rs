//! In-memory stand-ins for the remote collaborators
//!
//! - [`InMemoryDocumentStore`]: ordered in-memory collections
//! - [`MockIdentityClient`]: in-memory accounts and a single current session
//! - [`FixedClock`]: deterministic time

use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tasknest_core::environment::Clock;

mod document_store;
mod identity;

pub use document_store::{DocumentCall, InMemoryDocumentStore};
pub use identity::{IdentityCall, MockIdentityClient};

/// A [`Clock`] stopped at one instant, so session timestamps are
/// reproducible.
///
/// ```
/// use tasknest_core::environment::Clock;
/// use tasknest_testing::test_clock;
///
/// let clock = test_clock();
/// assert_eq!(clock.now().timestamp(), 1_735_689_600);
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Clock stopped at `time`
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Clock stopped at 2025-01-01T00:00:00Z
#[must_use]
pub fn test_clock() -> FixedClock {
    FixedClock::new(DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default())
}

/// Lock a mock's shared state, recovering it if a test thread panicked
/// while holding the lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_new_year_2025() {
        let clock = test_clock();
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(clock.now(), clock.now());
    }
}
