//! Environment module - Dependency injection traits
//!
//! External dependencies are abstracted behind traits and injected via a
//! reducer's Environment parameter. The two remote collaborators live in
//! [`crate::document`] and [`crate::identity`]; this module holds the clock.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
