//! Mock identity provider.

use super::{lock, test_clock};
use futures::future::BoxFuture;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tasknest_core::environment::Clock;
use tasknest_core::identity::{Credentials, IdentityClient, IdentityError, Session, UserId};

/// Minimum password length the provider itself enforces.
const PROVIDER_MIN_PASSWORD_LENGTH: usize = 6;

const NO_SUCH_USER: &str =
    "There is no user record corresponding to this identifier. The user may have been deleted.";
const WRONG_PASSWORD: &str = "The password is invalid or the user does not have a password.";
const EMAIL_IN_USE: &str = "The email address is already in use by another account.";
const BAD_EMAIL: &str = "The email address is badly formatted.";
const WEAK_PASSWORD: &str = "The given password is invalid. [ Password should be at least 6 characters ]";

/// A call received by [`MockIdentityClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCall {
    /// `sign_in` with this email
    SignIn {
        /// Submitted email
        email: String,
    },
    /// `sign_up` with this email
    SignUp {
        /// Submitted email
        email: String,
    },
    /// `sign_out`
    SignOut,
}

#[derive(Debug, Clone)]
struct Account {
    user_id: UserId,
    password: String,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    session: Option<Session>,
    calls: Vec<IdentityCall>,
    injected_failures: VecDeque<IdentityError>,
}

/// Mock identity provider holding accounts in memory.
///
/// Rejections carry the same wording a hosted provider returns, so screens
/// can be tested against realistic notices. Session timestamps come from a
/// [`FixedClock`](super::FixedClock) unless another clock is supplied.
#[derive(Clone)]
pub struct MockIdentityClient {
    inner: Arc<Mutex<Inner>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MockIdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockIdentityClient")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl Default for MockIdentityClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIdentityClient {
    /// Create a provider with no accounts and no session
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            clock: Arc::new(test_clock()),
        }
    }

    /// Use `clock` for session timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Register an account without logging a call.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str) -> Self {
        lock(&self.inner).accounts.insert(
            email.to_string(),
            Account {
                user_id: new_user_id(),
                password: password.to_string(),
            },
        );
        self
    }

    /// Register an account and start a session for it, as if the user
    /// signed in during an earlier run.
    #[must_use]
    pub fn signed_in_as(self, email: &str, password: &str) -> Self {
        let this = self.with_account(email, password);
        {
            let mut inner = lock(&this.inner);
            let session = inner
                .accounts
                .get(email)
                .map(|account| this.session_for(email, account));
            inner.session = session;
        }
        this
    }

    /// Drop the current session without a sign-out call, as when a token
    /// expires or is revoked remotely.
    pub fn expire_session(&self) {
        lock(&self.inner).session = None;
    }

    /// Make the next sign-in or sign-up fail with `error`.
    pub fn fail_next(&self, error: IdentityError) {
        lock(&self.inner).injected_failures.push_back(error);
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<IdentityCall> {
        lock(&self.inner).calls.clone()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.inner).calls.len()
    }

    /// Whether an account exists for `email`.
    #[must_use]
    pub fn has_account(&self, email: &str) -> bool {
        lock(&self.inner).accounts.contains_key(email)
    }

    fn session_for(&self, email: &str, account: &Account) -> Session {
        Session {
            user_id: account.user_id.clone(),
            email: email.to_string(),
            signed_in_at: self.clock.now(),
        }
    }

    fn authenticate(&self, credentials: &Credentials) -> Result<Session, IdentityError> {
        let mut inner = lock(&self.inner);
        inner.calls.push(IdentityCall::SignIn {
            email: credentials.email.clone(),
        });
        if let Some(error) = inner.injected_failures.pop_front() {
            return Err(error);
        }
        if !looks_like_email(&credentials.email) {
            return Err(IdentityError::Rejected(BAD_EMAIL.to_string()));
        }

        let account = inner
            .accounts
            .get(&credentials.email)
            .cloned()
            .ok_or_else(|| IdentityError::Rejected(NO_SUCH_USER.to_string()))?;
        if account.password != credentials.password {
            return Err(IdentityError::Rejected(WRONG_PASSWORD.to_string()));
        }

        let session = self.session_for(&credentials.email, &account);
        inner.session = Some(session.clone());
        Ok(session)
    }

    fn register(&self, credentials: &Credentials) -> Result<Session, IdentityError> {
        let mut inner = lock(&self.inner);
        inner.calls.push(IdentityCall::SignUp {
            email: credentials.email.clone(),
        });
        if let Some(error) = inner.injected_failures.pop_front() {
            return Err(error);
        }
        if !looks_like_email(&credentials.email) {
            return Err(IdentityError::Rejected(BAD_EMAIL.to_string()));
        }
        if credentials.password.chars().count() < PROVIDER_MIN_PASSWORD_LENGTH {
            return Err(IdentityError::Rejected(WEAK_PASSWORD.to_string()));
        }
        if inner.accounts.contains_key(&credentials.email) {
            return Err(IdentityError::Rejected(EMAIL_IN_USE.to_string()));
        }

        let account = Account {
            user_id: new_user_id(),
            password: credentials.password.clone(),
        };
        let session = self.session_for(&credentials.email, &account);
        inner.accounts.insert(credentials.email.clone(), account);
        inner.session = Some(session.clone());
        Ok(session)
    }
}

fn new_user_id() -> UserId {
    UserId::new(uuid::Uuid::new_v4().simple().to_string())
}

fn looks_like_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
}

impl IdentityClient for MockIdentityClient {
    fn sign_in(&self, credentials: Credentials) -> BoxFuture<'_, Result<Session, IdentityError>> {
        let result = self.authenticate(&credentials);
        Box::pin(async move { result })
    }

    fn sign_up(&self, credentials: Credentials) -> BoxFuture<'_, Result<Session, IdentityError>> {
        let result = self.register(&credentials);
        Box::pin(async move { result })
    }

    fn sign_out(&self) -> BoxFuture<'_, ()> {
        let mut inner = lock(&self.inner);
        inner.calls.push(IdentityCall::SignOut);
        inner.session = None;
        Box::pin(async {})
    }

    fn current_session(&self) -> Option<Session> {
        lock(&self.inner).session.clone()
    }
}
