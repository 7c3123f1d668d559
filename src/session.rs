//! The account and session store.
//!
//! `SessionStore` owns two keys in a [`KeyValueStore`]: the registered user
//! list (`users`) and the current session snapshot (`user`). All mutation of
//! either goes through the operations here, each of which runs under a single
//! lock so a double-submitted form cannot interleave its read-modify-write.

use anyhow::Result;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

use crate::demo;
use crate::error::AuthError;
use crate::journal::Journal;
use crate::model::{Registration, SessionState, StoredUser, User};
use crate::storage::{KeyValueStore, SESSION_KEY, USERS_KEY};
use crate::validation::{self, normalize_email, MIN_PASSWORD_LEN};

/// Behavioural switches for a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub min_password_len: usize,
    /// Insert the demo account before sign-in when no users exist
    pub seed_demo_user: bool,
    /// Cross-check a restored snapshot against the user list
    pub verify_restored_session: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            min_password_len: MIN_PASSWORD_LEN,
            seed_demo_user: false,
            verify_restored_session: false,
        }
    }
}

struct Inner {
    state: SessionState,
    journal: Option<Journal>,
}

impl Inner {
    /// Journal failures never fail the auth operation itself
    fn record(&mut self, f: impl FnOnce(&mut Journal) -> Result<()>) {
        if let Some(journal) = self.journal.as_mut() {
            if let Err(err) = f(&mut *journal) {
                tracing::warn!(
                    path = %journal.path.display(),
                    error = %err,
                    "Failed to write auth journal"
                );
            }
        }
    }
}

pub struct SessionStore<S = Box<dyn KeyValueStore>> {
    storage: S,
    settings: AuthSettings,
    inner: Mutex<Inner>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Create an anonymous store. Call [`restore_session`](Self::restore_session)
    /// to pick up a persisted session.
    pub fn new(storage: S, settings: AuthSettings) -> Self {
        Self {
            storage,
            settings,
            inner: Mutex::new(Inner {
                state: SessionState::Anonymous,
                journal: None,
            }),
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        let inner = self.inner.get_mut().unwrap_or_else(|e| e.into_inner());
        inner.journal = Some(journal);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.lock().state.user().cloned()
    }

    /// Registered accounts, without credentials
    pub fn users(&self) -> Result<Vec<User>, AuthError> {
        let _guard = self.lock();
        let users = self
            .load_users()
            .map_err(|e| AuthError::persistence("Loading accounts", e))?;
        Ok(users.into_iter().map(|u| u.user).collect())
    }

    /// Create an account and sign it in.
    ///
    /// The user list and the session snapshot are written as one unit: if the
    /// snapshot write fails the previous user list is put back.
    pub fn register(&self, candidate: &Registration) -> Result<User, AuthError> {
        let form = validation::validate_registration(candidate, self.settings.min_password_len)?;

        let mut inner = self.lock();

        let previous = self
            .storage
            .get(USERS_KEY)
            .map_err(|e| AuthError::persistence("Sign up", e))?;
        let mut users =
            parse_users(previous.as_deref()).map_err(|e| AuthError::persistence("Sign up", e))?;

        if users.iter().any(|u| u.has_email(&form.email)) {
            return Err(AuthError::DuplicateEmail);
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: form.email,
            first_name: form.first_name,
            last_name: form.last_name,
            phone: form.phone,
            created_at: Some(Utc::now()),
        };
        users.push(StoredUser {
            user: user.clone(),
            password: form.password,
        });

        self.save_users(&users)
            .map_err(|e| AuthError::persistence("Sign up", e))?;

        if let Err(err) = self.save_session(&user) {
            self.rollback_users(previous.as_deref());
            return Err(AuthError::persistence("Sign up", err));
        }

        tracing::info!(user_id = %user.id, "Registered and signed in");
        inner.state = SessionState::Authenticated(user.clone());
        inner.record(|j| j.sign_up(&user.id, &user.email));

        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// Unknown email and wrong password produce the same error.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        validation::validate_credentials(email, password)?;
        let email = normalize_email(email);

        if self.settings.seed_demo_user {
            self.seed_if_empty()?;
        }

        let mut inner = self.lock();

        let users = self
            .load_users()
            .map_err(|e| AuthError::persistence("Sign in", e))?;

        let Some(stored) = users.into_iter().find(|u| u.matches(&email, password)) else {
            tracing::info!("Rejected sign-in");
            inner.record(|j| j.sign_in_failed(&email, AuthError::InvalidCredentials.code()));
            return Err(AuthError::InvalidCredentials);
        };

        let user = stored.user;
        self.save_session(&user)
            .map_err(|e| AuthError::persistence("Sign in", e))?;

        tracing::info!(user_id = %user.id, "Signed in");
        inner.state = SessionState::Authenticated(user.clone());
        inner.record(|j| j.sign_in(&user.id, &user.email));

        Ok(user)
    }

    /// Load the persisted session at startup.
    ///
    /// Missing, unreadable or corrupt snapshots all mean "signed out".
    pub fn restore_session(&self) -> Option<User> {
        let mut inner = self.lock();

        let snapshot = match self.read_snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring unreadable session snapshot");
                None
            }
        };

        let verify = self.settings.verify_restored_session;
        let restored = match snapshot {
            Some(user) if verify && !self.is_registered(&user.id) => {
                tracing::warn!(user_id = %user.id, "Dropping session for unknown user");
                if let Err(err) = self.storage.remove(SESSION_KEY) {
                    tracing::warn!(error = %err, "Failed to remove stale session snapshot");
                }
                None
            }
            other => other,
        };

        inner.state = match &restored {
            Some(user) => SessionState::Authenticated(user.clone()),
            None => SessionState::Anonymous,
        };
        let user_id = restored.as_ref().map(|u| u.id.clone());
        inner.record(|j| j.session_restored(user_id.as_deref(), verify));

        restored
    }

    /// Clear the session. Signing out while anonymous is a no-op.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        let mut inner = self.lock();

        self.storage
            .remove(SESSION_KEY)
            .map_err(|e| AuthError::persistence("Sign out", e))?;

        let previous = std::mem::take(&mut inner.state);
        if let SessionState::Authenticated(user) = previous {
            tracing::info!(user_id = %user.id, "Signed out");
            inner.record(|j| j.sign_out(Some(&user.id)));
        }
        Ok(())
    }

    /// Insert the demo account if no users are registered.
    ///
    /// Returns true when the account was inserted.
    pub fn seed_if_empty(&self) -> Result<bool, AuthError> {
        let mut inner = self.lock();

        let users = self
            .load_users()
            .map_err(|e| AuthError::persistence("Demo setup", e))?;
        if !users.is_empty() {
            return Ok(false);
        }

        let demo = demo::demo_user();
        self.save_users(std::slice::from_ref(&demo))
            .map_err(|e| AuthError::persistence("Demo setup", e))?;

        tracing::info!(email = demo::DEMO_EMAIL, "Seeded demo account");
        inner.record(|j| j.demo_seeded(&demo.user.id));
        Ok(true)
    }

    // ------------------------------------------------------------------------
    // Persistence helpers; callers hold the lock
    // ------------------------------------------------------------------------

    fn load_users(&self) -> Result<Vec<StoredUser>> {
        let raw = self.storage.get(USERS_KEY)?;
        parse_users(raw.as_deref())
    }

    fn save_users(&self, users: &[StoredUser]) -> Result<()> {
        let raw = serde_json::to_string(users)?;
        self.storage.set(USERS_KEY, &raw)
    }

    fn save_session(&self, user: &User) -> Result<()> {
        let raw = serde_json::to_string(user)?;
        self.storage.set(SESSION_KEY, &raw)
    }

    fn read_snapshot(&self) -> Result<Option<User>> {
        match self.storage.get(SESSION_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn is_registered(&self, user_id: &str) -> bool {
        match self.load_users() {
            Ok(users) => users.iter().any(|u| u.user.id == user_id),
            Err(err) => {
                tracing::warn!(error = %err, "Cannot read user list to verify session");
                false
            }
        }
    }

    fn rollback_users(&self, previous: Option<&str>) {
        let result = match previous {
            Some(raw) => self.storage.set(USERS_KEY, raw),
            None => self.storage.remove(USERS_KEY),
        };
        match result {
            Ok(()) => tracing::warn!("Rolled back user list after failed session write"),
            Err(err) => tracing::error!(
                error = %err,
                "Failed to roll back user list; it may contain an account with no session"
            ),
        }
    }
}

fn parse_users(raw: Option<&str>) -> Result<Vec<StoredUser>> {
    match raw {
        Some(raw) => Ok(serde_json::from_str(raw)?),
        None => Ok(Vec::new()),
    }
}
