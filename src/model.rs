//! Account records as they are persisted and handed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::normalize_email;

/// A registered account without its credential.
///
/// This is the shape returned by every store operation and the shape of the
/// persisted session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Normalized (trimmed, lower-cased) email
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A user as stored at rest in the `users` list, credential included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    #[serde(flatten)]
    pub user: User,
    pub password: String,
}

impl StoredUser {
    /// Check a sign-in attempt against this record.
    ///
    /// `email` must already be normalized. The stored email is normalized
    /// too, since records written by the mobile app kept their original case.
    /// The password comparison is exact.
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.has_email(email) && self.password == password
    }

    /// Compare against an already-normalized email
    pub fn has_email(&self, email: &str) -> bool {
        normalize_email(&self.user.email) == email
    }
}

/// Sign-up form contents
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Current authentication state of a store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}
