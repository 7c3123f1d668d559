use std::fmt;

/// Errors surfaced by the session store
#[derive(Debug)]
pub enum AuthError {
    /// A required field is missing or malformed; the message is user-facing
    Validation(String),

    /// Another account already uses this normalized email
    DuplicateEmail,

    /// Unknown email or wrong password (deliberately indistinguishable)
    InvalidCredentials,

    /// Durable storage could not be read or written
    Persistence {
        operation: &'static str,
        source: anyhow::Error,
    },
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        AuthError::Validation(message.into())
    }

    pub(crate) fn persistence(operation: &'static str, source: anyhow::Error) -> Self {
        AuthError::Persistence { operation, source }
    }

    /// Stable machine-readable code, used in the auth journal and CLI output
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation",
            AuthError::DuplicateEmail => "duplicate_email",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Persistence { .. } => "persistence",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(msg) => write!(f, "{}", msg),
            AuthError::DuplicateEmail => write!(f, "An account with this email already exists"),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::Persistence { operation, .. } => {
                write!(f, "{} failed. Please try again.", operation)
            }
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Persistence { source, .. } => Some(&**source),
            _ => None,
        }
    }
}
