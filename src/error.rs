//! Shared error type for the toolkit.

use tracing::error;

/// Extension trait for concise error mapping on Results.
pub trait ResultExt<T> {
    fn repo_err(self, msg: &str) -> Result<T, AuthError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn repo_err(self, msg: &str) -> Result<T, AuthError> {
        self.map_err(|e| AuthError::repo_error(msg, e))
    }
}

/// Error taxonomy shared by every layer of the toolkit.
///
/// `Unauthorized` deliberately carries the same kind for every credential
/// failure (missing token, bad signature, expired, unknown user, wrong
/// password) so callers cannot be used as an account oracle. The message
/// strings are internal detail; transports report the kind uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A unique field (email or username) is already taken.
    Conflict(String),
    /// Credential or token rejected.
    Unauthorized(String),
    /// Invalid toolkit or caller configuration.
    Configuration(String),
    /// Repository or signing failure; cause is logged, message is opaque.
    Internal(String),
}

impl AuthError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn repo_error(context: &str, e: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, e);
        Self::Internal("Repository error".into())
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Conflict(msg) => write!(f, "conflict: {}", msg),
            AuthError::Unauthorized(msg) => write!(f, "unauthorized: {}", msg),
            AuthError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            AuthError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}
