//! Error types for the session module.

use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The signing capability failed (user rejected, wallet error).
    ///
    /// Never retried automatically; the caller decides whether to
    /// re-prompt.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// The session's expiry has passed.
    #[error("session expired")]
    Expired,

    /// The session is unusable (no signature attached, or malformed).
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// Malformed input when building a session.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
