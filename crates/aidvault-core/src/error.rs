//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur in pure core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed input to a pure function. Never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Payload serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Encryption error.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Authentication tag mismatch, truncated input, or wrong key.
    ///
    /// Treated as data corruption or tampering. Fatal, not retryable,
    /// and never accompanied by partial plaintext.
    #[error("decryption failed: authentication tag mismatch or truncated input")]
    DecryptionFailed,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
