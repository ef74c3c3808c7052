//! Error types for the threshold-encryption module.

use thiserror::Error;

/// Errors that can occur during threshold key operations.
#[derive(Debug, Error)]
pub enum SealError {
    /// Fewer key servers responded than the configured threshold.
    ///
    /// Transient; safe to retry with backoff at the caller's discretion.
    #[error("key servers unavailable: {responded} of {threshold} required servers responded")]
    KeyServerUnavailable {
        responded: usize,
        threshold: usize,
    },

    /// Malformed authority or policy identifier.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// The on-chain policy check rejected the request.
    ///
    /// Fatal for this policy ID; not retryable without a policy or
    /// ownership change.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The session credential's expiry has passed.
    #[error("session expired")]
    SessionExpired,

    /// The session credential is unusable (unsigned, bad signature,
    /// namespace mismatch).
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// Wrapped-key or proof bytes could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A key share failed to open.
    #[error("key share decryption failed: {0}")]
    ShareDecryption(String),
}

/// Result type for threshold key operations.
pub type Result<T> = std::result::Result<T, SealError>;
