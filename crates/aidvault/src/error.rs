//! Error types for the vault.

use aidvault_core::CoreError;
use aidvault_seal::SealError;
use aidvault_session::SessionError;
use aidvault_store::StoreError;
use thiserror::Error;

/// Failure in one of the vault's underlying components.
///
/// Preserved as the source of [`VaultError::StorageFailed`] and
/// [`VaultError::RetrievalFailed`] so callers can distinguish, say, an
/// access denial from a storage outage.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// Serialization or cipher error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Session creation or signing error.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Threshold encryption error.
    #[error("seal error: {0}")]
    Seal(#[from] SealError),

    /// Content storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A remote call exceeded the configured deadline.
    #[error("operation timed out: {0}")]
    Timeout(String),
}

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The store pipeline failed after validation.
    #[error("credential storage failed")]
    StorageFailed(#[source] ComponentError),

    /// The retrieval pipeline failed.
    #[error("credential retrieval failed")]
    RetrievalFailed(#[source] ComponentError),

    /// Caller-supplied input was rejected before any pipeline work.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl VaultError {
    /// The component failure behind this error, if any.
    pub fn cause(&self) -> Option<&ComponentError> {
        match self {
            VaultError::StorageFailed(cause) | VaultError::RetrievalFailed(cause) => Some(cause),
            VaultError::InvalidArgument(_) => None,
        }
    }

    /// Whether the operation was rejected by the access policy.
    ///
    /// Distinguishes a policy decision from infrastructure failures;
    /// retrying an access denial is pointless.
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self.cause(),
            Some(ComponentError::Seal(
                SealError::AccessDenied(_)
                    | SealError::SessionExpired
                    | SealError::InvalidSession(_)
            ))
        )
    }

    /// Whether the failure is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.cause(),
            Some(
                ComponentError::Timeout(_)
                    | ComponentError::Store(StoreError::Unavailable(_))
                    | ComponentError::Seal(SealError::KeyServerUnavailable { .. })
            )
        )
    }
}

/// Result type for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
