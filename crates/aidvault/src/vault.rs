//! The CredentialVault: unified API for the AidVault pipeline.
//!
//! The vault brings together threshold key wrapping, symmetric sealing,
//! content-addressed storage and audit into a cohesive store/retrieve
//! interface. It holds no credential state of its own; every store
//! operation returns a [`CredentialMetadataRecord`] that the caller
//! persists and presents again at retrieval time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::task::JoinSet;
use tracing::warn;

use aidvault_core::{
    now_millis, AccessLevel, Credential, CredentialMetadataRecord, EnvelopeKey, PolicyId,
    PolicyIdGenerator, NONCE_LEN, TAG_LEN,
};
use aidvault_seal::{ApprovalCall, ThresholdEncryptor};
use aidvault_session::{SessionAuthorizer, SessionCredential, Signer};
use aidvault_store::{ContentStore, PutOptions, StoreError};

use crate::audit::{AuditAction, AuditSink};
use crate::config::VaultConfig;
use crate::error::{ComponentError, Result, VaultError};

/// Result of one entry in a batch retrieval.
///
/// A batch never aborts on a single bad record; each entry carries its
/// own outcome, in the order the records were given.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Policy identity of the record this outcome belongs to.
    pub policy_id: PolicyId,
    /// The recovered credential, or why recovery failed.
    pub result: Result<Credential>,
}

/// The main vault struct.
///
/// Generic over the content store and the threshold encryptor so tests
/// can swap in in-memory and simulated backends. Operations are safe to
/// call concurrently; the vault shares its backends behind `Arc`.
pub struct CredentialVault<C: ContentStore, E: ThresholdEncryptor> {
    store: Arc<C>,
    encryptor: Arc<E>,
    authorizer: SessionAuthorizer,
    policy_ids: PolicyIdGenerator,
    audit: AuditSink<C>,
    config: VaultConfig,
}

impl<C, E> CredentialVault<C, E>
where
    C: ContentStore + 'static,
    E: ThresholdEncryptor + 'static,
{
    /// Create a vault over the given backends.
    pub fn new(store: C, encryptor: E, config: VaultConfig) -> Self {
        let store = Arc::new(store);
        let audit = AuditSink::new(Arc::clone(&store), config.audit_epochs);
        Self {
            store,
            encryptor: Arc::new(encryptor),
            authorizer: SessionAuthorizer::new(),
            policy_ids: PolicyIdGenerator::new(),
            audit,
            config,
        }
    }

    /// The vault's configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// The content store backend.
    pub fn content_store(&self) -> &C {
        &self.store
    }

    /// The threshold encryption backend.
    pub fn encryptor(&self) -> &E {
        &self.encryptor
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Store
    // ─────────────────────────────────────────────────────────────────────────

    /// Seal a credential and store it.
    ///
    /// Generates a fresh policy identity, threshold-wraps a fresh
    /// envelope key under it, seals the serialized credential and
    /// stores the sealed blob. Neither the plaintext nor the raw key
    /// survives the call; everything needed for retrieval is in the
    /// returned record.
    ///
    /// Oversized payloads are rejected before any remote work.
    pub async fn store(
        &self,
        subject_id: &str,
        credential: &Credential,
        access_level: AccessLevel,
        expires_at: Option<i64>,
    ) -> Result<CredentialMetadataRecord> {
        if subject_id.is_empty() {
            return Err(VaultError::InvalidArgument("subject_id is empty".into()));
        }
        credential
            .validate()
            .map_err(|e| VaultError::InvalidArgument(e.to_string()))?;

        let kind = credential.kind();
        let policy_id = self
            .policy_ids
            .generate(subject_id, kind)
            .map_err(|e| VaultError::StorageFailed(e.into()))?;

        let result = self
            .store_sealed(subject_id, credential, access_level, expires_at, &policy_id)
            .await;

        self.spawn_audit(
            AuditAction::Store,
            subject_id,
            policy_id.as_str(),
            result.is_ok(),
            json!({ "kind": kind.as_str() }),
            result.as_ref().err().map(failure_message),
        );
        result
    }

    async fn store_sealed(
        &self,
        subject_id: &str,
        credential: &Credential,
        access_level: AccessLevel,
        expires_at: Option<i64>,
        policy_id: &PolicyId,
    ) -> Result<CredentialMetadataRecord> {
        let payload = credential
            .to_json_bytes()
            .map_err(|e| VaultError::StorageFailed(e.into()))?;

        // Sealed size is payload plus nonce and tag; check it against
        // the ceiling before touching the network.
        let sealed_len = payload.len() + NONCE_LEN + TAG_LEN;
        if sealed_len > self.store.size_ceiling() {
            return Err(VaultError::StorageFailed(ComponentError::Store(
                StoreError::PayloadTooLarge {
                    size: sealed_len,
                    ceiling: self.store.size_ceiling(),
                },
            )));
        }

        let wrapped = with_deadline(
            self.config.call_timeout,
            "envelope key wrap",
            self.encryptor.encrypt(
                self.config.threshold,
                &self.config.authority_id,
                policy_id,
                &payload,
            ),
        )
        .await
        .map_err(VaultError::StorageFailed)?;

        let key = EnvelopeKey::from_material(&wrapped.symmetric_key)
            .map_err(|e| VaultError::StorageFailed(e.into()))?;
        let sealed = key
            .seal(&payload)
            .map_err(|e| VaultError::StorageFailed(e.into()))?;

        let options = PutOptions {
            epochs: self.config.storage_epochs,
            deletable: false,
        };
        let receipt = with_deadline(
            self.config.call_timeout,
            "sealed blob store",
            self.store.put(&sealed, &options),
        )
        .await
        .map_err(VaultError::StorageFailed)?;

        Ok(CredentialMetadataRecord {
            subject_id: subject_id.to_string(),
            kind: credential.kind(),
            content_id: receipt.content_id,
            wrapped_key: wrapped.wrapped_key,
            access_level,
            created_at: now_millis(),
            expires_at,
            authority_id: self.config.authority_id.clone(),
            policy_id: policy_id.clone(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Retrieve
    // ─────────────────────────────────────────────────────────────────────────

    /// Retrieve one credential.
    ///
    /// Creates a fresh signed session with `signer`, has the key
    /// servers unwrap the envelope key after their policy check, and
    /// opens the sealed blob.
    pub async fn retrieve(
        &self,
        record: &CredentialMetadataRecord,
        signer: &dyn Signer,
    ) -> Result<Credential> {
        let session = self.create_session(signer).await?;

        let result = Self::open_record(
            Arc::clone(&self.store),
            Arc::clone(&self.encryptor),
            self.config.call_timeout,
            record.clone(),
            session,
        )
        .await;

        self.audit_retrieval(signer.address(), record, &result);
        result
    }

    /// Retrieve several credentials under a single session.
    ///
    /// The signer is invoked exactly once; records are then fetched
    /// and unwrapped concurrently. The returned outcomes are in input
    /// order, and individual failures never abort the rest of the
    /// batch.
    pub async fn retrieve_batch(
        &self,
        records: Vec<CredentialMetadataRecord>,
        signer: &dyn Signer,
    ) -> Result<Vec<BatchOutcome>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let session = self.create_session(signer).await?;
        let count = records.len();

        let mut tasks = JoinSet::new();
        for (idx, record) in records.into_iter().enumerate() {
            let store = Arc::clone(&self.store);
            let encryptor = Arc::clone(&self.encryptor);
            let timeout = self.config.call_timeout;
            let session = session.clone();
            tasks.spawn(async move {
                let policy_id = record.policy_id.clone();
                let result = Self::open_record(store, encryptor, timeout, record, session).await;
                (idx, BatchOutcome { policy_id, result })
            });
        }

        let mut slots: Vec<Option<BatchOutcome>> = (0..count).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, outcome)) => slots[idx] = Some(outcome),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                // The set is never aborted, so cancellation cannot occur.
                Err(_) => {}
            }
        }

        let outcomes: Vec<BatchOutcome> = slots.into_iter().flatten().collect();
        for outcome in &outcomes {
            let action = match &outcome.result {
                Err(e) if e.is_access_denied() => AuditAction::AccessDenied,
                _ => AuditAction::Retrieve,
            };
            self.spawn_audit(
                action,
                signer.address(),
                outcome.policy_id.as_str(),
                outcome.result.is_ok(),
                json!({ "batch": count }),
                outcome.result.as_ref().err().map(failure_message),
            );
        }
        Ok(outcomes)
    }

    async fn create_session(&self, signer: &dyn Signer) -> Result<SessionCredential> {
        let session = self
            .authorizer
            .create_session(
                signer.address(),
                &self.config.authority_id,
                self.config.session_ttl_minutes,
                signer,
            )
            .await
            .map_err(|e| VaultError::RetrievalFailed(e.into()))?;

        self.spawn_audit(
            AuditAction::SessionCreate,
            signer.address(),
            &self.config.authority_id,
            true,
            json!({ "ttl_minutes": self.config.session_ttl_minutes }),
            None,
        );
        Ok(session)
    }

    /// Fetch, unwrap and open one record. Associated function so batch
    /// tasks can run it without borrowing the vault.
    async fn open_record(
        store: Arc<C>,
        encryptor: Arc<E>,
        timeout: Duration,
        record: CredentialMetadataRecord,
        session: SessionCredential,
    ) -> Result<Credential> {
        if !record.is_complete() {
            return Err(VaultError::InvalidArgument(
                "metadata record is missing content id, wrapped key or authority".into(),
            ));
        }

        // Authorization first: the key servers decide access before any
        // ciphertext moves.
        let proof = ApprovalCall::new(record.authority_id.clone(), record.policy_id.clone());
        let key_material = with_deadline(
            timeout,
            "envelope key unwrap",
            encryptor.decrypt(&record.wrapped_key, &session, &proof.to_bytes()),
        )
        .await
        .map_err(VaultError::RetrievalFailed)?;

        let blob = with_deadline(timeout, "sealed blob fetch", store.get(&record.content_id))
            .await
            .map_err(VaultError::RetrievalFailed)?;

        let key = EnvelopeKey::from_material(&key_material)
            .map_err(|e| VaultError::RetrievalFailed(e.into()))?;
        let plaintext = key
            .open(&blob)
            .map_err(|e| VaultError::RetrievalFailed(e.into()))?;

        let credential = Credential::from_json_bytes(&plaintext)
            .map_err(|e| VaultError::RetrievalFailed(e.into()))?;
        if credential.kind() != record.kind {
            return Err(VaultError::RetrievalFailed(ComponentError::Core(
                aidvault_core::CoreError::InvalidArgument(format!(
                    "stored credential is {:?}, record claims {:?}",
                    credential.kind(),
                    record.kind
                )),
            )));
        }
        Ok(credential)
    }

    fn audit_retrieval(
        &self,
        requester: &str,
        record: &CredentialMetadataRecord,
        result: &Result<Credential>,
    ) {
        let action = match result {
            Err(e) if e.is_access_denied() => AuditAction::AccessDenied,
            _ => AuditAction::Retrieve,
        };
        self.spawn_audit(
            action,
            requester,
            record.policy_id.as_str(),
            result.is_ok(),
            json!({ "kind": record.kind.as_str() }),
            result.as_ref().err().map(failure_message),
        );
    }

    /// Emit an audit record without blocking the operation.
    fn spawn_audit(
        &self,
        action: AuditAction,
        subject: &str,
        resource: &str,
        success: bool,
        detail: serde_json::Value,
        error: Option<String>,
    ) {
        let sink = self.audit.clone();
        let subject = subject.to_string();
        let resource = resource.to_string();
        tokio::spawn(async move {
            sink.record(action, &subject, &resource, success, detail, error.as_deref())
                .await;
        });
    }
}

/// The audit-trail description of a failure: the preserved component
/// cause where there is one, the surface error otherwise.
fn failure_message(err: &VaultError) -> String {
    match err.cause() {
        Some(cause) => cause.to_string(),
        None => err.to_string(),
    }
}

/// Run a fallible remote call under a deadline, folding both the call's
/// own error and expiry into a [`ComponentError`].
async fn with_deadline<T, E, F>(
    timeout: Duration,
    label: &str,
    fut: F,
) -> std::result::Result<T, ComponentError>
where
    F: Future<Output = std::result::Result<T, E>>,
    ComponentError: From<E>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => {
            warn!(call = label, timeout_ms = timeout.as_millis() as u64, "remote call timed out");
            Err(ComponentError::Timeout(label.to_string()))
        }
    }
}
