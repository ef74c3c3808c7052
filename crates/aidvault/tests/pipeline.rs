//! End-to-end pipeline tests over in-memory backends.
//!
//! Exercises the full store/retrieve path: policy identity generation,
//! threshold key wrapping against simulated key servers, symmetric
//! sealing, content-addressed storage, and the failure modes in
//! between. No network, no timing dependence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use aidvault::core::{
    AccessLevel, BankAccountCredentials, ContentId, CoreError, Credential, CredentialKind,
    DebitCardCredentials,
};
use aidvault::seal::{AllowlistPolicy, SealError, SimulatedKeyServers};
use aidvault::session::{LocalKeypairSigner, Signer};
use aidvault::store::{ContentStore, MemoryBlobStore, PutOptions, PutReceipt, StoreError};
use aidvault::{ComponentError, CredentialVault, VaultConfig, VaultError};

const AUTHORITY: &str = "0xauthority";

fn debit_card(user_id: &str) -> Credential {
    Credential::DebitCard(DebitCardCredentials {
        card_number: "4111111111111111".into(),
        expiry_date: "12/29".into(),
        cvv: "123".into(),
        bank_name: "Test Bank".into(),
        weekly_limit: 1_000_000_000,
        is_active: true,
        user_id: user_id.into(),
    })
}

fn bank_account(user_id: &str) -> Credential {
    Credential::BankAccount(BankAccountCredentials {
        account_number: "000123456789".into(),
        routing_number: "110000000".into(),
        bank_name: "Test Bank".into(),
        account_type: "checking".into(),
        account_holder_name: "Alice Example".into(),
        user_id: user_id.into(),
    })
}

fn new_vault() -> (
    CredentialVault<MemoryBlobStore, SimulatedKeyServers>,
    Arc<AllowlistPolicy>,
) {
    let policy = Arc::new(AllowlistPolicy::new(AUTHORITY));
    let servers = SimulatedKeyServers::new(3, policy.clone());
    let vault = CredentialVault::new(MemoryBlobStore::new(), servers, VaultConfig::new(AUTHORITY));
    (vault, policy)
}

/// Signer wrapper that counts how often it is invoked.
struct CountingSigner {
    inner: LocalKeypairSigner,
    calls: AtomicUsize,
}

impl CountingSigner {
    fn new() -> Self {
        Self {
            inner: LocalKeypairSigner::generate(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Signer for CountingSigner {
    fn address(&self) -> &str {
        self.inner.address()
    }

    async fn sign(&self, message: &[u8]) -> aidvault::session::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sign(message).await
    }
}

/// Store wrapper that counts credential-blob uploads. Credential and
/// audit puts use distinct retention, so the epoch count tells them
/// apart.
struct CountingStore {
    inner: MemoryBlobStore,
    credential_epochs: u32,
    credential_puts: AtomicUsize,
}

impl CountingStore {
    fn new(inner: MemoryBlobStore, credential_epochs: u32) -> Self {
        Self {
            inner,
            credential_epochs,
            credential_puts: AtomicUsize::new(0),
        }
    }

    fn credential_puts(&self) -> usize {
        self.credential_puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for CountingStore {
    async fn put(&self, blob: &[u8], options: &PutOptions) -> aidvault::store::Result<PutReceipt> {
        if options.epochs == self.credential_epochs {
            self.credential_puts.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.put(blob, options).await
    }

    async fn get(&self, id: &ContentId) -> aidvault::store::Result<Bytes> {
        self.inner.get(id).await
    }

    fn size_ceiling(&self) -> usize {
        self.inner.size_ceiling()
    }
}

#[tokio::test]
async fn test_store_retrieve_roundtrip() {
    let (vault, policy) = new_vault();
    let signer = LocalKeypairSigner::generate();
    let credential = debit_card("alice");

    let record = vault
        .store("alice", &credential, AccessLevel::User, None)
        .await
        .unwrap();

    assert_eq!(record.subject_id, "alice");
    assert_eq!(record.kind, CredentialKind::DebitCard);
    assert_eq!(record.authority_id, AUTHORITY);
    assert!(record.policy_id.as_str().starts_with("0x"));
    assert!(!record.wrapped_key.is_empty());
    assert!(record.is_complete());

    policy.register(record.policy_id.clone(), signer.address());
    let recovered = vault.retrieve(&record, &signer).await.unwrap();
    assert_eq!(recovered, credential);

    match recovered {
        Credential::DebitCard(card) => {
            assert_eq!(card.card_number, "4111111111111111");
            assert_eq!(card.weekly_limit, 1_000_000_000);
        }
        other => panic!("expected debit card, got {other:?}"),
    }
}

#[tokio::test]
async fn test_record_and_blob_contain_no_plaintext() {
    let (vault, _policy) = new_vault();
    let credential = debit_card("alice");

    let record = vault
        .store("alice", &credential, AccessLevel::User, None)
        .await
        .unwrap();

    let record_json = serde_json::to_string(&record).unwrap();
    assert!(!record_json.contains("4111111111111111"));
    assert!(!record_json.contains("Test Bank"));

    let blob = vault.content_store().get(&record.content_id).await.unwrap();
    let needle = b"4111111111111111";
    assert!(!blob.windows(needle.len()).any(|w| w == needle));
}

#[tokio::test]
async fn test_tampered_blob_fails_closed() {
    let (vault, policy) = new_vault();
    let signer = LocalKeypairSigner::generate();

    let record = vault
        .store("alice", &debit_card("alice"), AccessLevel::User, None)
        .await
        .unwrap();
    policy.register(record.policy_id.clone(), signer.address());

    assert!(vault.content_store().tamper(&record.content_id, 20));

    let err = vault.retrieve(&record, &signer).await.unwrap_err();
    assert!(matches!(
        err.cause(),
        Some(ComponentError::Core(CoreError::DecryptionFailed))
    ));
}

#[tokio::test]
async fn test_unauthorized_requester_denied() {
    let (vault, policy) = new_vault();
    let owner = LocalKeypairSigner::generate();
    let mallory = LocalKeypairSigner::generate();

    let record = vault
        .store("alice", &debit_card("alice"), AccessLevel::User, None)
        .await
        .unwrap();
    policy.register(record.policy_id.clone(), owner.address());

    let err = vault.retrieve(&record, &mallory).await.unwrap_err();
    assert!(err.is_access_denied());
    assert!(matches!(
        err.cause(),
        Some(ComponentError::Seal(SealError::AccessDenied(_)))
    ));
}

#[tokio::test]
async fn test_authorization_checked_before_content_fetch() {
    let (vault, policy) = new_vault();
    let owner = LocalKeypairSigner::generate();
    let mallory = LocalKeypairSigner::generate();

    let record = vault
        .store("alice", &debit_card("alice"), AccessLevel::User, None)
        .await
        .unwrap();
    policy.register(record.policy_id.clone(), owner.address());

    // Stale record: the blob is gone. An unauthorized requester must
    // still see the access decision, not the storage state.
    assert!(vault.content_store().remove(&record.content_id));

    let err = vault.retrieve(&record, &mallory).await.unwrap_err();
    assert!(err.is_access_denied());
    assert!(matches!(
        err.cause(),
        Some(ComponentError::Seal(SealError::AccessDenied(_)))
    ));
}

#[tokio::test]
async fn test_unregistered_policy_denied() {
    let (vault, _policy) = new_vault();
    let signer = LocalKeypairSigner::generate();

    let record = vault
        .store("alice", &debit_card("alice"), AccessLevel::User, None)
        .await
        .unwrap();
    // No registration: nobody owns this policy yet.

    let err = vault.retrieve(&record, &signer).await.unwrap_err();
    assert!(err.is_access_denied());
}

#[tokio::test]
async fn test_batch_partial_failure_preserves_order() {
    let (vault, policy) = new_vault();
    let signer = CountingSigner::new();

    let mut records = Vec::new();
    for i in 0..5 {
        let user = format!("user-{i}");
        let credential = if i % 2 == 0 {
            debit_card(&user)
        } else {
            bank_account(&user)
        };
        let record = vault
            .store(&user, &credential, AccessLevel::User, None)
            .await
            .unwrap();
        policy.register(record.policy_id.clone(), signer.address());
        records.push(record);
    }

    // Expire one blob out from under the batch.
    assert!(vault.content_store().remove(&records[2].content_id));

    let outcomes = vault.retrieve_batch(records.clone(), &signer).await.unwrap();

    assert_eq!(outcomes.len(), 5);
    assert_eq!(signer.calls(), 1);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.policy_id, records[i].policy_id);
        if i == 2 {
            let err = outcome.result.as_ref().unwrap_err();
            assert!(matches!(
                err.cause(),
                Some(ComponentError::Store(StoreError::NotFound(_)))
            ));
        } else {
            let credential = outcome.result.as_ref().unwrap();
            assert_eq!(credential.kind(), records[i].kind);
        }
    }
}

#[tokio::test]
async fn test_empty_batch_skips_the_signer() {
    let (vault, _policy) = new_vault();
    let signer = CountingSigner::new();

    let outcomes = vault.retrieve_batch(Vec::new(), &signer).await.unwrap();
    assert!(outcomes.is_empty());
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn test_oversized_payload_rejected_before_upload() {
    let policy = Arc::new(AllowlistPolicy::new(AUTHORITY));
    let servers = SimulatedKeyServers::new(3, policy.clone());
    let config = VaultConfig::new(AUTHORITY);
    let store = CountingStore::new(MemoryBlobStore::with_ceiling(256), config.storage_epochs);
    let vault = CredentialVault::new(store, servers, config);

    let credential = Credential::DebitCard(DebitCardCredentials {
        card_number: "4111111111111111".into(),
        expiry_date: "12/29".into(),
        cvv: "123".into(),
        bank_name: "x".repeat(1024),
        weekly_limit: 0,
        is_active: true,
        user_id: "alice".into(),
    });

    let err = vault
        .store("alice", &credential, AccessLevel::User, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.cause(),
        Some(ComponentError::Store(StoreError::PayloadTooLarge { .. }))
    ));
    assert!(!err.is_retryable());
    assert_eq!(vault.content_store().credential_puts(), 0);
}

#[tokio::test]
async fn test_quorum_failure_on_store() {
    let (vault, _policy) = new_vault();
    for server in &vault.encryptor().servers()[..2] {
        server.set_online(false);
    }

    let err = vault
        .store("alice", &debit_card("alice"), AccessLevel::User, None)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err.cause(),
        Some(ComponentError::Seal(SealError::KeyServerUnavailable {
            responded: 1,
            threshold: 2,
        }))
    ));
}

#[tokio::test]
async fn test_quorum_failure_on_retrieve() {
    let (vault, policy) = new_vault();
    let signer = LocalKeypairSigner::generate();

    let record = vault
        .store("alice", &debit_card("alice"), AccessLevel::User, None)
        .await
        .unwrap();
    policy.register(record.policy_id.clone(), signer.address());

    for server in &vault.encryptor().servers()[..2] {
        server.set_online(false);
    }

    let err = vault.retrieve(&record, &signer).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err.cause(),
        Some(ComponentError::Seal(SealError::KeyServerUnavailable { .. }))
    ));
}

#[tokio::test]
async fn test_kind_mismatch_rejected() {
    let (vault, policy) = new_vault();
    let signer = LocalKeypairSigner::generate();

    let mut record = vault
        .store("alice", &debit_card("alice"), AccessLevel::User, None)
        .await
        .unwrap();
    policy.register(record.policy_id.clone(), signer.address());

    record.kind = CredentialKind::Identity;

    let err = vault.retrieve(&record, &signer).await.unwrap_err();
    assert!(matches!(
        err.cause(),
        Some(ComponentError::Core(CoreError::InvalidArgument(_)))
    ));
}

#[tokio::test]
async fn test_incomplete_record_rejected() {
    let (vault, policy) = new_vault();
    let signer = LocalKeypairSigner::generate();

    let mut record = vault
        .store("alice", &debit_card("alice"), AccessLevel::User, None)
        .await
        .unwrap();
    policy.register(record.policy_id.clone(), signer.address());

    record.wrapped_key.clear();

    let err = vault.retrieve(&record, &signer).await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_empty_subject_rejected() {
    let (vault, _policy) = new_vault();
    let err = vault
        .store("", &debit_card("alice"), AccessLevel::User, None)
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_distinct_policies_per_store() {
    let (vault, _policy) = new_vault();
    let credential = debit_card("alice");

    let a = vault
        .store("alice", &credential, AccessLevel::User, None)
        .await
        .unwrap();
    let b = vault
        .store("alice", &credential, AccessLevel::User, None)
        .await
        .unwrap();

    // Same subject, same payload: policy identities never collide.
    assert_ne!(a.policy_id, b.policy_id);
}
