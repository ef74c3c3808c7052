//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a fully wired vault over
//! in-memory backends, plus sample credentials of every kind.

use std::sync::Arc;

use aidvault::{CredentialVault, VaultConfig};
use aidvault_core::{
    AccessLevel, BankAccountCredentials, Credential, CredentialMetadataRecord,
    DebitCardCredentials, IdentityCredentials,
};
use aidvault_seal::{AllowlistPolicy, SimulatedKeyServers};
use aidvault_session::{LocalKeypairSigner, Signer};
use aidvault_store::MemoryBlobStore;

/// Authority namespace used by all fixtures.
pub const TEST_AUTHORITY: &str = "0xa1dc4a1a";

/// A test fixture with a vault over in-memory backends, the policy it
/// is guarded by, and a signer acting as the credential owner.
pub struct VaultFixture {
    pub vault: CredentialVault<MemoryBlobStore, SimulatedKeyServers>,
    pub policy: Arc<AllowlistPolicy>,
    pub signer: LocalKeypairSigner,
}

impl VaultFixture {
    /// Create a fixture with three key servers (threshold two).
    pub fn new() -> Self {
        Self::with_servers(3)
    }

    /// Create a fixture with a custom key-server count.
    pub fn with_servers(count: usize) -> Self {
        let policy = Arc::new(AllowlistPolicy::new(TEST_AUTHORITY));
        let servers = SimulatedKeyServers::new(count, policy.clone());
        let vault = CredentialVault::new(
            MemoryBlobStore::new(),
            servers,
            VaultConfig::new(TEST_AUTHORITY),
        );
        Self {
            vault,
            policy,
            signer: LocalKeypairSigner::generate(),
        }
    }

    /// Store a credential and register the fixture's signer as the
    /// policy owner, so retrieval with [`Self::signer`] succeeds.
    pub async fn store_owned(
        &self,
        subject_id: &str,
        credential: &Credential,
    ) -> CredentialMetadataRecord {
        let record = self
            .vault
            .store(subject_id, credential, AccessLevel::User, None)
            .await
            .expect("fixture store failed");
        self.policy
            .register(record.policy_id.clone(), self.signer.address());
        record
    }

    /// Retrieve with the fixture's signer.
    pub async fn retrieve(&self, record: &CredentialMetadataRecord) -> Credential {
        self.vault
            .retrieve(record, &self.signer)
            .await
            .expect("fixture retrieve failed")
    }
}

impl Default for VaultFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A debit card with realistic-looking test values.
pub fn sample_debit_card(user_id: &str) -> Credential {
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

/// An identity document.
pub fn sample_identity(user_id: &str) -> Credential {
    Credential::Identity(IdentityCredentials {
        document_type: "passport".into(),
        document_number: "P01234567".into(),
        full_name: "Alice Example".into(),
        date_of_birth: "1990-01-01".into(),
        nationality: "NL".into(),
        expiry_date: "2031-06-30".into(),
        issuing_authority: "Ministry of Examples".into(),
        user_id: user_id.into(),
    })
}

/// A bank account.
pub fn sample_bank_account(user_id: &str) -> Credential {
    Credential::BankAccount(BankAccountCredentials {
        account_number: "000123456789".into(),
        routing_number: "110000000".into(),
        bank_name: "Test Bank".into(),
        account_type: "checking".into(),
        account_holder_name: "Alice Example".into(),
        user_id: user_id.into(),
    })
}
