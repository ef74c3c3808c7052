//! Simulated k-of-n key-server network.
//!
//! An in-process backend for the [`ThresholdEncryptor`] trait, used by
//! tests and local development. Every server holds an X25519 static
//! secret and independently validates the session credential and the
//! authorization proof against the injected [`AccessPolicy`] before its
//! share is opened. Servers can be taken offline to exercise quorum
//! failures.
//!
//! This is a test bench for the orchestration layer, not a threshold
//! cryptosystem: the real network lives behind the same trait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use rand::RngCore;

use aidvault_core::{now_millis, PolicyId};
use aidvault_session::{SessionCredential, SessionState};

use crate::approval::ApprovalCall;
use crate::encryptor::{ThresholdEncryptResult, ThresholdEncryptor};
use crate::error::{Result, SealError};
use crate::policy::AccessPolicy;
use crate::share::{open_with_server, wrap_for_server, ServerSecret};
use crate::wrapped::WrappedKey;

/// One simulated key server.
pub struct KeyServer {
    id: String,
    secret: ServerSecret,
    online: AtomicBool,
}

impl KeyServer {
    /// Create a server with a fresh static secret.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: ServerSecret::generate(),
            online: AtomicBool::new(true),
        }
    }

    /// Server identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Take the server offline (simulates an unreachable server).
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Validate a decryption request the way a real server would:
    /// session first, then the authorization proof against the policy.
    async fn validate(
        &self,
        wrapped: &WrappedKey,
        session: &SessionCredential,
        call: &ApprovalCall,
        policy: &dyn AccessPolicy,
    ) -> Result<()> {
        match session.state(now_millis()) {
            SessionState::Expired => return Err(SealError::SessionExpired),
            SessionState::Unsigned => {
                return Err(SealError::InvalidSession(
                    "session has no signature attached".into(),
                ))
            }
            SessionState::Signed => {}
        }

        if session.authority_namespace != wrapped.authority_id {
            return Err(SealError::InvalidSession(format!(
                "session namespace {} does not cover authority {}",
                session.authority_namespace, wrapped.authority_id
            )));
        }

        verify_session_signature(session)?;

        if call.policy_id != wrapped.policy_id || call.authority_id != wrapped.authority_id {
            return Err(SealError::InvalidPolicy(
                "authorization proof does not reference this wrapped key".into(),
            ));
        }

        let approved = policy.approve(call, &session.subject_address).await?;
        if !approved {
            return Err(SealError::AccessDenied(format!(
                "policy check rejected {} for {}",
                session.subject_address, call.policy_id
            )));
        }

        Ok(())
    }
}

/// Verify the session signature over its canonical challenge.
///
/// The simulated backend requires `subject_address` to be the hex
/// encoding of the subject's Ed25519 verifying key; a production
/// backend resolves addresses on-chain instead.
fn verify_session_signature(session: &SessionCredential) -> Result<()> {
    let sig_hex = session
        .signature
        .as_deref()
        .ok_or_else(|| SealError::InvalidSession("session has no signature attached".into()))?;

    let key_bytes: [u8; 32] = hex::decode(&session.subject_address)
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| {
            SealError::InvalidSession("subject address is not a verifying key".into())
        })?;
    let sig_bytes: [u8; 64] = hex::decode(sig_hex)
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| SealError::InvalidSession("malformed session signature".into()))?;

    let key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|_| SealError::InvalidSession("subject address is not a verifying key".into()))?;
    key.verify(
        &session.challenge_message(),
        &Signature::from_bytes(&sig_bytes),
    )
    .map_err(|_| SealError::InvalidSession("session signature does not verify".into()))
}

/// The simulated network: a fixed server set plus the access policy
/// they all consult.
pub struct SimulatedKeyServers {
    servers: Vec<Arc<KeyServer>>,
    policy: Arc<dyn AccessPolicy>,
}

impl SimulatedKeyServers {
    /// Create a network of `count` servers consulting `policy`.
    pub fn new(count: usize, policy: Arc<dyn AccessPolicy>) -> Self {
        let servers = (0..count)
            .map(|i| Arc::new(KeyServer::new(format!("keyserver-{i}"))))
            .collect();
        Self { servers, policy }
    }

    /// Handles to the individual servers, for fault injection in tests.
    pub fn servers(&self) -> &[Arc<KeyServer>] {
        &self.servers
    }

    fn validate_identifiers(authority_id: &str, policy_id: &PolicyId) -> Result<()> {
        if authority_id.trim().is_empty() {
            return Err(SealError::InvalidPolicy(
                "authority id must not be empty".into(),
            ));
        }
        // Re-parse to reject identifiers constructed outside the generator.
        PolicyId::parse(policy_id.as_str())
            .map_err(|e| SealError::InvalidPolicy(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ThresholdEncryptor for SimulatedKeyServers {
    async fn encrypt(
        &self,
        threshold: usize,
        authority_id: &str,
        policy_id: &PolicyId,
        _payload: &[u8],
    ) -> Result<ThresholdEncryptResult> {
        Self::validate_identifiers(authority_id, policy_id)?;
        if threshold == 0 {
            return Err(SealError::InvalidPolicy("threshold must be at least 1".into()));
        }

        let online: Vec<_> = self.servers.iter().filter(|s| s.is_online()).collect();
        if online.len() < threshold {
            return Err(SealError::KeyServerUnavailable {
                responded: online.len(),
                threshold,
            });
        }

        let mut symmetric_key = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut symmetric_key);

        let mut shares = Vec::with_capacity(online.len());
        for server in &online {
            shares.push(wrap_for_server(
                &server.id,
                &server.secret.public_key(),
                policy_id,
                &symmetric_key,
            )?);
        }

        let wrapped = WrappedKey {
            authority_id: authority_id.to_string(),
            policy_id: policy_id.clone(),
            threshold,
            shares,
        };

        Ok(ThresholdEncryptResult {
            wrapped_key: wrapped.to_bytes(),
            symmetric_key,
        })
    }

    async fn decrypt(
        &self,
        wrapped_key: &[u8],
        session: &SessionCredential,
        authorization_proof: &[u8],
    ) -> Result<Vec<u8>> {
        let wrapped = WrappedKey::from_bytes(wrapped_key)?;
        let call = ApprovalCall::from_bytes(authorization_proof)?;

        // Each online server holding a share validates independently;
        // the key is released only once a quorum approves.
        let mut approvals = Vec::new();
        let mut last_rejection = None;
        for server in self.servers.iter().filter(|s| s.is_online()) {
            let Some(share) = wrapped.shares.iter().find(|sh| sh.server_id == server.id) else {
                continue;
            };
            match server.validate(&wrapped, session, &call, self.policy.as_ref()).await {
                Ok(()) => approvals.push((server, share)),
                Err(e) => {
                    tracing::debug!(server = %server.id, error = %e, "key server rejected request");
                    last_rejection = Some(e);
                }
            }
        }

        if let Some(rejection) = last_rejection {
            // Servers apply identical validation; any rejection means the
            // request itself is bad, not the quorum.
            return Err(rejection);
        }

        if approvals.len() < wrapped.threshold {
            return Err(SealError::KeyServerUnavailable {
                responded: approvals.len(),
                threshold: wrapped.threshold,
            });
        }

        let (server, share) = approvals.first().ok_or(SealError::KeyServerUnavailable {
            responded: 0,
            threshold: wrapped.threshold,
        })?;
        open_with_server(share, &server.secret, &wrapped.policy_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::AllowlistPolicy;
    use aidvault_session::{LocalKeypairSigner, SessionAuthorizer, Signer};

    const AUTHORITY: &str = "0xauthority";

    async fn signed_session(signer: &LocalKeypairSigner) -> SessionCredential {
        SessionAuthorizer::new()
            .create_session(signer.address(), AUTHORITY, 30, signer)
            .await
            .unwrap()
    }

    fn network_with_policy() -> (SimulatedKeyServers, Arc<AllowlistPolicy>) {
        let policy = Arc::new(AllowlistPolicy::new(AUTHORITY));
        let network = SimulatedKeyServers::new(3, policy.clone());
        (network, policy)
    }

    fn policy_id() -> PolicyId {
        PolicyId::parse("0xdeadbeef").unwrap()
    }

    #[tokio::test]
    async fn test_wrap_unwrap_roundtrip() {
        let (network, policy) = network_with_policy();
        let signer = LocalKeypairSigner::generate();
        let pid = policy_id();
        policy.register(pid.clone(), signer.address());

        let result = network.encrypt(2, AUTHORITY, &pid, b"payload").await.unwrap();
        assert_eq!(result.symmetric_key.len(), 32);

        let session = signed_session(&signer).await;
        let proof = ApprovalCall::new(AUTHORITY, pid).to_bytes();
        let key = network
            .decrypt(&result.wrapped_key, &session, &proof)
            .await
            .unwrap();
        assert_eq!(key, result.symmetric_key);
    }

    #[tokio::test]
    async fn test_unregistered_requester_denied() {
        let (network, policy) = network_with_policy();
        let owner = LocalKeypairSigner::generate();
        let mallory = LocalKeypairSigner::generate();
        let pid = policy_id();
        policy.register(pid.clone(), owner.address());

        let result = network.encrypt(2, AUTHORITY, &pid, b"payload").await.unwrap();
        let session = signed_session(&mallory).await;
        let proof = ApprovalCall::new(AUTHORITY, pid).to_bytes();

        assert!(matches!(
            network.decrypt(&result.wrapped_key, &session, &proof).await,
            Err(SealError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_quorum_failure_on_encrypt() {
        let (network, _policy) = network_with_policy();
        for server in network.servers() {
            server.set_online(false);
        }
        network.servers()[0].set_online(true);

        let result = network.encrypt(2, AUTHORITY, &policy_id(), b"payload").await;
        assert!(matches!(
            result,
            Err(SealError::KeyServerUnavailable { responded: 1, threshold: 2 })
        ));
    }

    #[tokio::test]
    async fn test_quorum_failure_on_decrypt() {
        let (network, policy) = network_with_policy();
        let signer = LocalKeypairSigner::generate();
        let pid = policy_id();
        policy.register(pid.clone(), signer.address());

        let result = network.encrypt(2, AUTHORITY, &pid, b"payload").await.unwrap();

        for server in network.servers().iter().skip(1) {
            server.set_online(false);
        }

        let session = signed_session(&signer).await;
        let proof = ApprovalCall::new(AUTHORITY, pid).to_bytes();
        assert!(matches!(
            network.decrypt(&result.wrapped_key, &session, &proof).await,
            Err(SealError::KeyServerUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_forged_shareless_wrapped_key_rejected() {
        let (network, policy) = network_with_policy();
        let signer = LocalKeypairSigner::generate();
        let pid = policy_id();
        policy.register(pid.clone(), signer.address());

        // Well-formed CBOR, but a key that could never release anything.
        let forged = WrappedKey {
            authority_id: AUTHORITY.into(),
            policy_id: pid.clone(),
            threshold: 0,
            shares: vec![],
        };

        let session = signed_session(&signer).await;
        let proof = ApprovalCall::new(AUTHORITY, pid).to_bytes();
        assert!(matches!(
            network.decrypt(&forged.to_bytes(), &session, &proof).await,
            Err(SealError::InvalidPolicy(_))
        ));
    }

    #[tokio::test]
    async fn test_unsigned_session_rejected() {
        let (network, policy) = network_with_policy();
        let signer = LocalKeypairSigner::generate();
        let pid = policy_id();
        policy.register(pid.clone(), signer.address());

        let result = network.encrypt(2, AUTHORITY, &pid, b"payload").await.unwrap();
        let session = SessionCredential::unsigned(signer.address(), AUTHORITY, 30).unwrap();
        let proof = ApprovalCall::new(AUTHORITY, pid).to_bytes();

        assert!(matches!(
            network.decrypt(&result.wrapped_key, &session, &proof).await,
            Err(SealError::InvalidSession(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let (network, policy) = network_with_policy();
        let signer = LocalKeypairSigner::generate();
        let pid = policy_id();
        policy.register(pid.clone(), signer.address());

        let result = network.encrypt(2, AUTHORITY, &pid, b"payload").await.unwrap();

        let mut session = signed_session(&signer).await;
        session.expires_at = now_millis() - 1;
        let proof = ApprovalCall::new(AUTHORITY, pid).to_bytes();

        assert!(matches!(
            network.decrypt(&result.wrapped_key, &session, &proof).await,
            Err(SealError::SessionExpired)
        ));
    }

    #[tokio::test]
    async fn test_tampered_signature_rejected() {
        let (network, policy) = network_with_policy();
        let signer = LocalKeypairSigner::generate();
        let pid = policy_id();
        policy.register(pid.clone(), signer.address());

        let result = network.encrypt(2, AUTHORITY, &pid, b"payload").await.unwrap();

        let mut session = signed_session(&signer).await;
        session.signature = Some("00".repeat(64));
        let proof = ApprovalCall::new(AUTHORITY, pid).to_bytes();

        assert!(matches!(
            network.decrypt(&result.wrapped_key, &session, &proof).await,
            Err(SealError::InvalidSession(_))
        ));
    }

    #[tokio::test]
    async fn test_proof_for_other_policy_rejected() {
        let (network, policy) = network_with_policy();
        let signer = LocalKeypairSigner::generate();
        let pid = policy_id();
        policy.register(pid.clone(), signer.address());

        let result = network.encrypt(2, AUTHORITY, &pid, b"payload").await.unwrap();
        let session = signed_session(&signer).await;
        let other = PolicyId::parse("0xfeedface").unwrap();
        let proof = ApprovalCall::new(AUTHORITY, other).to_bytes();

        assert!(matches!(
            network.decrypt(&result.wrapped_key, &session, &proof).await,
            Err(SealError::InvalidPolicy(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_authority_rejected() {
        let (network, _policy) = network_with_policy();
        assert!(matches!(
            network.encrypt(2, " ", &policy_id(), b"payload").await,
            Err(SealError::InvalidPolicy(_))
        ));
    }
}
