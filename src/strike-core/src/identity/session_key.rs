use crate::error::delegation::SessionKeyError;
use ic_agent::identity::BasicIdentity;
use ic_agent::Identity;
use ring::signature::Ed25519KeyPair;
use std::sync::Arc;

/// An Ed25519 key pair that a delegation chain authorises for a short while.
///
/// Every login generates a new one; keys are never reused across logins.
#[derive(Clone)]
pub struct SessionKey {
    pem: String,
    public_key: Vec<u8>,
    identity: Arc<BasicIdentity>,
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("public_key", &hex::encode(&self.public_key))
            .finish_non_exhaustive()
    }
}

impl SessionKey {
    pub fn generate() -> Result<Self, SessionKeyError> {
        let rng = ring::rand::SystemRandom::new();
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).map_err(SessionKeyError::GenerateFailed)?;
        let encoded = pem::encode(&pem::Pem {
            tag: "PRIVATE KEY".to_string(),
            contents: pkcs8.as_ref().to_vec(),
        });
        Self::from_pem(&encoded)
    }

    pub fn from_pem(pem: &str) -> Result<Self, SessionKeyError> {
        let identity = BasicIdentity::from_pem(pem.as_bytes()).map_err(SessionKeyError::LoadFailed)?;
        let public_key = identity
            .public_key()
            .ok_or(SessionKeyError::MissingPublicKey)?;
        Ok(SessionKey {
            pem: pem.to_string(),
            public_key,
            identity: Arc::new(identity),
        })
    }

    pub fn pem(&self) -> &str {
        &self.pem
    }

    /// DER-encoded public key, the form canisters expect as `session_key`.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn identity(&self) -> Arc<BasicIdentity> {
        self.identity.clone()
    }
}
