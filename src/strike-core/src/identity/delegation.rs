use crate::error::delegation::DelegationError;
use crate::identity::session_key::SessionKey;
use candid::Principal;
use ic_agent::identity::{DelegatedIdentity, Delegation, SignedDelegation};
use serde::{Deserialize, Serialize};

/// A chain of delegations rooted at `public_key`, ending at a session key.
#[derive(Clone, Debug)]
pub struct DelegationChain {
    pub public_key: Vec<u8>,
    pub delegations: Vec<SignedDelegation>,
}

impl DelegationChain {
    /// Builds the one-link chain a canister signature produces: the user
    /// canister key delegates to the session key.
    pub fn from_signed_delegation(
        signed: SignedDelegation,
        user_canister_pubkey: Vec<u8>,
    ) -> Self {
        DelegationChain {
            public_key: user_canister_pubkey,
            delegations: vec![signed],
        }
    }

    /// The earliest expiration in the chain, in nanoseconds since the epoch.
    pub fn expiration(&self) -> Option<u64> {
        self.delegations
            .iter()
            .map(|d| d.delegation.expiration)
            .min()
    }

    pub fn is_expired_at(&self, now_nanos: u64) -> bool {
        self.expiration().is_none_or(|expiration| expiration <= now_nanos)
    }

    pub fn ensure_valid_at(&self, now_nanos: u64) -> Result<(), DelegationError> {
        if self.delegations.is_empty() {
            return Err(DelegationError::EmptyChain);
        }
        if self.is_expired_at(now_nanos) {
            return Err(DelegationError::Expired);
        }
        Ok(())
    }

    /// The principal the chain authenticates as.
    pub fn principal(&self) -> Principal {
        Principal::self_authenticating(&self.public_key)
    }

    /// Combines the chain with the session key it delegates to.
    ///
    /// The last link must delegate to `session_key`. Signatures are checked
    /// by the replica, not here.
    pub fn into_identity(
        self,
        session_key: &SessionKey,
        now_nanos: u64,
    ) -> Result<DelegatedIdentity, DelegationError> {
        self.ensure_valid_at(now_nanos)?;
        let delegated_to = self.delegations.last().map(|d| d.delegation.pubkey.as_slice());
        if delegated_to != Some(session_key.public_key()) {
            return Err(DelegationError::SessionKeyMismatch);
        }
        let inner = session_key.identity();
        Ok(DelegatedIdentity::new_unchecked(
            self.public_key,
            Box::new(ArcIdentity(inner)),
            self.delegations,
        ))
    }

    pub fn to_json(&self) -> JsonDelegationChain {
        JsonDelegationChain {
            delegations: self
                .delegations
                .iter()
                .map(|d| SignedJsonDelegation {
                    delegation: JsonDelegation {
                        expiration: format!("{:x}", d.delegation.expiration),
                        pubkey: hex::encode(&d.delegation.pubkey),
                        targets: d.delegation.targets.as_ref().map(|targets| {
                            targets.iter().map(|t| hex::encode(t.as_slice())).collect()
                        }),
                    },
                    signature: hex::encode(&d.signature),
                })
                .collect(),
            public_key: hex::encode(&self.public_key),
        }
    }
}

/// `BasicIdentity` is not `Clone`, so the session identity is shared.
struct ArcIdentity(std::sync::Arc<ic_agent::identity::BasicIdentity>);

impl ic_agent::Identity for ArcIdentity {
    fn sender(&self) -> Result<Principal, String> {
        self.0.sender()
    }

    fn public_key(&self) -> Option<Vec<u8>> {
        self.0.public_key()
    }

    fn sign(
        &self,
        content: &ic_agent::agent::EnvelopeContent,
    ) -> Result<ic_agent::Signature, String> {
        self.0.sign(content)
    }

    fn sign_delegation(&self, content: &Delegation) -> Result<ic_agent::Signature, String> {
        self.0.sign_delegation(content)
    }

    fn sign_arbitrary(&self, content: &[u8]) -> Result<ic_agent::Signature, String> {
        self.0.sign_arbitrary(content)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonDelegation {
    pub expiration: String,
    pub pubkey: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedJsonDelegation {
    pub delegation: JsonDelegation,
    pub signature: String,
}

impl SignedJsonDelegation {
    pub fn to_delegation(&self) -> Result<SignedDelegation, DelegationError> {
        let expiration = u64::from_str_radix(&self.delegation.expiration, 16).map_err(|err| {
            DelegationError::InvalidExpiration(self.delegation.expiration.clone(), err)
        })?;
        let pubkey = hex::decode(&self.delegation.pubkey)
            .map_err(|err| DelegationError::InvalidHex("pubkey", err))?;
        let targets = match &self.delegation.targets {
            None => None,
            Some(targets) => Some(
                targets
                    .iter()
                    .map(|t| {
                        let bytes = hex::decode(t)
                            .map_err(|err| DelegationError::InvalidHex("targets", err))?;
                        Principal::try_from_slice(&bytes)
                            .map_err(|err| DelegationError::InvalidTarget(t.clone(), err))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };
        let signature = hex::decode(&self.signature)
            .map_err(|err| DelegationError::InvalidHex("signature", err))?;

        Ok(SignedDelegation {
            delegation: Delegation {
                expiration,
                pubkey,
                targets,
            },
            signature,
        })
    }
}

/// The JSON form identity providers hand out and sessions are stored in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDelegationChain {
    pub delegations: Vec<SignedJsonDelegation>,
    pub public_key: String,
}

impl JsonDelegationChain {
    pub fn to_chain(&self) -> Result<DelegationChain, DelegationError> {
        let public_key = hex::decode(&self.public_key)
            .map_err(|err| DelegationError::InvalidHex("publicKey", err))?;
        let delegations = self
            .delegations
            .iter()
            .map(SignedJsonDelegation::to_delegation)
            .collect::<Result<Vec<_>, _>>()?;
        if delegations.is_empty() {
            return Err(DelegationError::EmptyChain);
        }
        Ok(DelegationChain {
            public_key,
            delegations,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ic_agent::Identity;

    pub(crate) fn chain_for(session_key: &SessionKey, expiration: u64) -> DelegationChain {
        DelegationChain::from_signed_delegation(
            SignedDelegation {
                delegation: Delegation {
                    pubkey: session_key.public_key().to_vec(),
                    expiration,
                    targets: None,
                },
                signature: vec![7; 64],
            },
            vec![0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00]
                .into_iter()
                .chain(std::iter::repeat(9).take(32))
                .collect(),
        )
    }

    #[test]
    fn json_round_trip_preserves_every_field() {
        let key = SessionKey::generate().unwrap();
        let mut chain = chain_for(&key, 0x1655f29d787c0000);
        chain.delegations[0].delegation.targets = Some(vec![Principal::from_slice(&[0, 0, 0, 0, 0, 32, 0, 3, 1, 1])]);

        let json = chain.to_json();
        assert_eq!(json.delegations[0].delegation.expiration, "1655f29d787c0000");
        assert_eq!(
            json.delegations[0].delegation.targets,
            Some(vec!["00000000002000030101".to_string()])
        );

        let restored = json.to_chain().unwrap();
        assert_eq!(restored.public_key, chain.public_key);
        assert_eq!(restored.expiration(), Some(0x1655f29d787c0000));
        assert_eq!(
            restored.delegations[0].delegation.targets,
            chain.delegations[0].delegation.targets
        );
        assert_eq!(restored.delegations[0].signature, vec![7; 64]);
    }

    #[test]
    fn expired_chain_cannot_become_an_identity() {
        let key = SessionKey::generate().unwrap();
        let chain = chain_for(&key, 1_000);
        assert!(matches!(
            chain.into_identity(&key, 2_000),
            Err(DelegationError::Expired)
        ));
    }

    #[test]
    fn chain_for_another_key_is_refused() {
        let key = SessionKey::generate().unwrap();
        let other = SessionKey::generate().unwrap();
        assert!(matches!(
            chain_for(&other, u64::MAX).into_identity(&key, 0),
            Err(DelegationError::SessionKeyMismatch)
        ));

        let stored = crate::identity::StoredSession::new(&key, &chain_for(&other, u64::MAX), None);
        assert!(matches!(
            stored.restore(0),
            Err(DelegationError::SessionKeyMismatch)
        ));
    }

    #[test]
    fn delegated_identity_acts_as_the_chain_root() {
        let key = SessionKey::generate().unwrap();
        let chain = chain_for(&key, u64::MAX);
        let principal = chain.principal();
        let identity = chain.into_identity(&key, 0).unwrap();
        assert_eq!(identity.sender().unwrap(), principal);
        assert_eq!(identity.delegation_chain().len(), 1);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let json: JsonDelegationChain = serde_json::from_str(
            r#"{"delegations":[{"delegation":{"expiration":"zz","pubkey":"00"},"signature":"00"}],"publicKey":"00"}"#,
        )
        .unwrap();
        assert!(matches!(
            json.to_chain(),
            Err(DelegationError::InvalidExpiration(..))
        ));

        let empty = JsonDelegationChain {
            delegations: vec![],
            public_key: "00".to_string(),
        };
        assert!(matches!(empty.to_chain(), Err(DelegationError::EmptyChain)));
    }
}
