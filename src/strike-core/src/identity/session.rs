use crate::error::delegation::DelegationError;
use crate::identity::delegation::{DelegationChain, JsonDelegationChain};
use crate::identity::session_key::SessionKey;
use ic_agent::identity::DelegatedIdentity;
use serde::{Deserialize, Serialize};

/// What a connector persists after a successful login, so that a restart can
/// pick the session back up until the delegation expires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub session_key: String,
    pub delegation_chain: JsonDelegationChain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl StoredSession {
    pub fn new(session_key: &SessionKey, chain: &DelegationChain, address: Option<String>) -> Self {
        StoredSession {
            session_key: session_key.pem().to_string(),
            delegation_chain: chain.to_json(),
            address,
        }
    }

    /// Rebuilds the delegated identity, failing once the chain has expired.
    pub fn restore(&self, now_nanos: u64) -> Result<DelegatedIdentity, DelegationError> {
        let session_key = SessionKey::from_pem(&self.session_key)?;
        let chain = self.delegation_chain.to_chain()?;
        chain.into_identity(&session_key, now_nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::delegation::tests::chain_for;
    use ic_agent::Identity;

    #[test]
    fn restore_yields_the_same_principal() {
        let key = SessionKey::generate().unwrap();
        let chain = chain_for(&key, 10_000);
        let expected = chain.principal();
        let stored = StoredSession::new(&key, &chain, Some("bc1qexample".to_string()));

        let json = serde_json::to_value(&stored).unwrap();
        assert!(json.get("sessionKey").is_some());
        assert!(json.get("delegationChain").is_some());

        let stored: StoredSession = serde_json::from_value(json).unwrap();
        let identity = stored.restore(5_000).unwrap();
        assert_eq!(identity.sender().unwrap(), expected);
        assert!(matches!(stored.restore(20_000), Err(DelegationError::Expired)));
    }
}
