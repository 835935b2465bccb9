use crate::connector::actor::{Actor, AgentActor};
use crate::connector::session::SessionSlot;
use crate::connector::{
    ConnectOptions, Connector, ConnectorConfig, ConnectorKind, ConnectorMeta, DisconnectOptions,
};
use crate::error::connector::{ConnectError, CreateActorError, DisconnectError, InitError};
use crate::identity::delegation::JsonDelegationChain;
use crate::identity::{now_nanos, IdentityHandle, SessionKey, StoredSession};
use crate::idl::ServiceInterface;
use crate::storage::{
    ic_session_key, KeyValueStorage, KeyValueStorageExt, LAST_CONNECTED_WALLET_KEY,
};
use async_trait::async_trait;
use candid::Principal;
use slog::{debug, info, warn, Logger};
use std::sync::Arc;
use url::Url;

/// What the identity provider is asked to authorise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizeRequest {
    /// Page to send the user to, `#authorize` included.
    pub provider_url: Url,
    pub session_public_key: Vec<u8>,
    /// Nanoseconds.
    pub max_time_to_live: u64,
    pub derivation_origin: Option<String>,
}

/// The interactive half of an identity-provider login: a browser redirect,
/// or a prompt for the delegation the provider produced.
#[async_trait]
pub trait IdentityProviderLogin: Send + Sync {
    /// `Ok(None)` means the user closed the provider without logging in.
    async fn authorize(
        &self,
        request: AuthorizeRequest,
    ) -> Result<Option<JsonDelegationChain>, String>;
}

/// Internet Identity and NFID.
pub struct IdentityProviderConnector {
    kind: ConnectorKind,
    meta: ConnectorMeta,
    config: ConnectorConfig,
    login: Arc<dyn IdentityProviderLogin>,
    storage: Arc<dyn KeyValueStorage>,
    slot: SessionSlot,
    logger: Logger,
}

impl IdentityProviderConnector {
    pub fn internet_identity(
        config: ConnectorConfig,
        login: Arc<dyn IdentityProviderLogin>,
        storage: Arc<dyn KeyValueStorage>,
        logger: Logger,
    ) -> Self {
        Self::new(ConnectorKind::InternetIdentity, config, login, storage, logger)
    }

    pub fn nfid(
        config: ConnectorConfig,
        login: Arc<dyn IdentityProviderLogin>,
        storage: Arc<dyn KeyValueStorage>,
        logger: Logger,
    ) -> Self {
        Self::new(ConnectorKind::Nfid, config, login, storage, logger)
    }

    fn new(
        kind: ConnectorKind,
        config: ConnectorConfig,
        login: Arc<dyn IdentityProviderLogin>,
        storage: Arc<dyn KeyValueStorage>,
        logger: Logger,
    ) -> Self {
        IdentityProviderConnector {
            kind,
            meta: kind.meta(),
            config,
            login,
            storage,
            slot: SessionSlot::default(),
            logger,
        }
    }

    fn storage_key(&self) -> String {
        ic_session_key(self.kind.id())
    }

    /// NFID wants to know who is asking; Internet Identity does not.
    pub fn authorize_url(&self) -> Url {
        let mut url = self.config.provider_url.clone();
        if self.kind == ConnectorKind::Nfid {
            let mut query = url.query_pairs_mut();
            query.append_pair("applicationName", &self.config.app_name);
            if let Some(logo) = &self.config.app_logo {
                query.append_pair("applicationLogo", logo);
            }
        }
        url.set_fragment(Some("authorize"));
        url
    }

    fn restore(&self) -> Option<(IdentityHandle, Option<u64>)> {
        let key = self.storage_key();
        let stored: StoredSession = match self.storage.get_typed(&key) {
            Ok(stored) => stored?,
            Err(err) => {
                warn!(self.logger, "Ignoring unreadable session: {}", err);
                return None;
            }
        };
        let expiration = stored
            .delegation_chain
            .to_chain()
            .ok()
            .and_then(|chain| chain.expiration());
        match stored.restore(now_nanos()) {
            Ok(identity) => Some((Arc::new(identity), expiration)),
            Err(err) => {
                debug!(self.logger, "Dropping stored session: {}", err);
                if let Err(err) = self.storage.remove(&key) {
                    warn!(self.logger, "Failed to remove stale session: {}", err);
                }
                None
            }
        }
    }
}

#[async_trait]
impl Connector for IdentityProviderConnector {
    fn meta(&self) -> &ConnectorMeta {
        &self.meta
    }

    fn kind(&self) -> ConnectorKind {
        self.kind
    }

    async fn init(&self) -> Result<(), InitError> {
        if !self.slot.mark_initialized() {
            return Ok(());
        }
        if let Some((identity, expiration)) = self.restore() {
            debug!(self.logger, "Restored session"; "connector" => self.kind.id());
            self.slot.set(identity, expiration);
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.slot.valid_identity().is_some()
    }

    async fn connect(&self, _options: &ConnectOptions) -> Result<bool, ConnectError> {
        if !self.slot.is_initialized() {
            return Err(ConnectError::NotInitialized);
        }
        let session_key =
            SessionKey::generate().map_err(|err| ConnectError::ConnectFailed(err.to_string()))?;
        let request = AuthorizeRequest {
            provider_url: self.authorize_url(),
            session_public_key: session_key.public_key().to_vec(),
            max_time_to_live: self.config.max_time_to_live,
            derivation_origin: self.config.derivation_origin.clone(),
        };
        let chain = self
            .login
            .authorize(request)
            .await
            .map_err(ConnectError::ConnectFailed)?
            .ok_or_else(|| ConnectError::ConnectFailed("UserInterrupt".to_string()))?
            .to_chain()
            .map_err(|err| ConnectError::ConnectFailed(err.to_string()))?;

        let expiration = chain.expiration();
        let session = StoredSession::new(&session_key, &chain, None);
        let identity = chain
            .into_identity(&session_key, now_nanos())
            .map_err(|err| ConnectError::ConnectFailed(err.to_string()))?;
        let identity: IdentityHandle = Arc::new(identity);

        if let Err(err) = self.storage.set_typed(&self.storage_key(), &session) {
            warn!(self.logger, "Failed to persist the session: {}", err);
        }
        if let Err(err) = self
            .storage
            .set_string(LAST_CONNECTED_WALLET_KEY, self.kind.id())
        {
            warn!(self.logger, "Failed to remember the wallet: {}", err);
        }
        self.slot.set(identity, expiration);
        info!(self.logger, "Connected"; "connector" => self.kind.id(), "principal" => ?self.principal());
        Ok(true)
    }

    async fn disconnect(&self, options: &DisconnectOptions) -> Result<bool, DisconnectError> {
        self.slot.clear();
        if !options.keep_session {
            self.storage
                .remove(&self.storage_key())
                .map_err(|err| DisconnectError::DisconnectFailed(err.to_string()))?;
        }
        Ok(true)
    }

    async fn create_actor(
        &self,
        canister_id: Principal,
        interface: ServiceInterface,
    ) -> Result<Arc<dyn Actor>, CreateActorError> {
        let identity = self
            .slot
            .valid_identity()
            .ok_or(CreateActorError::NotInitialized)?;
        AgentActor::create(
            &self.config.network,
            identity,
            canister_id,
            interface,
            self.logger.clone(),
        )
        .await
    }

    fn identity(&self) -> Option<IdentityHandle> {
        self.slot.identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::client_config::ClientConfig;
    use crate::identity::delegation::tests::chain_for;
    use crate::storage::MemoryStorage;
    use crate::testing::{logger, FakeProviderLogin};

    fn connector(
        kind: ConnectorKind,
        login: Arc<FakeProviderLogin>,
        storage: Arc<MemoryStorage>,
    ) -> IdentityProviderConnector {
        let config = ConnectorConfig::from_client_config(&ClientConfig {
            app_logo: Some("https://example.com/logo.png".to_string()),
            provider_url: "https://nfid.one/authenticate/".to_string(),
            ..Default::default()
        })
        .unwrap();
        IdentityProviderConnector::new(kind, config, login, storage, logger())
    }

    #[tokio::test]
    async fn connect_requires_init() {
        let login = Arc::new(FakeProviderLogin::approving());
        let ii = connector(
            ConnectorKind::InternetIdentity,
            login,
            Arc::new(MemoryStorage::default()),
        );
        assert_eq!(
            ii.connect(&ConnectOptions::default()).await,
            Err(ConnectError::NotInitialized)
        );
        assert_eq!(ii.disconnect(&DisconnectOptions::default()).await, Ok(true));
    }

    #[tokio::test]
    async fn connect_persists_and_restores_the_session() {
        let login = Arc::new(FakeProviderLogin::approving());
        let storage = Arc::new(MemoryStorage::default());
        let ii = connector(ConnectorKind::InternetIdentity, login.clone(), storage.clone());
        ii.init().await.unwrap();
        assert!(!ii.is_connected().await);

        assert_eq!(ii.connect(&ConnectOptions::default()).await, Ok(true));
        assert!(ii.is_connected().await);
        let principal = ii.principal().unwrap();
        assert_eq!(
            storage.get_string(LAST_CONNECTED_WALLET_KEY).unwrap().as_deref(),
            Some("ii")
        );
        let request = login.requests().pop().unwrap();
        assert_eq!(request.provider_url.fragment(), Some("authorize"));

        let restarted = connector(ConnectorKind::InternetIdentity, login, storage.clone());
        restarted.init().await.unwrap();
        assert!(restarted.is_connected().await);
        assert_eq!(restarted.principal(), Some(principal));

        restarted.disconnect(&DisconnectOptions::default()).await.unwrap();
        assert!(!restarted.is_connected().await);
        assert!(storage.get("ic:ii").unwrap().is_none());
    }

    #[tokio::test]
    async fn disconnect_after_failed_connect_is_a_no_op() {
        let login = Arc::new(FakeProviderLogin::declining());
        let nfid = connector(ConnectorKind::Nfid, login, Arc::new(MemoryStorage::default()));
        nfid.init().await.unwrap();
        assert!(matches!(
            nfid.connect(&ConnectOptions::default()).await,
            Err(ConnectError::ConnectFailed(_))
        ));
        assert_eq!(nfid.disconnect(&DisconnectOptions::default()).await, Ok(true));
        assert!(nfid.identity().is_none());
    }

    #[test]
    fn nfid_url_names_the_application() {
        let nfid = connector(
            ConnectorKind::Nfid,
            Arc::new(FakeProviderLogin::approving()),
            Arc::new(MemoryStorage::default()),
        );
        assert_eq!(
            nfid.authorize_url().as_str(),
            "https://nfid.one/authenticate/?applicationName=Strike&applicationLogo=https%3A%2F%2Fexample.com%2Flogo.png#authorize"
        );
    }

    #[test]
    fn expired_sessions_are_not_restored() {
        let storage = Arc::new(MemoryStorage::default());
        let key = SessionKey::generate().unwrap();
        storage
            .set_typed("ic:ii", &StoredSession::new(&key, &chain_for(&key, 1), None))
            .unwrap();
        let ii = connector(
            ConnectorKind::InternetIdentity,
            Arc::new(FakeProviderLogin::approving()),
            storage.clone(),
        );
        assert!(ii.restore().is_none());
        assert!(storage.get("ic:ii").unwrap().is_none());
    }
}
