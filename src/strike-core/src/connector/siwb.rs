use crate::config::model::network_descriptor::NetworkDescriptor;
use crate::connector::actor::{Actor, AgentActor};
use crate::connector::session::SessionSlot;
use crate::connector::{
    ConnectOptions, Connector, ConnectorConfig, ConnectorKind, ConnectorMeta, DisconnectOptions,
};
use crate::error::connector::{ConnectError, CreateActorError, DisconnectError, InitError};
use crate::error::display_chain;
use crate::error::siwb::SiwbError;
use crate::identity::{now_nanos, IdentityHandle, StoredSession};
use crate::idl::ServiceInterface;
use crate::network::agent::build_anonymous_agent;
use crate::network::root_key::fetch_root_key_if_needed;
use crate::siwb::{sign_in, spawn_siwb_machine, SiwbCanister, SiwbHandle, SiwbIdentityService, SiwbRunner};
use crate::storage::{
    siwb_session_key, KeyValueStorage, KeyValueStorageExt, LAST_CONNECTED_WALLET_KEY,
};
use crate::wallet::{RelayTransport, WalletProviderKey};
use async_trait::async_trait;
use candid::Principal;
use slog::{debug, info, warn, Logger};
use std::sync::{Arc, Mutex};

/// Builds the identity canister client for a SIWB canister id.
#[async_trait]
pub trait SiwbServiceFactory: Send + Sync {
    async fn service(
        &self,
        canister_id: Principal,
    ) -> Result<Arc<dyn SiwbIdentityService>, String>;
}

/// [`SiwbCanister`] over an anonymous agent.
pub struct AgentSiwbServiceFactory {
    network: NetworkDescriptor,
}

impl AgentSiwbServiceFactory {
    pub fn new(network: NetworkDescriptor) -> Self {
        AgentSiwbServiceFactory { network }
    }
}

#[async_trait]
impl SiwbServiceFactory for AgentSiwbServiceFactory {
    async fn service(
        &self,
        canister_id: Principal,
    ) -> Result<Arc<dyn SiwbIdentityService>, String> {
        let agent = build_anonymous_agent(&self.network).map_err(|err| err.to_string())?;
        fetch_root_key_if_needed(&agent, &self.network)
            .await
            .map_err(|err| err.to_string())?;
        Ok(Arc::new(SiwbCanister::new(agent, canister_id)))
    }
}

/// A Bitcoin wallet signing in through SIWB. One machine runs per
/// identity canister; a later connect against the same canister reuses it.
pub struct SiwbConnector {
    key: WalletProviderKey,
    meta: ConnectorMeta,
    config: ConnectorConfig,
    transport: Arc<dyn RelayTransport>,
    services: Arc<dyn SiwbServiceFactory>,
    storage: Arc<dyn KeyValueStorage>,
    machine: Mutex<Option<(Principal, SiwbHandle)>>,
    slot: SessionSlot,
    logger: Logger,
}

impl SiwbConnector {
    pub fn new(
        key: WalletProviderKey,
        config: ConnectorConfig,
        transport: Arc<dyn RelayTransport>,
        services: Arc<dyn SiwbServiceFactory>,
        storage: Arc<dyn KeyValueStorage>,
        logger: Logger,
    ) -> Self {
        SiwbConnector {
            key,
            meta: ConnectorKind::Siwb(key).meta(),
            config,
            transport,
            services,
            storage,
            machine: Mutex::new(None),
            slot: SessionSlot::default(),
            logger,
        }
    }

    fn storage_key(&self) -> String {
        siwb_session_key(self.key.as_str())
    }

    /// The address of the last successful sign-in, if it is still stored.
    pub fn address(&self) -> Option<String> {
        self.storage
            .get_typed::<StoredSession>(&self.storage_key())
            .ok()
            .flatten()
            .and_then(|session| session.address)
    }

    async fn machine_for(&self, canister_id: Principal) -> Result<SiwbHandle, ConnectError> {
        if let Some((id, handle)) = self.machine.lock().unwrap().as_ref() {
            if *id == canister_id {
                return Ok(handle.clone());
            }
        }
        let service = self
            .services
            .service(canister_id)
            .await
            .map_err(ConnectError::ConnectFailed)?;
        let logger = self.logger.new(slog::o!("siwb" => self.key.as_str()));
        let runner = Arc::new(SiwbRunner::new(
            self.transport.clone(),
            service,
            self.storage.clone(),
            self.storage_key(),
            logger.clone(),
        ));
        let handle = spawn_siwb_machine(runner, logger);
        *self.machine.lock().unwrap() = Some((canister_id, handle.clone()));
        Ok(handle)
    }
}

/// Keeps the whole cause chain, since the top-level SIWB message alone rarely
/// says what the wallet or canister objected to.
impl From<SiwbError> for ConnectError {
    fn from(err: SiwbError) -> Self {
        ConnectError::ConnectFailed(display_chain(&err))
    }
}

#[async_trait]
impl Connector for SiwbConnector {
    fn meta(&self) -> &ConnectorMeta {
        &self.meta
    }

    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Siwb(self.key)
    }

    async fn init(&self) -> Result<(), InitError> {
        if !self.slot.mark_initialized() {
            return Ok(());
        }
        let stored: Option<StoredSession> = self
            .storage
            .get_typed(&self.storage_key())
            .map_err(|err| InitError::InitFailed {
                id: self.key.as_str().to_string(),
                message: err.to_string(),
            })?;
        if let Some(stored) = stored {
            match stored.restore(now_nanos()) {
                Ok(identity) => {
                    let expiration = stored
                        .delegation_chain
                        .to_chain()
                        .ok()
                        .and_then(|chain| chain.expiration());
                    self.slot.set(Arc::new(identity), expiration);
                    debug!(self.logger, "Restored SIWB session"; "address" => stored.address);
                }
                Err(err) => debug!(self.logger, "Dropping stored SIWB session: {}", err),
            }
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.slot.valid_identity().is_some()
    }

    async fn connect(&self, options: &ConnectOptions) -> Result<bool, ConnectError> {
        if !self.slot.is_initialized() {
            return Err(ConnectError::NotInitialized);
        }
        let canister_id = options
            .siwb_canister_id
            .or(self.config.siwb_canister_id)
            .ok_or_else(|| ConnectError::ConnectFailed("siwbCanisterId is required".to_string()))?;
        let handle = self.machine_for(canister_id).await?;
        let (identity, address) = sign_in(&handle, self.key, &self.logger).await?;
        let expiration = handle
            .snapshot()
            .context
            .delegation_chain
            .and_then(|chain| chain.expiration());

        if let Err(err) = self
            .storage
            .set_string(LAST_CONNECTED_WALLET_KEY, self.key.as_str())
        {
            warn!(self.logger, "Failed to remember the wallet: {}", err);
        }
        self.slot.set(identity, expiration);
        info!(self.logger, "Connected"; "connector" => self.key.as_str(), "address" => address);
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
    use crate::storage::MemoryStorage;
    use crate::testing::{logger, FakeRelay, FakeSiwbService, FakeSiwbServices};
    use crate::wallet::RelayMethod;
    use serde_json::json;

    const ADDRESS: &str = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq";

    fn connector(
        siwb_canister_id: Option<Principal>,
        service: Arc<FakeSiwbService>,
        storage: Arc<MemoryStorage>,
    ) -> SiwbConnector {
        let relay = Arc::new(FakeRelay::default());
        relay.respond(RelayMethod::RequestAccounts, json!([ADDRESS]));
        relay.respond(RelayMethod::GetNetwork, json!("livenet"));
        relay.respond(RelayMethod::SignMessage, json!("c2lnbmF0dXJl"));
        relay.respond(RelayMethod::GetPublicKey, json!("02abcdef"));
        let config = ConnectorConfig::from_client_config(&ClientConfig {
            siwb_canister_id,
            ..Default::default()
        })
        .unwrap();
        SiwbConnector::new(
            WalletProviderKey::Unisat,
            config,
            relay,
            Arc::new(FakeSiwbServices(service)),
            storage,
            logger(),
        )
    }

    #[tokio::test]
    async fn connect_requires_a_siwb_canister() {
        let siwb = connector(
            None,
            Arc::new(FakeSiwbService::default()),
            Arc::new(MemoryStorage::default()),
        );
        siwb.init().await.unwrap();
        assert_eq!(
            siwb.connect(&ConnectOptions::default()).await,
            Err(ConnectError::ConnectFailed("siwbCanisterId is required".to_string()))
        );
        assert_eq!(siwb.disconnect(&DisconnectOptions::default()).await, Ok(true));
    }

    #[tokio::test]
    async fn connect_adopts_the_delegated_identity() {
        let storage = Arc::new(MemoryStorage::default());
        let service = Arc::new(FakeSiwbService::default());
        let siwb = connector(None, service.clone(), storage.clone());
        siwb.init().await.unwrap();

        let options = ConnectOptions {
            siwb_canister_id: Some(Principal::from_text("aaaaa-aa").unwrap()),
        };
        assert_eq!(siwb.connect(&options).await, Ok(true));
        assert_eq!(
            siwb.principal(),
            Some(Principal::self_authenticating(service.user_canister_pubkey()))
        );
        assert_eq!(siwb.address().as_deref(), Some(ADDRESS));
        assert_eq!(
            storage.get_string(LAST_CONNECTED_WALLET_KEY).unwrap().as_deref(),
            Some("unisat")
        );

        let restarted = connector(None, service, storage);
        restarted.init().await.unwrap();
        assert!(restarted.is_connected().await);
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_the_connector_disconnected() {
        let service = Arc::new(FakeSiwbService::default());
        service.reject_prepare("Address not allowed");
        let siwb = connector(
            Some(Principal::from_text("aaaaa-aa").unwrap()),
            service,
            Arc::new(MemoryStorage::default()),
        );
        siwb.init().await.unwrap();
        let result = siwb.connect(&ConnectOptions::default()).await;
        assert!(matches!(
            result,
            Err(ConnectError::ConnectFailed(message)) if message.contains("Address not allowed")
        ));
        assert!(!siwb.is_connected().await);
        assert_eq!(siwb.disconnect(&DisconnectOptions::default()).await, Ok(true));
    }
}
