use crate::connector::actor::{Actor, AgentActor};
use crate::connector::session::SessionSlot;
use crate::connector::{
    ConnectOptions, Connector, ConnectorConfig, ConnectorKind, ConnectorMeta, DisconnectOptions,
    PLUG_ID,
};
use crate::environment::Environment;
use crate::error::connector::{ConnectError, CreateActorError, DisconnectError, InitError};
use crate::error::wallet::RelayError;
use crate::identity::delegation::JsonDelegationChain;
use crate::identity::{now_nanos, IdentityHandle, SessionKey, StoredSession};
use crate::idl::ServiceInterface;
use crate::storage::{
    ic_session_key, KeyValueStorage, KeyValueStorageExt, LAST_CONNECTED_WALLET_KEY,
};
use crate::wallet::relay::interpret_response;
use crate::wallet::{RelayMethod, RelayRequest, RelayTransport};
use async_trait::async_trait;
use candid::Principal;
use serde::Deserialize;
use serde_json::json;
use slog::{debug, info, warn, Logger};
use std::sync::Arc;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectResponse {
    delegation_chain: JsonDelegationChain,
}

/// Plug, reached through the extension bridge. The wallet authorises a
/// session key for the whitelisted canisters.
pub struct PlugConnector {
    meta: ConnectorMeta,
    config: ConnectorConfig,
    transport: Option<Arc<dyn RelayTransport>>,
    storage: Arc<dyn KeyValueStorage>,
    slot: SessionSlot,
    logger: Logger,
}

impl PlugConnector {
    /// The bridge is only used when the environment says it exists.
    pub fn new(
        config: ConnectorConfig,
        environment: &Environment,
        transport: Option<Arc<dyn RelayTransport>>,
        storage: Arc<dyn KeyValueStorage>,
        logger: Logger,
    ) -> Self {
        PlugConnector {
            meta: ConnectorKind::Plug.meta(),
            config,
            transport: transport.filter(|_| environment.has_global_wallet_bridge),
            storage,
            slot: SessionSlot::default(),
            logger,
        }
    }

    async fn request_connect(
        &self,
        transport: &dyn RelayTransport,
        session_key: &SessionKey,
    ) -> Result<JsonDelegationChain, ConnectError> {
        let whitelist: Vec<String> = self.config.whitelist.iter().map(Principal::to_text).collect();
        let request = RelayRequest {
            method: RelayMethod::RequestConnect,
            wallet: PLUG_ID.to_string(),
            payload: json!({
                "whitelist": whitelist,
                "host": self.config.network.url.as_str(),
                "sessionPublicKey": hex::encode(session_key.public_key()),
            }),
        };
        let response = transport
            .send(request)
            .await
            .and_then(interpret_response)
            .map_err(|err| match err {
                RelayError::Wallet(message) if message.to_lowercase().contains("locked") => {
                    ConnectError::IsLocked
                }
                other => ConnectError::ConnectFailed(other.to_string()),
            })?;
        let response: ConnectResponse = serde_json::from_value(response)
            .map_err(|err| ConnectError::ConnectFailed(err.to_string()))?;
        Ok(response.delegation_chain)
    }
}

#[async_trait]
impl Connector for PlugConnector {
    fn meta(&self) -> &ConnectorMeta {
        &self.meta
    }

    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Plug
    }

    async fn init(&self) -> Result<(), InitError> {
        if !self.slot.mark_initialized() || self.transport.is_none() {
            return Ok(());
        }
        let key = ic_session_key(PLUG_ID);
        let stored: Option<StoredSession> =
            self.storage
                .get_typed(&key)
                .map_err(|err| InitError::InitFailed {
                    id: PLUG_ID.to_string(),
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
                    debug!(self.logger, "Restored Plug session");
                }
                Err(err) => debug!(self.logger, "Dropping stored Plug session: {}", err),
            }
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.transport.is_some() && self.slot.valid_identity().is_some()
    }

    async fn connect(&self, _options: &ConnectOptions) -> Result<bool, ConnectError> {
        let transport = self.transport.as_ref().ok_or(ConnectError::NotInstalled)?;
        if !self.slot.is_initialized() {
            return Err(ConnectError::NotInitialized);
        }
        let session_key =
            SessionKey::generate().map_err(|err| ConnectError::ConnectFailed(err.to_string()))?;
        let chain = self
            .request_connect(transport.as_ref(), &session_key)
            .await?
            .to_chain()
            .map_err(|err| ConnectError::ConnectFailed(err.to_string()))?;

        let expiration = chain.expiration();
        let session = StoredSession::new(&session_key, &chain, None);
        let identity = chain
            .into_identity(&session_key, now_nanos())
            .map_err(|err| ConnectError::ConnectFailed(err.to_string()))?;
        if let Err(err) = self.storage.set_typed(&ic_session_key(PLUG_ID), &session) {
            warn!(self.logger, "Failed to persist the Plug session: {}", err);
        }
        if let Err(err) = self.storage.set_string(LAST_CONNECTED_WALLET_KEY, PLUG_ID) {
            warn!(self.logger, "Failed to remember the wallet: {}", err);
        }
        self.slot.set(Arc::new(identity), expiration);
        info!(self.logger, "Connected"; "connector" => PLUG_ID);
        Ok(true)
    }

    async fn disconnect(&self, options: &DisconnectOptions) -> Result<bool, DisconnectError> {
        self.slot.clear();
        if !options.keep_session {
            self.storage
                .remove(&ic_session_key(PLUG_ID))
                .map_err(|err| DisconnectError::DisconnectFailed(err.to_string()))?;
        }
        Ok(true)
    }

    async fn create_actor(
        &self,
        canister_id: Principal,
        interface: ServiceInterface,
    ) -> Result<Arc<dyn Actor>, CreateActorError> {
        if self.config.network.is_local() {
            return Err(CreateActorError::LocalActorsNotSupported);
        }
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
    use crate::testing::{json_chain_for, logger, FakeRelay};

    fn config(host: &str) -> ConnectorConfig {
        ConnectorConfig::from_client_config(&ClientConfig {
            host: host.to_string(),
            whitelist: vec![Principal::from_text("ryjl3-tyaaa-aaaaa-aaaba-cai").unwrap()],
            ..Default::default()
        })
        .unwrap()
    }

    fn plug(host: &str, bridge: bool, relay: Arc<FakeRelay>) -> PlugConnector {
        PlugConnector::new(
            config(host),
            &Environment::new().with_wallet_bridge(bridge),
            Some(relay),
            Arc::new(MemoryStorage::default()),
            logger(),
        )
    }

    #[tokio::test]
    async fn without_a_bridge_plug_is_not_installed() {
        let plug = plug("https://icp0.io", false, Arc::new(FakeRelay::default()));
        plug.init().await.unwrap();
        assert_eq!(
            plug.connect(&ConnectOptions::default()).await,
            Err(ConnectError::NotInstalled)
        );
        assert_eq!(plug.disconnect(&DisconnectOptions::default()).await, Ok(true));
    }

    #[tokio::test]
    async fn locked_wallet_is_reported() {
        let relay = Arc::new(FakeRelay::default());
        relay.respond(
            RelayMethod::RequestConnect,
            json!({ "error": "The wallet is locked" }),
        );
        let plug = plug("https://icp0.io", true, relay);
        plug.init().await.unwrap();
        assert_eq!(
            plug.connect(&ConnectOptions::default()).await,
            Err(ConnectError::IsLocked)
        );
    }

    #[tokio::test]
    async fn connect_sends_whitelist_and_host() {
        let relay = Arc::new(FakeRelay::default());
        relay.respond_with(RelayMethod::RequestConnect, |payload| {
            let key = hex::decode(payload["sessionPublicKey"].as_str().unwrap()).unwrap();
            json!({ "delegationChain": json_chain_for(&key) })
        });
        let plug = plug("https://icp0.io", true, relay.clone());
        plug.init().await.unwrap();
        assert_eq!(plug.connect(&ConnectOptions::default()).await, Ok(true));
        assert!(plug.is_connected().await);

        let request = relay.requests().pop().unwrap();
        assert_eq!(request.wallet, "ic.plug");
        assert_eq!(request.payload["whitelist"], json!(["ryjl3-tyaaa-aaaaa-aaaba-cai"]));
        assert_eq!(request.payload["host"], json!("https://icp0.io/"));
    }

    #[tokio::test]
    async fn chain_for_a_foreign_key_is_not_adopted() {
        let relay = Arc::new(FakeRelay::default());
        let foreign = SessionKey::generate().unwrap();
        relay.respond(
            RelayMethod::RequestConnect,
            json!({ "delegationChain": json_chain_for(foreign.public_key()) }),
        );
        let plug = plug("https://icp0.io", true, relay);
        plug.init().await.unwrap();
        assert!(matches!(
            plug.connect(&ConnectOptions::default()).await,
            Err(ConnectError::ConnectFailed(message)) if message.contains("session key")
        ));
        assert!(!plug.is_connected().await);
    }

    #[tokio::test]
    async fn local_replicas_are_refused() {
        let plug = plug("http://127.0.0.1:4943", true, Arc::new(FakeRelay::default()));
        let result = plug
            .create_actor(Principal::anonymous(), ServiceInterface::new())
            .await;
        assert!(matches!(result, Err(CreateActorError::LocalActorsNotSupported)));
    }
}
