//! The façade applications hold: connectors built from configuration, the
//! auth machine driving them, and read access to whoever is connected.
use crate::auth::{
    spawn_auth_machine, wait_for_connected, AuthEmission, AuthEvent, AuthHandle, AuthRunner,
    AuthSnapshot, AuthState, ConnectRequest,
};
use crate::config::model::client_config::ClientConfig;
use crate::config::model::network_descriptor::NetworkDescriptor;
use crate::connector::{
    Actor, AgentSiwbServiceFactory, Connector, ConnectorConfig, ConnectorKind, ConnectorMeta,
    IdentityProviderConnector, IdentityProviderLogin, PlugConnector, SiwbConnector,
    SiwbServiceFactory,
};
use crate::environment::Environment;
use crate::error::auth::AuthError;
use crate::error::client::ClientError;
use crate::error::connector::CreateActorError;
use crate::identity::IdentityHandle;
use crate::idl::ServiceInterface;
use crate::network::agent::{build_agent, build_anonymous_agent};
use crate::network::root_key::fetch_root_key_if_needed;
use crate::storage::{open_storage, KeyValueStorage};
use crate::wallet::{HttpRelayTransport, RelayTransport};
use candid::Principal;
use ic_agent::Agent;
use slog::{debug, Logger};
use std::sync::Arc;
use tokio::sync::watch;

/// Everything `create_client` needs besides the configuration. Seams left
/// empty are filled from the configuration and environment.
pub struct ClientOptions {
    pub config: ClientConfig,
    pub environment: Environment,
    pub storage: Option<Arc<dyn KeyValueStorage>>,
    pub relay: Option<Arc<dyn RelayTransport>>,
    pub login: Option<Arc<dyn IdentityProviderLogin>>,
    pub siwb_services: Option<Arc<dyn SiwbServiceFactory>>,
    /// Used instead of the configured connector list when not empty.
    pub connectors: Vec<Arc<dyn Connector>>,
    pub logger: Logger,
}

impl ClientOptions {
    pub fn new(config: ClientConfig, logger: Logger) -> Self {
        ClientOptions {
            config,
            environment: Environment::default(),
            storage: None,
            relay: None,
            login: None,
            siwb_services: None,
            connectors: vec![],
            logger,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_relay(mut self, relay: Arc<dyn RelayTransport>) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn with_login(mut self, login: Arc<dyn IdentityProviderLogin>) -> Self {
        self.login = Some(login);
        self
    }

    pub fn with_siwb_services(mut self, services: Arc<dyn SiwbServiceFactory>) -> Self {
        self.siwb_services = Some(services);
        self
    }

    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connectors.push(connector);
        self
    }
}

pub struct Client {
    config: ClientConfig,
    network: NetworkDescriptor,
    runner: Arc<AuthRunner>,
    handle: AuthHandle,
    logger: Logger,
}

pub fn create_client(options: ClientOptions) -> Result<Client, ClientError> {
    let ClientOptions {
        config,
        environment,
        storage,
        relay,
        login,
        siwb_services,
        connectors,
        logger,
    } = options;

    config.validate()?;
    let network = config.network()?;
    let storage = match storage {
        Some(storage) => storage,
        None => open_storage(environment.storage_dir.as_deref())
            .map_err(ClientError::OpenStorageFailed)?,
    };
    let relay: Option<Arc<dyn RelayTransport>> = relay.or_else(|| {
        config.relay_url.clone().map(|url| {
            Arc::new(HttpRelayTransport::new(url, logger.new(slog::o!("relay" => "http"))))
                as Arc<dyn RelayTransport>
        })
    });

    let connectors = if connectors.is_empty() {
        let connector_config = ConnectorConfig::from_client_config(&config)?;
        let siwb_services = siwb_services
            .unwrap_or_else(|| Arc::new(AgentSiwbServiceFactory::new(network.clone())));
        config
            .connectors
            .iter()
            .map(|id| {
                let kind: ConnectorKind = id.parse()?;
                let logger = logger.new(slog::o!("connector" => kind.id()));
                let connector: Arc<dyn Connector> = match kind {
                    ConnectorKind::InternetIdentity | ConnectorKind::Nfid => {
                        let login = login
                            .clone()
                            .ok_or_else(|| ClientError::LoginUnavailable(id.clone()))?;
                        if kind == ConnectorKind::Nfid {
                            Arc::new(IdentityProviderConnector::nfid(
                                connector_config.clone(),
                                login,
                                storage.clone(),
                                logger,
                            ))
                        } else {
                            Arc::new(IdentityProviderConnector::internet_identity(
                                connector_config.clone(),
                                login,
                                storage.clone(),
                                logger,
                            ))
                        }
                    }
                    ConnectorKind::Plug => Arc::new(PlugConnector::new(
                        connector_config.clone(),
                        &environment,
                        relay.clone(),
                        storage.clone(),
                        logger,
                    )),
                    ConnectorKind::Siwb(key) => {
                        let relay = relay
                            .clone()
                            .ok_or_else(|| ClientError::RelayUnavailable(id.clone()))?;
                        Arc::new(SiwbConnector::new(
                            key,
                            connector_config.clone(),
                            relay,
                            siwb_services.clone(),
                            storage.clone(),
                            logger,
                        ))
                    }
                };
                Ok(connector)
            })
            .collect::<Result<Vec<_>, ClientError>>()?
    } else {
        connectors
    };
    debug!(logger, "Creating client"; "connectors" => connectors.len(), "host" => %network.url);

    let runner = Arc::new(
        AuthRunner::new(connectors, storage, logger.new(slog::o!("machine" => "auth")))
            .with_session_resume(config.auto_connect),
    );
    let handle = spawn_auth_machine(runner.clone(), logger.new(slog::o!("machine" => "auth")));
    Ok(Client {
        config,
        network,
        runner,
        handle,
        logger,
    })
}

impl Client {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn network(&self) -> &NetworkDescriptor {
        &self.network
    }

    /// Resolves once every connector is initialised and a previous session,
    /// if any, has been resumed.
    pub async fn wait_until_ready(&self) -> Result<AuthSnapshot, AuthError> {
        self.handle
            .wait_for(|snapshot| snapshot.state != AuthState::Initializing)
            .await
            .map_err(|_| AuthError::MachineStopped)
    }

    /// Waits out any connect or disconnect in flight, since the machine
    /// ignores a new request until then.
    async fn wait_until_settled(&self) -> Result<AuthSnapshot, AuthError> {
        self.handle
            .wait_for(|snapshot| matches!(snapshot.state, AuthState::Idle | AuthState::Connected))
            .await
            .map_err(|_| AuthError::MachineStopped)
    }

    /// Fire and forget. Progress is visible through [`Client::watch`].
    pub fn connect(&self, request: ConnectRequest) -> Result<(), AuthError> {
        self.handle
            .send(AuthEvent::Connect(request))
            .map_err(|_| AuthError::MachineStopped)
    }

    /// Resolves with the connected provider and principal, or the error the
    /// machine emitted.
    pub async fn connect_async(
        &self,
        request: ConnectRequest,
    ) -> Result<(String, Principal), AuthError> {
        self.wait_until_settled().await?;
        let mut emissions = self.handle.subscribe();
        self.connect(request)?;
        wait_for_connected(&mut emissions, &self.logger).await
    }

    pub fn cancel_connect(&self) -> Result<(), AuthError> {
        self.handle
            .send(AuthEvent::CancelConnect)
            .map_err(|_| AuthError::MachineStopped)
    }

    pub fn disconnect(&self) -> Result<(), AuthError> {
        self.handle
            .send(AuthEvent::Disconnect)
            .map_err(|_| AuthError::MachineStopped)
    }

    /// Succeeds right away when nothing is connected.
    pub async fn disconnect_async(&self) -> Result<(), AuthError> {
        let snapshot = self.wait_until_settled().await?;
        if snapshot.state != AuthState::Connected {
            return Ok(());
        }
        let mut emissions = self.handle.subscribe();
        self.disconnect()?;
        loop {
            match emissions.recv().await {
                Ok(AuthEmission::Disconnected) => return Ok(()),
                Ok(_) | Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    return Err(AuthError::MachineStopped)
                }
            }
        }
    }

    pub fn providers(&self) -> Vec<ConnectorMeta> {
        self.runner
            .connectors()
            .iter()
            .map(|connector| connector.meta().clone())
            .collect()
    }

    pub fn provider(&self, id: &str) -> Option<Arc<dyn Connector>> {
        self.runner.connector(id)
    }

    /// The connector the auth machine last connected, while it stays connected.
    pub fn active_provider(&self) -> Option<Arc<dyn Connector>> {
        let snapshot = self.handle.snapshot();
        if snapshot.state != AuthState::Connected {
            return None;
        }
        snapshot
            .context
            .active_provider
            .and_then(|id| self.runner.connector(&id))
    }

    pub fn principal(&self) -> Option<Principal> {
        self.handle.snapshot().context.principal
    }

    pub fn status(&self) -> AuthState {
        self.handle.snapshot().state
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.handle.snapshot()
    }

    pub fn watch(&self) -> watch::Receiver<AuthSnapshot> {
        self.handle.watch()
    }

    pub fn identity(&self) -> Option<IdentityHandle> {
        self.active_provider()
            .and_then(|connector| connector.identity())
    }

    /// An agent for the connected identity, anonymous when nobody is connected.
    pub async fn agent(&self) -> Result<Agent, ClientError> {
        let agent = match self.identity() {
            Some(identity) => build_agent(&self.network, identity),
            None => build_anonymous_agent(&self.network),
        }
        .map_err(ClientError::BuildAgentFailed)?;
        fetch_root_key_if_needed(&agent, &self.network).await?;
        Ok(agent)
    }

    pub async fn create_actor(
        &self,
        canister_id: Principal,
        interface: ServiceInterface,
    ) -> Result<Arc<dyn Actor>, CreateActorError> {
        let connector = self
            .active_provider()
            .ok_or(CreateActorError::NotInitialized)?;
        connector.create_actor(canister_id, interface).await
    }
}
