//! One uniform wrapper per wallet or identity provider.
//!
//! Every connector kind is selected from configuration by id; nothing is
//! detected at runtime. Connect, disconnect and actor creation report typed
//! errors as values so that callers can recover locally.
use crate::config::model::client_config::ClientConfig;
use crate::config::model::network_descriptor::NetworkDescriptor;
use crate::error::config::ConfigError;
use crate::error::connector::{ConnectError, CreateActorError, DisconnectError, InitError};
use crate::identity::{principal_of, IdentityHandle};
use crate::idl::ServiceInterface;
use crate::wallet::WalletProviderKey;
use async_trait::async_trait;
use candid::Principal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

pub mod actor;
pub mod identity_provider;
pub mod plug;
pub(crate) mod session;
pub mod siwb;

pub use actor::{Actor, AgentActor};
pub use identity_provider::{
    AuthorizeRequest, IdentityProviderConnector, IdentityProviderLogin,
};
pub use plug::PlugConnector;
pub use siwb::{AgentSiwbServiceFactory, SiwbConnector, SiwbServiceFactory};

pub const INTERNET_IDENTITY_ID: &str = "ii";
pub const NFID_ID: &str = "nfid";
pub const PLUG_ID: &str = "ic.plug";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectorKind {
    InternetIdentity,
    Nfid,
    Plug,
    Siwb(WalletProviderKey),
}

impl ConnectorKind {
    pub fn id(&self) -> &'static str {
        match self {
            ConnectorKind::InternetIdentity => INTERNET_IDENTITY_ID,
            ConnectorKind::Nfid => NFID_ID,
            ConnectorKind::Plug => PLUG_ID,
            ConnectorKind::Siwb(key) => key.as_str(),
        }
    }

    pub fn meta(&self) -> ConnectorMeta {
        let (name, features, link) = match self {
            ConnectorKind::InternetIdentity => (
                "Internet Identity",
                vec![],
                Some("https://identity.ic0.app"),
            ),
            ConnectorKind::Nfid => ("NFID", vec![], Some("https://nfid.one")),
            ConnectorKind::Plug => ("Plug Wallet", vec!["wallet"], Some("https://plugwallet.ooo")),
            ConnectorKind::Siwb(key) => (key.display_name(), vec!["bitcoin", "wallet"], None),
        };
        ConnectorMeta {
            id: self.id().to_string(),
            name: name.to_string(),
            features: features.into_iter().map(str::to_string).collect(),
            link: link.map(str::to_string),
        }
    }
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ConnectorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            INTERNET_IDENTITY_ID => Ok(ConnectorKind::InternetIdentity),
            NFID_ID => Ok(ConnectorKind::Nfid),
            PLUG_ID | "plug" => Ok(ConnectorKind::Plug),
            other => other
                .parse::<WalletProviderKey>()
                .map(ConnectorKind::Siwb)
                .map_err(|_| ConfigError::UnknownConnector(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectorMeta {
    pub id: String,
    pub name: String,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Static settings every connector is built with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub network: NetworkDescriptor,
    pub whitelist: Vec<Principal>,
    pub provider_url: Url,
    pub derivation_origin: Option<String>,
    pub max_time_to_live: u64,
    pub app_name: String,
    pub app_logo: Option<String>,
    pub siwb_canister_id: Option<Principal>,
}

impl ConnectorConfig {
    pub fn from_client_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(ConnectorConfig {
            network: config.network()?,
            whitelist: config.whitelist.clone(),
            provider_url: config.provider_url()?,
            derivation_origin: config.derivation_origin.clone(),
            max_time_to_live: config.max_time_to_live,
            app_name: config.app_name.clone(),
            app_logo: config.app_logo.clone(),
            siwb_canister_id: config.siwb_canister_id,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Overrides the configured SIWB identity canister.
    pub siwb_canister_id: Option<Principal>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisconnectOptions {
    /// Keep the persisted session so a later start can restore it.
    pub keep_session: bool,
}

#[async_trait]
pub trait Connector: Send + Sync {
    fn meta(&self) -> &ConnectorMeta;

    fn kind(&self) -> ConnectorKind;

    fn id(&self) -> &str {
        &self.meta().id
    }

    /// Idempotent. Restores a persisted session that is still valid.
    async fn init(&self) -> Result<(), InitError>;

    /// Cached identity first, then verified against its expiration.
    async fn is_connected(&self) -> bool;

    async fn connect(&self, options: &ConnectOptions) -> Result<bool, ConnectError>;

    /// Disconnecting a connector that is not connected succeeds.
    async fn disconnect(&self, options: &DisconnectOptions) -> Result<bool, DisconnectError>;

    async fn create_actor(
        &self,
        canister_id: Principal,
        interface: ServiceInterface,
    ) -> Result<Arc<dyn Actor>, CreateActorError>;

    fn identity(&self) -> Option<IdentityHandle>;

    fn principal(&self) -> Option<Principal> {
        self.identity().and_then(|identity| principal_of(identity.as_ref()))
    }
}
