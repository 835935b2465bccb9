use crate::config::directories::get_config_path;
use crate::config::model::network_descriptor::NetworkDescriptor;
use crate::error::config::ConfigError;
use crate::error::config::ConfigError::{
    InvalidProviderUrl, LoadConfigFailed, SaveConfigFailed,
};
use crate::json::{load_json_file, save_json_file};
use crate::security::level::{NormalizedSecurityLevel, SecurityLevelConfig};
use candid::Principal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "strike.json";
pub const DEFAULT_HOST: &str = "https://icp0.io";
pub const DEFAULT_PROVIDER_URL: &str = "https://identity.ic0.app";
pub const DEFAULT_APP_NAME: &str = "Strike";

/// Eight hours, the default lifetime of an identity-provider delegation.
pub const DEFAULT_MAX_TIME_TO_LIVE_NS: u64 = 8 * 60 * 60 * 1_000_000_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub host: String,
    pub dev: bool,
    pub auto_connect: bool,
    pub whitelist: Vec<Principal>,
    pub provider_url: String,
    pub derivation_origin: Option<String>,
    pub max_time_to_live: u64,
    pub siwb_canister_id: Option<Principal>,
    pub registry_canister_id: Option<Principal>,
    pub app_name: String,
    pub app_logo: Option<String>,
    pub relay_url: Option<Url>,
    pub connectors: Vec<String>,
    pub security_level: SecurityLevelConfig,
    pub trust: TrustListsConfig,
}

/// Static host lists used to classify websites and interstitials.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrustListsConfig {
    pub trusted_websites: Vec<String>,
    pub malicious_websites: Vec<String>,
    pub trusted_interstitials: Vec<String>,
    pub malicious_interstitials: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: DEFAULT_HOST.to_string(),
            dev: false,
            auto_connect: true,
            whitelist: vec![],
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            derivation_origin: None,
            max_time_to_live: DEFAULT_MAX_TIME_TO_LIVE_NS,
            siwb_canister_id: None,
            registry_canister_id: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            app_logo: None,
            relay_url: None,
            connectors: vec!["ii".to_string()],
            security_level: SecurityLevelConfig::default(),
            trust: TrustListsConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Loads the configuration from `path`, or from the per-user config
    /// directory when no path is given. Only an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
        let config = match path {
            Some(path) => load_json_file(path)
                .map_err(|err| LoadConfigFailed(Box::new(path.to_path_buf()), err))?,
            None => {
                let path = get_config_path()?;
                if path.exists() {
                    load_json_file(&path).map_err(|err| LoadConfigFailed(Box::new(path), err))?
                } else {
                    ClientConfig::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        save_json_file(path, self).map_err(|err| SaveConfigFailed(Box::new(path.to_path_buf()), err))
    }

    pub fn with_host(mut self, host: Option<String>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.network()?;
        self.provider_url()?;
        Ok(())
    }

    pub fn network(&self) -> Result<NetworkDescriptor, ConfigError> {
        NetworkDescriptor::from_host(&self.host)
    }

    pub fn provider_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.provider_url)
            .map_err(|err| InvalidProviderUrl(self.provider_url.clone(), err))
    }

    pub fn security_levels(&self) -> NormalizedSecurityLevel {
        self.security_level.normalize()
    }
}
