use crate::lib::error::StrikeResult;
use crate::lib::login::TerminalLogin;
use anyhow::Context;
use slog::Logger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strike_core::client::{create_client, Client, ClientOptions};
use strike_core::config::directories::{get_config_path, get_storage_directory};
use strike_core::config::model::client_config::ClientConfig;
use strike_core::environment::Environment as HostEnvironment;

pub trait Environment: Send + Sync {
    fn get_logger(&self) -> &Logger;
    fn get_config(&self) -> &ClientConfig;

    /// Where `config` was (or would be) read from.
    fn get_config_path(&self) -> &Path;
    fn get_storage_dir(&self) -> &Path;
    fn get_verbose_level(&self) -> i64;

    /// A client over the durable session store, prompting on the terminal
    /// for identity-provider logins.
    fn new_client(&self) -> StrikeResult<Arc<Client>> {
        let host = HostEnvironment::new()
            .with_wallet_bridge(self.get_config().relay_url.is_some())
            .with_storage_dir(Some(self.get_storage_dir().to_path_buf()));
        let options = ClientOptions::new(self.get_config().clone(), self.get_logger().clone())
            .with_environment(host)
            .with_login(Arc::new(TerminalLogin::new(self.get_logger().clone())));
        let client = create_client(options).context("Failed to create the wallet client.")?;
        Ok(Arc::new(client))
    }
}

pub struct EnvironmentImpl {
    logger: Logger,
    config: ClientConfig,
    config_path: PathBuf,
    storage_dir: PathBuf,
    verbose_level: i64,
}

impl EnvironmentImpl {
    pub fn new(config_path: Option<PathBuf>, logger: Logger) -> StrikeResult<Self> {
        let config = ClientConfig::load(config_path.as_deref())?;
        let config_path = match config_path {
            Some(path) => path,
            None => get_config_path()?,
        };
        Ok(EnvironmentImpl {
            logger,
            config,
            config_path,
            storage_dir: get_storage_directory()?,
            verbose_level: 0,
        })
    }

    pub fn with_host(mut self, host: Option<String>) -> StrikeResult<Self> {
        self.config = self.config.with_host(host);
        self.config.validate()?;
        Ok(self)
    }

    pub fn with_storage_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.storage_dir = dir;
        }
        self
    }

    pub fn with_verbose_level(mut self, verbose_level: i64) -> Self {
        self.verbose_level = verbose_level;
        self
    }
}

impl Environment for EnvironmentImpl {
    fn get_logger(&self) -> &Logger {
        &self.logger
    }

    fn get_config(&self) -> &ClientConfig {
        &self.config
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    fn get_storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn get_verbose_level(&self) -> i64 {
        self.verbose_level
    }
}
