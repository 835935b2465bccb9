use crate::error::config::ConfigError;
use crate::error::root_key::FetchRootKeyError;
use crate::error::storage::StorageError;
use ic_agent::AgentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to open storage")]
    OpenStorageFailed(#[source] StorageError),

    #[error("Connector '{0}' needs an identity provider login, but none was supplied")]
    LoginUnavailable(String),

    #[error("Connector '{0}' needs a wallet relay, but none is configured")]
    RelayUnavailable(String),

    #[error("Failed to build an agent")]
    BuildAgentFailed(#[source] AgentError),

    #[error(transparent)]
    FetchRootKeyFailed(#[from] FetchRootKeyError),
}
