use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Connector has not been initialized")]
    NotInitialized,

    #[error("Wallet is not installed")]
    NotInstalled,

    #[error("Failed to connect: {0}")]
    ConnectFailed(String),

    #[error("Wallet is locked")]
    IsLocked,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisconnectError {
    #[error("Connector has not been initialized")]
    NotInitialized,

    #[error("Failed to disconnect: {0}")]
    DisconnectFailed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateActorError {
    #[error("Failed to fetch the root key: {0}")]
    FetchRootKeyFailed(String),

    #[error("Failed to create the actor: {0}")]
    CreateActorFailed(String),

    #[error("Connector has not been initialized")]
    NotInitialized,

    #[error("This wallet does not support calls to local replicas")]
    LocalActorsNotSupported,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("Failed to initialize connector '{id}': {message}")]
    InitFailed { id: String, message: String },
}

#[derive(Error, Debug)]
pub enum ActorCallError {
    #[error("Method '{0}' is not part of the interface")]
    MethodNotFound(String),

    #[error("Failed to encode arguments for '{0}'")]
    EncodeArgsFailed(String, #[source] candid::Error),

    #[error("Call to '{0}' failed")]
    CallFailed(String, #[source] ic_agent::AgentError),

    #[error("Failed to decode the result of '{0}'")]
    DecodeResultFailed(String, #[source] candid::Error),
}
