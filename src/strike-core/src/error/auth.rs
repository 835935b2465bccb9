use crate::error::connector::{ConnectError, DisconnectError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No provider was selected and none was used before")]
    NoProviderSelected,

    #[error("Unknown provider '{0}'")]
    UnknownProvider(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Disconnect(#[from] DisconnectError),

    #[error("Provider '{0}' connected without an identity")]
    MissingIdentity(String),

    #[error("Connection was cancelled")]
    Cancelled,

    #[error("The authentication machine stopped")]
    MachineStopped,

    #[error("Authentication aborted: {0}")]
    Aborted(String),
}
