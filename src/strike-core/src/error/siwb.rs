use crate::error::wallet::WalletError;
use thiserror::Error;

/// Failures talking to the SIWB identity canister.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SiwbServiceError {
    #[error("Call to '{method}' failed: {message}")]
    CallFailed { method: String, message: String },

    #[error("Failed to encode arguments for '{method}': {message}")]
    EncodeFailed { method: String, message: String },

    #[error("Failed to decode the response of '{method}': {message}")]
    DecodeFailed { method: String, message: String },

    #[error("{0}")]
    Rejected(String),
}

/// Why a SIWB run ended in `idle`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SiwbError {
    #[error("Failed to connect the wallet")]
    WalletDiscovery(#[source] WalletError),

    #[error("Failed to prepare the login challenge")]
    PrepareLoginFailed(#[source] SiwbServiceError),

    #[error("There is no login challenge to sign")]
    NoChallenge,

    #[error("Failed to sign the login challenge")]
    SignFailed(#[source] WalletError),

    #[error("Failed to generate a session key: {0}")]
    SessionKeyFailed(String),

    #[error("Failed to log in")]
    LoginFailed(#[source] SiwbServiceError),

    #[error("Failed to fetch the delegation")]
    GetDelegationFailed(#[source] SiwbServiceError),

    #[error("Failed to build the delegated identity: {0}")]
    IdentityFailed(String),

    #[error("Failed to persist the session: {0}")]
    PersistFailed(String),

    #[error("A sign-in is already in progress")]
    Busy,

    #[error("The SIWB machine stopped: {0}")]
    Aborted(String),
}
