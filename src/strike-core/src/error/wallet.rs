use thiserror::Error;

/// Failures reported by the extension relay, either in transport or by the wallet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("{0}")]
    Wallet(String),

    #[error("Relay transport failed: {0}")]
    Transport(String),

    #[error("Relay is not available in this environment")]
    Unavailable,

    #[error("Unexpected response to '{method}': {reason}")]
    UnexpectedResponse { method: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Unknown address: {0}")]
    UnknownAddress(String),

    #[error("Connect Wallet first")]
    NotConnected,

    #[error("Address or network not found")]
    NoAccounts,

    #[error("User rejected request.")]
    UserRejected,

    #[error("Wallet Type: {address_type} not supported for sign message type: {sign_type}")]
    UnsupportedSignType {
        address_type: String,
        sign_type: String,
    },

    #[error("Unknown network '{0}'")]
    UnknownNetwork(String),

    #[error("Unknown wallet provider '{0}'")]
    UnknownProviderKey(String),
}
