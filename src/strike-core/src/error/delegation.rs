use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionKeyError {
    #[error("Failed to generate a session key")]
    GenerateFailed(#[source] ring::error::Unspecified),

    #[error("Failed to load the session key")]
    LoadFailed(#[source] ic_agent::identity::PemError),

    #[error("Session key has no public key")]
    MissingPublicKey,
}

#[derive(Error, Debug)]
pub enum DelegationError {
    #[error("Invalid delegation. This delegation has expired. Please request a fresh delegation and try again")]
    Expired,

    #[error("Delegation chain is empty")]
    EmptyChain,

    #[error("Delegation chain does not delegate to this session key")]
    SessionKeyMismatch,

    #[error("Invalid expiration '{0}'")]
    InvalidExpiration(String, #[source] std::num::ParseIntError),

    #[error("Invalid hex in delegation field '{0}'")]
    InvalidHex(&'static str, #[source] hex::FromHexError),

    #[error("Invalid target principal '{0}'")]
    InvalidTarget(String, #[source] candid::types::principal::PrincipalError),

    #[error(transparent)]
    SessionKey(#[from] SessionKeyError),
}
