use ic_agent::AgentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to encode arguments for '{0}'")]
    EncodeFailed(&'static str, #[source] candid::Error),

    #[error("Call to '{0}' failed")]
    CallFailed(&'static str, #[source] AgentError),

    #[error("Failed to decode the response of '{0}'")]
    DecodeFailed(&'static str, #[source] candid::Error),

    #[error("The registry rejected '{0}': {1}")]
    Rejected(&'static str, String),
}
