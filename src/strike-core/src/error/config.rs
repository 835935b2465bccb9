use crate::error::structured_file::StructuredFileError;
use candid::types::principal::PrincipalError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot find home directory (is HOME set?)")]
    NoHomeInEnvironment,

    #[error("Failed to load configuration from {0}")]
    LoadConfigFailed(Box<PathBuf>, #[source] StructuredFileError),

    #[error("Failed to save configuration to {0}")]
    SaveConfigFailed(Box<PathBuf>, #[source] StructuredFileError),

    #[error("Invalid host url '{0}'")]
    InvalidHost(String, #[source] url::ParseError),

    #[error("Invalid provider url '{0}'")]
    InvalidProviderUrl(String, #[source] url::ParseError),

    #[error("Invalid canister id '{0}'")]
    InvalidCanisterId(String, #[source] PrincipalError),

    #[error("Unknown connector '{0}'")]
    UnknownConnector(String),
}
