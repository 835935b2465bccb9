use crate::error::reqwest::WrappedReqwestError;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ResolveActionError {
    #[error("'{0}' is not a valid url")]
    InvalidUrl(String, #[source] url::ParseError),

    #[error("Failed to fetch {0}")]
    FetchFailed(Url, #[source] WrappedReqwestError),

    #[error("Failed to parse the response of {0}")]
    ParseFailed(Url, #[source] WrappedReqwestError),

    #[error("No rule in {0} matches the page")]
    NoMatchingRule(Url),

    #[error("Invalid action at {0}")]
    InvalidAction(Url, #[source] InvalidActionError),

    #[error("Failed to build the HTTP client")]
    ClientFailed(#[source] WrappedReqwestError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidActionError {
    #[error("Action '{action}' declares parameter '{name}' more than once")]
    DuplicateParameter { action: String, name: String },

    #[error("Action '{0}' has no method")]
    MissingMethod(String),
}

/// Staged input that cannot be submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{0}' is required")]
    Required(String),

    #[error("'{name}' does not match the expected format{}", .description.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    PatternMismatch {
        name: String,
        description: Option<String>,
    },

    #[error("'{name}' must be at least {min}")]
    BelowMin { name: String, min: String },

    #[error("'{name}' must be at most {max}")]
    AboveMax { name: String, max: String },

    #[error("'{value}' is not an option of '{name}'")]
    InvalidOption { name: String, value: String },

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),
}

/// Failures obtaining the invocation payload of a linked action.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Invalid action link '{0}'")]
    InvalidHref(String, #[source] url::ParseError),

    #[error("Failed to post to {0}")]
    PostFailed(Url, #[source] WrappedReqwestError),

    #[error("{0}")]
    Rejected(String),

    #[error("Transaction data missing: {0}")]
    DecodeFailed(String),
}
