use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchRootKeyError {
    #[error("Failed to fetch the root key of {0}")]
    AgentError(String, #[source] ic_agent::AgentError),
}
