use crate::config::model::network_descriptor::NetworkDescriptor;
use crate::error::root_key::FetchRootKeyError;
use ic_agent::Agent;

/// Non-mainnet replicas sign with a root key the agent does not know yet.
pub async fn fetch_root_key_if_needed(
    agent: &Agent,
    network: &NetworkDescriptor,
) -> Result<(), FetchRootKeyError> {
    if !network.is_ic {
        agent
            .fetch_root_key()
            .await
            .map_err(|err| FetchRootKeyError::AgentError(network.url.to_string(), err))?;
    }
    Ok(())
}
