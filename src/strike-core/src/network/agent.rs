use crate::config::model::network_descriptor::NetworkDescriptor;
use crate::identity::IdentityHandle;
use ic_agent::identity::AnonymousIdentity;
use ic_agent::{Agent, AgentError};
use std::sync::Arc;

pub fn build_agent(
    network: &NetworkDescriptor,
    identity: IdentityHandle,
) -> Result<Agent, AgentError> {
    Agent::builder()
        .with_url(network.url.as_str())
        .with_arc_identity(identity)
        .build()
}

pub fn build_anonymous_agent(network: &NetworkDescriptor) -> Result<Agent, AgentError> {
    build_agent(network, Arc::new(AnonymousIdentity))
}
