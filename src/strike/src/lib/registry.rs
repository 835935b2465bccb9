use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use anyhow::{anyhow, Context};
use std::sync::Arc;
use strike_core::client::Client;
use strike_core::registry::{RegistryCanister, RegistryLookup};
use strike_core::security::{ActionsRegistry, SecurityGate};

/// The registry canister, called as whoever is connected (anonymous otherwise).
pub async fn registry_canister(
    env: &dyn Environment,
    client: &Client,
) -> StrikeResult<RegistryCanister> {
    let canister_id = env.get_config().registry_canister_id.ok_or_else(|| {
        anyhow!(
            "No registry canister configured. Set registryCanisterId in {}.",
            env.get_config_path().display()
        )
    })?;
    let agent = client.agent().await.context("Failed to build an agent.")?;
    Ok(RegistryCanister::new(
        agent,
        canister_id,
        env.get_logger().new(slog::o!("registry" => canister_id.to_text())),
    ))
}

/// Without a registry canister every action classifies as unknown.
pub async fn security_gate(env: &dyn Environment, client: &Client) -> StrikeResult<SecurityGate> {
    let lookup: Option<Arc<dyn RegistryLookup>> = match env.get_config().registry_canister_id {
        Some(_) => Some(Arc::new(registry_canister(env, client).await?)),
        None => None,
    };
    let registry = ActionsRegistry::new(
        lookup,
        env.get_config().trust.clone(),
        env.get_logger().clone(),
    );
    Ok(SecurityGate::new(
        Arc::new(registry),
        env.get_config().security_levels(),
    ))
}
