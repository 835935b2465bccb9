use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use crate::lib::registry::registry_canister;
use candid::Principal;
use clap::Parser;
use slog::info;
use strike_core::registry::{StrikeStatus, UpdateRegistryStatusParams};

/// Marks a registered canister trusted or blocked. Admins only.
#[derive(Parser)]
pub struct SetStatusOpts {
    canister_id: Principal,

    /// submitted, trusted or blocked.
    status: StrikeStatus,
}

pub async fn exec(env: &dyn Environment, opts: SetStatusOpts) -> StrikeResult {
    let client = super::connected_client(env).await?;
    let registry = registry_canister(env, &client).await?;
    registry
        .update_registry_status(&UpdateRegistryStatusParams {
            canister_id: opts.canister_id,
            status: opts.status,
        })
        .await?;
    info!(env.get_logger(), "{} is now {}.", opts.canister_id, opts.status);
    Ok(())
}
