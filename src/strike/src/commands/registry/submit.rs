use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use crate::lib::registry::registry_canister;
use candid::Principal;
use clap::Parser;
use slog::info;
use strike_core::registry::AddRegistryParams;

/// Submits a canister for review. New entries start out as `submitted`.
#[derive(Parser)]
pub struct SubmitOpts {
    canister_id: Principal,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    project_name: String,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long)]
    website_url: Option<String>,

    #[arg(long)]
    telegram: Option<String>,

    #[arg(long)]
    twitter: Option<String>,
}

pub async fn exec(env: &dyn Environment, opts: SubmitOpts) -> StrikeResult {
    let client = super::connected_client(env).await?;
    let registry = registry_canister(env, &client).await?;
    registry
        .add_registry(&AddRegistryParams {
            canister_id: opts.canister_id,
            name: opts.name,
            email: opts.email,
            telegram: opts.telegram,
            twitter: opts.twitter,
            project_name: opts.project_name,
            description: opts.description,
            website_url: opts.website_url,
        })
        .await?;
    info!(env.get_logger(), "Submitted {} for review.", opts.canister_id);
    Ok(())
}
