use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use crate::lib::registry::registry_canister;
use candid::Principal;
use clap::Parser;
use slog::info;

/// Lists registry admins, or changes them.
#[derive(Parser)]
pub struct AdminsOpts {
    /// Grant admin rights to a principal.
    #[arg(long, conflicts_with_all = ["remove", "check"])]
    add: Option<Principal>,

    /// Revoke admin rights from a principal.
    #[arg(long, conflicts_with = "check")]
    remove: Option<Principal>,

    /// Tell whether a principal is an admin.
    #[arg(long)]
    check: Option<Principal>,
}

pub async fn exec(env: &dyn Environment, opts: AdminsOpts) -> StrikeResult {
    let log = env.get_logger();
    if let Some(admin) = opts.add {
        let client = super::connected_client(env).await?;
        registry_canister(env, &client).await?.add_admin(admin).await?;
        info!(log, "Added admin {}.", admin);
    } else if let Some(admin) = opts.remove {
        let client = super::connected_client(env).await?;
        registry_canister(env, &client).await?.remove_admin(admin).await?;
        info!(log, "Removed admin {}.", admin);
    } else if let Some(user) = opts.check {
        let client = env.new_client()?;
        let is_admin = registry_canister(env, &client).await?.is_admin(user).await?;
        println!("{}", is_admin);
    } else {
        let client = env.new_client()?;
        for admin in registry_canister(env, &client).await?.get_admins().await? {
            println!("{}", admin);
        }
    }
    Ok(())
}
