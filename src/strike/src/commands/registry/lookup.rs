use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use crate::lib::registry::registry_canister;
use candid::Principal;
use clap::Parser;
use strike_core::registry::RegistryLookup;

/// Shows the registry entry of a canister.
#[derive(Parser)]
pub struct LookupOpts {
    canister_id: Principal,

    /// Print the entry as JSON.
    #[arg(long)]
    json: bool,
}

pub async fn exec(env: &dyn Environment, opts: LookupOpts) -> StrikeResult {
    let client = env.new_client()?;
    let registry = registry_canister(env, &client).await?;
    let entry = registry.get_strike_by_canister_id(opts.canister_id).await?;
    match entry {
        Some(entry) if opts.json => println!("{}", serde_json::to_string_pretty(&entry)?),
        Some(entry) => super::print_entry(&entry),
        None => println!("{} is not registered.", opts.canister_id),
    }
    Ok(())
}
