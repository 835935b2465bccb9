use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use anyhow::bail;
use clap::Parser;
use std::sync::Arc;
use strike_core::client::Client;
use strike_core::registry::StrikeRegistry;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

mod admins;
mod list;
mod lookup;
mod set_status;
mod submit;

/// Reads and curates the registry of trusted action canisters.
#[derive(Parser)]
pub struct RegistryOpts {
    #[command(subcommand)]
    subcmd: SubCommand,
}

#[derive(Parser)]
enum SubCommand {
    Admins(admins::AdminsOpts),
    List(list::ListOpts),
    Lookup(lookup::LookupOpts),
    SetStatus(set_status::SetStatusOpts),
    Submit(submit::SubmitOpts),
}

pub async fn exec(env: &dyn Environment, opts: RegistryOpts) -> StrikeResult {
    match opts.subcmd {
        SubCommand::Admins(v) => admins::exec(env, v).await,
        SubCommand::List(v) => list::exec(env, v).await,
        SubCommand::Lookup(v) => lookup::exec(env, v).await,
        SubCommand::SetStatus(v) => set_status::exec(env, v).await,
        SubCommand::Submit(v) => submit::exec(env, v).await,
    }
}

/// Registry updates are signed by the connected wallet.
async fn connected_client(env: &dyn Environment) -> StrikeResult<Arc<Client>> {
    let client = env.new_client()?;
    if !client.wait_until_ready().await?.is_connected() {
        bail!("This command needs a connected wallet. Run `strike wallet connect` first.");
    }
    Ok(client)
}

fn format_timestamp(nanos: u64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(nanos as i128)
        .ok()
        .and_then(|time| time.format(&Rfc3339).ok())
        .unwrap_or_else(|| nanos.to_string())
}

fn print_entry(entry: &StrikeRegistry) {
    println!("{}  {}  {}", entry.canister_id, entry.status, entry.project_name);
    println!("    name: {} <{}>", entry.name, entry.email);
    if !entry.description.is_empty() {
        println!("    {}", entry.description);
    }
    if let Some(url) = &entry.website_url {
        println!("    website: {}", url);
    }
    println!(
        "    added {} by {}",
        format_timestamp(entry.created_at),
        entry.added_by
    );
}
