use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use clap::Parser;

/// Lists the configured wallets.
#[derive(Parser)]
pub struct ProvidersOpts {
    /// Print the list as JSON.
    #[arg(long)]
    json: bool,
}

pub async fn exec(env: &dyn Environment, opts: ProvidersOpts) -> StrikeResult {
    let client = env.new_client()?;
    client.wait_until_ready().await?;
    let providers = client.providers();
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&providers)?);
        return Ok(());
    }
    let active = client.active_provider().map(|c| c.id().to_string());
    for meta in providers {
        let marker = if active.as_deref() == Some(meta.id.as_str()) { "*" } else { " " };
        println!("{} {:<12} {}", marker, meta.id, meta.name);
    }
    Ok(())
}
