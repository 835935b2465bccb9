use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use anyhow::bail;
use clap::Parser;
use dialoguer::theme::ColorfulTheme;
use dialoguer::FuzzySelect;
use slog::info;
use strike_core::auth::ConnectRequest;

/// Connects a wallet and keeps the session for later commands.
#[derive(Parser)]
pub struct ConnectOpts {
    /// The wallet to connect. Prompts for one when omitted.
    #[arg(long)]
    wallet: Option<String>,
}

pub async fn exec(env: &dyn Environment, opts: ConnectOpts) -> StrikeResult {
    let log = env.get_logger();
    let client = env.new_client()?;
    client.wait_until_ready().await?;

    let provider_id = match opts.wallet {
        Some(id) => id,
        None => {
            let providers = client.providers();
            let names: Vec<String> = providers
                .iter()
                .map(|meta| format!("{} ({})", meta.name, meta.id))
                .collect();
            let selected = FuzzySelect::with_theme(&ColorfulTheme::default())
                .with_prompt("Select the wallet to connect")
                .default(0)
                .items(&names)
                .interact_opt()?;
            match selected {
                Some(index) => providers[index].id.clone(),
                None => bail!("No wallet selected."),
            }
        }
    };
    if client.provider(&provider_id).is_none() {
        bail!("Unknown wallet '{provider_id}'. Run `strike wallet providers` to list them.");
    }

    let (provider, principal) = tokio::select! {
        connected = client.connect_async(ConnectRequest::provider(provider_id)) => connected?,
        _ = tokio::signal::ctrl_c() => {
            client.cancel_connect()?;
            bail!("Connection cancelled.");
        }
    };
    info!(log, "Connected with {}.", provider);
    println!("{}", principal);
    Ok(())
}
