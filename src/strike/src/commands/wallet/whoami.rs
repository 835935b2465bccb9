use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use clap::Parser;

/// Shows the principal of the connected wallet.
#[derive(Parser)]
pub struct WhoAmIOpts {}

pub async fn exec(env: &dyn Environment, _opts: WhoAmIOpts) -> StrikeResult {
    let client = env.new_client()?;
    let snapshot = client.wait_until_ready().await?;
    match (snapshot.context.active_provider, snapshot.context.principal) {
        (Some(provider), Some(principal)) => println!("{} ({})", principal, provider),
        _ => println!("Not connected."),
    }
    Ok(())
}
