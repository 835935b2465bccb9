use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use clap::Parser;
use slog::info;

/// Ends the wallet session.
#[derive(Parser)]
pub struct DisconnectOpts {}

pub async fn exec(env: &dyn Environment, _opts: DisconnectOpts) -> StrikeResult {
    let client = env.new_client()?;
    client.disconnect_async().await?;
    info!(env.get_logger(), "Disconnected.");
    Ok(())
}
