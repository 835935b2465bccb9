use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use clap::Parser;

mod connect;
mod disconnect;
mod providers;
mod whoami;

/// Manages the wallet session actions run with.
#[derive(Parser)]
pub struct WalletOpts {
    #[command(subcommand)]
    subcmd: SubCommand,
}

#[derive(Parser)]
enum SubCommand {
    Connect(connect::ConnectOpts),
    Disconnect(disconnect::DisconnectOpts),
    Providers(providers::ProvidersOpts),
    Whoami(whoami::WhoAmIOpts),
}

pub async fn exec(env: &dyn Environment, opts: WalletOpts) -> StrikeResult {
    match opts.subcmd {
        SubCommand::Connect(v) => connect::exec(env, v).await,
        SubCommand::Disconnect(v) => disconnect::exec(env, v).await,
        SubCommand::Providers(v) => providers::exec(env, v).await,
        SubCommand::Whoami(v) => whoami::exec(env, v).await,
    }
}
