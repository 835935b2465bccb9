use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use clap::Subcommand;

mod action;
mod config;
mod registry;
mod wallet;

#[derive(Subcommand)]
pub enum StrikeCommand {
    Action(action::ActionOpts),
    Config(config::ConfigOpts),
    Registry(registry::RegistryOpts),
    Wallet(wallet::WalletOpts),
}

pub async fn exec(env: &dyn Environment, cmd: StrikeCommand) -> StrikeResult {
    match cmd {
        StrikeCommand::Action(v) => action::exec(env, v).await,
        StrikeCommand::Config(v) => config::exec(env, v),
        StrikeCommand::Registry(v) => registry::exec(env, v).await,
        StrikeCommand::Wallet(v) => wallet::exec(env, v).await,
    }
}
