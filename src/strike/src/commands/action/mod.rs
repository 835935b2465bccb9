use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use clap::Parser;

mod execute;
mod show;

/// Inspects and runs STRIKE actions.
#[derive(Parser)]
pub struct ActionOpts {
    #[command(subcommand)]
    subcmd: SubCommand,
}

#[derive(Parser)]
enum SubCommand {
    Execute(execute::ExecuteOpts),
    Show(show::ShowOpts),
}

pub async fn exec(env: &dyn Environment, opts: ActionOpts) -> StrikeResult {
    match opts.subcmd {
        SubCommand::Execute(v) => execute::exec(env, v).await,
        SubCommand::Show(v) => show::exec(env, v).await,
    }
}
