use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use clap::Parser;

/// Prints the effective configuration.
#[derive(Parser)]
pub struct ConfigOpts {
    /// Also print where the configuration and sessions live.
    #[arg(long)]
    paths: bool,
}

pub fn exec(env: &dyn Environment, opts: ConfigOpts) -> StrikeResult {
    if opts.paths {
        println!("config: {}", env.get_config_path().display());
        println!("storage: {}", env.get_storage_dir().display());
    }
    println!("{}", serde_json::to_string_pretty(env.get_config())?);
    Ok(())
}
