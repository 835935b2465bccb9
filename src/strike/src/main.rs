#![allow(special_module_name)]
use crate::lib::environment::{Environment, EnvironmentImpl};
use crate::lib::error::StrikeResult;
use crate::lib::logger::{create_root_logger, LoggingMode};
use anyhow::{Context, Error};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tokio::runtime::Runtime;

mod commands;
mod lib;

/// Resolve and run STRIKE actions on the Internet Computer.
#[derive(Parser)]
#[command(name = "strike", version, arg_required_else_help = true)]
pub struct CliOpts {
    /// Displays detailed information about operations. -vv also logs every state transition.
    #[arg(long, short, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppresses informational messages. -qq limits to errors only; -qqqq disables them all.
    #[arg(long, short, action = ArgAction::Count, global = true)]
    quiet: u8,

    /// The logging mode to use. You can log to stderr, a file, or both.
    #[arg(long = "log", default_value = "stderr", value_parser = ["stderr", "tee", "file"], global = true)]
    logmode: String,

    /// The file to log to, if logging to a file (see --log).
    #[arg(long, global = true)]
    logfile: Option<String>,

    /// The configuration file. Defaults to strike.json in the user config directory.
    #[arg(long, env = "STRIKE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// The replica or boundary node to talk to, overriding the configured host.
    #[arg(long, env = "STRIKE_HOST", global = true)]
    host: Option<String>,

    /// Where wallet sessions are kept. Defaults to the user data directory.
    #[arg(long, env = "STRIKE_STORAGE_DIR", global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::StrikeCommand,
}

fn setup_logging(opts: &CliOpts) -> StrikeResult<(i64, slog::Logger)> {
    let verbose_level = opts.verbose as i64 - opts.quiet as i64;
    let logfile = || PathBuf::from(opts.logfile.as_deref().unwrap_or("strike.log"));
    let mode = match opts.logmode.as_str() {
        "tee" => LoggingMode::Tee(logfile()),
        "file" => LoggingMode::File(logfile()),
        _ => LoggingMode::Stderr,
    };
    let logger = create_root_logger(verbose_level, mode).context("Failed to open the log file.")?;
    Ok((verbose_level, logger))
}

fn print_error(err: Error) {
    for (level, cause) in err.chain().enumerate() {
        let prefix = if level == 0 { "Error" } else { "Caused by" };
        eprintln!("{prefix}: {cause}");
    }
}

fn inner_main() -> StrikeResult {
    let cli_opts = CliOpts::parse();
    let (verbose_level, log) = setup_logging(&cli_opts)?;

    let env = EnvironmentImpl::new(cli_opts.config, log)?
        .with_host(cli_opts.host)?
        .with_storage_dir(cli_opts.storage_dir)
        .with_verbose_level(verbose_level);

    slog::trace!(
        env.get_logger(),
        "Trace mode enabled. Lots of logs coming up."
    );
    let runtime = Runtime::new().context("Unable to create a runtime")?;
    runtime.block_on(commands::exec(&env, cli_opts.command))
}

fn main() {
    if let Err(err) = inner_main() {
        print_error(err);
        std::process::exit(255);
    }
}

#[cfg(test)]
mod tests {
    use crate::CliOpts;
    use clap::{CommandFactory, Parser};

    #[test]
    fn validate_cli() {
        CliOpts::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let opts = CliOpts::try_parse_from([
            "strike",
            "action",
            "execute",
            "https://example.com/airdrop",
            "--param",
            "amount=3",
            "-vv",
            "--host",
            "http://127.0.0.1:4943",
        ])
        .unwrap();
        assert_eq!(opts.verbose, 2);
        assert_eq!(opts.host.as_deref(), Some("http://127.0.0.1:4943"));
    }

    #[test]
    fn registry_status_is_validated() {
        assert!(CliOpts::try_parse_from([
            "strike",
            "registry",
            "set-status",
            "ryjl3-tyaaa-aaaaa-aaaba-cai",
            "trusted",
        ])
        .is_ok());
        assert!(CliOpts::try_parse_from([
            "strike",
            "registry",
            "set-status",
            "ryjl3-tyaaa-aaaaa-aaaba-cai",
            "famous",
        ])
        .is_err());
    }
}
