use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use crate::lib::registry::security_gate;
use anyhow::bail;
use clap::Parser;
use slog::{info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;
use strike_core::action::{ActionComponent, ActionResolver};
use strike_core::execution::{ActionExecutor, ClientAdapter, ExecutionStatus};
use strike_core::idl::ParameterValue;

/// Runs one component of an action with the connected wallet.
#[derive(Parser)]
pub struct ExecuteOpts {
    /// An action URL, an `icp-action:` link, or a page that links to one.
    url: String,

    /// Index of the component to run, as listed by `action show`.
    #[arg(long = "action", default_value_t = 0)]
    component: usize,

    /// A parameter value. Repeat a name to pass several values.
    #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// The wallet to connect when no session is active.
    #[arg(long)]
    wallet: Option<String>,

    /// Proceed past a security disclaimer the policy allows skipping.
    #[arg(long)]
    ignore_warnings: bool,
}

fn parse_param(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{arg}'")),
    }
}

/// Repeated names and multi-value parameters become lists.
fn collect_params(
    component: &ActionComponent,
    params: Vec<(String, String)>,
) -> BTreeMap<String, ParameterValue> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in params {
        grouped.entry(name).or_default().push(value);
    }
    grouped
        .into_iter()
        .map(|(name, mut values)| {
            let multi = component
                .parameter(&name)
                .is_some_and(|parameter| parameter.kind.is_multi_value());
            let value = if multi || values.len() > 1 {
                ParameterValue::Multi(values)
            } else {
                ParameterValue::Single(values.remove(0))
            };
            (name, value)
        })
        .collect()
}

pub async fn exec(env: &dyn Environment, opts: ExecuteOpts) -> StrikeResult {
    let log = env.get_logger();
    let resolver = Arc::new(ActionResolver::new(log.clone())?);
    let resolved = resolver.resolve(&opts.url).await?;
    let client = env.new_client()?;
    let gate = security_gate(env, &client).await?;
    let adapter = ClientAdapter::new(client.clone(), log.clone()).with_provider(opts.wallet);

    let mut executor =
        ActionExecutor::new(resolved, resolver, gate, Arc::new(adapter), log.clone()).await;
    if executor.state().status == ExecutionStatus::Blocked {
        let overall = executor.assessment().overall;
        if !opts.ignore_warnings {
            bail!("The action is classified {overall}. Pass --ignore-warnings to run it anyway.");
        }
        if !executor.unblock() {
            bail!("The action is classified {overall} and the security policy does not allow running it.");
        }
        warn!(log, "Running an action classified {}", overall);
    }

    let Some(component) = executor.action().component(opts.component) else {
        bail!(
            "The action has no component {}. Run `strike action show` to list them.",
            opts.component
        );
    };
    let params = collect_params(component, opts.params);
    let state = executor.execute(opts.component, &params).await?.clone();
    println!("{}", serde_json::to_string_pretty(&state)?);

    match state.status {
        ExecutionStatus::Success => {
            info!(log, "Action executed.");
            Ok(())
        }
        ExecutionStatus::Blocked => {
            bail!("The action was reclassified while it ran and has been blocked.")
        }
        _ => match state.error_message {
            Some(message) => bail!(message),
            None => bail!("The action did not run. No wallet was connected."),
        },
    }
}
