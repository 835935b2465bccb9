use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use crate::lib::registry::registry_canister;
use clap::Parser;
use strike_core::registry::{GetRegistriesParams, Pagination, StrikeStatus};

/// Lists registry entries, one page at a time.
#[derive(Parser)]
pub struct ListOpts {
    /// Only entries with this status: submitted, trusted or blocked.
    #[arg(long)]
    status: Option<StrikeStatus>,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,

    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    page_size: u32,
}

pub async fn exec(env: &dyn Environment, opts: ListOpts) -> StrikeResult {
    let client = env.new_client()?;
    let registry = registry_canister(env, &client).await?;
    let response = registry
        .get_registries(&GetRegistriesParams {
            status: opts.status,
            pagination: Pagination {
                page: opts.page,
                page_size: opts.page_size,
            },
        })
        .await?;
    for entry in &response.items {
        super::print_entry(entry);
    }
    println!(
        "Page {} ({} of {} entries)",
        opts.page,
        response.items.len(),
        response.total
    );
    Ok(())
}
