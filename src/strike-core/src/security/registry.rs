use crate::config::model::client_config::TrustListsConfig;
use crate::registry::{RegistryLookup, StrikeStatus};
use crate::security::level::ActionState;
use async_trait::async_trait;
use candid::Principal;
use slog::{debug, warn, Logger};
use std::sync::Arc;

/// Classifies actions, websites and interstitials.
#[async_trait]
pub trait TrustRegistry: Send + Sync {
    async fn action_state(&self, canister_id: &str) -> ActionState;

    fn website_state(&self, host: &str) -> ActionState;

    fn interstitial_state(&self, host: &str) -> ActionState;
}

/// Actions are looked up on the registry canister, origins in static host
/// lists. Anything that cannot be looked up is `unknown`.
pub struct ActionsRegistry {
    lookup: Option<Arc<dyn RegistryLookup>>,
    lists: TrustListsConfig,
    logger: Logger,
}

impl ActionsRegistry {
    pub fn new(
        lookup: Option<Arc<dyn RegistryLookup>>,
        lists: TrustListsConfig,
        logger: Logger,
    ) -> Self {
        ActionsRegistry {
            lookup,
            lists,
            logger,
        }
    }
}

#[async_trait]
impl TrustRegistry for ActionsRegistry {
    async fn action_state(&self, canister_id: &str) -> ActionState {
        let Some(lookup) = &self.lookup else {
            return ActionState::Unknown;
        };
        let Ok(principal) = Principal::from_text(canister_id) else {
            debug!(self.logger, "Action has no valid canister id"; "canister_id" => canister_id);
            return ActionState::Unknown;
        };
        match lookup.get_strike_by_canister_id(principal).await {
            Ok(Some(entry)) => match entry.status {
                StrikeStatus::Trusted => ActionState::Trusted,
                StrikeStatus::Blocked => ActionState::Malicious,
                StrikeStatus::Submitted => ActionState::Unknown,
            },
            Ok(None) => ActionState::Unknown,
            Err(err) => {
                warn!(self.logger, "Registry lookup failed: {}", err; "canister_id" => canister_id);
                ActionState::Unknown
            }
        }
    }

    fn website_state(&self, host: &str) -> ActionState {
        classify_host(
            host,
            &self.lists.trusted_websites,
            &self.lists.malicious_websites,
        )
    }

    fn interstitial_state(&self, host: &str) -> ActionState {
        classify_host(
            host,
            &self.lists.trusted_interstitials,
            &self.lists.malicious_interstitials,
        )
    }
}

/// A listed host covers its subdomains. Malicious listings win.
fn classify_host(host: &str, trusted: &[String], malicious: &[String]) -> ActionState {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let listed = |list: &[String]| {
        list.iter().any(|entry| {
            let entry = entry.trim_end_matches('.').to_ascii_lowercase();
            host == entry || host.ends_with(&format!(".{entry}"))
        })
    };
    if listed(malicious) {
        ActionState::Malicious
    } else if listed(trusted) {
        ActionState::Trusted
    } else {
        ActionState::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{logger, FakeRegistry};

    const CANISTER: &str = "ryjl3-tyaaa-aaaaa-aaaba-cai";

    fn registry(lookup: Arc<FakeRegistry>) -> ActionsRegistry {
        ActionsRegistry::new(
            Some(lookup),
            TrustListsConfig {
                trusted_websites: vec!["example.com".to_string()],
                malicious_websites: vec!["evil.example.com".to_string()],
                trusted_interstitials: vec!["strike.example".to_string()],
                malicious_interstitials: vec![],
            },
            logger(),
        )
    }

    #[tokio::test]
    async fn registry_status_maps_to_action_state() {
        let lookup = Arc::new(FakeRegistry::default());
        let registry = registry(lookup.clone());
        assert_eq!(registry.action_state(CANISTER).await, ActionState::Unknown);

        lookup.set_status(CANISTER, StrikeStatus::Trusted);
        assert_eq!(registry.action_state(CANISTER).await, ActionState::Trusted);
        lookup.set_status(CANISTER, StrikeStatus::Blocked);
        assert_eq!(registry.action_state(CANISTER).await, ActionState::Malicious);
        lookup.set_status(CANISTER, StrikeStatus::Submitted);
        assert_eq!(registry.action_state(CANISTER).await, ActionState::Unknown);

        lookup.fail_lookups();
        assert_eq!(registry.action_state(CANISTER).await, ActionState::Unknown);
        assert_eq!(registry.action_state("not a principal").await, ActionState::Unknown);
    }

    #[test]
    fn hosts_match_exactly_or_as_subdomains() {
        let registry = registry(Arc::new(FakeRegistry::default()));
        assert_eq!(registry.website_state("example.com"), ActionState::Trusted);
        assert_eq!(registry.website_state("blog.Example.com"), ActionState::Trusted);
        assert_eq!(registry.website_state("evil.example.com"), ActionState::Malicious);
        assert_eq!(registry.website_state("notexample.com"), ActionState::Unknown);
        assert_eq!(registry.interstitial_state("strike.example"), ActionState::Trusted);
        assert_eq!(registry.interstitial_state("other.example"), ActionState::Unknown);
    }
}
