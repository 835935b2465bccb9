use crate::error::config::ConfigError;
use url::Url;

const IC_GATEWAY_DOMAINS: &[&str] = &["icp0.io", "ic0.app", "icp-api.io"];

/// The replica an agent talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub url: Url,
    pub is_ic: bool,
}

impl NetworkDescriptor {
    pub fn from_host(host: &str) -> Result<Self, ConfigError> {
        let url =
            Url::parse(host).map_err(|err| ConfigError::InvalidHost(host.to_string(), err))?;
        let is_ic = Self::is_ic(&url);
        Ok(NetworkDescriptor { url, is_ic })
    }

    /// Determines whether the url points at a mainnet boundary node.
    pub fn is_ic(url: &Url) -> bool {
        url.host_str().is_some_and(|host| {
            IC_GATEWAY_DOMAINS
                .iter()
                .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
        })
    }

    /// Local replicas, which some wallets refuse to proxy calls to.
    pub fn is_local(&self) -> bool {
        matches!(
            self.url.host_str(),
            Some("localhost" | "127.0.0.1" | "0.0.0.0" | "[::1]")
        ) || self
            .url
            .host_str()
            .is_some_and(|host| host.ends_with(".localhost"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ic_by_gateway() {
        assert!(NetworkDescriptor::from_host("https://icp0.io").unwrap().is_ic);
        assert!(NetworkDescriptor::from_host("https://ic0.app/").unwrap().is_ic);
        assert!(
            NetworkDescriptor::from_host("https://ryjl3-tyaaa-aaaaa-aaaba-cai.icp0.io")
                .unwrap()
                .is_ic
        );
    }

    #[test]
    fn local_replica_is_not_ic() {
        let network = NetworkDescriptor::from_host("http://127.0.0.1:4943").unwrap();
        assert!(!network.is_ic);
        assert!(network.is_local());

        let network = NetworkDescriptor::from_host("http://app.localhost:8080").unwrap();
        assert!(network.is_local());
    }

    #[test]
    fn lookalike_domain_is_not_ic() {
        assert!(
            !NetworkDescriptor::from_host("https://notic0.app")
                .unwrap()
                .is_ic
        );
    }
}
