use crate::error::wallet::WalletError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Livenet,
    Bitcoin,
    Testnet,
    Testnet4,
    Signet,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Livenet => "livenet",
            NetworkType::Bitcoin => "bitcoin",
            NetworkType::Testnet => "testnet",
            NetworkType::Testnet4 => "testnet4",
            NetworkType::Signet => "signet",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "mainnet" => NetworkType::Mainnet,
            "livenet" => NetworkType::Livenet,
            "bitcoin" => NetworkType::Bitcoin,
            "testnet" => NetworkType::Testnet,
            "testnet4" => NetworkType::Testnet4,
            "signet" => NetworkType::Signet,
            other => return Err(WalletError::UnknownNetwork(other.to_string())),
        })
    }
}

/// A wallet network as reported to dapps: the wallet's own name for it and the
/// chain it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkItem {
    #[serde(rename = "type")]
    pub kind: NetworkType,
    pub network: NetworkType,
}

impl NetworkItem {
    pub const MAINNET: NetworkItem = NetworkItem {
        kind: NetworkType::Livenet,
        network: NetworkType::Bitcoin,
    };

    /// Maps what a wallet reports onto the known networks. An empty report
    /// counts as mainnet.
    pub fn from_reported(reported: &str) -> Result<NetworkItem, WalletError> {
        if reported.is_empty() {
            return Ok(NetworkItem::MAINNET);
        }
        let item = match reported.parse::<NetworkType>()? {
            NetworkType::Mainnet | NetworkType::Livenet => NetworkItem::MAINNET,
            kind @ (NetworkType::Testnet | NetworkType::Testnet4 | NetworkType::Signet) => {
                NetworkItem {
                    kind,
                    network: NetworkType::Testnet,
                }
            }
            NetworkType::Bitcoin => {
                return Err(WalletError::UnknownNetwork(reported.to_string()))
            }
        };
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_networks_map_to_items() {
        assert_eq!(NetworkItem::from_reported("").unwrap(), NetworkItem::MAINNET);
        assert_eq!(
            NetworkItem::from_reported("livenet").unwrap(),
            NetworkItem::MAINNET
        );
        assert_eq!(
            NetworkItem::from_reported("testnet4").unwrap(),
            NetworkItem {
                kind: NetworkType::Testnet4,
                network: NetworkType::Testnet
            }
        );
        assert_eq!(
            NetworkItem::from_reported("signet").unwrap().network,
            NetworkType::Testnet
        );
        assert!(NetworkItem::from_reported("regtest").is_err());
    }

    #[test]
    fn item_serializes_with_a_type_field() {
        let json = serde_json::to_value(NetworkItem::MAINNET).unwrap();
        assert_eq!(json, serde_json::json!({"type": "livenet", "network": "bitcoin"}));
    }
}
