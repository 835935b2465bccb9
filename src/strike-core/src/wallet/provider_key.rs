use crate::error::wallet::WalletError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The wallet extensions the relay knows how to reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletProviderKey {
    #[serde(rename = "wizz")]
    Wizz,
    #[serde(rename = "unisat")]
    Unisat,
    #[serde(rename = "atom")]
    Atom,
    #[serde(rename = "XverseProviders.BitcoinProvider")]
    Xverse,
    #[serde(rename = "okxwallet.bitcoinTestnet")]
    OkxTestnet,
    #[serde(rename = "okxwallet.bitcoin")]
    Okx,
    #[serde(rename = "okxwallet.bitcoinSignet")]
    OkxSignet,
    #[serde(rename = "BitcoinProvider")]
    BitcoinProvider,
    #[serde(rename = "OrangecryptoProviders.BitcoinProvider")]
    Orange,
}

/// How a wallet's API is shaped. Fixed per key, never detected at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalletFamily {
    /// `request`-style providers: accounts come back as objects inside `result`.
    SatsConnect,
    /// Injected providers answering with plain values.
    Injected,
}

impl WalletProviderKey {
    pub const ALL: [WalletProviderKey; 9] = [
        WalletProviderKey::Wizz,
        WalletProviderKey::Unisat,
        WalletProviderKey::Atom,
        WalletProviderKey::Xverse,
        WalletProviderKey::OkxTestnet,
        WalletProviderKey::Okx,
        WalletProviderKey::OkxSignet,
        WalletProviderKey::BitcoinProvider,
        WalletProviderKey::Orange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WalletProviderKey::Wizz => "wizz",
            WalletProviderKey::Unisat => "unisat",
            WalletProviderKey::Atom => "atom",
            WalletProviderKey::Xverse => "XverseProviders.BitcoinProvider",
            WalletProviderKey::OkxTestnet => "okxwallet.bitcoinTestnet",
            WalletProviderKey::Okx => "okxwallet.bitcoin",
            WalletProviderKey::OkxSignet => "okxwallet.bitcoinSignet",
            WalletProviderKey::BitcoinProvider => "BitcoinProvider",
            WalletProviderKey::Orange => "OrangecryptoProviders.BitcoinProvider",
        }
    }

    pub fn family(&self) -> WalletFamily {
        match self {
            WalletProviderKey::BitcoinProvider
            | WalletProviderKey::Xverse
            | WalletProviderKey::Orange => WalletFamily::SatsConnect,
            _ => WalletFamily::Injected,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WalletProviderKey::Wizz => "Wizz",
            WalletProviderKey::Unisat => "Unisat",
            WalletProviderKey::Atom => "Atom",
            WalletProviderKey::Xverse => "Xverse",
            WalletProviderKey::OkxTestnet => "OKX (testnet)",
            WalletProviderKey::Okx => "OKX",
            WalletProviderKey::OkxSignet => "OKX (signet)",
            WalletProviderKey::BitcoinProvider => "Bitcoin Provider",
            WalletProviderKey::Orange => "Orange",
        }
    }
}

impl fmt::Display for WalletProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletProviderKey {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WalletProviderKey::ALL
            .iter()
            .find(|key| key.as_str() == s)
            .copied()
            .ok_or_else(|| WalletError::UnknownProviderKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_from_their_wire_names() {
        for key in WalletProviderKey::ALL {
            assert_eq!(key.as_str().parse::<WalletProviderKey>().unwrap(), key);
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
        assert!("metamask".parse::<WalletProviderKey>().is_err());
    }

    #[test]
    fn sats_connect_family_is_fixed_per_key() {
        assert_eq!(WalletProviderKey::Xverse.family(), WalletFamily::SatsConnect);
        assert_eq!(WalletProviderKey::Orange.family(), WalletFamily::SatsConnect);
        assert_eq!(
            WalletProviderKey::BitcoinProvider.family(),
            WalletFamily::SatsConnect
        );
        assert_eq!(WalletProviderKey::Unisat.family(), WalletFamily::Injected);
        assert_eq!(WalletProviderKey::Okx.family(), WalletFamily::Injected);
    }
}
