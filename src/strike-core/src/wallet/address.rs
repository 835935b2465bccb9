use crate::error::wallet::WalletError;
use crate::wallet::network::NetworkType;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressType {
    P2pkh,
    P2wpkh,
    P2tr,
    P2shP2wpkh,
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddressType::P2pkh => "P2PKH",
            AddressType::P2wpkh => "P2WPKH",
            AddressType::P2tr => "P2TR",
            AddressType::P2shP2wpkh => "P2SH_P2WPKH",
        })
    }
}

/// Classifies a Bitcoin address by its prefix.
pub fn address_type(address: &str) -> Result<(AddressType, NetworkType), WalletError> {
    const PREFIXES: &[(&str, AddressType, NetworkType)] = &[
        ("bc1q", AddressType::P2wpkh, NetworkType::Mainnet),
        ("bc1p", AddressType::P2tr, NetworkType::Mainnet),
        ("1", AddressType::P2pkh, NetworkType::Mainnet),
        ("3", AddressType::P2shP2wpkh, NetworkType::Mainnet),
        ("tb1q", AddressType::P2wpkh, NetworkType::Testnet),
        ("m", AddressType::P2pkh, NetworkType::Testnet),
        ("n", AddressType::P2pkh, NetworkType::Testnet),
        ("2", AddressType::P2shP2wpkh, NetworkType::Testnet),
        ("tb1p", AddressType::P2tr, NetworkType::Testnet),
    ];
    PREFIXES
        .iter()
        .find(|(prefix, _, _)| address.starts_with(prefix))
        .map(|(_, address_type, network)| (*address_type, *network))
        .ok_or_else(|| WalletError::UnknownAddress(address.to_string()))
}
