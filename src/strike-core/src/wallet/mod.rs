//! Bitcoin wallet extensions reached through the browser-extension relay.
pub mod address;
pub mod network;
pub mod provider;
pub mod provider_key;
pub mod register;
pub mod relay;

pub use address::{address_type, AddressType};
pub use network::{NetworkItem, NetworkType};
pub use provider::{BitcoinWallet, SignMessageType, WalletBalance};
pub use provider_key::{WalletFamily, WalletProviderKey};
pub use register::{register_extension, RegisteredWallet};
pub use relay::{HttpRelayTransport, RelayMethod, RelayRequest, RelayTransport};
