use crate::error::wallet::WalletError;
use crate::wallet::network::NetworkItem;
use crate::wallet::provider::BitcoinWallet;
use crate::wallet::provider_key::WalletProviderKey;

/// The outcome of wallet discovery: who the user is and on which network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredWallet {
    pub provider_key: WalletProviderKey,
    pub address: String,
    pub addresses: Vec<String>,
    pub network: NetworkItem,
}

/// Connects the extension and reads its default account and network.
pub async fn register_extension(wallet: &BitcoinWallet) -> Result<RegisteredWallet, WalletError> {
    let addresses = wallet.request_accounts().await?;
    let address = addresses.first().cloned().ok_or(WalletError::NoAccounts)?;
    let reported = wallet.get_network().await?;
    let network = NetworkItem::from_reported(&reported)?;
    Ok(RegisteredWallet {
        provider_key: wallet.key(),
        address,
        addresses,
        network,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRelay;
    use crate::wallet::network::NetworkType;
    use crate::wallet::relay::RelayMethod;
    use serde_json::json;
    use slog::Logger;
    use std::sync::Arc;

    #[tokio::test]
    async fn discovers_address_and_network() {
        let relay = Arc::new(FakeRelay::default());
        relay.respond(
            RelayMethod::RequestAccounts,
            json!(["tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx", "tb1qother"]),
        );
        relay.respond(RelayMethod::GetNetwork, json!("testnet"));
        let wallet = BitcoinWallet::new(
            WalletProviderKey::Wizz,
            relay,
            Logger::root(slog::Discard, slog::o!()),
        );

        let registered = register_extension(&wallet).await.unwrap();
        assert_eq!(registered.address, "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx");
        assert_eq!(registered.addresses.len(), 2);
        assert_eq!(registered.network.kind, NetworkType::Testnet);
        assert_eq!(wallet.default_address(), Some(registered.address));
    }

    #[tokio::test]
    async fn no_accounts_is_an_error() {
        let relay = Arc::new(FakeRelay::default());
        relay.respond(RelayMethod::RequestAccounts, json!([]));
        let wallet = BitcoinWallet::new(
            WalletProviderKey::Unisat,
            relay,
            Logger::root(slog::Discard, slog::o!()),
        );
        assert_eq!(
            register_extension(&wallet).await,
            Err(WalletError::NoAccounts)
        );
    }
}
