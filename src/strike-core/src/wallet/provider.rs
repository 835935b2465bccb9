use crate::error::wallet::{RelayError, WalletError};
use crate::wallet::address::{address_type, AddressType};
use crate::wallet::provider_key::{WalletFamily, WalletProviderKey};
use crate::wallet::relay::{interpret_response, RelayMethod, RelayRequest, RelayTransport};
use candid::CandidType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use slog::{debug, Logger};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Signature scheme a SIWB login is signed with.
#[derive(CandidType, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignMessageType {
    #[serde(rename = "ECDSA")]
    Ecdsa,
    Bip322Simple,
}

impl SignMessageType {
    /// The name wallets use for the scheme.
    pub fn as_wallet_str(&self) -> &'static str {
        match self {
            SignMessageType::Ecdsa => "ecdsa",
            SignMessageType::Bip322Simple => "bip322-simple",
        }
    }
}

impl fmt::Display for SignMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wallet_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub total: u64,
    pub confirmed: u64,
    pub unconfirmed: u64,
}

#[derive(Debug, Default)]
struct AccountCache {
    address: Option<String>,
    public_key: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SatsConnectAddress {
    address: String,
    #[serde(default)]
    public_key: Option<String>,
}

#[derive(Deserialize)]
struct SatsConnectResult<T> {
    result: Option<T>,
}

#[derive(Deserialize)]
struct SatsConnectSignature {
    signature: Option<String>,
}

/// One wallet extension, reached through the relay.
pub struct BitcoinWallet {
    key: WalletProviderKey,
    transport: Arc<dyn RelayTransport>,
    accounts: Mutex<AccountCache>,
    logger: Logger,
}

impl BitcoinWallet {
    pub fn new(key: WalletProviderKey, transport: Arc<dyn RelayTransport>, logger: Logger) -> Self {
        BitcoinWallet {
            key,
            transport,
            accounts: Mutex::new(AccountCache::default()),
            logger,
        }
    }

    pub fn key(&self) -> WalletProviderKey {
        self.key
    }

    pub fn family(&self) -> WalletFamily {
        self.key.family()
    }

    pub fn default_address(&self) -> Option<String> {
        self.accounts.lock().unwrap().address.clone()
    }

    async fn send_raw(&self, method: RelayMethod, payload: Value) -> Result<Value, WalletError> {
        debug!(self.logger, "Sending wallet request"; "type" => %method, "wallet" => self.key.as_str());
        let response = self
            .transport
            .send(RelayRequest {
                method,
                wallet: self.key.as_str().to_string(),
                payload,
            })
            .await?;
        Ok(interpret_response(response)?)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: RelayMethod,
        payload: Value,
    ) -> Result<T, WalletError> {
        let response = self.send_raw(method, payload).await?;
        serde_json::from_value(response).map_err(|err| {
            RelayError::UnexpectedResponse {
                method: method.to_string(),
                reason: err.to_string(),
            }
            .into()
        })
    }

    fn remember_accounts(&self, address: Option<String>, public_key: Option<String>) {
        let mut accounts = self.accounts.lock().unwrap();
        accounts.address = address;
        if public_key.is_some() {
            accounts.public_key = public_key;
        }
    }

    /// Asks the wallet to connect and returns its addresses, default first.
    pub async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        match self.family() {
            WalletFamily::SatsConnect => self.get_accounts().await,
            WalletFamily::Injected => {
                let accounts: Vec<String> =
                    self.send(RelayMethod::RequestAccounts, json!({})).await?;
                if let Some(first) = accounts.first() {
                    self.remember_accounts(Some(first.clone()), None);
                }
                Ok(accounts)
            }
        }
    }

    pub async fn get_accounts(&self) -> Result<Vec<String>, WalletError> {
        match self.family() {
            WalletFamily::SatsConnect => {
                let response: SatsConnectResult<Vec<SatsConnectAddress>> = self
                    .send(
                        RelayMethod::GetAccounts,
                        json!({ "purposes": ["ordinals", "payment"] }),
                    )
                    .await?;
                let addresses = response.result.ok_or(WalletError::UserRejected)?;
                let first = addresses.first();
                self.remember_accounts(
                    first.map(|a| a.address.clone()),
                    first.and_then(|a| a.public_key.clone()),
                );
                Ok(addresses.into_iter().map(|a| a.address).collect())
            }
            WalletFamily::Injected => {
                let accounts: Vec<String> = self.send(RelayMethod::GetAccounts, json!({})).await?;
                if let Some(first) = accounts.first() {
                    self.remember_accounts(Some(first.clone()), None);
                }
                Ok(accounts)
            }
        }
    }

    /// The network as the wallet names it.
    pub async fn get_network(&self) -> Result<String, WalletError> {
        match self.family() {
            WalletFamily::SatsConnect => {
                let address = self.default_address().ok_or(WalletError::NotConnected)?;
                let (_, network) = address_type(&address)?;
                Ok(network.as_str().to_string())
            }
            WalletFamily::Injected => self.send(RelayMethod::GetNetwork, json!({})).await,
        }
    }

    pub async fn get_public_key(&self) -> Result<String, WalletError> {
        if let Some(public_key) = self.accounts.lock().unwrap().public_key.clone() {
            return Ok(public_key);
        }
        match self.family() {
            WalletFamily::SatsConnect => Err(WalletError::NotConnected),
            WalletFamily::Injected => {
                let public_key: String = self.send(RelayMethod::GetPublicKey, json!({})).await?;
                self.accounts.lock().unwrap().public_key = Some(public_key.clone());
                Ok(public_key)
            }
        }
    }

    /// Signs `message` with the default account. When a scheme is requested,
    /// request-style wallets check it against the address type first.
    pub async fn sign_message(
        &self,
        message: &str,
        sign_type: Option<SignMessageType>,
    ) -> Result<String, WalletError> {
        match self.family() {
            WalletFamily::SatsConnect => {
                let address = self.default_address().ok_or(WalletError::NotConnected)?;
                if let Some(sign_type) = sign_type {
                    check_sign_type(&address, sign_type)?;
                }
                let response: SatsConnectResult<SatsConnectSignature> = self
                    .send(
                        RelayMethod::SignMessage,
                        json!({ "address": address, "message": message }),
                    )
                    .await?;
                response
                    .result
                    .and_then(|r| r.signature)
                    .ok_or(WalletError::UserRejected)
            }
            WalletFamily::Injected => {
                let payload = match sign_type {
                    Some(sign_type) => {
                        json!({ "message": message, "type": sign_type.as_wallet_str() })
                    }
                    None => json!({ "message": message }),
                };
                self.send(RelayMethod::SignMessage, payload).await
            }
        }
    }

    pub async fn get_balance(&self) -> Result<WalletBalance, WalletError> {
        self.send(RelayMethod::GetBalance, json!({})).await
    }

    /// Returns the transaction id.
    pub async fn send_bitcoin(&self, address: &str, amount: u64) -> Result<String, WalletError> {
        let payload = match self.family() {
            WalletFamily::SatsConnect => {
                json!({ "recipients": [{ "address": address, "amount": amount }] })
            }
            WalletFamily::Injected => json!({ "address": address, "amount": amount }),
        };
        self.send(RelayMethod::SendBitcoin, payload).await
    }

    pub async fn get_address_type(&self, address: &str) -> Result<Option<String>, WalletError> {
        self.send(RelayMethod::GetAddressType, json!({ "address": address }))
            .await
    }

    pub async fn get_app_version(&self) -> Result<String, WalletError> {
        self.send(RelayMethod::GetAppVersion, json!({})).await
    }

    pub async fn get_supported_methods(&self) -> Result<Vec<String>, WalletError> {
        self.send(RelayMethod::GetSupportedMethods, json!({})).await
    }

    pub async fn push_tx(&self, rawtx: &str) -> Result<String, WalletError> {
        self.send(RelayMethod::PushTx, json!({ "rawtx": rawtx })).await
    }

    pub async fn push_psbt(&self, psbt: &str) -> Result<String, WalletError> {
        self.send(RelayMethod::PushPsbt, json!({ "psbt": psbt })).await
    }

    pub async fn fetch_and_validate_file(
        &self,
        url: &str,
        file_path: &str,
        expect_sha: &str,
    ) -> Result<String, WalletError> {
        self.send(
            RelayMethod::FetchAndValidateFile,
            json!({ "url": url, "filePath": file_path, "expectSHA": expect_sha }),
        )
        .await
    }
}

fn check_sign_type(address: &str, sign_type: SignMessageType) -> Result<(), WalletError> {
    let (kind, _) = address_type(address)?;
    let refused = match sign_type {
        SignMessageType::Ecdsa => matches!(
            kind,
            AddressType::P2tr | AddressType::P2wpkh | AddressType::P2shP2wpkh
        ),
        SignMessageType::Bip322Simple => {
            matches!(kind, AddressType::P2pkh | AddressType::P2shP2wpkh)
        }
    };
    if refused {
        return Err(WalletError::UnsupportedSignType {
            address_type: kind.to_string(),
            sign_type: sign_type.to_string(),
        });
    }
    Ok(())
}

/// The scheme a SIWB login uses for this wallet and address: request-style
/// wallets sign Taproot and native SegWit addresses with BIP-322, everything
/// else signs plain ECDSA.
pub fn sign_message_type_for(
    key: WalletProviderKey,
    address: &str,
) -> Result<SignMessageType, WalletError> {
    if key.family() != WalletFamily::SatsConnect {
        return Ok(SignMessageType::Ecdsa);
    }
    let (kind, _) = address_type(address)?;
    Ok(match kind {
        AddressType::P2tr | AddressType::P2wpkh => SignMessageType::Bip322Simple,
        _ => SignMessageType::Ecdsa,
    })
}
