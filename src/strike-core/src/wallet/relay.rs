use crate::error::reqwest::WrappedReqwestError;
use crate::error::wallet::RelayError;
use crate::http::post::post_json;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slog::{trace, Logger};
use std::fmt;
use url::Url;

/// Message types the extension relay understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelayMethod {
    GetAccounts,
    RequestAccounts,
    GetBalance,
    SignMessage,
    SendBitcoin,
    GetPublicKey,
    GetNetwork,
    GetAddressType,
    RequestConnect,
    PushTx,
    PushPsbt,
    FetchAndValidateFile,
    GetAppVersion,
    GetSupportedMethods,
}

impl fmt::Display for RelayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_value(self) {
            Ok(Value::String(name)) => f.write_str(&name),
            _ => write!(f, "{self:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelayRequest {
    #[serde(rename = "type")]
    pub method: RelayMethod,
    pub wallet: String,
    pub payload: Value,
}

/// Request/response transport to an installed wallet extension.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Sends one request and returns the raw response body.
    async fn send(&self, request: RelayRequest) -> Result<Value, RelayError>;
}

/// Responses are either the raw result or `{ "error": "..." }`.
pub fn interpret_response(response: Value) -> Result<Value, RelayError> {
    if let Value::Object(map) = &response {
        if let Some(error) = map.get("error") {
            if !error.is_null() {
                let message = match error {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                return Err(RelayError::Wallet(message));
            }
        }
    }
    Ok(response)
}

/// Sends relay requests to a native-messaging bridge over HTTP.
pub struct HttpRelayTransport {
    client: reqwest::Client,
    url: Url,
    logger: Logger,
}

impl HttpRelayTransport {
    pub fn new(url: Url, logger: Logger) -> Self {
        HttpRelayTransport {
            client: reqwest::Client::new(),
            url,
            logger,
        }
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn send(&self, request: RelayRequest) -> Result<Value, RelayError> {
        trace!(self.logger, "Relay request"; "type" => %request.method, "wallet" => &request.wallet);
        let transport_error = |err: WrappedReqwestError| RelayError::Transport(err.to_string());
        let response = post_json(&self.client, self.url.clone(), &request)
            .await
            .map_err(transport_error)?;
        let body: Value = response
            .json()
            .await
            .map_err(|err| transport_error(WrappedReqwestError(err)))?;
        interpret_response(body)
    }
}
