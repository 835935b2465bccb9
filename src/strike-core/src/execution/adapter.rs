use crate::action::Action;
use crate::auth::ConnectRequest;
use crate::client::Client;
use crate::connector::Actor;
use crate::error::connector::CreateActorError;
use crate::identity::IdentityHandle;
use crate::idl::ServiceInterface;
use crate::security::gate::ExtendedActionState;
use async_trait::async_trait;
use candid::Principal;
use slog::{debug, warn, Logger};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// How long a wallet usually takes to confirm, with a fifth on top. Only
/// used to warn about a stalled confirmation.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(72);

/// What an execution is about, handed to the adapter with every request.
#[derive(Clone, Debug)]
pub struct ActionContext {
    pub action: Action,
    pub action_state: ExtendedActionState,
    /// The page the action was reached from, or the action itself.
    pub original_url: Url,
    pub triggered_component: usize,
    pub derivation_origin: Option<String>,
}

/// The wallet side of an execution.
#[async_trait]
pub trait ActionAdapter: Send + Sync {
    /// `None` when the user declined or the connection failed.
    async fn connect(&self, context: &ActionContext) -> Option<IdentityHandle>;

    async fn create_actor(
        &self,
        canister_id: Principal,
        interface: ServiceInterface,
        context: &ActionContext,
    ) -> Result<Arc<dyn Actor>, CreateActorError>;
}

/// Connects through a [`Client`], reusing its session when there is one.
pub struct ClientAdapter {
    client: Arc<Client>,
    provider_id: Option<String>,
    confirm_timeout: Duration,
    logger: Logger,
}

impl ClientAdapter {
    pub fn new(client: Arc<Client>, logger: Logger) -> Self {
        ClientAdapter {
            client,
            provider_id: None,
            confirm_timeout: CONFIRM_TIMEOUT,
            logger,
        }
    }

    /// Connect this provider when nobody is connected, instead of the last used one.
    pub fn with_provider(mut self, provider_id: Option<String>) -> Self {
        self.provider_id = provider_id;
        self
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }
}

#[async_trait]
impl ActionAdapter for ClientAdapter {
    async fn connect(&self, context: &ActionContext) -> Option<IdentityHandle> {
        if let Some(identity) = self.client.identity() {
            return Some(identity);
        }
        let request = ConnectRequest {
            provider_id: self.provider_id.clone(),
            ..Default::default()
        };
        let connect = self.client.connect_async(request);
        tokio::pin!(connect);
        let result = tokio::select! {
            result = &mut connect => result,
            _ = tokio::time::sleep(self.confirm_timeout) => {
                warn!(self.logger, "Still waiting for the wallet to confirm";
                    "action" => %context.action.url, "waited_secs" => self.confirm_timeout.as_secs());
                connect.await
            }
        };
        match result {
            Ok((provider_id, principal)) => {
                debug!(self.logger, "Connected for action"; "provider" => provider_id, "principal" => %principal);
                self.client.identity()
            }
            Err(err) => {
                debug!(self.logger, "No identity for action: {}", err);
                None
            }
        }
    }

    async fn create_actor(
        &self,
        canister_id: Principal,
        interface: ServiceInterface,
        _context: &ActionContext,
    ) -> Result<Arc<dyn Actor>, CreateActorError> {
        self.client.create_actor(canister_id, interface).await
    }
}
