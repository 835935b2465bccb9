use crate::auth::machine::{
    AuthEmission, AuthMachine, AuthOperation, AuthOutcome, ConnectRequest,
};
use crate::connector::{Connector, DisconnectOptions};
use crate::error::auth::AuthError;
use crate::machine::{spawn_machine, MachineHandle, OperationRunner};
use crate::storage::{KeyValueStorage, KeyValueStorageExt, LAST_PROVIDER_KEY};
use async_trait::async_trait;
use candid::Principal;
use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use slog::{debug, info, warn, Logger};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

pub type AuthHandle = MachineHandle<AuthMachine>;

/// Talks to the registered connectors on behalf of the auth machine.
pub struct AuthRunner {
    connectors: Vec<Arc<dyn Connector>>,
    storage: Arc<dyn KeyValueStorage>,
    resume_sessions: bool,
    logger: Logger,
}

impl AuthRunner {
    pub fn new(
        connectors: Vec<Arc<dyn Connector>>,
        storage: Arc<dyn KeyValueStorage>,
        logger: Logger,
    ) -> Self {
        AuthRunner {
            connectors,
            storage,
            resume_sessions: true,
            logger,
        }
    }

    /// When off, start always ends idle even if a connector kept a session.
    pub fn with_session_resume(mut self, resume: bool) -> Self {
        self.resume_sessions = resume;
        self
    }

    pub fn connectors(&self) -> &[Arc<dyn Connector>] {
        &self.connectors
    }

    pub fn connector(&self, id: &str) -> Option<Arc<dyn Connector>> {
        self.connectors
            .iter()
            .find(|connector| connector.id() == id)
            .cloned()
    }

    /// The first connector to report an existing session wins.
    async fn init(&self) -> AuthOutcome {
        for result in join_all(self.connectors.iter().map(|connector| connector.init())).await {
            if let Err(err) = result {
                warn!(self.logger, "{}", err);
            }
        }
        if !self.resume_sessions {
            return AuthOutcome::Initialized(None);
        }

        let mut checks: FuturesUnordered<_> = self
            .connectors
            .iter()
            .map(|connector| async move { connector.is_connected().await.then_some(connector) })
            .collect();
        while let Some(checked) = checks.next().await {
            let Some(connector) = checked else { continue };
            match connector.principal() {
                Some(principal) => {
                    info!(self.logger, "Resumed session"; "provider" => connector.id(), "principal" => %principal);
                    return AuthOutcome::Initialized(Some((connector.id().to_string(), principal)));
                }
                None => debug!(self.logger, "Connected without an identity"; "provider" => connector.id()),
            }
        }
        AuthOutcome::Initialized(None)
    }

    async fn connect(&self, request: ConnectRequest) -> Result<AuthOutcome, AuthError> {
        let provider_id = match request.provider_id {
            Some(id) => id,
            None => self
                .storage
                .get_string(LAST_PROVIDER_KEY)
                .ok()
                .flatten()
                .ok_or(AuthError::NoProviderSelected)?,
        };
        let connector = self
            .connector(&provider_id)
            .ok_or_else(|| AuthError::UnknownProvider(provider_id.clone()))?;

        if !connector.connect(&request.options).await? {
            return Err(AuthError::Cancelled);
        }
        let principal = connector
            .principal()
            .ok_or_else(|| AuthError::MissingIdentity(provider_id.clone()))?;

        if let Err(err) = self.storage.set_string(LAST_PROVIDER_KEY, &provider_id) {
            warn!(self.logger, "Failed to remember the provider: {}", err);
        }
        Ok(AuthOutcome::Connected {
            provider_id,
            principal,
        })
    }

    async fn disconnect(&self, provider_id: &str) -> Result<AuthOutcome, AuthError> {
        let connector = self
            .connector(provider_id)
            .ok_or_else(|| AuthError::UnknownProvider(provider_id.to_string()))?;
        connector.disconnect(&DisconnectOptions::default()).await?;
        Ok(AuthOutcome::Disconnected)
    }
}

#[async_trait]
impl OperationRunner<AuthOperation, AuthOutcome> for AuthRunner {
    async fn run(&self, operation: AuthOperation) -> AuthOutcome {
        let result = match operation {
            AuthOperation::Init => return self.init().await,
            AuthOperation::Connect(request) => self.connect(request).await,
            AuthOperation::Disconnect { provider_id } => self.disconnect(&provider_id).await,
        };
        result.unwrap_or_else(AuthOutcome::Failed)
    }
}

pub fn spawn_auth_machine(runner: Arc<AuthRunner>, logger: Logger) -> AuthHandle {
    let (machine, initial) = AuthMachine::new();
    spawn_machine(machine, Some(initial), runner, logger)
}

/// Waits for the terminal emission of a connect that was just sent on
/// `emissions`.
pub async fn wait_for_connected(
    emissions: &mut tokio::sync::broadcast::Receiver<AuthEmission>,
    logger: &Logger,
) -> Result<(String, Principal), AuthError> {
    loop {
        match emissions.recv().await {
            Ok(AuthEmission::Connected {
                provider_id,
                principal,
            }) => return Ok((provider_id, principal)),
            Ok(AuthEmission::Error(err)) => return Err(err),
            Ok(AuthEmission::Disconnected) => {}
            Err(RecvError::Lagged(skipped)) => {
                debug!(logger, "Missed {} auth emissions", skipped);
            }
            Err(RecvError::Closed) => return Err(AuthError::MachineStopped),
        }
    }
}
