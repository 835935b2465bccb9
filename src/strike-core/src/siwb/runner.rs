use crate::error::siwb::SiwbError;
use crate::identity::{now_nanos, DelegationChain, IdentityHandle, SessionKey, StoredSession};
use crate::machine::{spawn_machine, MachineHandle, OperationRunner};
use crate::siwb::canister::SiwbIdentityService;
use crate::siwb::machine::{SiwbEmission, SiwbEvent, SiwbMachine, SiwbOperation, SiwbOutcome, SiwbState};
use crate::siwb::types::LoginArgs;
use crate::storage::{KeyValueStorage, KeyValueStorageExt};
use crate::wallet::provider::sign_message_type_for;
use crate::wallet::{register_extension, BitcoinWallet, RelayTransport, WalletProviderKey};
use async_trait::async_trait;
use slog::{debug, info, Logger};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::RecvError;

pub type SiwbHandle = MachineHandle<SiwbMachine>;

/// Performs the wallet, canister and storage work of a SIWB run.
pub struct SiwbRunner {
    transport: Arc<dyn RelayTransport>,
    service: Arc<dyn SiwbIdentityService>,
    storage: Arc<dyn KeyValueStorage>,
    storage_key: String,
    wallets: Mutex<HashMap<WalletProviderKey, Arc<BitcoinWallet>>>,
    logger: Logger,
}

impl SiwbRunner {
    pub fn new(
        transport: Arc<dyn RelayTransport>,
        service: Arc<dyn SiwbIdentityService>,
        storage: Arc<dyn KeyValueStorage>,
        storage_key: String,
        logger: Logger,
    ) -> Self {
        SiwbRunner {
            transport,
            service,
            storage,
            storage_key,
            wallets: Mutex::new(HashMap::new()),
            logger,
        }
    }

    /// Wallets keep the accounts they reported, so one instance per key is reused.
    pub fn wallet(&self, key: WalletProviderKey) -> Arc<BitcoinWallet> {
        self.wallets
            .lock()
            .unwrap()
            .entry(key)
            .or_insert_with(|| {
                Arc::new(BitcoinWallet::new(
                    key,
                    self.transport.clone(),
                    self.logger.new(slog::o!("wallet" => key.as_str())),
                ))
            })
            .clone()
    }

    async fn connect(&self, key: WalletProviderKey) -> SiwbOutcome {
        match register_extension(&self.wallet(key)).await {
            Ok(wallet) => SiwbOutcome::Connected(wallet),
            Err(err) => SiwbOutcome::Failed(SiwbError::WalletDiscovery(err)),
        }
    }

    async fn prepare(&self, address: &str) -> SiwbOutcome {
        match self.service.prepare_login(address).await {
            Ok(message) => SiwbOutcome::Prepared(message),
            Err(err) => SiwbOutcome::Failed(SiwbError::PrepareLoginFailed(err)),
        }
    }

    async fn sign(
        &self,
        key: WalletProviderKey,
        address: &str,
        message: Option<String>,
    ) -> Result<SiwbOutcome, SiwbError> {
        let message = message.ok_or(SiwbError::NoChallenge)?;
        let sign_message_type =
            sign_message_type_for(key, address).map_err(SiwbError::SignFailed)?;
        let wallet = self.wallet(key);
        let signature = wallet
            .sign_message(&message, None)
            .await
            .map_err(SiwbError::SignFailed)?;
        let public_key = wallet
            .get_public_key()
            .await
            .map_err(SiwbError::SignFailed)?;
        Ok(SiwbOutcome::Signed {
            signature,
            public_key,
            sign_message_type,
        })
    }

    async fn authenticate(
        &self,
        address: String,
        signature: String,
        public_key: String,
        sign_message_type: crate::wallet::SignMessageType,
    ) -> Result<SiwbOutcome, SiwbError> {
        // Never reuse a session key across logins.
        let session_key =
            SessionKey::generate().map_err(|err| SiwbError::SessionKeyFailed(err.to_string()))?;
        let args = LoginArgs {
            signature,
            address,
            public_key,
            session_key: session_key.public_key().to_vec(),
            sign_message_type,
        };
        let details = self
            .service
            .login(&args)
            .await
            .map_err(SiwbError::LoginFailed)?;
        let signed = self
            .service
            .get_delegation(&args.address, &args.session_key, details.expiration)
            .await
            .map_err(SiwbError::GetDelegationFailed)?;

        let chain = DelegationChain::from_signed_delegation(signed, details.user_canister_pubkey);
        let identity = chain
            .clone()
            .into_identity(&session_key, now_nanos())
            .map_err(|err| SiwbError::IdentityFailed(err.to_string()))?;

        let session = StoredSession::new(&session_key, &chain, Some(args.address.clone()));
        self.storage
            .set_typed(&self.storage_key, &session)
            .map_err(|err| SiwbError::PersistFailed(err.to_string()))?;
        info!(self.logger, "Signed in with Bitcoin"; "address" => &args.address, "principal" => %chain.principal());

        Ok(SiwbOutcome::Authenticated {
            identity: Arc::new(identity),
            chain,
        })
    }
}

#[async_trait]
impl OperationRunner<SiwbOperation, SiwbOutcome> for SiwbRunner {
    async fn run(&self, operation: SiwbOperation) -> SiwbOutcome {
        match operation {
            SiwbOperation::Init => SiwbOutcome::Initialized,
            SiwbOperation::Connect(key) => self.connect(key).await,
            SiwbOperation::Prepare { address } => self.prepare(&address).await,
            SiwbOperation::Sign {
                provider_key,
                address,
                message,
            } => self
                .sign(provider_key, &address, message)
                .await
                .unwrap_or_else(SiwbOutcome::Failed),
            SiwbOperation::Authenticate {
                address,
                signature,
                public_key,
                sign_message_type,
            } => self
                .authenticate(address, signature, public_key, sign_message_type)
                .await
                .unwrap_or_else(SiwbOutcome::Failed),
        }
    }
}

pub fn spawn_siwb_machine(runner: Arc<SiwbRunner>, logger: Logger) -> SiwbHandle {
    let (machine, initial) = SiwbMachine::new();
    spawn_machine(machine, Some(initial), runner, logger)
}

/// Drives a full sign-in and waits for its terminal emission.
pub async fn sign_in(
    handle: &SiwbHandle,
    key: WalletProviderKey,
    logger: &Logger,
) -> Result<(IdentityHandle, String), SiwbError> {
    let stopped = |_| SiwbError::Aborted("machine stopped".to_string());
    let snapshot = handle
        .wait_for(|snapshot| snapshot.state != SiwbState::Initializing)
        .await
        .map_err(stopped)?;
    if !matches!(snapshot.state, SiwbState::Idle | SiwbState::Authenticated) {
        return Err(SiwbError::Busy);
    }

    let mut emissions = handle.subscribe();
    handle.send(SiwbEvent::Connect(key)).map_err(stopped)?;
    let mut address = None;
    loop {
        match emissions.recv().await {
            Ok(SiwbEmission::Connected(wallet)) => {
                debug!(logger, "Wallet connected"; "address" => &wallet.address);
                address = Some(wallet.address);
            }
            Ok(SiwbEmission::Authenticated(identity)) => {
                let address = address
                    .or_else(|| handle.snapshot().context.address)
                    .unwrap_or_default();
                return Ok((identity, address));
            }
            Ok(SiwbEmission::Error(err)) => return Err(err),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                debug!(logger, "Missed {} SIWB emissions", skipped);
            }
            Err(RecvError::Closed) => {
                return Err(SiwbError::Aborted("machine stopped".to_string()))
            }
        }
    }
}
