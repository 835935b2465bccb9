//! In-process fakes for the network seams.
use crate::connector::identity_provider::{AuthorizeRequest, IdentityProviderLogin};
use crate::connector::siwb::SiwbServiceFactory;
use crate::connector::{
    Actor, ConnectOptions, Connector, ConnectorKind, ConnectorMeta, DisconnectOptions,
};
use crate::error::connector::{
    ActorCallError, ConnectError, CreateActorError, DisconnectError, InitError,
};
use crate::error::registry::RegistryError;
use crate::error::siwb::SiwbServiceError;
use crate::error::wallet::RelayError;
use crate::identity::delegation::JsonDelegationChain;
use crate::identity::{DelegationChain, IdentityHandle, SessionKey};
use crate::idl::ServiceInterface;
use crate::registry::{RegistryLookup, StrikeRegistry, StrikeStatus};
use crate::security::level::ActionState;
use crate::security::registry::TrustRegistry;
use crate::siwb::types::{LoginArgs, LoginDetails};
use crate::siwb::SiwbIdentityService;
use crate::wallet::relay::{RelayMethod, RelayRequest, RelayTransport};
use async_trait::async_trait;
use candid::{IDLArgs, Principal};
use ic_agent::identity::{Delegation, SignedDelegation};
use serde_json::Value;
use slog::Logger;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn logger() -> Logger {
    Logger::root(slog::Discard, slog::o!())
}

type Responder = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Answers every request of a method with the configured value.
#[derive(Default)]
pub struct FakeRelay {
    responses: Mutex<HashMap<RelayMethod, Responder>>,
    requests: Mutex<Vec<RelayRequest>>,
}

impl FakeRelay {
    pub fn respond(&self, method: RelayMethod, value: Value) {
        self.respond_with(method, move |_| value.clone());
    }

    /// Answers with a value computed from the request payload.
    pub fn respond_with(
        &self,
        method: RelayMethod,
        responder: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) {
        self.responses
            .lock()
            .unwrap()
            .insert(method, Arc::new(responder));
    }

    pub fn requests(&self) -> Vec<RelayRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayTransport for FakeRelay {
    async fn send(&self, request: RelayRequest) -> Result<Value, RelayError> {
        let method = request.method;
        let responder = self.responses.lock().unwrap().get(&method).cloned();
        let response = responder.map(|respond| respond(&request.payload));
        self.requests.lock().unwrap().push(request);
        response.ok_or_else(|| RelayError::Transport(format!("no response for {method}")))
    }
}

/// A SIWB canister that accepts any signature and hands out unexpiring delegations.
#[derive(Default)]
pub struct FakeSiwbService {
    prepare_rejection: Mutex<Option<String>>,
    logins: Mutex<Vec<LoginArgs>>,
}

impl FakeSiwbService {
    pub fn reject_prepare(&self, message: &str) {
        *self.prepare_rejection.lock().unwrap() = Some(message.to_string());
    }

    pub fn logins(&self) -> Vec<LoginArgs> {
        self.logins.lock().unwrap().clone()
    }

    pub fn user_canister_pubkey(&self) -> &'static [u8] {
        &[0x30, 0x3c, 0x30, 0x0c, 0x06, 0x0a, 0x2b, 0x06, 0x01, 0x04, 0x01, 0x83, 0xb8, 0x43, 0x01, 0x02]
    }
}

#[async_trait]
impl SiwbIdentityService for FakeSiwbService {
    async fn prepare_login(&self, _address: &str) -> Result<String, SiwbServiceError> {
        match self.prepare_rejection.lock().unwrap().clone() {
            Some(message) => Err(SiwbServiceError::Rejected(message)),
            None => Ok("challenge".to_string()),
        }
    }

    async fn login(&self, args: &LoginArgs) -> Result<LoginDetails, SiwbServiceError> {
        self.logins.lock().unwrap().push(args.clone());
        Ok(LoginDetails {
            expiration: u64::MAX,
            user_canister_pubkey: self.user_canister_pubkey().to_vec(),
        })
    }

    async fn get_delegation(
        &self,
        _address: &str,
        session_key: &[u8],
        expiration: u64,
    ) -> Result<SignedDelegation, SiwbServiceError> {
        Ok(SignedDelegation {
            delegation: Delegation {
                pubkey: session_key.to_vec(),
                expiration,
                targets: None,
            },
            signature: vec![1; 64],
        })
    }
}

/// Hands the same fake to every SIWB canister id.
pub struct FakeSiwbServices(pub Arc<FakeSiwbService>);

#[async_trait]
impl SiwbServiceFactory for FakeSiwbServices {
    async fn service(
        &self,
        _canister_id: Principal,
    ) -> Result<Arc<dyn SiwbIdentityService>, String> {
        Ok(self.0.clone())
    }
}

/// An unexpiring single-link chain delegating to `session_public_key`.
pub fn json_chain_for(session_public_key: &[u8]) -> JsonDelegationChain {
    let root: Vec<u8> = [0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00]
        .into_iter()
        .chain(std::iter::repeat(5).take(32))
        .collect();
    DelegationChain::from_signed_delegation(
        SignedDelegation {
            delegation: Delegation {
                pubkey: session_public_key.to_vec(),
                expiration: u64::MAX,
                targets: None,
            },
            signature: vec![3; 64],
        },
        root,
    )
    .to_json()
}

/// Approves or declines every authorisation and records the requests.
pub struct FakeProviderLogin {
    approve: bool,
    requests: Mutex<Vec<AuthorizeRequest>>,
}

impl FakeProviderLogin {
    pub fn approving() -> Self {
        FakeProviderLogin {
            approve: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn declining() -> Self {
        FakeProviderLogin {
            approve: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<AuthorizeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProviderLogin for FakeProviderLogin {
    async fn authorize(
        &self,
        request: AuthorizeRequest,
    ) -> Result<Option<JsonDelegationChain>, String> {
        let chain = json_chain_for(&request.session_public_key);
        self.requests.lock().unwrap().push(request);
        Ok(self.approve.then_some(chain))
    }
}

/// Registry entries by canister id, all owned by the anonymous principal.
#[derive(Default)]
pub struct FakeRegistry {
    statuses: Mutex<HashMap<Principal, StrikeStatus>>,
    failing: Mutex<bool>,
}

impl FakeRegistry {
    pub fn set_status(&self, canister_id: &str, status: StrikeStatus) {
        let principal = Principal::from_text(canister_id).unwrap();
        self.statuses.lock().unwrap().insert(principal, status);
    }

    pub fn fail_lookups(&self) {
        *self.failing.lock().unwrap() = true;
    }
}

#[async_trait]
impl RegistryLookup for FakeRegistry {
    async fn get_strike_by_canister_id(
        &self,
        canister_id: Principal,
    ) -> Result<Option<StrikeRegistry>, RegistryError> {
        if *self.failing.lock().unwrap() {
            return Err(RegistryError::Rejected(
                "get_strike_by_canister_id",
                "unavailable".to_string(),
            ));
        }
        let status = self.statuses.lock().unwrap().get(&canister_id).copied();
        Ok(status.map(|status| StrikeRegistry {
            canister_id,
            module_hash: None,
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            telegram: None,
            twitter: None,
            project_name: "Test".to_string(),
            description: String::new(),
            website_url: None,
            created_at: 0,
            added_by: Principal::anonymous(),
            status,
        }))
    }
}

fn fresh_identity() -> IdentityHandle {
    SessionKey::generate().unwrap().identity()
}

/// A connector whose connect succeeds with a fresh key unless told otherwise.
/// Actors it creates answer every call with the configured reply.
pub struct FakeConnector {
    meta: ConnectorMeta,
    kind: ConnectorKind,
    identity: Mutex<Option<IdentityHandle>>,
    connect_error: Mutex<Option<ConnectError>>,
    connect_delay: Mutex<Option<Duration>>,
    disconnect_delay: Mutex<Option<Duration>>,
    init_calls: AtomicUsize,
    connect_calls: AtomicUsize,
    reply: Mutex<Result<IDLArgs, String>>,
    calls: Arc<Mutex<Vec<(String, IDLArgs)>>>,
}

impl FakeConnector {
    pub fn new(kind: ConnectorKind) -> Self {
        FakeConnector {
            meta: kind.meta(),
            kind,
            identity: Mutex::new(None),
            connect_error: Mutex::new(None),
            connect_delay: Mutex::new(None),
            disconnect_delay: Mutex::new(None),
            init_calls: AtomicUsize::new(0),
            connect_calls: AtomicUsize::new(0),
            reply: Mutex::new(Ok(IDLArgs::new(&[]))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn connected(kind: ConnectorKind) -> Self {
        let connector = Self::new(kind);
        *connector.identity.lock().unwrap() = Some(fresh_identity());
        connector
    }

    pub fn fail_with(&self, err: ConnectError) {
        *self.connect_error.lock().unwrap() = Some(err);
    }

    pub fn delay_connect(&self, delay: Duration) {
        *self.connect_delay.lock().unwrap() = Some(delay);
    }

    pub fn delay_disconnect(&self, delay: Duration) {
        *self.disconnect_delay.lock().unwrap() = Some(delay);
    }

    pub fn reply_with(&self, reply: Result<IDLArgs, String>) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<(String, IDLArgs)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    fn meta(&self) -> &ConnectorMeta {
        &self.meta
    }

    fn kind(&self) -> ConnectorKind {
        self.kind
    }

    async fn init(&self) -> Result<(), InitError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.identity.lock().unwrap().is_some()
    }

    async fn connect(&self, _options: &ConnectOptions) -> Result<bool, ConnectError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.connect_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.connect_error.lock().unwrap().clone() {
            return Err(err);
        }
        *self.identity.lock().unwrap() = Some(fresh_identity());
        Ok(true)
    }

    async fn disconnect(&self, _options: &DisconnectOptions) -> Result<bool, DisconnectError> {
        let delay = *self.disconnect_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        *self.identity.lock().unwrap() = None;
        Ok(true)
    }

    async fn create_actor(
        &self,
        canister_id: Principal,
        interface: ServiceInterface,
    ) -> Result<Arc<dyn Actor>, CreateActorError> {
        if self.identity.lock().unwrap().is_none() {
            return Err(CreateActorError::NotInitialized);
        }
        Ok(Arc::new(FakeActor {
            canister_id,
            interface,
            reply: self.reply.lock().unwrap().clone(),
            calls: self.calls.clone(),
        }))
    }

    fn identity(&self) -> Option<IdentityHandle> {
        self.identity.lock().unwrap().clone()
    }
}

pub struct FakeActor {
    canister_id: Principal,
    interface: ServiceInterface,
    reply: Result<IDLArgs, String>,
    calls: Arc<Mutex<Vec<(String, IDLArgs)>>>,
}

#[async_trait]
impl Actor for FakeActor {
    fn canister_id(&self) -> Principal {
        self.canister_id
    }

    fn interface(&self) -> &ServiceInterface {
        &self.interface
    }

    async fn call(&self, method: &str, args: IDLArgs) -> Result<IDLArgs, ActorCallError> {
        if self.interface.method(method).is_none() {
            return Err(ActorCallError::MethodNotFound(method.to_string()));
        }
        self.calls.lock().unwrap().push((method.to_string(), args));
        self.reply.clone().map_err(|message| {
            ActorCallError::CallFailed(method.to_string(), ic_agent::AgentError::MessageError(message))
        })
    }
}

/// Classifies every action as configured; origins are unknown.
pub struct FakeTrust {
    action: Mutex<ActionState>,
}

impl FakeTrust {
    pub fn new(action: ActionState) -> Self {
        FakeTrust {
            action: Mutex::new(action),
        }
    }

    pub fn set_action(&self, state: ActionState) {
        *self.action.lock().unwrap() = state;
    }
}

#[async_trait]
impl TrustRegistry for FakeTrust {
    async fn action_state(&self, _canister_id: &str) -> ActionState {
        *self.action.lock().unwrap()
    }

    fn website_state(&self, _host: &str) -> ActionState {
        ActionState::Unknown
    }

    fn interstitial_state(&self, _host: &str) -> ActionState {
        ActionState::Unknown
    }
}
