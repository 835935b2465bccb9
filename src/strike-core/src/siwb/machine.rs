use crate::error::siwb::SiwbError;
use crate::identity::{DelegationChain, IdentityHandle};
use crate::machine::{Input, Machine, Step};
use crate::wallet::{NetworkItem, RegisteredWallet, SignMessageType, WalletProviderKey};
use candid::Principal;
use ic_agent::Identity;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiwbState {
    Initializing,
    Idle,
    Connecting,
    Preparing,
    Signing,
    Authenticating,
    Authenticated,
}

impl SiwbState {
    pub fn name(&self) -> &'static str {
        match self {
            SiwbState::Initializing => "initializing",
            SiwbState::Idle => "idle",
            SiwbState::Connecting => "connecting",
            SiwbState::Preparing => "preparing",
            SiwbState::Signing => "signing",
            SiwbState::Authenticating => "authenticating",
            SiwbState::Authenticated => "authenticated",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SiwbEvent {
    Connect(WalletProviderKey),
    /// Sign the current challenge again without reconnecting the wallet.
    Sign,
}

/// Fields are filled strictly in pipeline order and cleared on every connect.
#[derive(Clone, Default)]
pub struct SiwbContext {
    pub provider_key: Option<WalletProviderKey>,
    pub address: Option<String>,
    pub network: Option<NetworkItem>,
    pub connected: bool,
    pub siwb_message: Option<String>,
    pub signature: Option<String>,
    pub public_key: Option<String>,
    pub sign_message_type: Option<SignMessageType>,
    pub delegation_chain: Option<DelegationChain>,
    pub identity: Option<IdentityHandle>,
}

impl fmt::Debug for SiwbContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiwbContext")
            .field("provider_key", &self.provider_key)
            .field("address", &self.address)
            .field("network", &self.network)
            .field("connected", &self.connected)
            .field("siwb_message", &self.siwb_message.is_some())
            .field("signature", &self.signature.is_some())
            .field("sign_message_type", &self.sign_message_type)
            .field("identity", &self.principal())
            .finish()
    }
}

impl SiwbContext {
    pub fn principal(&self) -> Option<Principal> {
        self.identity.as_ref().and_then(|identity| identity.sender().ok())
    }
}

#[derive(Clone, Debug)]
pub struct SiwbSnapshot {
    pub state: SiwbState,
    pub context: SiwbContext,
}

/// Side effects the machine asks for; one per busy state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SiwbOperation {
    Init,
    Connect(WalletProviderKey),
    Prepare {
        address: String,
    },
    Sign {
        provider_key: WalletProviderKey,
        address: String,
        message: Option<String>,
    },
    Authenticate {
        address: String,
        signature: String,
        public_key: String,
        sign_message_type: SignMessageType,
    },
}

pub enum SiwbOutcome {
    Initialized,
    Connected(RegisteredWallet),
    Prepared(String),
    Signed {
        signature: String,
        public_key: String,
        sign_message_type: SignMessageType,
    },
    Authenticated {
        identity: IdentityHandle,
        chain: DelegationChain,
    },
    Failed(SiwbError),
}

#[derive(Clone)]
pub enum SiwbEmission {
    Connected(RegisteredWallet),
    SignDataPrepared(String),
    SignatureSettled {
        signature: String,
        public_key: String,
        sign_message_type: SignMessageType,
    },
    Authenticated(IdentityHandle),
    Error(SiwbError),
}

impl fmt::Debug for SiwbEmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiwbEmission::Connected(wallet) => f.debug_tuple("Connected").field(wallet).finish(),
            SiwbEmission::SignDataPrepared(_) => f.write_str("SignDataPrepared"),
            SiwbEmission::SignatureSettled {
                sign_message_type, ..
            } => f
                .debug_struct("SignatureSettled")
                .field("sign_message_type", sign_message_type)
                .finish_non_exhaustive(),
            SiwbEmission::Authenticated(identity) => f
                .debug_tuple("Authenticated")
                .field(&identity.sender().ok())
                .finish(),
            SiwbEmission::Error(err) => f.debug_tuple("Error").field(err).finish(),
        }
    }
}

#[derive(Debug)]
pub struct SiwbMachine {
    state: SiwbState,
    context: SiwbContext,
}

impl Default for SiwbMachine {
    fn default() -> Self {
        SiwbMachine {
            state: SiwbState::Initializing,
            context: SiwbContext::default(),
        }
    }
}

type SiwbStep = Step<SiwbOperation, SiwbEmission>;

impl SiwbMachine {
    /// A fresh machine and the operation of its initial state.
    pub fn new() -> (Self, SiwbOperation) {
        (SiwbMachine::default(), SiwbOperation::Init)
    }

    pub fn state(&self) -> SiwbState {
        self.state
    }

    pub fn context(&self) -> &SiwbContext {
        &self.context
    }

    fn event(&mut self, event: SiwbEvent) -> SiwbStep {
        use SiwbState::*;
        match (self.state, event) {
            (Idle | Authenticated, SiwbEvent::Connect(provider_key)) => {
                self.context = SiwbContext {
                    provider_key: Some(provider_key),
                    ..SiwbContext::default()
                };
                self.state = Connecting;
                Step::to(Some(SiwbOperation::Connect(provider_key)))
            }
            (Idle | Authenticated, SiwbEvent::Sign) if self.context.connected => {
                match (&self.context.provider_key, &self.context.address) {
                    (Some(provider_key), Some(address)) => {
                        let operation = SiwbOperation::Sign {
                            provider_key: *provider_key,
                            address: address.clone(),
                            message: self.context.siwb_message.clone(),
                        };
                        self.state = Signing;
                        Step::to(Some(operation))
                    }
                    _ => Step::ignored(),
                }
            }
            _ => Step::ignored(),
        }
    }

    fn done(&mut self, outcome: SiwbOutcome) -> SiwbStep {
        use SiwbState::*;
        match (self.state, outcome) {
            (Initializing, SiwbOutcome::Initialized) => {
                self.state = Idle;
                Step::to(None)
            }
            (Initializing, SiwbOutcome::Failed(_)) => {
                self.state = Idle;
                Step::to(None)
            }
            (Connecting, SiwbOutcome::Connected(wallet)) => {
                self.context.provider_key = Some(wallet.provider_key);
                self.context.address = Some(wallet.address.clone());
                self.context.network = Some(wallet.network);
                self.context.connected = true;
                self.state = Preparing;
                Step::to(Some(SiwbOperation::Prepare {
                    address: wallet.address.clone(),
                }))
                .emit(SiwbEmission::Connected(wallet))
            }
            (Preparing, SiwbOutcome::Prepared(message)) => {
                self.context.siwb_message = Some(message.clone());
                let operation = match (&self.context.provider_key, &self.context.address) {
                    (Some(provider_key), Some(address)) => SiwbOperation::Sign {
                        provider_key: *provider_key,
                        address: address.clone(),
                        message: Some(message.clone()),
                    },
                    _ => return self.fail(SiwbError::Aborted("wallet context lost".to_string())),
                };
                self.state = Signing;
                Step::to(Some(operation)).emit(SiwbEmission::SignDataPrepared(message))
            }
            (
                Signing,
                SiwbOutcome::Signed {
                    signature,
                    public_key,
                    sign_message_type,
                },
            ) => {
                let Some(address) = self.context.address.clone() else {
                    return self.fail(SiwbError::Aborted("wallet context lost".to_string()));
                };
                self.context.signature = Some(signature.clone());
                self.context.public_key = Some(public_key.clone());
                self.context.sign_message_type = Some(sign_message_type);
                self.state = Authenticating;
                Step::to(Some(SiwbOperation::Authenticate {
                    address,
                    signature: signature.clone(),
                    public_key: public_key.clone(),
                    sign_message_type,
                }))
                .emit(SiwbEmission::SignatureSettled {
                    signature,
                    public_key,
                    sign_message_type,
                })
            }
            (Authenticating, SiwbOutcome::Authenticated { identity, chain }) => {
                self.context.delegation_chain = Some(chain);
                self.context.identity = Some(identity.clone());
                self.state = Authenticated;
                Step::to(None).emit(SiwbEmission::Authenticated(identity))
            }
            (Connecting | Preparing | Signing | Authenticating, SiwbOutcome::Failed(err)) => {
                self.fail(err)
            }
            _ => Step::ignored(),
        }
    }

    fn fail(&mut self, err: SiwbError) -> SiwbStep {
        self.state = SiwbState::Idle;
        Step::to(None).emit(SiwbEmission::Error(err))
    }
}

impl Machine for SiwbMachine {
    type Event = SiwbEvent;
    type Outcome = SiwbOutcome;
    type Operation = SiwbOperation;
    type Emission = SiwbEmission;
    type Snapshot = SiwbSnapshot;

    fn state_name(&self) -> &'static str {
        self.state.name()
    }

    fn handle(&mut self, input: Input<SiwbEvent, SiwbOutcome>) -> SiwbStep {
        match input {
            Input::Event(event) => self.event(event),
            Input::Done(outcome) => self.done(outcome),
        }
    }

    fn snapshot(&self) -> SiwbSnapshot {
        SiwbSnapshot {
            state: self.state,
            context: self.context.clone(),
        }
    }

    fn aborted(reason: String) -> SiwbOutcome {
        SiwbOutcome::Failed(SiwbError::Aborted(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::wallet::WalletError;
    use crate::identity::delegation::tests::chain_for;
    use crate::identity::SessionKey;
    use std::sync::Arc;

    const ADDRESS: &str = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq";

    fn registered() -> RegisteredWallet {
        RegisteredWallet {
            provider_key: WalletProviderKey::Unisat,
            address: ADDRESS.to_string(),
            addresses: vec![ADDRESS.to_string()],
            network: NetworkItem::MAINNET,
        }
    }

    fn idle_machine() -> SiwbMachine {
        let (mut machine, operation) = SiwbMachine::new();
        assert_eq!(operation, SiwbOperation::Init);
        machine.handle(Input::Done(SiwbOutcome::Initialized));
        assert_eq!(machine.state(), SiwbState::Idle);
        machine
    }

    fn signed() -> SiwbOutcome {
        SiwbOutcome::Signed {
            signature: "sig".to_string(),
            public_key: "02ab".to_string(),
            sign_message_type: SignMessageType::Ecdsa,
        }
    }

    #[test]
    fn happy_path_fills_context_in_order() {
        let mut machine = idle_machine();

        let step = machine.handle(Input::Event(SiwbEvent::Connect(WalletProviderKey::Unisat)));
        assert_eq!(
            step.operation,
            Some(SiwbOperation::Connect(WalletProviderKey::Unisat))
        );
        assert_eq!(machine.state(), SiwbState::Connecting);
        assert!(machine.context().address.is_none());

        let step = machine.handle(Input::Done(SiwbOutcome::Connected(registered())));
        assert!(matches!(step.emissions[..], [SiwbEmission::Connected(_)]));
        assert_eq!(
            step.operation,
            Some(SiwbOperation::Prepare {
                address: ADDRESS.to_string()
            })
        );
        assert!(machine.context().siwb_message.is_none());

        let step = machine.handle(Input::Done(SiwbOutcome::Prepared("challenge".to_string())));
        assert!(matches!(
            &step.emissions[..],
            [SiwbEmission::SignDataPrepared(m)] if m == "challenge"
        ));
        assert_eq!(machine.state(), SiwbState::Signing);
        assert!(machine.context().signature.is_none());

        let step = machine.handle(Input::Done(signed()));
        assert!(matches!(
            step.operation,
            Some(SiwbOperation::Authenticate { .. })
        ));
        assert_eq!(machine.state(), SiwbState::Authenticating);
        assert!(machine.context().identity.is_none());

        let key = SessionKey::generate().unwrap();
        let chain = chain_for(&key, u64::MAX);
        let identity: IdentityHandle = Arc::new(chain.clone().into_identity(&key, 0).unwrap());
        let step = machine.handle(Input::Done(SiwbOutcome::Authenticated {
            identity,
            chain: chain.clone(),
        }));
        assert!(matches!(step.emissions[..], [SiwbEmission::Authenticated(_)]));
        assert_eq!(machine.state(), SiwbState::Authenticated);
        assert_eq!(machine.context().principal(), Some(chain.principal()));
    }

    #[test]
    fn failure_in_any_busy_state_returns_to_idle() {
        let mut machine = idle_machine();
        machine.handle(Input::Event(SiwbEvent::Connect(WalletProviderKey::Unisat)));
        let step = machine.handle(Input::Done(SiwbOutcome::Failed(SiwbError::WalletDiscovery(
            WalletError::NoAccounts,
        ))));
        assert_eq!(machine.state(), SiwbState::Idle);
        assert!(matches!(step.emissions[..], [SiwbEmission::Error(_)]));

        machine.handle(Input::Event(SiwbEvent::Connect(WalletProviderKey::Unisat)));
        machine.handle(Input::Done(SiwbOutcome::Connected(registered())));
        machine.handle(Input::Done(SiwbOutcome::Failed(SiwbError::NoChallenge)));
        assert_eq!(machine.state(), SiwbState::Idle);
        assert!(machine.context().connected);
    }

    #[test]
    fn connect_while_busy_is_ignored() {
        let mut machine = idle_machine();
        machine.handle(Input::Event(SiwbEvent::Connect(WalletProviderKey::Unisat)));
        let step = machine.handle(Input::Event(SiwbEvent::Connect(WalletProviderKey::Wizz)));
        assert!(step.ignored);
        assert_eq!(
            machine.context().provider_key,
            Some(WalletProviderKey::Unisat)
        );
    }

    #[test]
    fn sign_requires_a_connected_wallet() {
        let mut machine = idle_machine();
        assert!(machine.handle(Input::Event(SiwbEvent::Sign)).ignored);

        machine.handle(Input::Event(SiwbEvent::Connect(WalletProviderKey::Unisat)));
        machine.handle(Input::Done(SiwbOutcome::Connected(registered())));
        machine.handle(Input::Done(SiwbOutcome::Prepared("challenge".to_string())));
        machine.handle(Input::Done(SiwbOutcome::Failed(SiwbError::SignFailed(
            WalletError::UserRejected,
        ))));
        assert_eq!(machine.state(), SiwbState::Idle);

        let step = machine.handle(Input::Event(SiwbEvent::Sign));
        assert_eq!(machine.state(), SiwbState::Signing);
        assert_eq!(
            step.operation,
            Some(SiwbOperation::Sign {
                provider_key: WalletProviderKey::Unisat,
                address: ADDRESS.to_string(),
                message: Some("challenge".to_string()),
            })
        );
    }

    #[test]
    fn reconnect_clears_previous_context() {
        let mut machine = idle_machine();
        machine.handle(Input::Event(SiwbEvent::Connect(WalletProviderKey::Unisat)));
        machine.handle(Input::Done(SiwbOutcome::Connected(registered())));
        machine.handle(Input::Done(SiwbOutcome::Prepared("challenge".to_string())));
        machine.handle(Input::Done(SiwbOutcome::Failed(SiwbError::NoChallenge)));

        machine.handle(Input::Event(SiwbEvent::Connect(WalletProviderKey::Wizz)));
        let context = machine.context();
        assert_eq!(context.provider_key, Some(WalletProviderKey::Wizz));
        assert!(context.address.is_none());
        assert!(context.siwb_message.is_none());
        assert!(!context.connected);
    }

    #[test]
    fn stale_outcomes_are_ignored() {
        let mut machine = idle_machine();
        assert!(machine
            .handle(Input::Done(SiwbOutcome::Prepared("late".to_string())))
            .ignored);
        assert_eq!(machine.state(), SiwbState::Idle);
    }
}
