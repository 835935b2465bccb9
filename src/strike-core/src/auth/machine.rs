use crate::connector::ConnectOptions;
use crate::error::auth::AuthError;
use crate::machine::{Input, Machine, Step};
use candid::Principal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    Initializing,
    Idle,
    Connecting,
    Connected,
    Disconnecting,
}

impl AuthState {
    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Initializing => "initializing",
            AuthState::Idle => "idle",
            AuthState::Connecting => "connecting",
            AuthState::Connected => "connected",
            AuthState::Disconnecting => "disconnecting",
        }
    }
}

/// Which provider to connect. Without an id the last used provider is taken.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectRequest {
    pub provider_id: Option<String>,
    pub options: ConnectOptions,
}

impl ConnectRequest {
    pub fn provider(id: impl Into<String>) -> Self {
        ConnectRequest {
            provider_id: Some(id.into()),
            options: ConnectOptions::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    Connect(ConnectRequest),
    CancelConnect,
    Disconnect,
}

/// Written only by the machine. Both fields are set together or not at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub active_provider: Option<String>,
    pub principal: Option<Principal>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub state: AuthState,
    pub context: AuthContext,
}

impl AuthSnapshot {
    pub fn is_connected(&self) -> bool {
        self.state == AuthState::Connected
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOperation {
    /// Initialise every connector and look for one that is already connected.
    Init,
    Connect(ConnectRequest),
    Disconnect { provider_id: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    Initialized(Option<(String, Principal)>),
    Connected {
        provider_id: String,
        principal: Principal,
    },
    Disconnected,
    Failed(AuthError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEmission {
    Connected {
        provider_id: String,
        principal: Principal,
    },
    Disconnected,
    Error(AuthError),
}

#[derive(Debug)]
pub struct AuthMachine {
    state: AuthState,
    context: AuthContext,
}

type AuthStep = Step<AuthOperation, AuthEmission>;

impl AuthMachine {
    pub fn new() -> (Self, AuthOperation) {
        (
            AuthMachine {
                state: AuthState::Initializing,
                context: AuthContext::default(),
            },
            AuthOperation::Init,
        )
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn context(&self) -> &AuthContext {
        &self.context
    }

    fn enter_idle(&mut self) {
        self.state = AuthState::Idle;
        self.context = AuthContext::default();
    }

    fn enter_connected(&mut self, provider_id: String, principal: Principal) -> AuthEmission {
        self.state = AuthState::Connected;
        self.context = AuthContext {
            active_provider: Some(provider_id.clone()),
            principal: Some(principal),
        };
        AuthEmission::Connected {
            provider_id,
            principal,
        }
    }

    fn event(&mut self, event: AuthEvent) -> AuthStep {
        use AuthState::*;
        match (self.state, event) {
            (Idle | Connected, AuthEvent::Connect(request)) => {
                self.state = Connecting;
                Step::to(Some(AuthOperation::Connect(request)))
            }
            (Connecting, AuthEvent::CancelConnect) => {
                self.enter_idle();
                Step::to(None)
                    .cancelling()
                    .emit(AuthEmission::Error(AuthError::Cancelled))
            }
            (Connected, AuthEvent::Disconnect) => match self.context.active_provider.clone() {
                Some(provider_id) => {
                    self.state = Disconnecting;
                    Step::to(Some(AuthOperation::Disconnect { provider_id }))
                }
                None => {
                    self.enter_idle();
                    Step::to(None).emit(AuthEmission::Disconnected)
                }
            },
            _ => Step::ignored(),
        }
    }

    fn done(&mut self, outcome: AuthOutcome) -> AuthStep {
        use AuthState::*;
        match (self.state, outcome) {
            (Initializing, AuthOutcome::Initialized(Some((provider_id, principal)))) => {
                let emission = self.enter_connected(provider_id, principal);
                Step::to(None).emit(emission)
            }
            (Initializing, AuthOutcome::Initialized(None) | AuthOutcome::Failed(_)) => {
                self.enter_idle();
                Step::to(None)
            }
            (
                Connecting,
                AuthOutcome::Connected {
                    provider_id,
                    principal,
                },
            ) => {
                let emission = self.enter_connected(provider_id, principal);
                Step::to(None).emit(emission)
            }
            (Connecting, AuthOutcome::Failed(err)) => {
                self.enter_idle();
                Step::to(None).emit(AuthEmission::Error(err))
            }
            (Disconnecting, AuthOutcome::Disconnected) => {
                self.enter_idle();
                Step::to(None).emit(AuthEmission::Disconnected)
            }
            (Disconnecting, AuthOutcome::Failed(err)) => {
                self.enter_idle();
                Step::to(None)
                    .emit(AuthEmission::Error(err))
                    .emit(AuthEmission::Disconnected)
            }
            _ => Step::ignored(),
        }
    }
}

impl Machine for AuthMachine {
    type Event = AuthEvent;
    type Outcome = AuthOutcome;
    type Operation = AuthOperation;
    type Emission = AuthEmission;
    type Snapshot = AuthSnapshot;

    fn state_name(&self) -> &'static str {
        self.state.name()
    }

    fn handle(&mut self, input: Input<AuthEvent, AuthOutcome>) -> AuthStep {
        match input {
            Input::Event(event) => self.event(event),
            Input::Done(outcome) => self.done(outcome),
        }
    }

    fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            state: self.state,
            context: self.context.clone(),
        }
    }

    fn aborted(reason: String) -> AuthOutcome {
        AuthOutcome::Failed(AuthError::Aborted(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::connector::{ConnectError, DisconnectError};

    fn principal() -> Principal {
        Principal::from_text("2vxsx-fae").unwrap()
    }

    fn idle() -> AuthMachine {
        let (mut machine, operation) = AuthMachine::new();
        assert_eq!(operation, AuthOperation::Init);
        let step = machine.handle(Input::Done(AuthOutcome::Initialized(None)));
        assert!(step.emissions.is_empty());
        machine
    }

    fn connected() -> AuthMachine {
        let mut machine = idle();
        machine.handle(Input::Event(AuthEvent::Connect(ConnectRequest::provider("ii"))));
        machine.handle(Input::Done(AuthOutcome::Connected {
            provider_id: "ii".to_string(),
            principal: principal(),
        }));
        machine
    }

    #[test]
    fn init_resumes_an_existing_session() {
        let (mut machine, _) = AuthMachine::new();
        let step = machine.handle(Input::Done(AuthOutcome::Initialized(Some((
            "ic.plug".to_string(),
            principal(),
        )))));
        assert_eq!(machine.state(), AuthState::Connected);
        assert_eq!(machine.context().active_provider.as_deref(), Some("ic.plug"));
        assert_eq!(
            step.emissions,
            vec![AuthEmission::Connected {
                provider_id: "ic.plug".to_string(),
                principal: principal(),
            }]
        );
    }

    #[test]
    fn events_are_ignored_while_initializing() {
        let (mut machine, _) = AuthMachine::new();
        assert!(machine.handle(Input::Event(AuthEvent::Disconnect)).ignored);
        assert!(machine
            .handle(Input::Event(AuthEvent::Connect(ConnectRequest::default())))
            .ignored);
        assert_eq!(machine.state(), AuthState::Initializing);
    }

    #[test]
    fn connect_stores_provider_and_principal() {
        let machine = connected();
        assert_eq!(machine.state(), AuthState::Connected);
        assert_eq!(
            machine.context(),
            &AuthContext {
                active_provider: Some("ii".to_string()),
                principal: Some(principal()),
            }
        );
    }

    #[test]
    fn failed_connect_returns_to_idle_with_the_raw_error() {
        let mut machine = idle();
        machine.handle(Input::Event(AuthEvent::Connect(ConnectRequest::provider("ic.plug"))));
        let step = machine.handle(Input::Done(AuthOutcome::Failed(AuthError::Connect(
            ConnectError::IsLocked,
        ))));
        assert_eq!(machine.state(), AuthState::Idle);
        assert_eq!(
            step.emissions,
            vec![AuthEmission::Error(AuthError::Connect(ConnectError::IsLocked))]
        );
    }

    #[test]
    fn cancel_only_applies_while_connecting() {
        let mut machine = idle();
        assert!(machine.handle(Input::Event(AuthEvent::CancelConnect)).ignored);

        machine.handle(Input::Event(AuthEvent::Connect(ConnectRequest::provider("ii"))));
        let step = machine.handle(Input::Event(AuthEvent::CancelConnect));
        assert!(step.cancel_pending);
        assert_eq!(machine.state(), AuthState::Idle);

        // A late result from the detached connect changes nothing.
        let late = machine.handle(Input::Done(AuthOutcome::Connected {
            provider_id: "ii".to_string(),
            principal: principal(),
        }));
        assert!(late.ignored);
        assert_eq!(machine.context(), &AuthContext::default());
    }

    #[test]
    fn disconnect_always_ends_idle() {
        let mut machine = connected();
        let step = machine.handle(Input::Event(AuthEvent::Disconnect));
        assert_eq!(
            step.operation,
            Some(AuthOperation::Disconnect {
                provider_id: "ii".to_string()
            })
        );
        let step = machine.handle(Input::Done(AuthOutcome::Failed(AuthError::Disconnect(
            DisconnectError::DisconnectFailed("storage".to_string()),
        ))));
        assert_eq!(machine.state(), AuthState::Idle);
        assert_eq!(machine.context(), &AuthContext::default());
        assert_eq!(step.emissions.last(), Some(&AuthEmission::Disconnected));
    }

    #[test]
    fn connected_can_switch_provider() {
        let mut machine = connected();
        let step = machine.handle(Input::Event(AuthEvent::Connect(ConnectRequest::provider("nfid"))));
        assert_eq!(machine.state(), AuthState::Connecting);
        assert!(matches!(step.operation, Some(AuthOperation::Connect(_))));
    }
}
