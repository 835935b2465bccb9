//! Which provider is connected, and the transitions between providers.
pub mod machine;
pub mod runner;

pub use machine::{
    AuthContext, AuthEmission, AuthEvent, AuthMachine, AuthOperation, AuthOutcome, AuthSnapshot,
    AuthState, ConnectRequest,
};
pub use runner::{spawn_auth_machine, wait_for_connected, AuthHandle, AuthRunner};
