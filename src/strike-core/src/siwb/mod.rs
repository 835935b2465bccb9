//! Sign-In With Bitcoin: a wallet signature turned into a delegated identity.
pub mod canister;
pub mod machine;
pub mod runner;
pub mod types;

pub use canister::{SiwbCanister, SiwbIdentityService};
pub use machine::{
    SiwbContext, SiwbEmission, SiwbEvent, SiwbMachine, SiwbOperation, SiwbOutcome, SiwbSnapshot,
    SiwbState,
};
pub use runner::{sign_in, spawn_siwb_machine, SiwbHandle, SiwbRunner};
