//! Wallet connection and action execution for STRIKE.
//!
//! The crate is organised leaf-first: wallet relays and identity helpers at
//! the bottom, connectors on top of them, the two connection state machines
//! (`siwb` and `auth`) driving the connectors, and the [`client::Client`]
//! façade that the action [`execution`] pipeline talks to.
pub mod action;
pub mod auth;
pub mod client;
pub mod config;
pub mod connector;
pub mod environment;
pub mod error;
pub mod execution;
pub mod fs;
pub mod http;
pub mod identity;
pub mod idl;
pub mod json;
pub mod machine;
pub mod network;
pub mod registry;
pub mod security;
pub mod siwb;
pub mod storage;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;
