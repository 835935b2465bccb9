//! Session keys, delegation chains and the identities built from them.
use candid::Principal;
use ic_agent::Identity;
use std::sync::Arc;

pub mod delegation;
pub mod session;
pub mod session_key;

pub use delegation::DelegationChain;
pub use session::StoredSession;
pub use session_key::SessionKey;

/// The credential a connector hands out after a successful connect.
pub type IdentityHandle = Arc<dyn Identity>;

pub fn principal_of(identity: &dyn Identity) -> Option<Principal> {
    identity.sender().ok()
}

pub(crate) fn now_nanos() -> u64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos).unwrap_or(0)
}
