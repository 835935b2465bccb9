use crate::identity::{now_nanos, IdentityHandle};
use std::sync::Mutex;

/// The identity a connector currently holds. Only connect, disconnect and
/// init write it.
#[derive(Default)]
pub(crate) struct SessionSlot {
    inner: Mutex<SlotState>,
}

#[derive(Default)]
struct SlotState {
    initialized: bool,
    identity: Option<IdentityHandle>,
    /// Nanoseconds since the epoch; `None` never expires.
    expiration: Option<u64>,
}

impl SessionSlot {
    pub fn mark_initialized(&self) -> bool {
        let mut state = self.inner.lock().unwrap();
        let first = !state.initialized;
        state.initialized = true;
        first
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.lock().unwrap().initialized
    }

    pub fn set(&self, identity: IdentityHandle, expiration: Option<u64>) {
        let mut state = self.inner.lock().unwrap();
        state.identity = Some(identity);
        state.expiration = expiration;
    }

    pub fn clear(&self) -> bool {
        let mut state = self.inner.lock().unwrap();
        state.expiration = None;
        state.identity.take().is_some()
    }

    pub fn identity(&self) -> Option<IdentityHandle> {
        self.inner.lock().unwrap().identity.clone()
    }

    /// The identity if it has not expired yet. An expired one is dropped.
    pub fn valid_identity(&self) -> Option<IdentityHandle> {
        let mut state = self.inner.lock().unwrap();
        if state.expiration.is_some_and(|expiration| expiration <= now_nanos()) {
            state.identity = None;
            state.expiration = None;
        }
        state.identity.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ic_agent::identity::AnonymousIdentity;
    use std::sync::Arc;

    #[test]
    fn expired_identities_are_dropped() {
        let slot = SessionSlot::default();
        assert!(slot.mark_initialized());
        assert!(!slot.mark_initialized());

        slot.set(Arc::new(AnonymousIdentity), Some(1));
        assert!(slot.identity().is_some());
        assert!(slot.valid_identity().is_none());
        assert!(slot.identity().is_none());

        slot.set(Arc::new(AnonymousIdentity), None);
        assert!(slot.valid_identity().is_some());
        assert!(slot.clear());
        assert!(!slot.clear());
    }
}
