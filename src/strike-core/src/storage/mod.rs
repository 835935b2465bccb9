//! Durable key/value state: last used wallet, persisted sessions, toggles.
use crate::error::storage::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Connector id of the wallet that connected most recently.
pub const LAST_CONNECTED_WALLET_KEY: &str = "lastConnectedWalletId";
/// Provider id chosen by the auth machine, used when a connect names none.
pub const LAST_PROVIDER_KEY: &str = "icp:provider";
pub const ENABLED_KEY: &str = "enabled";

pub fn siwb_session_key(connector_id: &str) -> String {
    format!("siwb:{connector_id}")
}

pub fn ic_session_key(connector_id: &str) -> String {
    format!("ic:{connector_id}")
}

pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed accessors on top of the raw JSON values.
pub trait KeyValueStorageExt: KeyValueStorage {
    fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key)? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| StorageError::DecodeFailed(key.to_string(), err)),
        }
    }

    fn set_typed<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)
            .map_err(|err| StorageError::EncodeFailed(key.to_string(), err))?;
        self.set(key, value)
    }

    fn get_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key)?.and_then(|value| match value {
            Value::String(s) => Some(s),
            _ => None,
        }))
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set(key, Value::String(value.to_string()))
    }

    fn is_enabled(&self) -> Result<bool, StorageError> {
        Ok(self.get_typed::<bool>(ENABLED_KEY)?.unwrap_or(true))
    }

    fn set_enabled(&self, enabled: bool) -> Result<(), StorageError> {
        self.set(ENABLED_KEY, Value::Bool(enabled))
    }
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorageExt for T {}

/// File storage under `dir` when one is configured, memory otherwise.
pub fn open_storage(dir: Option<&Path>) -> Result<Arc<dyn KeyValueStorage>, StorageError> {
    Ok(match dir {
        Some(dir) => Arc::new(FileStorage::open(&dir.join("storage.json"))?),
        None => Arc::new(MemoryStorage::default()),
    })
}
