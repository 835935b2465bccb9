use super::KeyValueStorage;
use crate::error::storage::StorageError;
use crate::json::{load_json_file, save_json_file};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A single JSON object on disk; every mutation is written through.
///
/// Sessions carry private keys, so the file is kept readable by its owner only.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl FileStorage {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let entries = if path.exists() {
            load_json_file(path).map_err(StorageError::LoadFailed)?
        } else {
            BTreeMap::new()
        };
        Ok(FileStorage {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Memory only changes once the new contents are on disk.
    fn update<F: FnOnce(&mut BTreeMap<String, Value>)>(&self, f: F) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        let mut updated = entries.clone();
        f(&mut updated);
        save_json_file(&self.path, &updated).map_err(StorageError::SaveFailed)?;
        crate::fs::restrict_to_owner(&self.path).map_err(StorageError::RestrictFailed)?;
        *entries = updated;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStorageExt, LAST_CONNECTED_WALLET_KEY};

    #[test]
    fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage
            .set_string(LAST_CONNECTED_WALLET_KEY, "unisat")
            .unwrap();
        storage.set_enabled(false).unwrap();
        drop(storage);

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(
            storage.get_string(LAST_CONNECTED_WALLET_KEY).unwrap(),
            Some("unisat".to_string())
        );
        assert!(!storage.is_enabled().unwrap());

        storage.remove(LAST_CONNECTED_WALLET_KEY).unwrap();
        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get_string(LAST_CONNECTED_WALLET_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::LoadFailed(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn sessions_are_readable_by_the_owner_only() {
        use crate::identity::delegation::tests::chain_for;
        use crate::identity::{SessionKey, StoredSession};
        use crate::storage::siwb_session_key;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let storage = FileStorage::open(&path).unwrap();
        let key = SessionKey::generate().unwrap();
        let session = StoredSession::new(&key, &chain_for(&key, u64::MAX), None);
        storage
            .set_typed(&siwb_session_key("unisat"), &session)
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let storage = FileStorage::open(&path).unwrap();
        storage
            .set_string(LAST_CONNECTED_WALLET_KEY, "unisat")
            .unwrap();

        // A directory where the file should be makes every save fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(matches!(
            storage.set_string(LAST_CONNECTED_WALLET_KEY, "wizz"),
            Err(StorageError::SaveFailed(_))
        ));
        assert!(storage.remove(LAST_CONNECTED_WALLET_KEY).is_err());
        assert_eq!(
            storage.get_string(LAST_CONNECTED_WALLET_KEY).unwrap(),
            Some("unisat".to_string())
        );
    }

    #[test]
    fn enabled_defaults_to_true() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(&dir.path().join("storage.json")).unwrap();
        assert!(storage.is_enabled().unwrap());
    }
}
