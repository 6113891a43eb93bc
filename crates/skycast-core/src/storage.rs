//! File-backed key-value store.
//!
//! Each key maps to one JSON file under a root directory, so values
//! survive restarts and stay human-inspectable.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Durable string-keyed JSON storage.
///
/// Construct one instance at startup and pass it by reference to whatever
/// needs it; keys are scoped to the root directory.
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|e| StorageError::Directory(e.to_string()))?;
        Ok(Self { root: dir.to_path_buf() })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Read and deserialize the value stored under `key`.
    ///
    /// An absent key is `Ok(None)`, never an error. A present but
    /// malformed value is reported as `Corrupt`; the caller decides
    /// whether to clear it.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(|e| StorageError::Read {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let value = serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(Some(value))
    }

    /// Serialize and write `value` under `key`, replacing any previous value.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        fs::write(self.key_path(key), json).map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!("Stored value under key: {}", key);
        Ok(())
    }

    /// Delete the value under `key` if present.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StorageError::Write {
                key: key.to_string(),
                message: e.to_string(),
            })?;
            tracing::debug!("Removed key: {}", key);
        }
        Ok(())
    }

    /// Whether a value exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.key_path(key).exists()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_set_and_get_roundtrip() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let value = Sample { name: "Warsaw".into(), count: 3 };
        store.set("sample", &value).unwrap();

        let loaded: Option<Sample> = store.get("sample").unwrap();
        assert_eq!(loaded, Some(value));
    }

    #[test]
    fn test_absent_key_is_none() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let loaded: Option<Sample> = store.get("missing").unwrap();
        assert!(loaded.is_none());
        assert!(!store.contains("missing"));
    }

    #[test]
    fn test_remove_deletes_value() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        store.set("key", &"value").unwrap();
        assert!(store.contains("key"));

        store.remove("key").unwrap();
        assert!(!store.contains("key"));
        // Removing again is a no-op
        store.remove("key").unwrap();
    }

    #[test]
    fn test_corrupt_value_is_reported() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let result: Result<Option<Sample>, _> = store.get("bad");
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        store.set("city", &"Warsaw").unwrap();
        store.set("city", &"Oslo").unwrap();

        let city: Option<String> = store.get("city").unwrap();
        assert_eq!(city.as_deref(), Some("Oslo"));
    }
}
