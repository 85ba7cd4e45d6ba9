//! # Storage Backends
//!
//! A backend stores one UTF-8 document per [`StorageKey`]. It knows nothing
//! about what the documents contain.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FileStorage  <data_dir>/orders.json                                    │
//! │               <data_dir>/catalog.json                                   │
//! │               <data_dir>/cash_register.json  ...                        │
//! │                                                                         │
//! │  write:  orders.json.tmp ──(fsync)──► rename ──► orders.json            │
//! │                                                                         │
//! │  MemoryStorage  HashMap<StorageKey, String>   (tests, demos)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Names of the persisted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Orders,
    Catalog,
    CashRegister,
    RegisterHistory,
    Customers,
    Categories,
    BusinessConfig,
    Team,
}

impl StorageKey {
    pub const ALL: [StorageKey; 8] = [
        StorageKey::Orders,
        StorageKey::Catalog,
        StorageKey::CashRegister,
        StorageKey::RegisterHistory,
        StorageKey::Customers,
        StorageKey::Categories,
        StorageKey::BusinessConfig,
        StorageKey::Team,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Orders => "orders",
            StorageKey::Catalog => "catalog",
            StorageKey::CashRegister => "cash_register",
            StorageKey::RegisterHistory => "register_history",
            StorageKey::Customers => "customers",
            StorageKey::Categories => "categories",
            StorageKey::BusinessConfig => "business_config",
            StorageKey::Team => "team",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A place to keep snapshot documents.
pub trait SnapshotStorage: Send + Sync {
    /// The stored document, `None` if nothing was ever written.
    fn read(&self, key: StorageKey) -> StoreResult<Option<String>>;

    /// Replaces the document. Either the old or the new content survives a
    /// crash, never a mix.
    fn write(&self, key: StorageKey, contents: &str) -> StoreResult<()>;
}

// =============================================================================
// File Backend
// =============================================================================

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Uses `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        debug!(dir = %dir.display(), "File storage ready");
        Ok(FileStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self, key: StorageKey) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&self, key: StorageKey, contents: &str) -> StoreResult<()> {
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        let target = self.path(key);
        let tmp = target.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp).map_err(io_err)?;
            file.write_all(contents.as_bytes()).map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }
        fs::rename(&tmp, &target).map_err(io_err)?;

        debug!(key = %key, bytes = contents.len(), "Snapshot written");
        Ok(())
    }
}

// =============================================================================
// In-Memory Backend
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    docs: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw document, for asserting on what was persisted.
    pub fn raw(&self, key: StorageKey) -> Option<String> {
        self.docs.lock().ok().and_then(|docs| docs.get(&key).cloned())
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: StorageKey) -> StoreResult<Option<String>> {
        let docs = self
            .docs
            .lock()
            .map_err(|_| StoreError::LockPoisoned(key.to_string()))?;
        Ok(docs.get(&key).cloned())
    }

    fn write(&self, key: StorageKey, contents: &str) -> StoreResult<()> {
        let mut docs = self
            .docs
            .lock()
            .map_err(|_| StoreError::LockPoisoned(key.to_string()))?;
        docs.insert(key, contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("data")).unwrap();

        assert!(storage.read(StorageKey::Orders).unwrap().is_none());
        storage.write(StorageKey::Orders, "{\"orders\":[]}").unwrap();
        assert_eq!(
            storage.read(StorageKey::Orders).unwrap().as_deref(),
            Some("{\"orders\":[]}")
        );
        assert!(dir.path().join("data").join("orders.json").exists());
        assert!(!dir.path().join("data").join("orders.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.write(StorageKey::Team, "first").unwrap();
        storage.write(StorageKey::Team, "second").unwrap();
        assert_eq!(
            storage.read(StorageKey::Team).unwrap().as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_memory_storage_keys_are_independent() {
        let storage = MemoryStorage::new();
        storage.write(StorageKey::Catalog, "a").unwrap();
        assert!(storage.read(StorageKey::Customers).unwrap().is_none());
        assert_eq!(storage.raw(StorageKey::Catalog).as_deref(), Some("a"));
    }

    #[test]
    fn test_key_names() {
        let names: Vec<&str> = StorageKey::ALL.iter().map(|k| k.as_str()).collect();
        assert!(names.contains(&"register_history"));
        assert!(names.contains(&"business_config"));
        assert_eq!(names.len(), 8);
    }
}
