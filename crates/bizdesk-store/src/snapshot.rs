//! # Snapshot Cells
//!
//! A [`SnapshotCell`] holds one state container in memory and mirrors it to
//! a storage key.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update(f)                                                              │
//! │     │                                                                   │
//! │     ├── lock state                                                      │
//! │     ├── draft = state.clone()                                           │
//! │     ├── f(&mut draft) ──── Err ──► state untouched, error returned      │
//! │     ├── write(serialize(draft)) ── Err ──► state untouched              │
//! │     └── state = draft                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The in-memory state therefore never runs ahead of what was persisted.

use std::sync::{Arc, Mutex, MutexGuard};

use bizdesk_core::CoreResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::storage::{SnapshotStorage, StorageKey};

pub struct SnapshotCell<T> {
    key: StorageKey,
    storage: Arc<dyn SnapshotStorage>,
    state: Mutex<T>,
}

impl<T> SnapshotCell<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Loads the document for `key`.
    ///
    /// A missing, unreadable or corrupt document yields `fallback()`; the
    /// bad document is left on disk until the next successful write.
    pub fn load(
        key: StorageKey,
        storage: Arc<dyn SnapshotStorage>,
        fallback: impl FnOnce() -> T,
    ) -> Self {
        let state = match storage.read(key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(state) => {
                    debug!(key = %key, "Snapshot loaded");
                    state
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Corrupt snapshot, using defaults");
                    fallback()
                }
            },
            Ok(None) => {
                debug!(key = %key, "No snapshot yet, using defaults");
                fallback()
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Snapshot unreadable, using defaults");
                fallback()
            }
        };

        SnapshotCell {
            key,
            storage,
            state: Mutex::new(state),
        }
    }

    pub fn key(&self) -> StorageKey {
        self.key
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, T>> {
        self.state
            .lock()
            .map_err(|_| StoreError::LockPoisoned(self.key.to_string()))
    }

    fn persist(&self, state: &T) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(state).map_err(|source| {
            StoreError::Serialization {
                key: self.key.to_string(),
                source,
            }
        })?;
        self.storage.write(self.key, &json)
    }

    /// Runs `f` with read access.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> CoreResult<R> {
        let state = self.lock()?;
        Ok(f(&state))
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> CoreResult<T> {
        self.read(T::clone)
    }

    /// Applies `f` to a draft, persists it, then commits it.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> CoreResult<R>) -> CoreResult<R> {
        let mut state = self.lock()?;
        let mut draft = state.clone();
        let out = f(&mut draft)?;
        self.persist(&draft)?;
        *state = draft;
        Ok(out)
    }

    /// Writes the current state as is (used by the seed binary).
    pub fn flush(&self) -> CoreResult<()> {
        let state = self.lock()?;
        self.persist(&state)?;
        Ok(())
    }
}
