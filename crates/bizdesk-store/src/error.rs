//! # Store Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the snapshot key                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CoreError::Persistence ← What repository ports return                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (bizdesk-service) ← Code + message for the front end          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bizdesk_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a snapshot file failed.
    ///
    /// ## When This Occurs
    /// - Data directory not writable
    /// - Disk full
    /// - Rename across filesystems
    #[error("I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot could not be encoded.
    ///
    /// Decoding failures never surface here; a corrupt document falls back
    /// to the default dataset instead.
    #[error("Failed to encode '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A previous holder of the state lock panicked.
    #[error("State lock poisoned for '{0}'")]
    LockPoisoned(String),

    /// No platform data directory could be resolved.
    #[error("Could not resolve a data directory for this platform")]
    NoDataDir,
}

impl StoreError {
    /// Snapshot key the error relates to, if any.
    pub fn key(&self) -> &str {
        match self {
            StoreError::Io { key, .. } | StoreError::Serialization { key, .. } => key,
            StoreError::LockPoisoned(key) => key,
            StoreError::NoDataDir => "",
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Persistence {
            key: err.key().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_persistence_error() {
        let err = StoreError::LockPoisoned("orders".to_string());
        match CoreError::from(err) {
            CoreError::Persistence { key, reason } => {
                assert_eq!(key, "orders");
                assert!(reason.contains("poisoned"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
