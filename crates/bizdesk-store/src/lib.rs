//! # bizdesk-store: Snapshot Persistence for bizdesk
//!
//! Each state container is kept in memory and mirrored to one JSON document
//! per key. There is no database and no schema versioning.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        bizdesk Data Flow                                │
//! │                                                                         │
//! │  OrderService::create_order                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   bizdesk-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  LocalStore   │    │ Repositories  │    │   Storage    │  │   │
//! │  │   │  (local.rs)   │    │ (catalog.rs)  │    │ (storage.rs) │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SnapshotCells │◄───│ OrderStore    │───►│ FileStorage  │  │   │
//! │  │   │ loaded once   │    │ RegisterRepo  │    │ MemoryStorage│  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   ~/.local/share/bizdesk/{orders,catalog,cash_register,...}.json │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`local`] - store handle and data directory resolution
//! - [`storage`] - file and in-memory backends
//! - [`snapshot`] - load-or-default cells with persist-then-commit updates
//! - [`repository`] - repository implementations
//! - [`seed`] - default datasets
//! - [`error`] - store error types
//!
//! ## Usage
//!
//! ```rust
//! use bizdesk_core::{LedgerRepository, Money};
//! use bizdesk_store::LocalStore;
//!
//! let store = LocalStore::in_memory();
//! store.register().open(Money::from_major(100), "Admin").unwrap();
//! assert!(store.register().register().unwrap().is_open);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod local;
pub mod repository;
pub mod seed;
pub mod snapshot;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use local::{LocalStore, StoreConfig};
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage, StorageKey};

pub use repository::{
    BusinessConfigRepository, CatalogRepository, CategoryRepository, CustomerStore, OrderStore,
    RegisterRepository, TeamRepository,
};
