//! # Local Store
//!
//! Loads every snapshot once at startup and hands out repositories that
//! share the loaded state.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  App startup                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::default_location()  ← platform data dir (directories)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LocalStore::open(config)                                               │
//! │       │   load orders, catalog, cash_register, register_history,        │
//! │       │        customers, categories, business_config, team             │
//! │       ▼                                                                 │
//! │  store.orders() / store.catalog() / store.register() ...                │
//! │  (cheap clones sharing the same cells)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use tracing::info;

use bizdesk_core::{
    BusinessConfig, CashRegister, Catalog, Category, ClosedShift, CoreResult, CustomerBook,
    OrderBook, Roster,
};

use crate::error::{StoreError, StoreResult};
use crate::repository::{
    BusinessConfigRepository, CatalogRepository, CategoryRepository, CustomerStore, OrderStore,
    RegisterRepository, TeamRepository,
};
use crate::seed;
use crate::snapshot::SnapshotCell;
use crate::storage::{FileStorage, MemoryStorage, SnapshotStorage, StorageKey};

/// Where the file backend keeps its documents.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            data_dir: data_dir.into(),
        }
    }

    /// The platform data directory, e.g. `~/.local/share/bizdesk` on Linux.
    pub fn default_location() -> StoreResult<Self> {
        let dirs = ProjectDirs::from("com", "bizdesk", "bizdesk").ok_or(StoreError::NoDataDir)?;
        Ok(StoreConfig::new(dirs.data_dir()))
    }
}

#[derive(Clone)]
pub struct LocalStore {
    storage: Arc<dyn SnapshotStorage>,
    orders: Arc<SnapshotCell<OrderBook>>,
    catalog: Arc<SnapshotCell<Catalog>>,
    register: Arc<SnapshotCell<CashRegister>>,
    history: Arc<SnapshotCell<Vec<ClosedShift>>>,
    customers: Arc<SnapshotCell<CustomerBook>>,
    categories: Arc<SnapshotCell<Vec<Category>>>,
    config: Arc<SnapshotCell<BusinessConfig>>,
    team: Arc<SnapshotCell<Roster>>,
}

impl LocalStore {
    /// File-backed store under `config.data_dir`.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        info!(dir = %config.data_dir.display(), "Opening local store");
        let storage = FileStorage::open(config.data_dir)?;
        Ok(Self::with_storage(Arc::new(storage)))
    }

    /// Fresh in-memory store seeded with the default datasets.
    pub fn in_memory() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    pub fn with_storage(storage: Arc<dyn SnapshotStorage>) -> Self {
        let s = || storage.clone();
        LocalStore {
            orders: Arc::new(SnapshotCell::load(StorageKey::Orders, s(), OrderBook::default)),
            catalog: Arc::new(SnapshotCell::load(StorageKey::Catalog, s(), || {
                Catalog::new(seed::default_catalog())
            })),
            register: Arc::new(SnapshotCell::load(
                StorageKey::CashRegister,
                s(),
                CashRegister::default,
            )),
            history: Arc::new(SnapshotCell::load(
                StorageKey::RegisterHistory,
                s(),
                Vec::new,
            )),
            customers: Arc::new(SnapshotCell::load(
                StorageKey::Customers,
                s(),
                CustomerBook::default,
            )),
            categories: Arc::new(SnapshotCell::load(
                StorageKey::Categories,
                s(),
                seed::default_categories,
            )),
            config: Arc::new(SnapshotCell::load(
                StorageKey::BusinessConfig,
                s(),
                BusinessConfig::default,
            )),
            team: Arc::new(SnapshotCell::load(StorageKey::Team, s(), || {
                Roster::new(seed::default_team())
            })),
            storage,
        }
    }

    pub fn storage(&self) -> Arc<dyn SnapshotStorage> {
        self.storage.clone()
    }

    pub fn orders(&self) -> OrderStore {
        OrderStore::new(self.orders.clone())
    }

    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.catalog.clone(), self.config.clone())
    }

    pub fn register(&self) -> RegisterRepository {
        RegisterRepository::new(self.register.clone(), self.history.clone())
    }

    pub fn customers(&self) -> CustomerStore {
        CustomerStore::new(self.customers.clone())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.categories.clone())
    }

    pub fn config(&self) -> BusinessConfigRepository {
        BusinessConfigRepository::new(self.config.clone())
    }

    pub fn team(&self) -> TeamRepository {
        TeamRepository::new(self.team.clone())
    }

    /// Writes every document, including ones still at their defaults.
    pub fn flush_all(&self) -> CoreResult<()> {
        self.orders.flush()?;
        self.catalog.flush()?;
        self.register.flush()?;
        self.history.flush()?;
        self.customers.flush()?;
        self.categories.flush()?;
        self.config.flush()?;
        self.team.flush()?;
        Ok(())
    }
}
