//! # Repository Module
//!
//! Snapshot-backed repositories, one per state container.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service                                                                │
//! │     │  store.catalog().deduct("item-id", 3)                             │
//! │     ▼                                                                   │
//! │  CatalogRepository ──► SnapshotCell<Catalog> ──► storage["catalog"]     │
//! │                                                                         │
//! │  Repositories that implement a bizdesk-core port can be handed to the   │
//! │  services as `Arc<dyn Port>`; the rest are used directly.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`] - catalog maintenance, implements `StockRepository`
//! - [`RegisterRepository`] - cash register and shift archive, implements `LedgerRepository`
//! - [`CustomerStore`] - CRM, implements `CustomerRepository`
//! - [`OrderStore`] - order log, implements `OrderRepository`
//! - [`BusinessConfigRepository`] - tenant settings, implements `ConfigRepository`
//! - [`TeamRepository`] - roster and PIN lookup
//! - [`CategoryRepository`] - catalog categories

pub mod catalog;
pub mod category;
pub mod config;
pub mod customer;
pub mod order;
pub mod register;
pub mod team;

pub use catalog::CatalogRepository;
pub use category::CategoryRepository;
pub use config::BusinessConfigRepository;
pub use customer::CustomerStore;
pub use order::OrderStore;
pub use register::RegisterRepository;
pub use team::TeamRepository;
