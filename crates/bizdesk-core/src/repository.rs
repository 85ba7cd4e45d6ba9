//! # Repository Ports
//!
//! Traits the services depend on. `bizdesk-store` implements them over
//! persisted snapshots; tests can substitute in-memory fakes.
//!
//! ```text
//! OrderService ──► Arc<dyn StockRepository>     (catalog stock)
//!              ──► Arc<dyn LedgerRepository>    (cash register)
//!              ──► Arc<dyn CustomerRepository>  (CRM)
//!              ──► Arc<dyn OrderRepository>     (order log)
//!              ──► Arc<dyn ConfigRepository>    (business config)
//! ```
//!
//! Every mutating call persists before returning. A failed write surfaces
//! as `CoreError::Persistence` and leaves the previous state in place.

use chrono::{DateTime, Utc};

use crate::business::BusinessConfig;
use crate::catalog::{CatalogItem, StockAdjustment};
use crate::customer::{Customer, CustomerRef};
use crate::error::CoreResult;
use crate::money::Money;
use crate::order::{Order, OrderFilter};
use crate::register::{CashMovement, CashRegister, CashTransaction, ClosedShift};

/// Catalog stock as seen by order processing.
pub trait StockRepository: Send + Sync {
    /// Item by id, `None` when it does not exist.
    fn item(&self, id: &str) -> CoreResult<Option<CatalogItem>>;

    /// Deducts `qty`, flooring tracked stock at zero.
    ///
    /// Untracked items are left as they are. Fails with `ItemNotFound`.
    fn deduct(&self, id: &str, qty: i64) -> CoreResult<StockAdjustment>;

    /// Adds `qty` back and reactivates the item.
    fn replenish(&self, id: &str, qty: i64, reason: Option<&str>) -> CoreResult<StockAdjustment>;
}

/// The cash register and its archive of closed shifts.
pub trait LedgerRepository: Send + Sync {
    fn register(&self) -> CoreResult<CashRegister>;

    fn open(&self, start_amount: Money, actor: &str) -> CoreResult<CashTransaction>;

    /// Closes the shift and archives it.
    fn close(&self, actor: &str) -> CoreResult<ClosedShift>;

    fn add_movement(
        &self,
        movement: CashMovement,
        amount: Money,
        description: &str,
        actor: &str,
    ) -> CoreResult<CashTransaction>;

    fn register_sale(
        &self,
        amount: Money,
        description: &str,
        actor: &str,
    ) -> CoreResult<CashTransaction>;

    /// Closed shifts, newest first.
    fn history(&self) -> CoreResult<Vec<ClosedShift>>;
}

pub trait CustomerRepository: Send + Sync {
    /// Upserts the CRM record for an order. `None` for anonymous orders.
    fn record_order(
        &self,
        customer: &CustomerRef,
        total: Money,
        at: DateTime<Utc>,
        vip_threshold: Money,
    ) -> CoreResult<Option<Customer>>;

    fn list(&self) -> CoreResult<Vec<Customer>>;

    /// Fails with `CustomerNotFound`.
    fn get(&self, id: &str) -> CoreResult<Customer>;
}

/// The append-only order log.
pub trait OrderRepository: Send + Sync {
    /// Reserves the next display number.
    fn next_number(&self) -> CoreResult<u32>;

    fn insert(&self, order: &Order) -> CoreResult<()>;

    /// Replaces an existing order. Fails with `OrderNotFound`.
    fn save(&self, order: &Order) -> CoreResult<()>;

    /// Fails with `OrderNotFound`.
    fn get(&self, id: &str) -> CoreResult<Order>;

    /// Newest first.
    fn list(&self, filter: &OrderFilter) -> CoreResult<Vec<Order>>;
}

pub trait ConfigRepository: Send + Sync {
    fn business_config(&self) -> CoreResult<BusinessConfig>;

    fn save_business_config(&self, config: &BusinessConfig) -> CoreResult<()>;
}
