//! # Catalog Repository
//!
//! Catalog maintenance plus the [`StockRepository`] port used by order
//! processing. Stock alerts use the tenant's alert thresholds, read from
//! the business config at the time of the call.

use std::sync::Arc;

use tracing::{debug, info, warn};

use bizdesk_core::{
    BusinessConfig, Catalog, CatalogItem, CatalogItemUpdate, CoreResult, NewCatalogItem,
    StockAdjustment, StockAlert, StockRepository,
};

use crate::snapshot::SnapshotCell;

#[derive(Clone)]
pub struct CatalogRepository {
    catalog: Arc<SnapshotCell<Catalog>>,
    config: Arc<SnapshotCell<BusinessConfig>>,
}

impl CatalogRepository {
    pub fn new(
        catalog: Arc<SnapshotCell<Catalog>>,
        config: Arc<SnapshotCell<BusinessConfig>>,
    ) -> Self {
        CatalogRepository { catalog, config }
    }

    pub fn list(&self) -> CoreResult<Vec<CatalogItem>> {
        self.catalog.read(|c| c.items.clone())
    }

    pub fn add(&self, new: NewCatalogItem) -> CoreResult<CatalogItem> {
        let item = self.catalog.update(|c| c.add(new))?;
        info!(item_id = %item.id, name = %item.name, "Catalog item added");
        Ok(item)
    }

    pub fn update(&self, id: &str, update: CatalogItemUpdate) -> CoreResult<CatalogItem> {
        let item = self.catalog.update(|c| c.update(id, update))?;
        debug!(item_id = %id, "Catalog item updated");
        Ok(item)
    }

    pub fn remove(&self, id: &str) -> CoreResult<CatalogItem> {
        let item = self.catalog.update(|c| c.remove(id))?;
        info!(item_id = %id, name = %item.name, "Catalog item removed");
        Ok(item)
    }

    pub fn check_availability(&self, id: &str, qty: i64) -> CoreResult<bool> {
        self.catalog.read(|c| c.check_availability(id, qty))
    }

    /// Derived on demand; nothing is stored.
    pub fn stock_alerts(&self) -> CoreResult<Vec<StockAlert>> {
        let config = self.config.read(|c| c.stock_alerts)?;
        self.catalog.read(|c| c.stock_alerts(&config))
    }
}

impl StockRepository for CatalogRepository {
    fn item(&self, id: &str) -> CoreResult<Option<CatalogItem>> {
        self.catalog.read(|c| c.get(id).cloned())
    }

    fn deduct(&self, id: &str, qty: i64) -> CoreResult<StockAdjustment> {
        let config = self.config.read(|c| c.stock_alerts)?;
        let adjustment = self.catalog.update(|c| c.deduct(id, qty, &config))?;

        if let Some(alert) = &adjustment.alert {
            warn!(
                item_id = %id,
                stock = alert.stock,
                severity = ?alert.severity,
                "Stock alert"
            );
        }
        if adjustment.deactivated {
            info!(item_id = %id, "Item sold out and deactivated");
        }
        Ok(adjustment)
    }

    fn replenish(&self, id: &str, qty: i64, reason: Option<&str>) -> CoreResult<StockAdjustment> {
        let adjustment = self.catalog.update(|c| c.replenish(id, qty, reason))?;
        debug!(
            item_id = %id,
            qty,
            stock = ?adjustment.current,
            reason = reason.unwrap_or(""),
            "Stock replenished"
        );
        Ok(adjustment)
    }
}
