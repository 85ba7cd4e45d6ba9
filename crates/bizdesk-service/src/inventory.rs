//! # Inventory Service
//!
//! Catalog and category maintenance behind the `ManageCatalog` gate, plus
//! manual stock corrections by delta. Reads are open to every role.

use std::sync::Arc;

use tracing::info;

use bizdesk_core::{
    Actor, BusinessSegment, CatalogItem, CatalogItemUpdate, Category, CoreResult,
    NewCatalogItem, Permission, StockAdjustment, StockAlert, StockRepository, ValidationError,
};
use bizdesk_store::{CatalogRepository, CategoryRepository};

use crate::notify::{notify_best_effort, Notification, Notifier};

#[derive(Clone)]
pub struct InventoryService {
    catalog: CatalogRepository,
    categories: CategoryRepository,
    notifier: Arc<dyn Notifier>,
}

impl InventoryService {
    pub fn new(
        catalog: CatalogRepository,
        categories: CategoryRepository,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        InventoryService {
            catalog,
            categories,
            notifier,
        }
    }

    pub fn list_items(&self) -> CoreResult<Vec<CatalogItem>> {
        self.catalog.list()
    }

    pub fn check_availability(&self, item_id: &str, qty: i64) -> CoreResult<bool> {
        self.catalog.check_availability(item_id, qty)
    }

    /// Out first, then critical, then low.
    pub fn stock_alerts(&self) -> CoreResult<Vec<StockAlert>> {
        self.catalog.stock_alerts()
    }

    pub fn add_item(&self, new: NewCatalogItem, actor: &Actor) -> CoreResult<CatalogItem> {
        actor.require(Permission::ManageCatalog)?;
        self.catalog.add(new)
    }

    pub fn update_item(
        &self,
        item_id: &str,
        update: CatalogItemUpdate,
        actor: &Actor,
    ) -> CoreResult<CatalogItem> {
        actor.require(Permission::ManageCatalog)?;
        self.catalog.update(item_id, update)
    }

    pub fn remove_item(&self, item_id: &str, actor: &Actor) -> CoreResult<CatalogItem> {
        actor.require(Permission::ManageCatalog)?;
        self.catalog.remove(item_id)
    }

    /// Positive `delta` restocks, negative removes (flooring at zero).
    pub fn adjust_stock(
        &self,
        item_id: &str,
        delta: i64,
        reason: &str,
        actor: &Actor,
    ) -> CoreResult<StockAdjustment> {
        actor.require(Permission::ManageCatalog)?;
        let adjustment = match delta {
            0 => {
                return Err(ValidationError::MustBePositive {
                    field: "stock delta".to_string(),
                }
                .into())
            }
            d if d > 0 => self.catalog.replenish(item_id, d, Some(reason))?,
            d => {
                let qty = d.checked_neg().ok_or_else(|| ValidationError::OutOfRange {
                    field: "stock delta".to_string(),
                    min: -i64::MAX,
                    max: i64::MAX,
                })?;
                let mut adjustment = self.catalog.deduct(item_id, qty)?;
                adjustment.reason = Some(reason.to_string());
                adjustment
            }
        };
        info!(
            item_id = %item_id,
            delta,
            stock = ?adjustment.current,
            reason = %reason,
            actor = %actor.name,
            "Stock adjusted"
        );

        if let Some(alert) = adjustment.alert.clone() {
            notify_best_effort(self.notifier.as_ref(), Notification::StockAlert(alert));
        }
        Ok(adjustment)
    }

    pub fn list_categories(&self, segment: Option<BusinessSegment>) -> CoreResult<Vec<Category>> {
        self.categories.list(segment)
    }

    pub fn add_category(
        &self,
        name: &str,
        segment: BusinessSegment,
        actor: &Actor,
    ) -> CoreResult<Category> {
        actor.require(Permission::ManageCatalog)?;
        self.categories.add(name, segment)
    }

    pub fn remove_category(&self, category_id: &str, actor: &Actor) -> CoreResult<Category> {
        actor.require(Permission::ManageCatalog)?;
        self.categories.remove(category_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;
    use bizdesk_core::{CoreError, Money, Role, StockSeverity};
    use bizdesk_store::LocalStore;

    fn service() -> (InventoryService, Arc<RecordingNotifier>) {
        let store = LocalStore::in_memory();
        let notifier = Arc::new(RecordingNotifier::default());
        let service = InventoryService::new(store.catalog(), store.categories(), notifier.clone());
        (service, notifier)
    }

    fn cola() -> NewCatalogItem {
        NewCatalogItem {
            name: "Cola 2L".to_string(),
            description: Some("Family size".to_string()),
            price: Money::from_cents(1150),
            category: "Drinks".to_string(),
            stock: Some(6),
            low_stock_threshold: Some(5),
            segment: BusinessSegment::Delivery,
        }
    }

    #[test]
    fn test_cashier_cannot_edit_catalog() {
        let (inventory, _) = service();
        let cashier = Actor::new("Caio", Role::Cashier);
        assert!(matches!(
            inventory.add_item(cola(), &cashier),
            Err(CoreError::Unauthorized { .. })
        ));
        assert!(!inventory.list_items().unwrap().is_empty());
    }

    #[test]
    fn test_adjust_by_delta() {
        let (inventory, notifier) = service();
        let manager = Actor::new("Marta", Role::Manager);
        let item = inventory.add_item(cola(), &manager).unwrap();

        let down = inventory
            .adjust_stock(&item.id, -6, "Broken bottles", &manager)
            .unwrap();
        assert_eq!(down.current, Some(0));
        assert!(down.deactivated);
        assert_eq!(down.alert.unwrap().severity, StockSeverity::Out);
        assert_eq!(notifier.sent().len(), 1);

        let up = inventory
            .adjust_stock(&item.id, 12, "Supplier delivery", &manager)
            .unwrap();
        assert_eq!(up.current, Some(12));
        assert!(inventory.check_availability(&item.id, 12).unwrap());

        assert!(inventory.adjust_stock(&item.id, 0, "noop", &manager).is_err());
    }

    #[test]
    fn test_extreme_deltas_stay_in_range() {
        let (inventory, _) = service();
        let manager = Actor::new("Marta", Role::Manager);
        let item = inventory.add_item(cola(), &manager).unwrap();

        assert!(matches!(
            inventory.adjust_stock(&item.id, i64::MIN, "Typo", &manager),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(
            inventory.list_items().unwrap().iter().find(|i| i.id == item.id).unwrap().stock,
            Some(6)
        );

        let up = inventory
            .adjust_stock(&item.id, i64::MAX, "Typo", &manager)
            .unwrap();
        assert_eq!(up.current, Some(i64::MAX));

        let down = inventory
            .adjust_stock(&item.id, -i64::MAX, "Recount", &manager)
            .unwrap();
        assert_eq!(down.current, Some(0));
    }

    #[test]
    fn test_alerts_come_from_catalog() {
        let (inventory, _) = service();
        let admin = Actor::new("Ana", Role::Admin);
        let item = inventory.add_item(cola(), &admin).unwrap();
        inventory.adjust_stock(&item.id, -2, "Count", &admin).unwrap();

        let alerts = inventory.stock_alerts().unwrap();
        assert!(alerts.iter().any(|a| a.item_id == item.id));
    }

    #[test]
    fn test_update_and_remove() {
        let (inventory, _) = service();
        let admin = Actor::new("Ana", Role::Admin);
        let item = inventory.add_item(cola(), &admin).unwrap();

        let updated = inventory
            .update_item(
                &item.id,
                CatalogItemUpdate {
                    price: Some(Money::from_cents(1290)),
                    ..Default::default()
                },
                &admin,
            )
            .unwrap();
        assert_eq!(updated.price, Money::from_cents(1290));

        inventory.remove_item(&item.id, &admin).unwrap();
        assert!(matches!(
            inventory.remove_item(&item.id, &admin),
            Err(CoreError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_categories() {
        let (inventory, _) = service();
        let admin = Actor::new("Ana", Role::Admin);
        let brunch = inventory
            .add_category("Brunch", BusinessSegment::Restaurant, &admin)
            .unwrap();
        assert!(inventory
            .list_categories(Some(BusinessSegment::Restaurant))
            .unwrap()
            .iter()
            .any(|c| c.id == brunch.id));
        inventory.remove_category(&brunch.id, &admin).unwrap();
    }
}
