//! # Order Repository
//!
//! The order log under `orders`. Orders are inserted once and then only
//! replaced by id; nothing is ever deleted.

use std::sync::Arc;

use tracing::debug;

use bizdesk_core::{CoreError, CoreResult, Order, OrderBook, OrderFilter, OrderRepository};

use crate::snapshot::SnapshotCell;

#[derive(Clone)]
pub struct OrderStore {
    book: Arc<SnapshotCell<OrderBook>>,
}

impl OrderStore {
    pub fn new(book: Arc<SnapshotCell<OrderBook>>) -> Self {
        OrderStore { book }
    }
}

impl OrderRepository for OrderStore {
    fn next_number(&self) -> CoreResult<u32> {
        self.book.update(|b| Ok(b.next_number()))
    }

    fn insert(&self, order: &Order) -> CoreResult<()> {
        self.book.update(|b| {
            b.orders.push(order.clone());
            Ok(())
        })?;
        debug!(order_id = %order.id, number = order.number, "Order stored");
        Ok(())
    }

    fn save(&self, order: &Order) -> CoreResult<()> {
        self.book.update(|b| {
            let slot = b.get_mut(&order.id)?;
            *slot = order.clone();
            Ok(())
        })
    }

    fn get(&self, id: &str) -> CoreResult<Order> {
        self.book
            .read(|b| b.get(id).cloned())?
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))
    }

    fn list(&self, filter: &OrderFilter) -> CoreResult<Vec<Order>> {
        self.book.read(|b| b.list(filter))
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{MemoryStorage, StorageKey};
    use crate::LocalStore;
    use bizdesk_core::{
        BusinessSegment, CoreError, CustomerRef, Money, NewOrder, NewOrderItem, Order,
        OrderFilter, OrderRepository, OrderSource, OrderStatus, PaymentDetail, PaymentMethod,
    };
    use std::sync::Arc;

    fn order(number: u32) -> Order {
        Order::create(
            number,
            NewOrder {
                customer: CustomerRef::named("Maria"),
                segment: BusinessSegment::Delivery,
                source: OrderSource::Whatsapp,
                items: vec![NewOrderItem {
                    item_id: "acai".to_string(),
                    name: "Acai".to_string(),
                    unit_price: Money::from_cents(2200),
                    quantity: 1,
                }],
                discount: Money::zero(),
                payment: PaymentDetail::single(PaymentMethod::Pix),
                status: OrderStatus::Pending,
                notes: Some("no sugar".to_string()),
            },
            "Ana",
        )
        .unwrap()
    }

    #[test]
    fn test_orders_survive_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let first = LocalStore::with_storage(storage.clone());
        let repo = first.orders();
        let number = repo.next_number().unwrap();
        let mut o = order(number);
        repo.insert(&o).unwrap();
        o.transition(OrderStatus::Accepted, "Ana").unwrap();
        repo.save(&o).unwrap();

        let second = LocalStore::with_storage(storage.clone());
        let reloaded = second.orders().get(&o.id).unwrap();
        assert_eq!(reloaded, o);
        assert_eq!(second.orders().next_number().unwrap(), number + 1);
        assert!(storage.raw(StorageKey::Orders).is_some());
    }

    #[test]
    fn test_save_unknown_order() {
        let store = LocalStore::in_memory();
        assert!(matches!(
            store.orders().save(&order(1)),
            Err(CoreError::OrderNotFound(_))
        ));
    }

    #[test]
    fn test_list_filters_by_status() {
        let store = LocalStore::in_memory();
        let repo = store.orders();
        repo.insert(&order(1)).unwrap();
        let filter = OrderFilter {
            status: Some(OrderStatus::Completed),
            segment: None,
        };
        assert!(repo.list(&filter).unwrap().is_empty());
        assert_eq!(repo.list(&OrderFilter::default()).unwrap().len(), 1);
    }
}
