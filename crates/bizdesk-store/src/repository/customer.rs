//! # Customer Repository
//!
//! CRM records under `customers`, upserted once per qualifying order.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use bizdesk_core::{
    CoreError, CoreResult, Customer, CustomerBook, CustomerRef, CustomerRepository, Money,
};

use crate::snapshot::SnapshotCell;

#[derive(Clone)]
pub struct CustomerStore {
    book: Arc<SnapshotCell<CustomerBook>>,
}

impl CustomerStore {
    pub fn new(book: Arc<SnapshotCell<CustomerBook>>) -> Self {
        CustomerStore { book }
    }
}

impl CustomerRepository for CustomerStore {
    fn record_order(
        &self,
        customer: &CustomerRef,
        total: Money,
        at: DateTime<Utc>,
        vip_threshold: Money,
    ) -> CoreResult<Option<Customer>> {
        if customer.key().is_none() {
            return Ok(None);
        }
        let record = self
            .book
            .update(|b| Ok(b.record_order(customer, total, at, vip_threshold)))?;
        if let Some(c) = &record {
            debug!(
                customer_id = %c.id,
                total_orders = c.total_orders,
                status = ?c.status,
                "Customer record updated"
            );
        }
        Ok(record)
    }

    fn list(&self) -> CoreResult<Vec<Customer>> {
        self.book.read(|b| b.customers.clone())
    }

    fn get(&self, id: &str) -> CoreResult<Customer> {
        self.book
            .read(|b| b.customers.iter().find(|c| c.id == id).cloned())?
            .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))
    }
}
