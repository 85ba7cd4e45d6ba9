//! # Customers (CRM)
//!
//! Customer records are a stateful cache updated incrementally on every
//! qualifying order creation. They are not recomputed from the order log
//! and are not reconciled when an order is cancelled later.
//!
//! ## Identity
//! Records are matched by a stable key derived once from contact data:
//! phone digits first, lowercased email second. The display name is never
//! part of the key, so two "Maria"s with different phones stay apart.
//! Orders without any contact data do not touch the CRM.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

/// Customer identity as captured on an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl CustomerRef {
    pub fn named(name: impl Into<String>) -> Self {
        CustomerRef {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Stable CRM key, or `None` for anonymous walk-ins.
    ///
    /// ```rust
    /// use bizdesk_core::customer::CustomerRef;
    ///
    /// let mut c = CustomerRef::named("Maria");
    /// c.phone = Some("+55 (11) 98888-7777".into());
    /// assert_eq!(c.key().as_deref(), Some("tel:5511988887777"));
    /// ```
    pub fn key(&self) -> Option<String> {
        if let Some(phone) = &self.phone {
            let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
            if !digits.is_empty() {
                return Some(format!("tel:{}", digits));
            }
        }
        if let Some(email) = &self.email {
            let email = email.trim().to_lowercase();
            if !email.is_empty() {
                return Some(format!("mail:{}", email));
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    New,
    Regular,
    Vip,
}

/// A CRM record, persisted under `customers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub key: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub total_orders: u32,
    pub total_spent: Money,
    #[ts(as = "String")]
    pub last_order_at: DateTime<Utc>,
    pub status: CustomerStatus,
}

impl Customer {
    fn status_for(total_orders: u32, total_spent: Money, vip_threshold: Money) -> CustomerStatus {
        if total_spent >= vip_threshold {
            CustomerStatus::Vip
        } else if total_orders > 1 {
            CustomerStatus::Regular
        } else {
            CustomerStatus::New
        }
    }
}

/// The CRM container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBook {
    pub customers: Vec<Customer>,
}

impl CustomerBook {
    pub fn new(customers: Vec<Customer>) -> Self {
        CustomerBook { customers }
    }

    pub fn find_by_key(&self, key: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.key == key)
    }

    /// Counts one more order for the customer, creating the record on first
    /// sight. Returns `None` for orders without contact data.
    pub fn record_order(
        &mut self,
        customer: &CustomerRef,
        total: Money,
        at: DateTime<Utc>,
        vip_threshold: Money,
    ) -> Option<Customer> {
        let key = customer.key()?;

        let idx = match self.customers.iter().position(|c| c.key == key) {
            Some(idx) => {
                let existing = &mut self.customers[idx];
                existing.total_orders += 1;
                existing.total_spent += total;
                existing.last_order_at = at;
                // Contact details follow the latest order; the key does not.
                existing.name = customer.name.clone();
                if customer.phone.is_some() {
                    existing.phone = customer.phone.clone();
                }
                if customer.email.is_some() {
                    existing.email = customer.email.clone();
                }
                idx
            }
            None => {
                self.customers.push(Customer {
                    id: Uuid::new_v4().to_string(),
                    key,
                    name: customer.name.clone(),
                    phone: customer.phone.clone(),
                    email: customer.email.clone(),
                    total_orders: 1,
                    total_spent: total,
                    last_order_at: at,
                    status: CustomerStatus::New,
                });
                self.customers.len() - 1
            }
        };

        let record = &mut self.customers[idx];
        record.status = Customer::status_for(record.total_orders, record.total_spent, vip_threshold);
        Some(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maria(phone: &str) -> CustomerRef {
        CustomerRef {
            name: "Maria".to_string(),
            phone: Some(phone.to_string()),
            email: None,
            avatar: None,
        }
    }

    #[test]
    fn test_same_name_different_phone_stays_separate() {
        let mut book = CustomerBook::default();
        let vip = Money::from_major(1000);
        book.record_order(&maria("1111-1111"), Money::from_cents(500), Utc::now(), vip);
        book.record_order(&maria("2222-2222"), Money::from_cents(500), Utc::now(), vip);
        assert_eq!(book.customers.len(), 2);
    }

    #[test]
    fn test_repeat_orders_accumulate() {
        let mut book = CustomerBook::default();
        let vip = Money::from_major(1000);
        book.record_order(&maria("1111"), Money::from_cents(2500), Utc::now(), vip);
        let record = book
            .record_order(&maria("1-1-1-1"), Money::from_cents(1500), Utc::now(), vip)
            .unwrap();
        assert_eq!(record.total_orders, 2);
        assert_eq!(record.total_spent, Money::from_cents(4000));
        assert_eq!(record.status, CustomerStatus::Regular);
        assert_eq!(book.customers.len(), 1);
    }

    #[test]
    fn test_vip_threshold() {
        let mut book = CustomerBook::default();
        let record = book
            .record_order(
                &maria("9"),
                Money::from_major(1200),
                Utc::now(),
                Money::from_major(1000),
            )
            .unwrap();
        assert_eq!(record.status, CustomerStatus::Vip);
    }

    #[test]
    fn test_anonymous_order_skips_crm() {
        let mut book = CustomerBook::default();
        let walk_in = CustomerRef::named("Counter");
        assert!(book
            .record_order(&walk_in, Money::from_cents(100), Utc::now(), Money::from_major(1000))
            .is_none());
        assert!(book.customers.is_empty());
    }

    #[test]
    fn test_email_key_is_case_insensitive() {
        let mut a = CustomerRef::named("Jo");
        a.email = Some("Jo@Example.com ".to_string());
        let mut b = CustomerRef::named("Joanna");
        b.email = Some("jo@example.com".to_string());
        assert_eq!(a.key(), b.key());
    }
}
