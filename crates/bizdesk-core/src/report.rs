//! # Sales Reports
//!
//! Summaries are derived on demand from the order log; nothing here is
//! persisted.
//!
//! - **gross sales**: amount due of every order that was not voided
//!   (cancelled or rejected)
//! - **refunds**: amount paid back for returned units, net of the order
//!   discount
//! - **net sales**: gross minus refunds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::order::{Order, OrderStatus, PaymentMethod};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodBreakdown {
    pub method: PaymentMethod,
    pub amount: Money,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    #[ts(as = "String")]
    pub from: DateTime<Utc>,
    #[ts(as = "String")]
    pub to: DateTime<Utc>,
    pub total_orders: u32,
    pub void_orders: u32,
    pub status_counts: Vec<StatusCount>,
    pub gross_sales: Money,
    pub total_discount: Money,
    pub refunds: Money,
    pub net_sales: Money,
    pub average_ticket: Money,
    pub payment_breakdowns: Vec<PaymentMethodBreakdown>,
}

impl SalesSummary {
    /// Summarises orders created in `[from, to)`.
    pub fn from_orders(orders: &[Order], from: DateTime<Utc>, to: DateTime<Utc>) -> SalesSummary {
        let in_range: Vec<&Order> = orders
            .iter()
            .filter(|o| o.created_at >= from && o.created_at < to)
            .collect();

        let mut status_counts: Vec<StatusCount> = Vec::new();
        for order in &in_range {
            match status_counts.iter_mut().find(|c| c.status == order.status) {
                Some(c) => c.count += 1,
                None => status_counts.push(StatusCount {
                    status: order.status,
                    count: 1,
                }),
            }
        }

        let sales: Vec<&Order> = in_range
            .iter()
            .copied()
            .filter(|o| !matches!(o.status, OrderStatus::Cancelled | OrderStatus::Rejected))
            .collect();

        let gross_sales: Money = sales.iter().map(|o| o.amount_due()).sum();
        let total_discount: Money = sales.iter().map(|o| o.discount).sum();
        let refunds: Money = sales.iter().map(|o| o.refunded_amount()).sum();
        let average_ticket = if sales.is_empty() {
            Money::zero()
        } else {
            Money::from_cents(gross_sales.cents() / sales.len() as i64)
        };

        let mut payment_breakdowns: Vec<PaymentMethodBreakdown> = Vec::new();
        for order in &sales {
            for (method, amount) in order.payment.allocations(order.amount_due()) {
                match payment_breakdowns.iter_mut().find(|b| b.method == method) {
                    Some(b) => {
                        b.amount += amount;
                        b.count += 1;
                    }
                    None => payment_breakdowns.push(PaymentMethodBreakdown {
                        method,
                        amount,
                        count: 1,
                    }),
                }
            }
        }
        payment_breakdowns.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.method.cmp(&b.method)));

        SalesSummary {
            from,
            to,
            total_orders: in_range.len() as u32,
            void_orders: (in_range.len() - sales.len()) as u32,
            status_counts,
            gross_sales,
            total_discount,
            refunds,
            net_sales: gross_sales - refunds,
            average_ticket,
            payment_breakdowns,
        }
    }
}
