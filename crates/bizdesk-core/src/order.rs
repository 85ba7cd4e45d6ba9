//! # Orders & the Status State Machine
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  pending ──► accepted ──► preparing ──► ready ──► delivering ──►        │
//! │     │            │            │           │           │                 │
//! │     │            └────────────┴─── cancelled ◄────────┘                 │
//! │     ├──► rejected                                                       │
//! │     └──► cancelled                                                      │
//! │                                                                         │
//! │  ──► completed ──► partially_returned ──► returned                      │
//! │           └──────────────────────────────────┘                          │
//! │                                                                         │
//! │  Forward moves may skip steps (ready ──► completed for pickups).        │
//! │  Terminal: completed, cancelled, rejected, returned.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every change appends to `history`; nothing is ever replaced, and orders
//! are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::business::BusinessSegment;
use crate::customer::CustomerRef;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{
    validate_chat_text, validate_installments, validate_item_name, validate_line_count,
    validate_price, validate_quantity,
};

// =============================================================================
// Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Preparing,
    Ready,
    Delivering,
    Completed,
    Cancelled,
    Rejected,
    Returned,
    PartiallyReturned,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Returned => "returned",
            OrderStatus::PartiallyReturned => "partially_returned",
        }
    }

    /// Still moving through the fulfilment chain.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending
                | OrderStatus::Accepted
                | OrderStatus::Preparing
                | OrderStatus::Ready
                | OrderStatus::Delivering
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed
                | OrderStatus::Cancelled
                | OrderStatus::Rejected
                | OrderStatus::Returned
        )
    }

    /// Position on the main chain, `None` for side branches.
    fn chain_rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Accepted => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::Ready => Some(3),
            OrderStatus::Delivering => Some(4),
            OrderStatus::Completed => Some(5),
            _ => None,
        }
    }

    /// Transition legality.
    ///
    /// ```rust
    /// use bizdesk_core::order::OrderStatus::*;
    ///
    /// assert!(Pending.can_transition_to(Accepted));
    /// assert!(Ready.can_transition_to(Completed));
    /// assert!(!Accepted.can_transition_to(Rejected));
    /// assert!(!Completed.can_transition_to(Cancelled));
    /// ```
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (*self, next) {
            (Pending, Rejected) => true,
            (from, Cancelled) => from.is_active(),
            (Completed | PartiallyReturned, Returned | PartiallyReturned) => true,
            (from, to) => match (from.chain_rank(), to.chain_rank()) {
                (Some(a), Some(b)) => from.is_active() && b > a,
                _ => false,
            },
        }
    }

    /// Statuses an order may be created in.
    pub fn is_valid_initial(&self) -> bool {
        self.chain_rank().is_some()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Source & Payment
// =============================================================================

/// Channel the order came in through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    Counter,
    Whatsapp,
    Website,
    Marketplace,
    Phone,
    App,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Debit,
    Credit,
    Pix,
    Voucher,
    Online,
}

impl PaymentMethod {
    /// Cash and debit are settled at the drawer and hit the register ledger.
    pub fn routes_through_drawer(&self) -> bool {
        matches!(self, PaymentMethod::Cash | PaymentMethod::Debit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Debit => "debit",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Voucher => "voucher",
            PaymentMethod::Online => "online",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One leg of a split payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLeg {
    pub method: PaymentMethod,
    pub amount: Money,
    #[serde(default = "one")]
    pub installments: u8,
}

fn one() -> u8 {
    1
}

/// How an order was (or will be) paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentDetail {
    Single {
        method: PaymentMethod,
        #[serde(default = "one")]
        installments: u8,
    },
    Split {
        legs: Vec<PaymentLeg>,
    },
}

impl PaymentDetail {
    pub fn single(method: PaymentMethod) -> Self {
        PaymentDetail::Single {
            method,
            installments: 1,
        }
    }

    /// Amount per method for an order whose amount due is `due`.
    pub fn allocations(&self, due: Money) -> Vec<(PaymentMethod, Money)> {
        match self {
            PaymentDetail::Single { method, .. } => vec![(*method, due)],
            PaymentDetail::Split { legs } => legs.iter().map(|l| (l.method, l.amount)).collect(),
        }
    }

    /// Portion of `due` that lands in the cash drawer.
    pub fn drawer_amount(&self, due: Money) -> Money {
        self.allocations(due)
            .into_iter()
            .filter(|(method, _)| method.routes_through_drawer())
            .map(|(_, amount)| amount)
            .sum()
    }

    /// Refunds go back in cash only for single cash payments.
    pub fn refunds_in_cash(&self) -> bool {
        matches!(
            self,
            PaymentDetail::Single {
                method: PaymentMethod::Cash,
                ..
            }
        )
    }

    /// Split legs must be positive and cover exactly the amount due.
    pub fn validate(&self, due: Money) -> CoreResult<()> {
        match self {
            PaymentDetail::Single { installments, .. } => {
                validate_installments(*installments)?;
            }
            PaymentDetail::Split { legs } => {
                if legs.is_empty() {
                    return Err(ValidationError::Required {
                        field: "payment legs".to_string(),
                    }
                    .into());
                }
                for leg in legs {
                    validate_installments(leg.installments)?;
                    if !leg.amount.is_positive() {
                        return Err(CoreError::InvalidAmount {
                            amount: leg.amount,
                            reason: "payment legs must be positive".to_string(),
                        });
                    }
                }
                let paid: Money = legs.iter().map(|l| l.amount).sum();
                if paid != due {
                    return Err(CoreError::InvalidAmount {
                        amount: paid,
                        reason: format!("split payments must add up to {}", due),
                    });
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Lines, History, Chat
// =============================================================================

/// A line on an order. Name and price are frozen at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Catalog item id.
    pub item_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    #[serde(default)]
    pub returned_quantity: i64,
}

impl OrderItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn returnable(&self) -> i64 {
        self.quantity - self.returned_quantity
    }
}

/// Proposed line for a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub at: DateTime<Utc>,
    pub actor: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ChatAuthor {
    Customer,
    Merchant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub author: ChatAuthor,
    pub text: String,
    #[ts(as = "String")]
    pub at: DateTime<Utc>,
}

/// A quantity of one catalog item, used for stock reversal and returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLine {
    pub item_id: String,
    pub quantity: i64,
}

/// Validated return, computed before anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPlan {
    pub lines: Vec<ReturnLine>,
    pub refund: Money,
    pub resulting_status: OrderStatus,
}

// =============================================================================
// Order
// =============================================================================

/// Proposed order handed to the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer: CustomerRef,
    pub segment: BusinessSegment,
    pub source: OrderSource,
    pub items: Vec<NewOrderItem>,
    #[serde(default)]
    pub discount: Money,
    pub payment: PaymentDetail,
    /// `pending` for incoming requests, `completed` for counter sales.
    pub status: OrderStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewOrder {
    /// Sum of `unit_price × quantity`.
    pub fn total(&self) -> Money {
        self.items
            .iter()
            .map(|i| i.unit_price.multiply_quantity(i.quantity))
            .sum()
    }

    pub fn amount_due(&self) -> Money {
        self.total().saturating_sub_floor(self.discount)
    }

    /// Requested quantity per catalog item (lines for the same item merged).
    pub fn quantities(&self) -> BTreeMap<&str, i64> {
        let mut map = BTreeMap::new();
        for item in &self.items {
            *map.entry(item.item_id.as_str()).or_insert(0) += item.quantity;
        }
        map
    }

    pub fn validate(&self) -> CoreResult<()> {
        validate_line_count(self.items.len())?;
        for item in &self.items {
            validate_item_name(&item.name)?;
            validate_price(item.unit_price)?;
            validate_quantity(item.quantity)?;
        }
        if self.discount.is_negative() || self.discount > self.total() {
            return Err(CoreError::InvalidAmount {
                amount: self.discount,
                reason: "discount must be between zero and the order total".to_string(),
            });
        }
        if !self.status.is_valid_initial() {
            return Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("an order cannot start as {}", self.status),
            }
            .into());
        }
        self.payment.validate(self.amount_due())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Human-facing sequential number ("#42").
    pub number: u32,
    pub customer: CustomerRef,
    /// Stable CRM key derived at creation.
    pub customer_key: Option<String>,
    pub segment: BusinessSegment,
    pub source: OrderSource,
    pub items: Vec<OrderItem>,
    /// Always `Σ unit_price × quantity` of the lines at creation.
    pub total: Money,
    #[serde(default)]
    pub discount: Money,
    pub status: OrderStatus,
    pub payment: PaymentDetail,
    #[serde(default)]
    pub chat: Vec<ChatMessage>,
    pub history: Vec<StatusChange>,
    #[serde(default)]
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds an order from a validated proposal. No side effects.
    pub fn create(number: u32, new: NewOrder, actor: &str) -> CoreResult<Order> {
        new.validate()?;

        let now = Utc::now();
        let total = new.total();
        let customer_key = new.customer.key();
        Ok(Order {
            id: Uuid::new_v4().to_string(),
            number,
            customer: new.customer,
            customer_key,
            segment: new.segment,
            source: new.source,
            items: new
                .items
                .into_iter()
                .map(|i| OrderItem {
                    item_id: i.item_id,
                    name: i.name.trim().to_string(),
                    unit_price: i.unit_price,
                    quantity: i.quantity,
                    returned_quantity: 0,
                })
                .collect(),
            total,
            discount: new.discount,
            status: new.status,
            payment: new.payment,
            chat: Vec::new(),
            history: vec![StatusChange {
                status: new.status,
                at: now,
                actor: actor.to_string(),
            }],
            notes: new.notes,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn amount_due(&self) -> Money {
        self.total.saturating_sub_floor(self.discount)
    }

    /// Portion of the amount due settled through the cash drawer.
    pub fn drawer_amount(&self) -> Money {
        self.payment.drawer_amount(self.amount_due())
    }

    /// Moves to `next` and appends a history entry.
    pub fn transition(&mut self, next: OrderStatus, actor: &str) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                order_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        let now = Utc::now();
        self.status = next;
        self.updated_at = now;
        self.history.push(StatusChange {
            status: next,
            at: now,
            actor: actor.to_string(),
        });
        Ok(())
    }

    /// Every unit not yet returned, merged per catalog item.
    pub fn outstanding_lines(&self) -> Vec<ReturnLine> {
        let mut map: BTreeMap<&str, i64> = BTreeMap::new();
        for item in &self.items {
            if item.returnable() > 0 {
                *map.entry(item.item_id.as_str()).or_insert(0) += item.returnable();
            }
        }
        map.into_iter()
            .map(|(item_id, quantity)| ReturnLine {
                item_id: item_id.to_string(),
                quantity,
            })
            .collect()
    }

    /// Validates a return request against this order.
    ///
    /// Fails with `ReturnExceedsPurchase` if any item asks for more than is
    /// still returnable (items not on the order have nothing returnable).
    pub fn plan_return(&self, lines: &[ReturnLine]) -> CoreResult<ReturnPlan> {
        if !matches!(
            self.status,
            OrderStatus::Completed | OrderStatus::PartiallyReturned
        ) {
            return Err(CoreError::InvalidTransition {
                order_id: self.id.clone(),
                from: self.status,
                to: OrderStatus::Returned,
            });
        }
        if lines.is_empty() {
            return Err(ValidationError::Required {
                field: "return items".to_string(),
            }
            .into());
        }

        let mut requested: BTreeMap<&str, i64> = BTreeMap::new();
        for line in lines {
            validate_quantity(line.quantity)?;
            *requested.entry(line.item_id.as_str()).or_insert(0) += line.quantity;
        }

        let mut returning_gross = Money::zero();
        let mut planned = Vec::with_capacity(requested.len());
        for (item_id, qty) in requested {
            let returnable: i64 = self
                .items
                .iter()
                .filter(|i| i.item_id == item_id)
                .map(OrderItem::returnable)
                .sum();
            if qty > returnable {
                return Err(CoreError::ReturnExceedsPurchase {
                    item_id: item_id.to_string(),
                    returnable,
                    requested: qty,
                });
            }
            returning_gross += self.gross_value(item_id, qty);
            planned.push(ReturnLine {
                item_id: item_id.to_string(),
                quantity: qty,
            });
        }

        let remaining: i64 = self.items.iter().map(OrderItem::returnable).sum::<i64>()
            - planned.iter().map(|l| l.quantity).sum::<i64>();
        let resulting_status = if remaining == 0 {
            OrderStatus::Returned
        } else {
            OrderStatus::PartiallyReturned
        };

        // Cumulative, so a series of partial returns adds up to the amount due.
        let returned_gross = self.returned_gross();
        let refund = self.net_of_discount(returned_gross + returning_gross)
            - self.net_of_discount(returned_gross);

        Ok(ReturnPlan {
            lines: planned,
            refund,
            resulting_status,
        })
    }

    /// What the customer has been paid back so far, net of the discount.
    pub fn refunded_amount(&self) -> Money {
        self.net_of_discount(self.returned_gross())
    }

    fn returned_gross(&self) -> Money {
        self.items
            .iter()
            .map(|i| i.unit_price.multiply_quantity(i.returned_quantity))
            .sum()
    }

    /// Share of the amount due that a gross line value stands for. The
    /// order discount is spread over the lines in proportion to their value.
    fn net_of_discount(&self, gross: Money) -> Money {
        if self.total.is_zero() {
            return Money::zero();
        }
        let net = i128::from(gross.cents()) * i128::from(self.amount_due().cents())
            / i128::from(self.total.cents());
        Money::from_cents(net as i64)
    }

    /// Undiscounted value of `qty` units of an item, walking its lines in order.
    fn gross_value(&self, item_id: &str, mut qty: i64) -> Money {
        let mut value = Money::zero();
        for item in self.items.iter().filter(|i| i.item_id == item_id) {
            let take = qty.min(item.returnable());
            value += item.unit_price.multiply_quantity(take);
            qty -= take;
            if qty == 0 {
                break;
            }
        }
        value
    }

    /// Marks the planned units as returned and moves the status.
    pub fn apply_return(&mut self, plan: &ReturnPlan, actor: &str) -> CoreResult<()> {
        self.transition(plan.resulting_status, actor)?;
        for line in &plan.lines {
            let mut qty = line.quantity;
            for item in self.items.iter_mut().filter(|i| i.item_id == line.item_id) {
                let take = qty.min(item.returnable());
                item.returned_quantity += take;
                qty -= take;
                if qty == 0 {
                    break;
                }
            }
        }
        Ok(())
    }

    pub fn append_chat(&mut self, author: ChatAuthor, text: &str) -> CoreResult<ChatMessage> {
        validate_chat_text(text)?;
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            author,
            text: text.trim().to_string(),
            at: Utc::now(),
        };
        self.chat.push(message.clone());
        self.updated_at = message.at;
        Ok(message)
    }
}

/// Filter for listing orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub segment: Option<BusinessSegment>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.status.map_or(true, |s| order.status == s)
            && self.segment.map_or(true, |s| order.segment == s)
    }
}

/// The order container, persisted under `orders`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub last_number: u32,
}

impl OrderBook {
    pub fn next_number(&mut self) -> u32 {
        self.last_number += 1;
        self.last_number
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> CoreResult<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))
    }

    /// Newest first.
    pub fn list(&self, filter: &OrderFilter) -> Vec<Order> {
        self.orders
            .iter()
            .rev()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, price: i64, qty: i64) -> NewOrderItem {
        NewOrderItem {
            item_id: id.to_string(),
            name: format!("Item {}", id),
            unit_price: Money::from_cents(price),
            quantity: qty,
        }
    }

    fn new_order(items: Vec<NewOrderItem>, status: OrderStatus) -> NewOrder {
        NewOrder {
            customer: CustomerRef::named("Maria"),
            segment: BusinessSegment::Restaurant,
            source: OrderSource::Counter,
            items,
            discount: Money::zero(),
            payment: PaymentDetail::single(PaymentMethod::Cash),
            status,
            notes: None,
        }
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let order = Order::create(
            1,
            new_order(vec![line("a", 1000, 2), line("b", 500, 1)], OrderStatus::Pending),
            "Ana",
        )
        .unwrap();
        assert_eq!(order.total, Money::from_cents(2500));
        assert_eq!(order.history.len(), 1);
        assert_eq!(order.history[0].status, OrderStatus::Pending);
    }

    #[test]
    fn test_transition_appends_history() {
        let mut order =
            Order::create(1, new_order(vec![line("a", 100, 1)], OrderStatus::Pending), "Ana")
                .unwrap();
        order.transition(OrderStatus::Accepted, "Ana").unwrap();
        order.transition(OrderStatus::Ready, "Bruno").unwrap();

        let statuses: Vec<OrderStatus> = order.history.iter().map(|h| h.status).collect();
        assert_eq!(
            statuses,
            vec![OrderStatus::Pending, OrderStatus::Accepted, OrderStatus::Ready]
        );
        assert_eq!(order.history[2].actor, "Bruno");
    }

    #[test]
    fn test_illegal_transitions() {
        use OrderStatus::*;
        assert!(!Ready.can_transition_to(Accepted));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Returned.can_transition_to(PartiallyReturned));
        assert!(!Pending.can_transition_to(Returned));
        assert!(PartiallyReturned.can_transition_to(Returned));
        assert!(Delivering.can_transition_to(Cancelled));
    }

    #[test]
    fn test_terminal_states() {
        use OrderStatus::*;
        for s in [Completed, Cancelled, Rejected, Returned] {
            assert!(s.is_terminal());
        }
        assert!(!PartiallyReturned.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn test_plan_partial_return() {
        let order = Order::create(
            1,
            new_order(vec![line("a", 1000, 2), line("b", 500, 1)], OrderStatus::Completed),
            "Ana",
        )
        .unwrap();

        let plan = order
            .plan_return(&[ReturnLine {
                item_id: "a".to_string(),
                quantity: 1,
            }])
            .unwrap();
        assert_eq!(plan.refund, Money::from_cents(1000));
        assert_eq!(plan.resulting_status, OrderStatus::PartiallyReturned);
    }

    #[test]
    fn test_plan_return_exceeding_purchase() {
        let order =
            Order::create(1, new_order(vec![line("a", 1000, 2)], OrderStatus::Completed), "Ana")
                .unwrap();
        let err = order
            .plan_return(&[
                ReturnLine {
                    item_id: "a".to_string(),
                    quantity: 2,
                },
                ReturnLine {
                    item_id: "a".to_string(),
                    quantity: 1,
                },
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ReturnExceedsPurchase {
                returnable: 2,
                requested: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_successive_returns_reach_returned() {
        let mut order =
            Order::create(1, new_order(vec![line("a", 1000, 2)], OrderStatus::Completed), "Ana")
                .unwrap();
        let one = [ReturnLine {
            item_id: "a".to_string(),
            quantity: 1,
        }];

        let plan = order.plan_return(&one).unwrap();
        order.apply_return(&plan, "Ana").unwrap();
        assert_eq!(order.status, OrderStatus::PartiallyReturned);

        let plan = order.plan_return(&one).unwrap();
        assert_eq!(plan.resulting_status, OrderStatus::Returned);
        order.apply_return(&plan, "Ana").unwrap();
        assert_eq!(order.items[0].returned_quantity, 2);
        assert!(order.outstanding_lines().is_empty());
    }

    #[test]
    fn test_refunds_spread_the_discount() {
        let mut new = new_order(vec![line("a", 1000, 3)], OrderStatus::Completed);
        new.discount = Money::from_cents(1000);
        let mut order = Order::create(1, new, "Ana").unwrap();
        assert_eq!(order.amount_due(), Money::from_cents(2000));

        let one = [ReturnLine {
            item_id: "a".to_string(),
            quantity: 1,
        }];
        let mut refunded = Money::zero();
        for expected in [666, 667, 667] {
            let plan = order.plan_return(&one).unwrap();
            assert_eq!(plan.refund, Money::from_cents(expected));
            refunded += plan.refund;
            order.apply_return(&plan, "Ana").unwrap();
        }

        assert_eq!(order.status, OrderStatus::Returned);
        assert_eq!(refunded, order.amount_due());
        assert_eq!(order.refunded_amount(), order.amount_due());
    }

    #[test]
    fn test_return_requires_completed_order() {
        let order =
            Order::create(1, new_order(vec![line("a", 1000, 2)], OrderStatus::Pending), "Ana")
                .unwrap();
        assert!(matches!(
            order.plan_return(&order.outstanding_lines()),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_split_payment_must_cover_amount_due() {
        let mut new = new_order(vec![line("a", 1000, 2)], OrderStatus::Completed);
        new.payment = PaymentDetail::Split {
            legs: vec![
                PaymentLeg {
                    method: PaymentMethod::Cash,
                    amount: Money::from_cents(500),
                    installments: 1,
                },
                PaymentLeg {
                    method: PaymentMethod::Credit,
                    amount: Money::from_cents(1000),
                    installments: 3,
                },
            ],
        };
        assert!(new.validate().is_err());

        if let PaymentDetail::Split { legs } = &mut new.payment {
            legs[0].amount = Money::from_cents(1000);
        }
        let order = Order::create(1, new, "Ana").unwrap();
        assert_eq!(order.drawer_amount(), Money::from_cents(1000));
        assert!(!order.payment.refunds_in_cash());
    }

    #[test]
    fn test_cannot_start_in_side_branch() {
        let new = new_order(vec![line("a", 100, 1)], OrderStatus::Cancelled);
        assert!(Order::create(1, new, "Ana").is_err());
    }

    #[test]
    fn test_payment_detail_wire_format() {
        let json = serde_json::to_value(PaymentDetail::single(PaymentMethod::Pix)).unwrap();
        assert_eq!(json["type"], "single");
        assert_eq!(json["method"], "pix");
    }

    #[test]
    fn test_order_book_numbers_and_filter() {
        let mut book = OrderBook::default();
        for status in [OrderStatus::Pending, OrderStatus::Completed] {
            let n = book.next_number();
            let order = Order::create(n, new_order(vec![line("a", 100, 1)], status), "Ana").unwrap();
            book.orders.push(order);
        }
        assert_eq!(book.last_number, 2);
        let pending = book.list(&OrderFilter {
            status: Some(OrderStatus::Pending),
            segment: None,
        });
        assert_eq!(pending.len(), 1);
        assert_eq!(book.list(&OrderFilter::default())[0].number, 2);
    }
}
