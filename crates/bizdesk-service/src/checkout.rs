//! # Checkout Session
//!
//! The counter cart: items with frozen prices, an optional discount, and
//! one or more payments. Finalizing hands a completed counter sale to the
//! [`OrderService`], which applies the same stock and cash rules as any
//! other order.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier Action            Session Call            Cart State Change    │
//! │  ──────────────            ────────────            ─────────────────    │
//! │                                                                         │
//! │  Tap item ───────────────► add_item() ───────────► items.push / qty+=  │
//! │  Change quantity ────────► update_quantity() ────► qty = n (0 removes) │
//! │  10% off ────────────────► set_discount() ───────► discount            │
//! │  Cash $50 ───────────────► add_payment() ────────► payments.push       │
//! │                                                    (change returned)    │
//! │  Confirm ────────────────► finalize() ───────────► OrderService        │
//! │                                                    then cart cleared    │
//! │                                                                         │
//! │  All calls lock the cart; finalize holds the lock until the order       │
//! │  is stored so the cart cannot change underneath it.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;

use bizdesk_core::validation::{validate_discount_bps, validate_installments, validate_quantity};
use bizdesk_core::{
    Actor, BusinessSegment, CatalogItem, CoreError, CoreResult, CustomerRef, Money, NewOrder,
    NewOrderItem, Order, OrderSource, OrderStatus, PaymentDetail, PaymentLeg, PaymentMethod,
    StockRepository, ValidationError, MAX_ITEM_QUANTITY, MAX_ORDER_LINES,
};

use crate::orders::OrderService;

// =============================================================================
// Cart
// =============================================================================

/// A cart line. Name and price are frozen when the item is added, so a
/// catalog edit mid-sale does not change what the customer was quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn from_catalog(item: &CatalogItem, quantity: i64) -> Self {
        CartItem {
            item_id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.price,
            quantity,
            added_at: Utc::now(),
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Discount {
    #[default]
    None,
    /// Basis points of the subtotal (1000 = 10%).
    Percent { bps: u32 },
    /// Fixed amount, capped at the subtotal.
    Amount { amount: Money },
}

/// ## Invariants
/// - Items are unique by `item_id` (adding again increases quantity)
/// - Quantities stay within `1..=MAX_ITEM_QUANTITY`
/// - Payments never exceed the total; cash overpayment becomes change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub customer: CustomerRef,
    pub discount: Discount,
    pub payments: Vec<PaymentLeg>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            customer: CustomerRef::named("Walk-in"),
            discount: Discount::None,
            payments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn add_item(&mut self, item: &CatalogItem, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        if !item.is_available {
            return Err(ValidationError::InvalidFormat {
                field: "item".to_string(),
                reason: format!("{} is not available", item.name),
            }
            .into());
        }

        if let Some(line) = self.items.iter_mut().find(|i| i.item_id == item.id) {
            let new_qty = line.quantity + quantity;
            validate_quantity(new_qty)?;
            line.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_ORDER_LINES {
            return Err(ValidationError::OutOfRange {
                field: "items".to_string(),
                min: 1,
                max: MAX_ORDER_LINES as i64,
            }
            .into());
        }

        self.items.push(CartItem::from_catalog(item, quantity));
        Ok(())
    }

    /// Zero removes the line.
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(item_id);
        }
        if quantity < 0 || quantity > MAX_ITEM_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 0,
                max: MAX_ITEM_QUANTITY,
            }
            .into());
        }

        let line = self
            .items
            .iter_mut()
            .find(|i| i.item_id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.item_id != item_id);
        if self.items.len() == before {
            return Err(CoreError::ItemNotFound(item_id.to_string()));
        }
        Ok(())
    }

    pub fn set_discount(&mut self, discount: Discount) -> CoreResult<()> {
        match discount {
            Discount::Percent { bps } => validate_discount_bps(bps)?,
            Discount::Amount { amount } if amount.is_negative() => {
                return Err(CoreError::InvalidAmount {
                    amount,
                    reason: "discount cannot be negative".to_string(),
                })
            }
            _ => {}
        }
        self.discount = discount;
        Ok(())
    }

    /// Records a payment and returns the change owed.
    ///
    /// Only cash may be overpaid; the leg is recorded at the remaining
    /// amount and the difference comes back as change.
    pub fn add_payment(
        &mut self,
        method: PaymentMethod,
        tendered: Money,
        installments: u8,
    ) -> CoreResult<Money> {
        validate_installments(installments)?;
        if !tendered.is_positive() {
            return Err(CoreError::InvalidAmount {
                amount: tendered,
                reason: "payment must be greater than zero".to_string(),
            });
        }

        let remaining = self.remaining();
        if remaining.is_zero() {
            return Err(CoreError::InvalidAmount {
                amount: tendered,
                reason: "the sale is already paid".to_string(),
            });
        }

        let (amount, change) = if tendered > remaining {
            if method != PaymentMethod::Cash {
                return Err(CoreError::InvalidAmount {
                    amount: tendered,
                    reason: format!("only {} is left to pay", remaining),
                });
            }
            (remaining, tendered - remaining)
        } else {
            (tendered, Money::zero())
        };

        self.payments.push(PaymentLeg {
            method,
            amount,
            installments,
        });
        Ok(change)
    }

    pub fn remove_payment(&mut self, index: usize) -> CoreResult<PaymentLeg> {
        if index >= self.payments.len() {
            return Err(ValidationError::OutOfRange {
                field: "payment".to_string(),
                min: 0,
                max: self.payments.len() as i64 - 1,
            }
            .into());
        }
        Ok(self.payments.remove(index))
    }

    pub fn clear(&mut self) {
        *self = Cart::new();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn discount_amount(&self) -> Money {
        let subtotal = self.subtotal();
        match self.discount {
            Discount::None => Money::zero(),
            Discount::Percent { bps } => subtotal.percentage_bps(bps),
            Discount::Amount { amount } => amount.min(subtotal),
        }
    }

    pub fn total(&self) -> Money {
        self.subtotal().saturating_sub_floor(self.discount_amount())
    }

    pub fn paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn remaining(&self) -> Money {
        self.total().saturating_sub_floor(self.paid())
    }

    /// One leg becomes a single payment, several become a split.
    ///
    /// A cart fully covered by its discount needs no payment and is
    /// recorded as a voucher, which keeps it out of the cash drawer.
    pub fn payment_detail(&self) -> CoreResult<PaymentDetail> {
        if self.payments.is_empty() && !self.is_empty() && self.total().is_zero() {
            return Ok(PaymentDetail::single(PaymentMethod::Voucher));
        }
        if self.payments.is_empty() {
            return Err(ValidationError::Required {
                field: "payment".to_string(),
            }
            .into());
        }
        if self.paid() != self.total() {
            return Err(CoreError::InvalidAmount {
                amount: self.paid(),
                reason: format!("payments must add up to {}", self.total()),
            });
        }
        Ok(match self.payments.as_slice() {
            [leg] => PaymentDetail::Single {
                method: leg.method,
                installments: leg.installments,
            },
            legs => PaymentDetail::Split {
                legs: legs.to_vec(),
            },
        })
    }

    /// The counter sale this cart describes.
    pub fn to_new_order(
        &self,
        segment: BusinessSegment,
        notes: Option<String>,
    ) -> CoreResult<NewOrder> {
        if self.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }
        Ok(NewOrder {
            customer: self.customer.clone(),
            segment,
            source: OrderSource::Counter,
            items: self
                .items
                .iter()
                .map(|i| NewOrderItem {
                    item_id: i.item_id.clone(),
                    name: i.name.clone(),
                    unit_price: i.unit_price,
                    quantity: i.quantity,
                })
                .collect(),
            discount: self.discount_amount(),
            payment: self.payment_detail()?,
            status: OrderStatus::Completed,
            notes,
        })
    }
}

/// Cart totals summary for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub paid: Money,
    pub remaining: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.items.len(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            discount: cart.discount_amount(),
            total: cart.total(),
            paid: cart.paid(),
            remaining: cart.remaining(),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// One cart bound to a segment, finalized through the order service.
pub struct CheckoutSession {
    id: String,
    segment: BusinessSegment,
    cart: Arc<Mutex<Cart>>,
    stock: Arc<dyn StockRepository>,
    orders: Arc<OrderService>,
}

impl CheckoutSession {
    pub fn new(
        segment: BusinessSegment,
        stock: Arc<dyn StockRepository>,
        orders: Arc<OrderService>,
    ) -> Self {
        CheckoutSession {
            id: Uuid::new_v4().to_string(),
            segment,
            cart: Arc::new(Mutex::new(Cart::new())),
            stock,
            orders,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        // A panic mid-update leaves at worst a stale cart, which is still usable.
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        f(&self.lock())
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        f(&mut self.lock())
    }

    pub fn totals(&self) -> CartTotals {
        self.with_cart(|cart| CartTotals::from(cart))
    }

    /// Looks the item up in the catalog and adds it at today's price.
    pub fn add_item(&self, item_id: &str, quantity: i64) -> CoreResult<CartTotals> {
        let item = self
            .stock
            .item(item_id)?
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        self.with_cart_mut(|cart| {
            cart.add_item(&item, quantity)?;
            Ok(CartTotals::from(&*cart))
        })
    }

    pub fn update_quantity(&self, item_id: &str, quantity: i64) -> CoreResult<CartTotals> {
        self.with_cart_mut(|cart| {
            cart.update_quantity(item_id, quantity)?;
            Ok(CartTotals::from(&*cart))
        })
    }

    pub fn remove_item(&self, item_id: &str) -> CoreResult<CartTotals> {
        self.with_cart_mut(|cart| {
            cart.remove_item(item_id)?;
            Ok(CartTotals::from(&*cart))
        })
    }

    pub fn set_customer(&self, customer: CustomerRef) {
        self.with_cart_mut(|cart| cart.customer = customer);
    }

    pub fn set_discount(&self, discount: Discount) -> CoreResult<CartTotals> {
        self.with_cart_mut(|cart| {
            cart.set_discount(discount)?;
            Ok(CartTotals::from(&*cart))
        })
    }

    /// Returns the change owed for this payment.
    pub fn add_payment(
        &self,
        method: PaymentMethod,
        tendered: Money,
        installments: u8,
    ) -> CoreResult<Money> {
        let change = self.with_cart_mut(|cart| cart.add_payment(method, tendered, installments))?;
        debug!(session_id = %self.id, method = %method, tendered = %tendered, change = %change, "Payment added");
        Ok(change)
    }

    pub fn remove_payment(&self, index: usize) -> CoreResult<PaymentLeg> {
        self.with_cart_mut(|cart| cart.remove_payment(index))
    }

    pub fn clear(&self) {
        self.with_cart_mut(Cart::clear);
    }

    /// Places the sale. The cart is cleared only when the order is stored;
    /// on failure it is left as it was so the cashier can fix it.
    pub fn finalize(&self, actor: &Actor, notes: Option<String>) -> CoreResult<Order> {
        let mut cart = self.lock();
        let new = cart.to_new_order(self.segment, notes)?;
        let order = self.orders.create_order(new, actor)?;
        cart.clear();

        info!(session_id = %self.id, order_id = %order.id, number = order.number, "Checkout finalized");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoopNotifier;
    use bizdesk_core::{LedgerRepository, NewCatalogItem, Role};
    use bizdesk_store::LocalStore;

    fn item(id: &str, cents: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            description: None,
            price: Money::from_cents(cents),
            category: "Test".to_string(),
            stock: None,
            low_stock_threshold: None,
            segment: BusinessSegment::Restaurant,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cart_add_same_item_increases_quantity() {
        let mut cart = Cart::new();
        let burger = item("1", 999);

        cart.add_item(&burger, 2).unwrap();
        cart.add_item(&burger, 3).unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(cart.subtotal(), Money::from_cents(4995));
    }

    #[test]
    fn test_cart_quantity_limits() {
        let mut cart = Cart::new();
        let burger = item("1", 999);

        cart.add_item(&burger, MAX_ITEM_QUANTITY).unwrap();
        assert!(cart.add_item(&burger, 1).is_err());
        assert!(cart.update_quantity("1", -1).is_err());

        cart.update_quantity("1", 0).unwrap();
        assert!(cart.is_empty());
        assert!(matches!(
            cart.update_quantity("1", 2),
            Err(CoreError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_unavailable_item_rejected() {
        let mut cart = Cart::new();
        let mut sold_out = item("1", 500);
        sold_out.is_available = false;
        assert!(cart.add_item(&sold_out, 1).is_err());
    }

    #[test]
    fn test_percent_discount_and_cash_change() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 1000), 2).unwrap();
        cart.add_item(&item("2", 500), 1).unwrap();
        cart.set_discount(Discount::Percent { bps: 1000 }).unwrap();

        assert_eq!(cart.total(), Money::from_cents(2250));

        let change = cart
            .add_payment(PaymentMethod::Cash, Money::from_major(30), 1)
            .unwrap();
        assert_eq!(change, Money::from_cents(750));
        assert_eq!(cart.paid(), Money::from_cents(2250));
        assert!(cart.remaining().is_zero());
        assert_eq!(
            cart.payment_detail().unwrap(),
            PaymentDetail::single(PaymentMethod::Cash)
        );
    }

    #[test]
    fn test_card_cannot_overpay() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 1000), 1).unwrap();
        assert!(cart
            .add_payment(PaymentMethod::Credit, Money::from_major(11), 1)
            .is_err());
    }

    #[test]
    fn test_split_payment_detail() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 3000), 1).unwrap();
        cart.add_payment(PaymentMethod::Cash, Money::from_major(10), 1)
            .unwrap();
        assert!(cart.payment_detail().is_err());

        cart.add_payment(PaymentMethod::Credit, Money::from_major(20), 3)
            .unwrap();
        match cart.payment_detail().unwrap() {
            PaymentDetail::Split { legs } => {
                assert_eq!(legs.len(), 2);
                assert_eq!(legs[1].installments, 3);
            }
            other => panic!("expected split, got {:?}", other),
        }
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 1000), 1).unwrap();
        cart.set_discount(Discount::Amount {
            amount: Money::from_major(50),
        })
        .unwrap();
        assert_eq!(cart.discount_amount(), Money::from_major(10));
        assert!(cart.total().is_zero());
    }

    fn session(store: &LocalStore) -> CheckoutSession {
        let orders = Arc::new(OrderService::from_store(store, Arc::new(NoopNotifier)));
        CheckoutSession::new(
            BusinessSegment::Restaurant,
            Arc::new(store.catalog()),
            orders,
        )
    }

    fn stocked(store: &LocalStore, name: &str, cents: i64, stock: i64) -> CatalogItem {
        store
            .catalog()
            .add(NewCatalogItem {
                name: name.to_string(),
                description: None,
                price: Money::from_cents(cents),
                category: "Test".to_string(),
                stock: Some(stock),
                low_stock_threshold: None,
                segment: BusinessSegment::Restaurant,
            })
            .unwrap()
    }

    #[test]
    fn test_finalize_places_counter_sale() {
        let store = LocalStore::in_memory();
        let burger = stocked(&store, "Burger", 1000, 10);
        let fries = stocked(&store, "Fries", 500, 10);
        store.register().open(Money::from_major(100), "Caio").unwrap();
        let checkout = session(&store);
        let cashier = Actor::new("Caio", Role::Cashier);

        checkout.add_item(&burger.id, 2).unwrap();
        let totals = checkout.add_item(&fries.id, 1).unwrap();
        assert_eq!(totals.total, Money::from_major(25));

        let change = checkout
            .add_payment(PaymentMethod::Cash, Money::from_major(50), 1)
            .unwrap();
        assert_eq!(change, Money::from_major(25));

        let order = checkout.finalize(&cashier, None).unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.source, OrderSource::Counter);
        assert_eq!(order.total, Money::from_major(25));
        assert!(checkout.with_cart(Cart::is_empty));
        assert_eq!(
            store.register().register().unwrap().current_balance,
            Money::from_major(125)
        );
    }

    #[test]
    fn test_failed_finalize_keeps_cart() {
        let store = LocalStore::in_memory();
        let burger = stocked(&store, "Burger", 1000, 10);
        let checkout = session(&store);
        let cashier = Actor::new("Caio", Role::Cashier);

        checkout.add_item(&burger.id, 1).unwrap();
        checkout
            .add_payment(PaymentMethod::Cash, Money::from_major(10), 1)
            .unwrap();

        assert!(matches!(
            checkout.finalize(&cashier, None),
            Err(CoreError::RegisterClosed)
        ));
        assert_eq!(checkout.totals().item_count, 1);
        assert_eq!(checkout.totals().paid, Money::from_major(10));
    }

    #[test]
    fn test_fully_discounted_cart_finalizes_without_payment() {
        let store = LocalStore::in_memory();
        let coffee = stocked(&store, "Coffee", 500, 10);
        let checkout = session(&store);
        let cashier = Actor::new("Caio", Role::Cashier);

        checkout.add_item(&coffee.id, 1).unwrap();
        let totals = checkout
            .set_discount(Discount::Percent { bps: 10_000 })
            .unwrap();
        assert!(totals.total.is_zero());
        assert!(checkout
            .add_payment(PaymentMethod::Pix, Money::from_cents(500), 1)
            .is_err());

        let order = checkout.finalize(&cashier, None).unwrap();
        assert_eq!(order.amount_due(), Money::zero());
        assert_eq!(order.discount, Money::from_cents(500));
        assert_eq!(order.payment, PaymentDetail::single(PaymentMethod::Voucher));
        assert!(checkout.with_cart(Cart::is_empty));
        assert!(store.register().register().unwrap().transactions.is_empty());
    }

    #[test]
    fn test_unknown_item() {
        let store = LocalStore::in_memory();
        let checkout = session(&store);
        assert!(matches!(
            checkout.add_item("nope", 1),
            Err(CoreError::ItemNotFound(_))
        ));
    }
}
