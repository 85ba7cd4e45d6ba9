//! # Order Service
//!
//! The one place where order, stock, cash and CRM rules meet. Counter
//! checkout and incoming channel orders both go through here.
//!
//! ## Create Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_order(new, actor)                                               │
//! │                                                                         │
//! │  PRECONDITIONS (nothing mutated yet)                                    │
//! │   1. actor may create orders                                            │
//! │   2. proposal is valid (lines, prices, discount, payment split)         │
//! │   3. cash/debit payment ──► register must be open                       │
//! │   4. every item exists; tracked items have enough stock                 │
//! │                                                                         │
//! │  EFFECTS                                                                │
//! │   5. deduct stock (alerts go to the notifier)                           │
//! │   6. reserve number, append order with its first history entry          │
//! │   7. register open + drawer amount > 0 ──► ledger `sale`                │
//! │   8. upsert CRM record by stable customer key                           │
//! │   9. notify (best effort)                                               │
//! │  10. dispatch OrderCreated ──► auto-accept                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Reversal
//! ```text
//! cancel / reject ─┐
//! full return ─────┼──► reverse_stock_effects(order, lines) ──► replenish
//! partial return ──┘
//! ```
//!
//! Operations are serialized by an internal gate so that a check and the
//! writes that depend on it are never interleaved with another operation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};
use ts_rs::TS;

use bizdesk_core::{
    Actor, BusinessConfig, CashMovement, CashTransaction, ChatAuthor, ChatMessage,
    ConfigRepository, CoreError, CoreResult, CustomerRepository, LedgerRepository, Money,
    NewOrder, Order, OrderFilter, OrderRepository, OrderStatus, Permission, ReturnLine,
    StockAdjustment, StockRepository, ValidationError, SYSTEM_ACTOR,
};
use bizdesk_store::LocalStore;

use crate::events::DomainEvent;
use crate::notify::{notify_best_effort, Notification, Notifier};

/// The repositories an [`OrderService`] works against.
#[derive(Clone)]
pub struct OrderPorts {
    pub stock: Arc<dyn StockRepository>,
    pub ledger: Arc<dyn LedgerRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub config: Arc<dyn ConfigRepository>,
}

impl OrderPorts {
    pub fn from_store(store: &LocalStore) -> Self {
        OrderPorts {
            stock: Arc::new(store.catalog()),
            ledger: Arc::new(store.register()),
            customers: Arc::new(store.customers()),
            orders: Arc::new(store.orders()),
            config: Arc::new(store.config()),
        }
    }
}

/// Result of a return.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReturnOutcome {
    pub order: Order,
    pub refund: Money,
    /// The `bleed` entry when the refund was paid out of the drawer.
    pub refund_entry: Option<CashTransaction>,
}

pub struct OrderService {
    stock: Arc<dyn StockRepository>,
    ledger: Arc<dyn LedgerRepository>,
    customers: Arc<dyn CustomerRepository>,
    orders: Arc<dyn OrderRepository>,
    config: Arc<dyn ConfigRepository>,
    notifier: Arc<dyn Notifier>,
    gate: Mutex<()>,
}

impl OrderService {
    pub fn new(ports: OrderPorts, notifier: Arc<dyn Notifier>) -> Self {
        OrderService {
            stock: ports.stock,
            ledger: ports.ledger,
            customers: ports.customers,
            orders: ports.orders,
            config: ports.config,
            notifier,
            gate: Mutex::new(()),
        }
    }

    pub fn from_store(store: &LocalStore, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(OrderPorts::from_store(store), notifier)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The gate guards no data, so a poisoned lock is still usable.
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get_order(&self, order_id: &str) -> CoreResult<Order> {
        self.orders.get(order_id)
    }

    /// Newest first.
    pub fn list_orders(&self, filter: &OrderFilter) -> CoreResult<Vec<Order>> {
        self.orders.list(filter)
    }

    // =========================================================================
    // Create
    // =========================================================================

    pub fn create_order(&self, new: NewOrder, actor: &Actor) -> CoreResult<Order> {
        actor.require(Permission::CreateOrders)?;
        new.validate()?;
        let _gate = self.lock();

        let register = self.ledger.register()?;
        let uses_drawer = new
            .payment
            .allocations(new.amount_due())
            .iter()
            .any(|(method, _)| method.routes_through_drawer());
        if uses_drawer && !register.is_open {
            return Err(CoreError::RegisterClosed);
        }

        let quantities: Vec<(String, i64)> = new
            .quantities()
            .into_iter()
            .map(|(id, qty)| (id.to_string(), qty))
            .collect();
        for (item_id, qty) in &quantities {
            let item = self
                .stock
                .item(item_id)?
                .ok_or_else(|| CoreError::ItemNotFound(item_id.clone()))?;
            if let Some(available) = item.stock {
                if available < *qty {
                    return Err(CoreError::InsufficientStock {
                        item_id: item.id,
                        name: item.name,
                        available,
                        requested: *qty,
                    });
                }
            }
        }

        let config = self.config.business_config()?;

        for (item_id, qty) in &quantities {
            let adjustment = self.stock.deduct(item_id, *qty)?;
            self.announce_stock(adjustment);
        }

        let number = self.orders.next_number()?;
        let order = Order::create(number, new, &actor.name)?;
        self.orders.insert(&order)?;
        info!(
            order_id = %order.id,
            number,
            status = %order.status,
            total = %order.total,
            actor = %actor.name,
            "Order created"
        );

        let drawer = order.drawer_amount();
        if register.is_open && drawer.is_positive() {
            self.ledger
                .register_sale(drawer, &format!("Order #{}", number), &actor.name)?;
        }

        if let Some(customer) = self.customers.record_order(
            &order.customer,
            order.amount_due(),
            order.created_at,
            config.vip_threshold,
        )? {
            debug!(customer_id = %customer.id, orders = customer.total_orders, "Customer updated");
        }

        notify_best_effort(
            self.notifier.as_ref(),
            Notification::NewOrder {
                order_id: order.id.clone(),
                number,
                segment: order.segment,
            },
        );

        let event = DomainEvent::OrderCreated {
            order_id: order.id.clone(),
        };
        match self.dispatch_locked(&event, &config)?.pop() {
            Some(accepted) => Ok(accepted),
            None => Ok(order),
        }
    }

    fn announce_stock(&self, adjustment: StockAdjustment) {
        if adjustment.deactivated {
            info!(item_id = %adjustment.item_id, "Item sold out and switched off");
        }
        if let Some(alert) = adjustment.alert {
            notify_best_effort(self.notifier.as_ref(), Notification::StockAlert(alert));
        }
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Moves an order along its lifecycle.
    ///
    /// Cancelling or rejecting puts every outstanding unit back in stock.
    /// `Returned` is a full return of what is left; `PartiallyReturned`
    /// needs item quantities and goes through [`Self::return_items`].
    pub fn update_status(
        &self,
        order_id: &str,
        next: OrderStatus,
        actor: &Actor,
    ) -> CoreResult<Order> {
        actor.require(Permission::UpdateOrders)?;
        if next == OrderStatus::PartiallyReturned {
            return Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: "a partial return needs item quantities".to_string(),
            }
            .into());
        }

        let _gate = self.lock();
        let mut order = self.orders.get(order_id)?;

        match next {
            OrderStatus::Returned => {
                actor.require(Permission::ProcessReturns)?;
                let lines = order.outstanding_lines();
                return Ok(self.return_locked(order, &lines, actor)?.order);
            }
            OrderStatus::Cancelled | OrderStatus::Rejected => {
                if !order.status.can_transition_to(next) {
                    return Err(CoreError::InvalidTransition {
                        order_id: order.id,
                        from: order.status,
                        to: next,
                    });
                }
                let lines = order.outstanding_lines();
                self.reverse_stock_effects(&order, &lines, next.as_str())?;
            }
            _ => {}
        }

        let from = order.status;
        order.transition(next, &actor.name)?;
        self.orders.save(&order)?;
        info!(order_id = %order.id, from = %from, to = %next, actor = %actor.name, "Order status changed");

        self.announce_status(&order);
        Ok(order)
    }

    fn announce_status(&self, order: &Order) {
        notify_best_effort(
            self.notifier.as_ref(),
            Notification::StatusChanged {
                order_id: order.id.clone(),
                number: order.number,
                status: order.status,
            },
        );
    }

    // =========================================================================
    // Returns
    // =========================================================================

    pub fn return_items(
        &self,
        order_id: &str,
        lines: &[ReturnLine],
        actor: &Actor,
    ) -> CoreResult<ReturnOutcome> {
        actor.require(Permission::ProcessReturns)?;
        let _gate = self.lock();
        let order = self.orders.get(order_id)?;
        self.return_locked(order, lines, actor)
    }

    fn return_locked(
        &self,
        mut order: Order,
        lines: &[ReturnLine],
        actor: &Actor,
    ) -> CoreResult<ReturnOutcome> {
        let plan = order.plan_return(lines)?;

        let pay_from_drawer = if order.payment.refunds_in_cash() && plan.refund.is_positive() {
            let register = self.ledger.register()?;
            if register.is_open {
                register.ensure_can_withdraw(plan.refund)?;
            }
            register.is_open
        } else {
            false
        };

        self.reverse_stock_effects(&order, &plan.lines, "return")?;

        let refund_entry = if pay_from_drawer {
            Some(self.ledger.add_movement(
                CashMovement::Bleed,
                plan.refund,
                &format!("Refund order #{}", order.number),
                &actor.name,
            )?)
        } else {
            None
        };

        order.apply_return(&plan, &actor.name)?;
        self.orders.save(&order)?;
        info!(
            order_id = %order.id,
            refund = %plan.refund,
            status = %order.status,
            from_drawer = pay_from_drawer,
            "Items returned"
        );

        self.announce_status(&order);
        Ok(ReturnOutcome {
            order,
            refund: plan.refund,
            refund_entry,
        })
    }

    /// Puts `lines` back into stock on behalf of `order`.
    ///
    /// Items deleted from the catalog since the order was placed are
    /// skipped with a warning; other failures abort.
    pub fn reverse_stock_effects(
        &self,
        order: &Order,
        lines: &[ReturnLine],
        reason: &str,
    ) -> CoreResult<Vec<StockAdjustment>> {
        let note = format!("Order #{} {}", order.number, reason);
        let mut adjustments = Vec::with_capacity(lines.len());
        for line in lines {
            match self.stock.replenish(&line.item_id, line.quantity, Some(&note)) {
                Ok(adjustment) => adjustments.push(adjustment),
                Err(CoreError::ItemNotFound(item_id)) => {
                    warn!(
                        order_id = %order.id,
                        item_id = %item_id,
                        quantity = line.quantity,
                        "Item no longer in catalog, stock not restored"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(adjustments)
    }

    // =========================================================================
    // Chat
    // =========================================================================

    pub fn append_chat(
        &self,
        order_id: &str,
        author: ChatAuthor,
        text: &str,
    ) -> CoreResult<ChatMessage> {
        let _gate = self.lock();
        let mut order = self.orders.get(order_id)?;
        let message = order.append_chat(author, text)?;
        self.orders.save(&order)?;
        debug!(order_id = %order.id, author = ?author, "Chat message appended");
        Ok(message)
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Runs the rules attached to `event`; returns the orders it changed.
    pub fn dispatch(&self, event: &DomainEvent) -> CoreResult<Vec<Order>> {
        let _gate = self.lock();
        let config = self.config.business_config()?;
        self.dispatch_locked(event, &config)
    }

    fn dispatch_locked(
        &self,
        event: &DomainEvent,
        config: &BusinessConfig,
    ) -> CoreResult<Vec<Order>> {
        let candidates = match event {
            DomainEvent::OrderCreated { order_id } => vec![self.orders.get(order_id)?],
            DomainEvent::ServiceConfigChanged { segment } => self.orders.list(&OrderFilter {
                status: Some(OrderStatus::Pending),
                segment: Some(*segment),
            })?,
        };

        let mut changed = Vec::new();
        for order in candidates {
            if let Some(order) = self.auto_accept(order, config)? {
                changed.push(order);
            }
        }
        Ok(changed)
    }

    /// Moves a pending order of an auto-accepting segment forward.
    /// Anything already past pending is left alone.
    fn auto_accept(&self, mut order: Order, config: &BusinessConfig) -> CoreResult<Option<Order>> {
        if order.status != OrderStatus::Pending || !config.auto_accepts(order.segment) {
            return Ok(None);
        }
        let target = order.segment.auto_accept_target();
        order.transition(target, SYSTEM_ACTOR)?;
        self.orders.save(&order)?;
        info!(order_id = %order.id, segment = %order.segment, status = %target, "Order auto-accepted");

        self.announce_status(&order);
        Ok(Some(order))
    }
}
