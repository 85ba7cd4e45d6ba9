//! # Dashboard
//!
//! Wires one [`LocalStore`] into every service and exposes the operations a
//! UI surface calls, each returning [`ApiResult`] so the front end only ever
//! sees an error code and a message.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Dashboard::open(config)                         │
//! │                                                                         │
//! │   AppConfig ──► StoreConfig ──► LocalStore (snapshot cells)             │
//! │                                      │                                  │
//! │        ┌──────────────┬──────────────┼──────────────┬──────────────┐    │
//! │        ▼              ▼              ▼              ▼              ▼    │
//! │  OrderService  RegisterService  InventoryService  AccessService  ...   │
//! │        │                                                                │
//! │        └──► shared by CheckoutSession, SettingsService, ReportService  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use bizdesk_core::{
    Actor, BusinessSegment, CashMovement, CashTransaction, ClosedShift, Money, NewOrder, Order,
    OrderFilter, OrderStatus, Receipt, ReturnLine, SalesSummary, ServiceConfig, StockAlert,
};
use bizdesk_store::LocalStore;

use crate::access::{AccessService, Session};
use crate::checkout::CheckoutSession;
use crate::config::AppConfig;
use crate::error::ApiResult;
use crate::inventory::InventoryService;
use crate::notify::{LogNotifier, Notifier};
use crate::orders::{OrderService, ReturnOutcome};
use crate::register::{RegisterService, RegisterSummary};
use crate::reports::ReportService;
use crate::settings::SettingsService;

pub struct Dashboard {
    config: AppConfig,
    store: LocalStore,
    orders: Arc<OrderService>,
    register: RegisterService,
    inventory: InventoryService,
    access: AccessService,
    settings: SettingsService,
    reports: ReportService,
}

impl Dashboard {
    /// File-backed dashboard at the configured data directory.
    pub fn open(config: AppConfig) -> ApiResult<Self> {
        let store = LocalStore::open(config.store_config()?)?;
        Ok(Self::with_store(store, config))
    }

    /// In-memory dashboard seeded with the default datasets.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_store(LocalStore::in_memory(), config)
    }

    pub fn with_store(store: LocalStore, config: AppConfig) -> Self {
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier {
            sound: config.display.sound_enabled,
        });
        Self::with_notifier(store, config, notifier)
    }

    pub fn with_notifier(
        store: LocalStore,
        config: AppConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let orders = Arc::new(OrderService::from_store(&store, notifier.clone()));
        let register = RegisterService::new(Arc::new(store.register()));
        let inventory = InventoryService::new(store.catalog(), store.categories(), notifier);
        let access = AccessService::new(store.team(), config.login_delay());
        let settings = SettingsService::new(Arc::new(store.config()), orders.clone());
        let reports = ReportService::new(
            orders.clone(),
            Arc::new(store.register()),
            Arc::new(store.config()),
            config.printer.clone(),
        );
        info!("Dashboard ready");

        Dashboard {
            config,
            store,
            orders,
            register,
            inventory,
            access,
            settings,
            reports,
        }
    }

    // =========================================================================
    // Services
    // =========================================================================

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    pub fn register(&self) -> &RegisterService {
        &self.register
    }

    pub fn inventory(&self) -> &InventoryService {
        &self.inventory
    }

    pub fn access(&self) -> &AccessService {
        &self.access
    }

    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    pub fn reports(&self) -> &ReportService {
        &self.reports
    }

    // =========================================================================
    // Access
    // =========================================================================

    pub async fn login(&self, pin: &str) -> ApiResult<Option<Session>> {
        Ok(self.access.login(pin).await?)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    pub fn list_orders(&self, filter: &OrderFilter) -> ApiResult<Vec<Order>> {
        Ok(self.orders.list_orders(filter)?)
    }

    pub fn create_order(&self, new: NewOrder, actor: &Actor) -> ApiResult<Order> {
        Ok(self.orders.create_order(new, actor)?)
    }

    pub fn update_status(
        &self,
        order_id: &str,
        next: OrderStatus,
        actor: &Actor,
    ) -> ApiResult<Order> {
        Ok(self.orders.update_status(order_id, next, actor)?)
    }

    pub fn return_items(
        &self,
        order_id: &str,
        lines: &[ReturnLine],
        actor: &Actor,
    ) -> ApiResult<ReturnOutcome> {
        Ok(self.orders.return_items(order_id, lines, actor)?)
    }

    /// A fresh counter cart for `segment`.
    pub fn new_checkout(&self, segment: BusinessSegment) -> CheckoutSession {
        CheckoutSession::new(segment, Arc::new(self.store.catalog()), self.orders.clone())
    }

    // =========================================================================
    // Register
    // =========================================================================

    pub fn register_summary(&self) -> ApiResult<RegisterSummary> {
        Ok(self.register.summary()?)
    }

    pub fn open_register(&self, start_amount: Money, actor: &Actor) -> ApiResult<CashTransaction> {
        Ok(self.register.open(start_amount, actor)?)
    }

    pub fn close_register(&self, actor: &Actor) -> ApiResult<ClosedShift> {
        Ok(self.register.close(actor)?)
    }

    pub fn add_movement(
        &self,
        movement: CashMovement,
        amount: Money,
        description: &str,
        actor: &Actor,
    ) -> ApiResult<CashTransaction> {
        Ok(self.register.add_movement(movement, amount, description, actor)?)
    }

    // =========================================================================
    // Inventory, Settings, Reports
    // =========================================================================

    pub fn stock_alerts(&self) -> ApiResult<Vec<StockAlert>> {
        Ok(self.inventory.stock_alerts()?)
    }

    pub fn update_service(&self, service: ServiceConfig, actor: &Actor) -> ApiResult<Vec<Order>> {
        Ok(self.settings.update_service(service, actor)?)
    }

    pub fn sales_summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        actor: &Actor,
    ) -> ApiResult<SalesSummary> {
        Ok(self.reports.sales_summary(from, to, actor)?)
    }

    pub fn order_receipt(&self, order_id: &str) -> ApiResult<Receipt> {
        Ok(self.reports.order_receipt(order_id)?)
    }

    /// Writes every snapshot back to storage.
    pub fn flush(&self) -> ApiResult<()> {
        Ok(self.store.flush_all()?)
    }
}
