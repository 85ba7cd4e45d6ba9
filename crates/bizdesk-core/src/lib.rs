//! # bizdesk-core: Pure Business Logic for the Merchant Back Office
//!
//! Domain rules for orders, checkout, the cash register, catalog/inventory,
//! team access and reporting. No I/O lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        bizdesk Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Dashboard front end (SPA)                       │   │
//! │  │    Orders board ──► POS ──► Register ──► Inventory ──► Reports  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 bizdesk-service                                 │   │
//! │  │    OrderService, RegisterService, CheckoutSession, PIN login    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bizdesk-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  order   │ │ catalog  │ │ register │ │ repository ports │  │   │
//! │  │   │  state   │ │  stock   │ │  ledger  │ │  (traits only)   │  │   │
//! │  │   │ machine  │ │  alerts  │ │  shifts  │ │                  │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO LOGGING SINKS • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 bizdesk-store (persistence)                     │   │
//! │  │          JSON snapshot per key, file or in-memory               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - integer-cents Money type
//! - [`order`] - orders, payments and the status state machine
//! - [`catalog`] - catalog items, categories, stock deduction and alerts
//! - [`register`] - cash register ledger and closed shifts
//! - [`customer`] - CRM records keyed by contact data
//! - [`team`] - roster, roles, PIN verification
//! - [`business`] - per-tenant business configuration
//! - [`receipt`] - structured receipt layout
//! - [`report`] - sales summaries
//! - [`repository`] - storage ports implemented by `bizdesk-store`
//! - [`error`] / [`validation`] - typed errors and input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use bizdesk_core::{CashRegister, Money};
//!
//! let mut register = CashRegister::default();
//! register.open(Money::from_major(100), "Ana").unwrap();
//! register.register_sale(Money::from_cents(2500), "Order #1", "Ana").unwrap();
//!
//! assert_eq!(register.current_balance, Money::from_cents(12500));
//! assert_eq!(register.ledger_balance(), register.current_balance);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod business;
pub mod catalog;
pub mod customer;
pub mod error;
pub mod money;
pub mod order;
pub mod receipt;
pub mod register;
pub mod report;
pub mod repository;
pub mod team;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use business::{BusinessConfig, BusinessSegment, ServiceConfig, StockAlertConfig};
pub use catalog::{
    Catalog, CatalogItem, CatalogItemUpdate, Category, NewCatalogItem, StockAdjustment,
    StockAlert, StockSeverity,
};
pub use customer::{Customer, CustomerBook, CustomerRef, CustomerStatus};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{
    ChatAuthor, ChatMessage, NewOrder, NewOrderItem, Order, OrderBook, OrderFilter, OrderItem,
    OrderSource, OrderStatus, PaymentDetail, PaymentLeg, PaymentMethod, ReturnLine, ReturnPlan,
    StatusChange,
};
pub use receipt::{
    render_receipt, render_register_report, FontSize, PrinterConfig, Receipt, ReceiptAlign,
    ReceiptLine,
};
pub use register::{CashMovement, CashRegister, CashTransaction, ClosedShift, TransactionKind};
pub use report::SalesSummary;
pub use repository::{
    ConfigRepository, CustomerRepository, LedgerRepository, OrderRepository, StockRepository,
};
pub use team::{Actor, Permission, Role, Roster, TeamMember};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tenant id used when a business config has none of its own.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum quantity of one line item.
///
/// Catches fat-finger entries (1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum line items on one order or cart.
pub const MAX_ORDER_LINES: usize = 100;

/// Team PINs are exactly this many digits.
pub const PIN_LENGTH: usize = 4;

/// Actor name recorded for automated transitions (auto-accept).
pub const SYSTEM_ACTOR: &str = "System";
