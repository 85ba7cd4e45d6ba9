//! # bizdesk-service: Orchestration for the Merchant Back Office
//!
//! Connects the pure rules of `bizdesk-core` to the snapshot repositories of
//! `bizdesk-store` and hands the result to a UI surface.
//!
//! ## Module Organization
//! ```text
//! bizdesk_service/
//! ├── lib.rs          ◄─── You are here (re-exports, tracing setup)
//! ├── dashboard.rs    ◄─── One store wired into every service
//! ├── orders.rs       ◄─── OrderService: the single home of order rules
//! ├── events.rs       ◄─── DomainEvent triggers (auto-accept)
//! ├── checkout.rs     ◄─── Counter cart and CheckoutSession
//! ├── register.rs     ◄─── Cash register with role gates
//! ├── inventory.rs    ◄─── Catalog, categories, stock corrections
//! ├── access.rs       ◄─── PIN login and team roster
//! ├── settings.rs     ◄─── Business configuration
//! ├── reports.rs      ◄─── Sales summary, receipts
//! ├── notify.rs       ◄─── Best-effort notifications
//! ├── config.rs       ◄─── AppConfig (defaults, TOML, env)
//! └── error.rs        ◄─── ApiError for UI callers
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bizdesk_service::{AppConfig, Dashboard};
//!
//! # async fn run() -> Result<(), bizdesk_service::ApiError> {
//! bizdesk_service::init_tracing();
//!
//! let dashboard = Dashboard::open(AppConfig::load_or_default(None))?;
//! if let Some(session) = dashboard.login("4242").await? {
//!     println!("Welcome, {}", session.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod checkout;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod inventory;
pub mod notify;
pub mod orders;
pub mod register;
pub mod reports;
pub mod settings;

pub use access::{AccessService, Session};
pub use checkout::{Cart, CartItem, CartTotals, CheckoutSession, Discount};
pub use config::AppConfig;
pub use dashboard::Dashboard;
pub use error::{ApiError, ApiResult, ConfigError, ConfigResult, ErrorCode};
pub use events::DomainEvent;
pub use inventory::InventoryService;
pub use notify::{LogNotifier, NoopNotifier, Notification, Notifier, NotifyError};
pub use orders::{OrderPorts, OrderService, ReturnOutcome};
pub use register::{RegisterService, RegisterSummary};
pub use reports::ReportService;
pub use settings::SettingsService;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bizdesk_service=trace` - Trace for this crate only
/// - Default: INFO, DEBUG for the bizdesk crates
///
/// Calling it twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,bizdesk_core=debug,bizdesk_store=debug,bizdesk_service=debug")
    });

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
