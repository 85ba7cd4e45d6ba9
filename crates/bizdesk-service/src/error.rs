//! # API Error Type
//!
//! What a dashboard surface receives when an operation fails.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in bizdesk                                │
//! │                                                                         │
//! │  Snapshot write fails ── StoreError::Io ──► CoreError::Persistence ─┐  │
//! │                                                                      │  │
//! │  Rule violated ───────── CoreError::RegisterClosed ─────────────────┤  │
//! │                                                                      ▼  │
//! │                                                      ApiError { code,   │
//! │                                                             message }  │
//! │                                                                         │
//! │  try { await api.createOrder(order) }                                   │
//! │  catch (e) {                                                            │
//! │    // e.code    = "REGISTER_ERROR"                                      │
//! │    // e.message = "Cash register is closed"                             │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal details (file paths, serde messages) are logged here and
//! replaced by a generic message.

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use bizdesk_core::CoreError;
use bizdesk_store::StoreError;

/// Result type for dashboard-facing operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures while loading or saving `bizdesk.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No config path available on this platform")]
    NoConfigPath,
}

/// Serialized as:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Pizza Margherita: available 2, requested 3"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS, Error)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Order, item, member, customer or category missing
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Snapshot could not be written
    PersistenceError,

    /// Illegal status change, over-return, bad amount
    BusinessLogic,

    /// Role lacks the permission
    Unauthorized,

    InsufficientStock,

    /// Register closed, already open, or short of cash
    RegisterError,

    /// Payment does not cover the order
    PaymentError,

    /// Configuration file unreadable or invalid
    ConfigError,

    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            CoreError::ItemNotFound(id) => ApiError::not_found("Item", &id),
            CoreError::MemberNotFound(id) => ApiError::not_found("Team member", &id),
            CoreError::CustomerNotFound(id) => ApiError::not_found("Customer", &id),
            CoreError::CategoryNotFound(id) => ApiError::not_found("Category", &id),
            e @ CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            e @ (CoreError::RegisterClosed
            | CoreError::RegisterAlreadyOpen
            | CoreError::InsufficientRegisterBalance { .. }) => {
                ApiError::new(ErrorCode::RegisterError, e.to_string())
            }
            e @ (CoreError::InvalidTransition { .. }
            | CoreError::ReturnExceedsPurchase { .. }) => {
                ApiError::new(ErrorCode::BusinessLogic, e.to_string())
            }
            e @ CoreError::InvalidAmount { .. } => {
                ApiError::new(ErrorCode::PaymentError, e.to_string())
            }
            e @ CoreError::Unauthorized { .. } => {
                ApiError::new(ErrorCode::Unauthorized, e.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::Persistence { key, reason } => {
                // Log the actual error but return a generic message
                tracing::error!(key = %key, reason = %reason, "Snapshot write failed");
                ApiError::new(ErrorCode::PersistenceError, "Could not save your changes")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(reason) => ApiError::new(ErrorCode::ConfigError, reason),
            other => {
                tracing::error!(error = %other, "Configuration failure");
                ApiError::new(ErrorCode::ConfigError, "Configuration could not be loaded")
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::from(CoreError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizdesk_core::{Money, Permission};

    #[test]
    fn test_not_found_message() {
        let err = ApiError::from(CoreError::OrderNotFound("abc".to_string()));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Order not found: abc");
    }

    #[test]
    fn test_persistence_details_are_hidden() {
        let err = ApiError::from(CoreError::Persistence {
            key: "orders".to_string(),
            reason: "/home/ana/.local/share/bizdesk/orders.json: disk full".to_string(),
        });
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert!(!err.message.contains("disk full"));
    }

    #[test]
    fn test_register_errors_share_a_code() {
        let closed = ApiError::from(CoreError::RegisterClosed);
        let short = ApiError::from(CoreError::InsufficientRegisterBalance {
            available: Money::from_major(10),
            requested: Money::from_major(20),
        });
        assert_eq!(closed.code, ErrorCode::RegisterError);
        assert_eq!(short.code, ErrorCode::RegisterError);
    }

    #[test]
    fn test_unauthorized_serializes_screaming_case() {
        let err = ApiError::from(CoreError::Unauthorized {
            actor: "Caio".to_string(),
            permission: Permission::ViewReports,
        });
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "UNAUTHORIZED");
    }
}
