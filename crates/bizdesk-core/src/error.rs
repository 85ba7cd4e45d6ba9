//! # Error Types
//!
//! Domain-specific error types for bizdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bizdesk-core errors (this file)                                        │
//! │  ├── CoreError        - Preconditions, not-found, persistence           │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  bizdesk-store errors                                                   │
//! │  └── StoreError       - Snapshot I/O, converted into CoreError          │
//! │                                                                         │
//! │  bizdesk-service errors                                                 │
//! │  └── ApiError         - What a UI surface sees (code + message)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Front end               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every precondition variant is returned BEFORE any state is mutated.

use thiserror::Error;

use crate::money::Money;
use crate::order::OrderStatus;
use crate::team::Permission;

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Cash or debit payment attempted while the register is closed,
    /// or a register-only operation on a closed register.
    #[error("Cash register is closed")]
    RegisterClosed,

    /// `open` called on a register that is already open.
    #[error("Cash register is already open")]
    RegisterAlreadyOpen,

    /// Tracked stock cannot cover the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Order: 3 × Burger
    ///      │
    ///      ▼
    /// Check stock: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Burger", available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// Nothing deducted, nothing recorded
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// A bleed or cash refund exceeds what is in the drawer.
    #[error("Insufficient register balance: available {available}, requested {requested}")]
    InsufficientRegisterBalance { available: Money, requested: Money },

    /// Return quantity exceeds what is still returnable on the order.
    #[error("Return quantity for {item_id} exceeds purchase: returnable {returnable}, requested {requested}")]
    ReturnExceedsPurchase {
        item_id: String,
        returnable: i64,
        requested: i64,
    },

    /// Status change not allowed by the order state machine.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Amount must be a positive magnitude.
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount { amount: Money, reason: String },

    /// The acting team member lacks the capability.
    #[error("{actor} is not allowed to {permission}")]
    Unauthorized { actor: String, permission: Permission },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Catalog item not found: {0}")]
    ItemNotFound(String),

    #[error("Team member not found: {0}")]
    MemberNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// A repository could not read or write its snapshot.
    #[error("Persistence failed for {key}: {reason}")]
    Persistence { key: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True for the "something referenced does not exist" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::OrderNotFound(_)
                | CoreError::ItemNotFound(_)
                | CoreError::MemberNotFound(_)
                | CoreError::CustomerNotFound(_)
                | CoreError::CategoryNotFound(_)
        )
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
