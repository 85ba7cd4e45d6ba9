//! # Validation Module
//!
//! Input validation run before any domain rule touches state.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end (TypeScript bindings)                               │
//! │  ├── Shape of the payload                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Field rules (names, PINs, quantities, amounts)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Domain containers                                             │
//! │  └── Invariants (stock, balance, state machine)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_LINES, PIN_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a catalog item name (1-200 characters).
///
/// ```rust
/// use bizdesk_core::validation::validate_item_name;
///
/// assert!(validate_item_name("X-Burger").is_ok());
/// assert!(validate_item_name("  ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    required("name", name, 200)
}

/// Validates a person's display name (team member or customer).
pub fn validate_person_name(name: &str) -> ValidationResult<()> {
    required("name", name, 120)
}

/// Validates a category name.
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    required("category", name, 80)
}

/// Validates a chat message body.
pub fn validate_chat_text(text: &str) -> ValidationResult<()> {
    required("message", text, 2000)
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (courtesy items).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates the number of lines on an order or cart.
pub fn validate_line_count(lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    if lines > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }
    Ok(())
}

/// Validates a team PIN: exactly four ASCII digits.
///
/// ```rust
/// use bizdesk_core::validation::validate_pin;
///
/// assert!(validate_pin("4242").is_ok());
/// assert!(validate_pin("42a2").is_err());
/// assert!(validate_pin("424").is_err());
/// ```
pub fn validate_pin(pin: &str) -> ValidationResult<()> {
    if pin.len() != PIN_LENGTH || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "pin".to_string(),
            reason: format!("must be exactly {} digits", PIN_LENGTH),
        });
    }
    Ok(())
}

/// Validates a discount in basis points (0-10000).
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 10000,
        });
    }
    Ok(())
}

/// Validates an installment count for card payments (1-24).
pub fn validate_installments(n: u8) -> ValidationResult<()> {
    if n == 0 || n > 24 {
        return Err(ValidationError::OutOfRange {
            field: "installments".to_string(),
            min: 1,
            max: 24,
        });
    }
    Ok(())
}

/// Validates an entity id (UUID format).
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}
