//! # Validation Module
//!
//! Input checks run before any storage is touched.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: fulfil-service entry points                                   │
//! │  └── THIS MODULE: ids, quantities, checkout fields                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Stock ledger                                                  │
//! │  └── Gated decrement (stock never below zero)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── CHECK (stock_quantity >= 0), CHECK (quantity > 0)                  │
//! │  └── UNIQUE (user_id, product_id) on cart lines                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fulfil_core::validation::{validate_quantity, validate_shipping_address};
//!
//! validate_quantity(5).unwrap();
//! validate_shipping_address("221B Baker Street").unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_PAYMENT_METHOD_LEN, MAX_SHIPPING_ADDRESS_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart or order line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `MAX_ITEM_QUANTITY`
///
/// ## Example
/// ```rust
/// use fulfil_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-3).is_err());
/// ```
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

/// Validates a price in cents. Zero is allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an absolute stock level set by an admin.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock_quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Checkout Field Validators
// =============================================================================

fn validate_text(value: &str, field: &str, max: usize) -> ValidationResult<()> {
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

/// Validates a shipping address: non-blank, at most
/// `MAX_SHIPPING_ADDRESS_LEN` characters after trimming.
pub fn validate_shipping_address(address: &str) -> ValidationResult<()> {
    validate_text(address, "shipping_address", MAX_SHIPPING_ADDRESS_LEN)
}

/// Validates a payment method label: non-blank, at most
/// `MAX_PAYMENT_METHOD_LEN` characters after trimming.
pub fn validate_payment_method(method: &str) -> ValidationResult<()> {
    validate_text(method, "payment_method", MAX_PAYMENT_METHOD_LEN)
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use fulfil_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "order_id").is_ok());
/// assert!(validate_uuid("not-a-uuid", "order_id").is_err());
/// ```
pub fn validate_uuid(id: &str, field: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-5).is_err());
    }

    #[test]
    fn test_validate_checkout_fields() {
        assert!(validate_shipping_address("1 Main St").is_ok());
        assert!(validate_shipping_address("   ").is_err());
        assert!(validate_shipping_address(&"x".repeat(MAX_SHIPPING_ADDRESS_LEN + 1)).is_err());

        assert!(validate_payment_method("card").is_ok());
        assert!(validate_payment_method("").is_err());
        assert!(validate_payment_method(&"x".repeat(MAX_PAYMENT_METHOD_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "id").is_ok());
        assert!(validate_uuid("", "id").is_err());
        assert!(validate_uuid("123", "id").is_err());
    }
}
