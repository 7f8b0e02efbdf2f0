//! # Money Module
//!
//! Provides the `Money` type for handling monetary values exactly.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing order lines as f64:                                            │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  An order total must equal Σ(price × quantity) EXACTLY, forever.        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "10.00" ──parse──► 1000 cents ──× 2──► 2000 cents ──render──► "20.00"│
//! │    Decimal strings only exist at the boundary.                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fulfil_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price.checked_mul_quantity(3).unwrap();
//! assert_eq!(line.to_string(), "32.97");
//!
//! // Inputs finer than a cent are rejected, never rounded.
//! assert!("10.999".parse::<Money>().is_err());
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Number of fractional digits carried by [`Money`].
pub const SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Zero-cost wrapper; negative values are representable
///   but prices are validated non-negative before they reach storage
/// - **Checked arithmetic**: totals report overflow instead of wrapping
/// - **Decimal strings at the edge**: serde and `Display` use `"25.00"`
///
/// ## Where Money Flows
/// ```text
/// Product.price_cents ──► StockReservation.unit_price ──► OrderItem.price_cents
///                                     │
///                                     ▼
///                    Σ price × quantity ──► Order.total_amount_cents
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    ///
    /// ## User Workflow
    /// ```text
    /// OrderItem: price 10.00, quantity 2
    ///      │
    ///      ▼
    /// checked_mul_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line total: 20.00
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Returns the exact decimal value (scale 2).
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, SCALE)
    }

    /// Converts an exact decimal into Money.
    ///
    /// ## Rules
    /// - At most two significant fractional digits (`10.50`, `10.500` are fine,
    ///   `10.505` is not)
    /// - Must fit in `i64` cents
    pub fn from_decimal(value: Decimal) -> Result<Money, ValidationError> {
        let normalized = value.normalize();
        if normalized.scale() > SCALE {
            return Err(ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("must have at most {SCALE} decimal places"),
            });
        }

        normalized
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: "out of range".to_string(),
            })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders the exact decimal value, e.g. `25.00` or `-5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|e| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: e.to_string(),
        })?;
        Money::from_decimal(value)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde helper for integer-cent columns that must leave the process as
/// decimal strings.
///
/// ```rust,ignore
/// #[serde(rename = "price", with = "crate::money::cents_as_decimal")]
/// pub price_cents: i64,
/// ```
pub mod cents_as_decimal {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Money;

    pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        Money::from_cents(*cents).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Money::deserialize(deserializer).map(|m| m.cents())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let money: Money = "10.99".parse().unwrap();
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.to_string(), "10.99");

        assert_eq!("5".parse::<Money>().unwrap().cents(), 500);
        assert_eq!("0.5".parse::<Money>().unwrap().to_string(), "0.50");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_sub_cent_input_rejected() {
        assert!("10.999".parse::<Money>().is_err());
        assert!("0.001".parse::<Money>().is_err());
        // Trailing zeros are not extra precision
        assert_eq!("10.500".parse::<Money>().unwrap().cents(), 1050);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!("ten".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        let price = Money::from_cents(1000);
        let line = price.checked_mul_quantity(2).unwrap();
        let total = line.checked_add(Money::from_cents(500)).unwrap();
        assert_eq!(total.cents(), 2500);

        assert!(Money::from_cents(i64::MAX).checked_mul_quantity(2).is_none());
        assert!(Money::from_cents(i64::MAX)
            .checked_add(Money::from_cents(1))
            .is_none());
    }

    /// 0.10 added ten times must be exactly 1.00 - the classic float trap.
    #[test]
    fn test_no_drift_on_repeated_addition() {
        let dime: Money = "0.10".parse().unwrap();
        let mut total = Money::zero();
        for _ in 0..10 {
            total = total.checked_add(dime).unwrap();
        }
        assert_eq!(total, "1.00".parse().unwrap());
    }

    #[test]
    fn test_serde_uses_decimal_strings() {
        let money = Money::from_cents(2500);
        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, "\"25.00\"");

        let back: Money = serde_json::from_str("\"25.00\"").unwrap();
        assert_eq!(back, money);

        assert!(serde_json::from_str::<Money>("25.0").is_err());
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_negative());
        assert!(Money::from_cents(-1).is_negative());
    }
}
