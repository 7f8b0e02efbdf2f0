//! # Domain Types
//!
//! Records shared by every layer of the fulfilment core.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Product      │   │    CartItem     │   │     Order       │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (UUID)      │   │  user_id        │   │  id (UUID)      │        │
//! │  │  price_cents    │◄──│  product_id(FK) │   │  status         │        │
//! │  │  stock_quantity │   │  quantity > 0   │   │  total_amount   │        │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘        │
//! │          ▲                                            │ 1..*            │
//! │          │ id only (no FK)                   ┌────────▼────────┐        │
//! │          └───────────────────────────────────│   OrderItem     │        │
//! │                                              │  price snapshot │        │
//! │                                              └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `OrderItem.price_cents` is copied from the product at checkout. Later
//! price edits never reach committed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::{cents_as_decimal, Money};
use crate::status::OrderStatus;

// =============================================================================
// Principal
// =============================================================================

/// Role supplied by the external auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Seller,
    Buyer,
}

/// The caller of an operation.
///
/// The core trusts this value; it only checks the role it is handed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Builds a principal from a bare "is admin" flag.
    pub fn from_flag(user_id: impl Into<String>, is_privileged: bool) -> Self {
        let role = if is_privileged { Role::Admin } else { Role::Buyer };
        Self::new(user_id, role)
    }

    /// Only admins may change order status or see other users' orders.
    pub fn is_privileged(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    pub description: Option<String>,

    /// Current unit price. Serialized as a decimal string under `price`.
    #[serde(rename = "price", with = "cents_as_decimal")]
    pub price_cents: i64,

    /// Never negative. Only the stock ledger writes this column.
    pub stock_quantity: i64,

    pub shop_id: String,

    pub category_id: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new product with a fresh id and timestamps.
    pub fn new(
        name: impl Into<String>,
        price: Money,
        stock_quantity: i64,
        shop_id: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            price_cents: price.cents(),
            stock_quantity,
            shop_id: shop_id.into(),
            category_id: category_id.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Advisory stock check used by cart operations.
    ///
    /// Checkout does not rely on this; the gated decrement is authoritative.
    pub fn ensure_available(&self, requested: i64) -> CoreResult<()> {
        if requested > self.stock_quantity {
            return Err(CoreError::InsufficientStock {
                product_id: self.id.clone(),
                available: self.stock_quantity,
                requested,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One product in a user's cart. Unique per (user_id, product_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    /// Always > 0.
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line as read for checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

impl From<&CartItem> for CartLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
        }
    }
}

// =============================================================================
// Stock Reservation
// =============================================================================

/// Result of a successful gated decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReservation {
    pub product_id: String,
    pub quantity: i64,
    /// Product price at the instant of the decrement.
    pub unit_price: Money,
    /// Stock left after the decrement.
    pub remaining_stock: i64,
}

// =============================================================================
// Order
// =============================================================================

/// Order header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    /// Immutable once written.
    #[serde(rename = "total_amount", with = "cents_as_decimal")]
    pub total_amount_cents: i64,
    pub shipping_address: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

/// A line of a committed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price captured at checkout.
    #[serde(rename = "price", with = "cents_as_decimal")]
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// price × quantity, `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.price().checked_mul_quantity(self.quantity)
    }
}

/// Order header plus its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAggregate {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderAggregate {
    /// Σ price × quantity over the items.
    ///
    /// Equals `order.total_amount()` for every aggregate the factory builds.
    pub fn items_total(&self) -> Option<Money> {
        self.items
            .iter()
            .try_fold(Money::zero(), |acc, item| acc.checked_add(item.line_total()?))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
