//! # fulfil-core: Pure Domain Logic for Order Fulfillment
//!
//! This crate holds every rule of the checkout core that can be expressed
//! without touching storage: money arithmetic, order assembly, the order
//! status state machine, capability checks and input validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fulfil Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 fulfil-service (orchestration)                  │   │
//! │  │   CheckoutCoordinator ── OrderStatusController ── CartService   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ fulfil-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │  money   │ │  order   │ │  status  │ │  access  │         │   │
//! │  │   │  Money   │ │ Factory  │ │   FSM    │ │  checks  │         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  fulfil-db (Ledger Store)                       │   │
//! │  │        SQLite, migrations, StockLedger, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, CartItem, Order, OrderItem, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`order`] - `OrderFactory`: cart snapshot + reservations → order
//! - [`status`] - Order status state machine and transition policies
//! - [`access`] - Capability checks for principals
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use fulfil_core::money::Money;
//!
//! let price: Money = "10.00".parse().unwrap();
//! let line = price.checked_mul_quantity(2).unwrap();
//! let total = line.checked_add(Money::from_cents(500)).unwrap();
//!
//! assert_eq!(total.to_string(), "25.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod money;
pub mod order;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::OrderFactory;
pub use status::{OrderStatus, TransitionPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest quantity accepted for a single cart or order line.
///
/// Catalogue quantities are 32-bit on every client we talk to, so anything
/// above this cannot have come from a well-formed request.
pub const MAX_ITEM_QUANTITY: i64 = i32::MAX as i64;

/// Maximum length of a shipping address.
pub const MAX_SHIPPING_ADDRESS_LEN: usize = 500;

/// Maximum length of a payment method label.
pub const MAX_PAYMENT_METHOD_LEN: usize = 50;
