//! # Checkout
//!
//! Converts a user's cart into an order in one all-or-nothing transaction.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       checkout(user, address, payment)                  │
//! │                                                                         │
//! │  1. validate input                                                      │
//! │  2. cart snapshot (pool read, outside the transaction)                  │
//! │  3. empty? ──► EmptyCart, nothing opened                                │
//! │                                                                         │
//! │  ┌──────────────── bounded by tx_timeout ────────────────────────────┐  │
//! │  │ 4. BEGIN                                                          │  │
//! │  │ 5. for each line: StockLedger::reserve_and_decrement              │  │
//! │  │       first failure ──► drop tx (ROLLBACK), return error          │  │
//! │  │ 6. OrderFactory::build ──► insert header + items                  │  │
//! │  │ 7. CartClearer::consume(snapshot)                                 │  │
//! │  │       cart changed since step 2 ──► drop tx, Conflict             │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! │  Timeout ──► transaction dropped (rolled back) ──► Conflict             │
//! │                                                                         │
//! │  8. COMMIT, unbounded (failure ──► Internal)                            │
//! │  9. return the committed aggregate                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first statement of the transaction is a gated stock write, so the
//! transaction takes SQLite's write lock immediately and concurrent
//! checkouts queue behind it instead of racing on stale reads. The cart
//! lines are only deleted if they still match the snapshot, so a second
//! submit of the same cart fails with `CONFLICT` instead of placing a
//! duplicate order.
//!
//! The timeout stops short of `COMMIT`. Once the commit has been issued its
//! outcome is reported as is, so a caller never sees a retryable error for
//! an order that was in fact persisted.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use fulfil_core::validation::{validate_payment_method, validate_shipping_address, validate_uuid};
use fulfil_core::{CartLine, CoreError, OrderAggregate, OrderFactory};
use fulfil_db::{Database, DbTransaction};

/// Orchestrates stock ledger, order factory and cart clearer.
#[derive(Debug, Clone)]
pub struct CheckoutCoordinator {
    db: Database,
    tx_timeout: Duration,
}

impl CheckoutCoordinator {
    pub fn new(db: Database, tx_timeout: Duration) -> Self {
        CheckoutCoordinator { db, tx_timeout }
    }

    pub fn from_config(db: Database, config: &ServiceConfig) -> Self {
        Self::new(db, config.tx_timeout)
    }

    /// Places an order for everything in the user's cart.
    ///
    /// ## Errors
    /// - `VALIDATION_ERROR` bad user id, address or payment method
    /// - `EMPTY_CART` nothing to order
    /// - `NOT_FOUND` a cart line points at a product that no longer exists
    /// - `INSUFFICIENT_STOCK` some line asks for more than remains
    /// - `CONFLICT` lock contention, the transaction timed out, or the cart
    ///   changed while checking out (for example a double submit)
    /// - `INTERNAL` storage failure, including a failed commit
    ///
    /// On any error nothing was written.
    pub async fn checkout(
        &self,
        user_id: &str,
        shipping_address: &str,
        payment_method: &str,
    ) -> ServiceResult<OrderAggregate> {
        validate_uuid(user_id, "user_id")?;
        validate_shipping_address(shipping_address)?;
        validate_payment_method(payment_method)?;

        let cart = self.db.carts().snapshot(user_id).await?;
        if cart.is_empty() {
            warn!(user_id = %user_id, "Checkout rejected: cart is empty");
            return Err(CoreError::EmptyCart.into());
        }

        debug!(user_id = %user_id, lines = cart.len(), "Starting checkout");

        let attempt = self.place_order(user_id, &cart, shipping_address, payment_method);
        let (tx, aggregate) = match timeout(self.tx_timeout, attempt).await {
            Ok(Ok(staged)) => staged,
            Ok(Err(e)) => {
                warn!(user_id = %user_id, code = e.code.as_str(), "Checkout failed: {}", e.message);
                return Err(e);
            }
            Err(_) => {
                warn!(
                    user_id = %user_id,
                    timeout_ms = self.tx_timeout.as_millis() as u64,
                    "Checkout transaction timed out, rolled back"
                );
                return Err(ServiceError::conflict("Checkout timed out, try again"));
            }
        };

        tx.commit().await.map_err(|e| {
            error!(user_id = %user_id, order_id = %aggregate.order.id, "Checkout commit failed: {}", e);
            ServiceError::internal("Checkout could not be committed")
        })?;

        info!(
            user_id = %user_id,
            order_id = %aggregate.order.id,
            total = %aggregate.order.total_amount(),
            items = aggregate.items.len(),
            "Order placed"
        );
        Ok(aggregate)
    }

    /// Steps 4-7. Hands back the uncommitted transaction; returning early
    /// drops `tx`, which rolls it back.
    async fn place_order(
        &self,
        user_id: &str,
        cart: &[CartLine],
        shipping_address: &str,
        payment_method: &str,
    ) -> ServiceResult<(DbTransaction, OrderAggregate)> {
        let mut tx = self.db.begin().await?;
        let ledger = self.db.stock_ledger();

        let mut reservations = Vec::with_capacity(cart.len());
        for line in cart {
            let reservation = ledger
                .reserve_and_decrement(&mut tx, &line.product_id, line.quantity)
                .await?;
            reservations.push(reservation);
        }

        let aggregate =
            OrderFactory::build(user_id, cart, shipping_address, payment_method, &reservations)?;

        self.db.orders().insert_aggregate(&mut tx, &aggregate).await?;

        if !self.db.cart_clearer().consume(&mut tx, user_id, cart).await? {
            return Err(ServiceError::conflict("Cart changed during checkout, try again"));
        }

        Ok((tx, aggregate))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
