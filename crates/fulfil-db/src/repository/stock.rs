//! # Stock Ledger
//!
//! The only writer of `products.stock_quantity`.
//!
//! ## Gated Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 reserve_and_decrement(A, qty = 2)                       │
//! │                                                                         │
//! │  UPDATE products                                                        │
//! │     SET stock_quantity = stock_quantity - 2                             │
//! │   WHERE id = 'A' AND stock_quantity >= 2     ← check and write are ONE  │
//! │  RETURNING price_cents, stock_quantity          statement               │
//! │       │                                                                 │
//! │       ├── 1 row  → StockReservation { unit_price, remaining_stock }     │
//! │       │                                                                 │
//! │       └── 0 rows → SELECT stock_quantity                                │
//! │                      ├── no product → NotFound                          │
//! │                      └── available  → InsufficientStock (no write)      │
//! │                                                                         │
//! │  The UPDATE takes SQLite's write lock, held until the caller's          │
//! │  transaction ends. A second checkout touching any product waits on      │
//! │  busy_timeout and then sees the committed stock.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every method runs on a connection the caller already holds, normally
//! `&mut *tx`. Nothing here commits.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use fulfil_core::validation::{validate_quantity, validate_stock_quantity};
use fulfil_core::{Money, StockReservation};

/// Gated, transaction-scoped stock writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockLedger;

impl StockLedger {
    pub fn new() -> Self {
        StockLedger
    }

    /// Checks and decrements stock for one product in a single statement.
    ///
    /// ## Returns
    /// The product's price at this instant (the order item's price snapshot)
    /// and the stock left after the decrement.
    ///
    /// ## Errors
    /// - `Validation` for a quantity ≤ 0 (storage is not touched)
    /// - `NotFound` if the product does not exist
    /// - `InsufficientStock` if fewer than `quantity` units remain
    /// - `Busy` if another writer held the lock past the busy timeout
    pub async fn reserve_and_decrement(
        &self,
        conn: &mut SqliteConnection,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<StockReservation> {
        validate_quantity(quantity)?;

        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            UPDATE products
               SET stock_quantity = stock_quantity - ?2,
                   updated_at = ?3
             WHERE id = ?1 AND stock_quantity >= ?2
            RETURNING price_cents, stock_quantity
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some((price_cents, remaining_stock)) => {
                debug!(
                    product_id = %product_id,
                    quantity,
                    remaining_stock,
                    "Stock decremented"
                );
                Ok(StockReservation {
                    product_id: product_id.to_string(),
                    quantity,
                    unit_price: Money::from_cents(price_cents),
                    remaining_stock,
                })
            }
            None => Err(self.refusal(conn, product_id, quantity).await),
        }
    }

    /// Applies a relative stock change (restock or write-off).
    ///
    /// A delta that would take stock below zero fails with
    /// `InsufficientStock` and writes nothing.
    pub async fn adjust_stock(
        &self,
        conn: &mut SqliteConnection,
        product_id: &str,
        delta: i64,
    ) -> DbResult<i64> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE products
               SET stock_quantity = stock_quantity + ?2,
                   updated_at = ?3
             WHERE id = ?1 AND stock_quantity + ?2 >= 0
            RETURNING stock_quantity
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some((stock,)) => {
                debug!(product_id = %product_id, delta, stock, "Stock adjusted");
                Ok(stock)
            }
            None => Err(self.refusal(conn, product_id, delta.saturating_neg()).await),
        }
    }

    /// Sets an absolute stock level. Negative levels are rejected.
    pub async fn set_stock(
        &self,
        conn: &mut SqliteConnection,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<i64> {
        validate_stock_quantity(quantity)?;

        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE products
               SET stock_quantity = ?2,
                   updated_at = ?3
             WHERE id = ?1
            RETURNING stock_quantity
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        let (stock,) = row.ok_or_else(|| DbError::not_found("Product", product_id))?;
        debug!(product_id = %product_id, stock, "Stock set");
        Ok(stock)
    }

    /// Current stock as seen by this connection.
    pub async fn available(
        &self,
        conn: &mut SqliteConnection,
        product_id: &str,
    ) -> DbResult<Option<i64>> {
        let stock: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(stock)
    }

    /// Explains why a gated write matched no row.
    async fn refusal(
        &self,
        conn: &mut SqliteConnection,
        product_id: &str,
        requested: i64,
    ) -> DbError {
        match self.available(conn, product_id).await {
            Ok(Some(available)) => {
                debug!(product_id = %product_id, available, requested, "Stock write refused");
                DbError::InsufficientStock {
                    product_id: product_id.to_string(),
                    available,
                    requested,
                }
            }
            Ok(None) => DbError::not_found("Product", product_id),
            Err(e) => e,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
