//! # Cart Repository
//!
//! Cart lines, one row per (user, product).
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  upsert(A, 2) ──► upsert(A, 3) ──► update_quantity(A, 1)                │
//! │   (insert)         (replace qty)    (must already exist)                │
//! │                                                                         │
//! │  snapshot(user) ──► [{A, 1}, ...]   read by checkout before its tx      │
//! │                                                                         │
//! │  Ends in one of:                                                        │
//! │   • remove(A)                        single line, idempotent            │
//! │   • clear(user)                      standalone, own transaction        │
//! │   • CartClearer::consume(tx, lines)  inside a checkout transaction,     │
//! │                                      only if the snapshot still holds   │
//! │   • product deleted                  ON DELETE CASCADE                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use fulfil_core::validation::validate_quantity;
use fulfil_core::{CartItem, CartLine};

// =============================================================================
// Cart Repository
// =============================================================================

/// Repository for cart line operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// All lines of a user's cart in the order they were added.
    pub async fn list(&self, user_id: &str) -> DbResult<Vec<CartItem>> {
        let items = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT id, user_id, product_id, quantity, created_at, updated_at
            FROM cart_items
            WHERE user_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// The `(product_id, quantity)` pairs checkout consumes.
    pub async fn snapshot(&self, user_id: &str) -> DbResult<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT product_id, quantity
            FROM cart_items
            WHERE user_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(user_id = %user_id, lines = lines.len(), "Read cart snapshot");
        Ok(lines)
    }

    /// Gets one line.
    pub async fn get(&self, user_id: &str, product_id: &str) -> DbResult<Option<CartItem>> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT id, user_id, product_id, quantity, created_at, updated_at
            FROM cart_items
            WHERE user_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Inserts a line, or replaces the quantity of the existing line for
    /// the same product.
    ///
    /// ## Errors
    /// - `Validation` for a quantity ≤ 0
    /// - `ForeignKeyViolation` if the product does not exist
    pub async fn upsert(&self, user_id: &str, product_id: &str, quantity: i64) -> DbResult<CartItem> {
        validate_quantity(quantity)?;

        let now = Utc::now();
        debug!(user_id = %user_id, product_id = %product_id, quantity, "Upserting cart line");

        let item = sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (id, user_id, product_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = excluded.quantity, updated_at = excluded.updated_at
            RETURNING id, user_id, product_id, quantity, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Changes the quantity of an existing line.
    pub async fn update_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<CartItem> {
        validate_quantity(quantity)?;

        let item = sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items
               SET quantity = ?3, updated_at = ?4
             WHERE user_id = ?1 AND product_id = ?2
            RETURNING id, user_id, product_id, quantity, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        item.ok_or_else(|| DbError::not_found("Cart item", product_id))
    }

    /// Removes one line. Returns whether a line existed.
    pub async fn remove(&self, user_id: &str, product_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Empties the cart in its own transaction. Returns the number of
    /// lines removed; clearing an empty cart returns 0.
    pub async fn clear(&self, user_id: &str) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;
        let removed = CartClearer::new().clear(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(removed)
    }
}

// =============================================================================
// Cart Clearer
// =============================================================================

/// Removes cart lines inside the caller's transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartClearer;

impl CartClearer {
    pub fn new() -> Self {
        CartClearer
    }

    /// Idempotent. Returns the number of lines removed.
    pub async fn clear(&self, conn: &mut SqliteConnection, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        debug!(user_id = %user_id, removed = result.rows_affected(), "Cart cleared");
        Ok(result.rows_affected())
    }

    /// Removes exactly the lines a checkout read, each only if it still
    /// has the quantity that was read.
    ///
    /// Returns `false` when any line is gone or was changed, meaning another
    /// writer got to the cart first. The caller must then roll back, since
    /// the lines that did match have already been deleted. Lines added after
    /// the snapshot are left in place.
    pub async fn consume(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
        lines: &[CartLine],
    ) -> DbResult<bool> {
        for line in lines {
            let result = sqlx::query(
                "DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2 AND quantity = ?3",
            )
            .bind(user_id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .execute(&mut *conn)
            .await?;

            if result.rows_affected() != 1 {
                debug!(
                    user_id = %user_id,
                    product_id = %line.product_id,
                    quantity = line.quantity,
                    "Cart line no longer matches snapshot"
                );
                return Ok(false);
            }
        }

        debug!(user_id = %user_id, removed = lines.len(), "Cart consumed");
        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use fulfil_core::{Money, Product};

    async fn setup() -> (Database, Product, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = Product::new("A", Money::from_cents(1000), 5, "s", "c");
        let b = Product::new("B", Money::from_cents(500), 1, "s", "c");
        db.products().insert(&a).await.unwrap();
        db.products().insert(&b).await.unwrap();
        (db, a, b)
    }

    #[tokio::test]
    async fn test_upsert_replaces_quantity() {
        let (db, a, _) = setup().await;
        let carts = db.carts();

        let first = carts.upsert("u1", &a.id, 2).await.unwrap();
        let second = carts.upsert("u1", &a.id, 3).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 3);
        assert_eq!(carts.list("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_unknown_product_fails() {
        let (db, _, _) = setup().await;
        let err = db.carts().upsert("u1", "missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_preserves_insertion_order() {
        let (db, a, b) = setup().await;
        let carts = db.carts();
        carts.upsert("u1", &a.id, 2).await.unwrap();
        carts.upsert("u1", &b.id, 1).await.unwrap();
        carts.upsert("u2", &b.id, 1).await.unwrap();

        let snapshot = carts.snapshot("u1").await.unwrap();
        assert_eq!(
            snapshot,
            vec![
                CartLine {
                    product_id: a.id.clone(),
                    quantity: 2
                },
                CartLine {
                    product_id: b.id.clone(),
                    quantity: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_update_remove_and_clear() {
        let (db, a, b) = setup().await;
        let carts = db.carts();
        carts.upsert("u1", &a.id, 2).await.unwrap();
        carts.upsert("u1", &b.id, 1).await.unwrap();
        carts.upsert("u2", &a.id, 1).await.unwrap();

        assert_eq!(carts.update_quantity("u1", &a.id, 4).await.unwrap().quantity, 4);
        assert!(matches!(
            carts.update_quantity("u2", &b.id, 1).await,
            Err(DbError::NotFound { .. })
        ));

        assert!(carts.remove("u1", &b.id).await.unwrap());
        assert!(!carts.remove("u1", &b.id).await.unwrap());

        assert_eq!(carts.clear("u1").await.unwrap(), 1);
        assert_eq!(carts.clear("u1").await.unwrap(), 0);
        // Other users' carts are untouched
        assert_eq!(carts.list("u2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_product_delete_cascades_to_cart() {
        let (db, a, _) = setup().await;
        db.carts().upsert("u1", &a.id, 1).await.unwrap();

        db.products().delete(&a.id).await.unwrap();
        assert!(db.carts().list("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clearer_inside_rolled_back_transaction() {
        let (db, a, _) = setup().await;
        db.carts().upsert("u1", &a.id, 1).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert_eq!(db.cart_clearer().clear(&mut tx, "u1").await.unwrap(), 1);
        tx.rollback().await.unwrap();

        assert_eq!(db.carts().list("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_consume_removes_only_snapshot_lines() {
        let (db, a, b) = setup().await;
        db.carts().upsert("u1", &a.id, 2).await.unwrap();
        let snapshot = db.carts().snapshot("u1").await.unwrap();

        // Added after the snapshot was read
        db.carts().upsert("u1", &b.id, 1).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert!(db.cart_clearer().consume(&mut tx, "u1", &snapshot).await.unwrap());
        tx.commit().await.unwrap();

        let left = db.carts().list("u1").await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].product_id, b.id);
    }

    #[tokio::test]
    async fn test_consume_refuses_changed_or_missing_lines() {
        let (db, a, b) = setup().await;
        db.carts().upsert("u1", &a.id, 2).await.unwrap();
        db.carts().upsert("u1", &b.id, 1).await.unwrap();
        let snapshot = db.carts().snapshot("u1").await.unwrap();

        db.carts().update_quantity("u1", &b.id, 3).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert!(!db.cart_clearer().consume(&mut tx, "u1", &snapshot).await.unwrap());
        tx.rollback().await.unwrap();
        assert_eq!(db.carts().list("u1").await.unwrap().len(), 2);

        // A second pass over an already-consumed cart matches nothing
        let snapshot = db.carts().snapshot("u1").await.unwrap();
        let mut tx = db.begin().await.unwrap();
        assert!(db.cart_clearer().consume(&mut tx, "u1", &snapshot).await.unwrap());
        assert!(!db.cart_clearer().consume(&mut tx, "u1", &snapshot).await.unwrap());
        tx.rollback().await.unwrap();
        assert_eq!(db.carts().list("u1").await.unwrap().len(), 2);
    }
}
