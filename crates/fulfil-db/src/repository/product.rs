//! # Product Repository
//!
//! Catalogue reads and writes.
//!
//! Stock levels are deliberately absent from the update paths here: after
//! insert, `stock_quantity` changes only through
//! [`StockLedger`](crate::repository::stock::StockLedger).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use fulfil_core::validation::{validate_price_cents, validate_stock_quantity};
use fulfil_core::{Money, Product};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// repo.insert(&product).await?;
/// let product = repo.get_by_id(&product.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, stock_quantity,
                   shop_id, category_id, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products, most recently created first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, stock_quantity,
                   shop_id, category_id, created_at, updated_at
            FROM products
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// - `Validation` for a negative price or stock level
    /// - `UniqueViolation` if the id already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_price_cents(product.price_cents)?;
        validate_stock_quantity(product.stock_quantity)?;

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, stock_quantity,
                shop_id, category_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(&product.shop_id)
        .bind(&product.category_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Changes the catalogue price.
    ///
    /// Committed orders keep the price they were placed at.
    pub async fn update_price(&self, id: &str, price: Money) -> DbResult<()> {
        validate_price_cents(price.cents())?;

        debug!(id = %id, price = %price, "Updating product price");

        let result = sqlx::query(
            "UPDATE products SET price_cents = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(price.cents())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product. Cart lines referencing it go with it; order
    /// items keep their snapshot.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = Product::new("Widget", Money::from_cents(1050), 4, "shop-1", "cat-1");
        repo.insert(&product).await.unwrap();

        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Widget");
        assert_eq!(fetched.price(), Money::from_cents(1050));
        assert_eq!(fetched.stock_quantity, 4);
        assert_eq!(repo.count().await.unwrap(), 1);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_negative_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = Product::new("Widget", Money::from_cents(100), -1, "s", "c");

        let err = db.products().insert(&product).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_price_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        let product = Product::new("Widget", Money::from_cents(100), 1, "s", "c");
        repo.insert(&product).await.unwrap();

        repo.update_price(&product.id, Money::from_cents(250)).await.unwrap();
        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.price_cents, 250);

        assert!(matches!(
            repo.update_price("missing", Money::from_cents(1)).await,
            Err(DbError::NotFound { .. })
        ));

        repo.delete(&product.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(matches!(
            repo.delete(&product.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
