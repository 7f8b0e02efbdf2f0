//! # Order Repository
//!
//! Order headers and items.
//!
//! Writes happen only inside a caller's transaction: the aggregate insert is
//! part of checkout, and status changes are a compare-and-set on the status
//! the caller read. Reads go through the pool.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use fulfil_core::{Order, OrderAggregate, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, user_id, status, total_amount_cents, shipping_address, \
                             payment_method, created_at, updated_at";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets the items of an order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, quantity, price_cents, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets an order with its items.
    pub async fn get_aggregate(&self, id: &str) -> DbResult<Option<OrderAggregate>> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.get_items(&order.id).await?;
        Ok(Some(OrderAggregate { order, items }))
    }

    /// A user's orders, newest first. Headers only.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 \
             ORDER BY created_at DESC, rowid DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Transaction-bound
    // =========================================================================

    /// Inserts the header and every item on the caller's connection.
    pub async fn insert_aggregate(
        &self,
        conn: &mut SqliteConnection,
        aggregate: &OrderAggregate,
    ) -> DbResult<()> {
        let order = &aggregate.order;
        debug!(
            order_id = %order.id,
            user_id = %order.user_id,
            items = aggregate.items.len(),
            "Inserting order"
        );

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, status, total_amount_cents,
                shipping_address, payment_method, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.status)
        .bind(order.total_amount_cents)
        .bind(&order.shipping_address)
        .bind(&order.payment_method)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *conn)
        .await?;

        for item in &aggregate.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, quantity, price_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.price_cents)
            .bind(item.created_at)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Reads an order header on the caller's connection.
    pub async fn find_in(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(order)
    }

    /// Sets `next` only if the stored status still equals `expected`.
    ///
    /// Returns the updated header, or `None` when the status moved (or the
    /// order vanished) since the caller read it.
    pub async fn compare_and_set_status(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Order>> {
        let sql = format!(
            "UPDATE orders SET status = ?3, updated_at = ?4 \
             WHERE id = ?1 AND status = ?2 \
             RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(expected)
            .bind(next)
            .bind(now)
            .fetch_optional(&mut *conn)
            .await?;

        if order.is_some() {
            debug!(order_id = %id, from = %expected, to = %next, "Order status updated");
        }
        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use fulfil_core::{CartLine, Money, OrderFactory, StockReservation};

    fn sample_aggregate(user_id: &str) -> OrderAggregate {
        let cart = vec![
            CartLine {
                product_id: "A".to_string(),
                quantity: 2,
            },
            CartLine {
                product_id: "B".to_string(),
                quantity: 1,
            },
        ];
        let reservations = vec![
            StockReservation {
                product_id: "A".to_string(),
                quantity: 2,
                unit_price: Money::from_cents(1000),
                remaining_stock: 3,
            },
            StockReservation {
                product_id: "B".to_string(),
                quantity: 1,
                unit_price: Money::from_cents(500),
                remaining_stock: 0,
            },
        ];
        OrderFactory::build(user_id, &cart, "1 Main St", "card", &reservations).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_read_aggregate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();
        let aggregate = sample_aggregate("u1");

        let mut tx = db.begin().await.unwrap();
        orders.insert_aggregate(&mut tx, &aggregate).await.unwrap();
        tx.commit().await.unwrap();

        let stored = orders
            .get_aggregate(&aggregate.order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.order.status, OrderStatus::Pending);
        assert_eq!(stored.order.total_amount_cents, 2500);
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.items_total(), Some(stored.order.total_amount()));

        assert!(orders.get_aggregate("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();
        let first = sample_aggregate("u1");
        let second = sample_aggregate("u1");
        let other = sample_aggregate("u2");

        let mut tx = db.begin().await.unwrap();
        for aggregate in [&first, &second, &other] {
            orders.insert_aggregate(&mut tx, aggregate).await.unwrap();
        }
        tx.commit().await.unwrap();

        let listed = orders.list_for_user("u1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        assert_eq!(orders.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_compare_and_set_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();
        let aggregate = sample_aggregate("u1");
        let id = aggregate.order.id.clone();

        let mut tx = db.begin().await.unwrap();
        orders.insert_aggregate(&mut tx, &aggregate).await.unwrap();

        let updated = orders
            .compare_and_set_status(
                &mut tx,
                &id,
                OrderStatus::Pending,
                OrderStatus::Processing,
                Utc::now(),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Processing);

        // Stale expectation loses
        let lost = orders
            .compare_and_set_status(
                &mut tx,
                &id,
                OrderStatus::Pending,
                OrderStatus::Cancelled,
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(lost.is_none());
        tx.commit().await.unwrap();

        let stored = orders.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Processing);
    }
}
