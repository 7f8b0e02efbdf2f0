//! Fixtures shared by the service tests.

use std::time::Duration;

use tempfile::TempDir;
use uuid::Uuid;

use fulfil_core::{Money, Principal, Product, Role};
use fulfil_db::{Database, DbConfig};

pub(crate) async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// File-backed database so several connections share one store.
pub(crate) async fn file_db(dir: &TempDir, max_connections: u32, busy_timeout: Duration) -> Database {
    let config = DbConfig::new(dir.path().join("fulfil.db"))
        .max_connections(max_connections)
        .busy_timeout(busy_timeout);
    Database::new(config).await.unwrap()
}

pub(crate) async fn add_product(db: &Database, price: &str, stock: i64) -> Product {
    let product = Product::new(
        "Test product",
        price.parse::<Money>().unwrap(),
        stock,
        Uuid::new_v4().to_string(),
        Uuid::new_v4().to_string(),
    );
    db.products().insert(&product).await.unwrap();
    product
}

pub(crate) async fn stock_of(db: &Database, product_id: &str) -> i64 {
    db.products()
        .get_by_id(product_id)
        .await
        .unwrap()
        .unwrap()
        .stock_quantity
}

pub(crate) fn buyer() -> Principal {
    Principal::new(Uuid::new_v4().to_string(), Role::Buyer)
}

pub(crate) fn admin() -> Principal {
    Principal::new(Uuid::new_v4().to_string(), Role::Admin)
}
