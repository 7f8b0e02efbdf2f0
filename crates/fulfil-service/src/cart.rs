//! # Cart Service
//!
//! Maintains the lines checkout consumes. Stock checks here are advisory:
//! they turn away obviously impossible requests early, but only the gated
//! decrement at checkout decides who gets the stock.

use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};
use fulfil_core::validation::{validate_quantity, validate_uuid};
use fulfil_core::CartItem;
use fulfil_db::Database;

#[derive(Debug, Clone)]
pub struct CartService {
    db: Database,
}

impl CartService {
    pub fn new(db: Database) -> Self {
        CartService { db }
    }

    /// Puts `quantity` units of a product in the cart, replacing the
    /// quantity if the product is already there.
    pub async fn add_to_cart(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> ServiceResult<CartItem> {
        self.check_line(user_id, product_id, quantity).await?;

        let item = self.db.carts().upsert(user_id, product_id, quantity).await?;
        info!(user_id = %user_id, product_id = %product_id, quantity, "Cart line set");
        Ok(item)
    }

    /// Changes the quantity of a line already in the cart.
    pub async fn update_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> ServiceResult<CartItem> {
        self.check_line(user_id, product_id, quantity).await?;

        let item = self
            .db
            .carts()
            .update_quantity(user_id, product_id, quantity)
            .await?;
        debug!(user_id = %user_id, product_id = %product_id, quantity, "Cart quantity updated");
        Ok(item)
    }

    /// Removes a line. Returns whether anything was removed.
    pub async fn remove_item(&self, user_id: &str, product_id: &str) -> ServiceResult<bool> {
        validate_uuid(user_id, "user_id")?;
        let removed = self.db.carts().remove(user_id, product_id).await?;
        debug!(user_id = %user_id, product_id = %product_id, removed, "Cart line removed");
        Ok(removed)
    }

    /// Lines in the order they were added.
    pub async fn get_cart(&self, user_id: &str) -> ServiceResult<Vec<CartItem>> {
        validate_uuid(user_id, "user_id")?;
        Ok(self.db.carts().list(user_id).await?)
    }

    pub async fn clear_cart(&self, user_id: &str) -> ServiceResult<u64> {
        validate_uuid(user_id, "user_id")?;
        let removed = self.db.carts().clear(user_id).await?;
        info!(user_id = %user_id, removed, "Cart cleared");
        Ok(removed)
    }

    async fn check_line(&self, user_id: &str, product_id: &str, quantity: i64) -> ServiceResult<()> {
        validate_uuid(user_id, "user_id")?;
        validate_quantity(quantity)?;

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))?;

        product.ensure_available(quantity)?;
        Ok(())
    }
}
