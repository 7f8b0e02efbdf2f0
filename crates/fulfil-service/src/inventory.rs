//! Administrative stock edits.
//!
//! Runs the stock ledger's gated writes in their own short transaction, so
//! restocks queue behind in-flight checkouts like any other writer.

use tracing::info;

use crate::error::ServiceResult;
use fulfil_core::access::authorize_stock_edit;
use fulfil_core::Principal;
use fulfil_db::{Database, DbError};

#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
}

impl InventoryService {
    pub fn new(db: Database) -> Self {
        InventoryService { db }
    }

    /// Adds `delta` units (negative to write off). Returns the new level.
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        delta: i64,
        principal: &Principal,
    ) -> ServiceResult<i64> {
        authorize_stock_edit(principal)?;

        let mut tx = self.db.begin().await?;
        let stock = self
            .db
            .stock_ledger()
            .adjust_stock(&mut tx, product_id, delta)
            .await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(product_id = %product_id, delta, stock, by = %principal.user_id, "Stock adjusted");
        Ok(stock)
    }

    /// Sets an absolute level. Returns the new level.
    pub async fn set_stock(
        &self,
        product_id: &str,
        quantity: i64,
        principal: &Principal,
    ) -> ServiceResult<i64> {
        authorize_stock_edit(principal)?;

        let mut tx = self.db.begin().await?;
        let stock = self
            .db
            .stock_ledger()
            .set_stock(&mut tx, product_id, quantity)
            .await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(product_id = %product_id, stock, by = %principal.user_id, "Stock set");
        Ok(stock)
    }
}
