//! # fulfil-service: Checkout and Order Lifecycle
//!
//! The operations callers use. Each one validates input, checks the
//! principal's capabilities, and runs its storage work in one transaction.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      fulfil-service (THIS CRATE)                        │
//! │                                                                         │
//! │  ┌────────────────────┐ ┌──────────────────────┐ ┌──────────────────┐   │
//! │  │ CheckoutCoordinator│ │ OrderStatusController│ │ OrderQueries     │   │
//! │  │ cart ──► order     │ │ FSM + compare-and-set│ │ owner / admin    │   │
//! │  └─────────┬──────────┘ └──────────┬───────────┘ └────────┬─────────┘   │
//! │            │    ┌─────────────┐ ┌──┴──────────────┐       │             │
//! │            │    │ CartService │ │ InventoryService│       │             │
//! │            │    └──────┬──────┘ └──────┬──────────┘       │             │
//! │            ▼           ▼               ▼                  ▼             │
//! │   fulfil-core: Money, OrderFactory, TransitionPolicy, access checks     │
//! │   fulfil-db:   Database, StockLedger, CartClearer, repositories         │
//! │                                                                         │
//! │  Every error leaves as ServiceError { code, message }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fulfil_service::{FulfilService, ServiceConfig};
//!
//! let service = FulfilService::connect(&ServiceConfig::load()?).await?;
//! let placed = service.checkout.checkout(&user_id, "1 Main St", "card").await?;
//! println!("{} for {}", placed.order.id, placed.order.total_amount());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod inventory;
pub mod orders;
pub mod status;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart::CartService;
pub use checkout::CheckoutCoordinator;
pub use config::{ConfigError, ServiceConfig};
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use inventory::InventoryService;
pub use orders::OrderQueries;
pub use status::OrderStatusController;

use fulfil_db::Database;
use tracing::info;

/// Every service wired to one database handle.
#[derive(Debug, Clone)]
pub struct FulfilService {
    pub checkout: CheckoutCoordinator,
    pub status: OrderStatusController,
    pub orders: OrderQueries,
    pub carts: CartService,
    pub inventory: InventoryService,
    db: Database,
}

impl FulfilService {
    pub fn from_config(db: Database, config: &ServiceConfig) -> Self {
        FulfilService {
            checkout: CheckoutCoordinator::from_config(db.clone(), config),
            status: OrderStatusController::new(db.clone(), config.status_policy),
            orders: OrderQueries::new(db.clone()),
            carts: CartService::new(db.clone()),
            inventory: InventoryService::new(db.clone()),
            db,
        }
    }

    /// Opens the database (running migrations) and wires the services.
    pub async fn connect(config: &ServiceConfig) -> ServiceResult<Self> {
        let db = Database::new(config.db_config()).await?;
        info!(
            path = %config.database_path.display(),
            policy = ?config.status_policy,
            "Fulfil service ready"
        );
        Ok(Self::from_config(db, config))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}
