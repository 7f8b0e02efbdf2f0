//! # fulfil-db: Ledger Store for Fulfil
//!
//! SQLite-backed persistence for products, carts and orders, plus the
//! transaction-scoped components checkout is built from.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fulfil Data Flow                                 │
//! │                                                                         │
//! │  CheckoutCoordinator (fulfil-service)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     fulfil-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │    │    │
//! │  │   │               │    │ ProductRepo   │    │ 001_init.sql │    │    │
//! │  │   │ SqlitePool    │◄───│ CartRepo      │    │              │    │    │
//! │  │   │ begin() → tx  │    │ OrderRepo     │    │              │    │    │
//! │  │   │               │    │ StockLedger   │    │              │    │    │
//! │  │   │               │    │ CartClearer   │    │              │    │    │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘    │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL, foreign keys on, busy timeout)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repositories and transaction-bound components
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fulfil_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("fulfil.db")).await?;
//!
//! let mut tx = db.begin().await?;
//! let reservation = db.stock_ledger().reserve_and_decrement(&mut tx, &product_id, 1).await?;
//! db.cart_clearer().clear(&mut tx, &user_id).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbTransaction};

pub use repository::cart::{CartClearer, CartRepository};
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::stock::StockLedger;
