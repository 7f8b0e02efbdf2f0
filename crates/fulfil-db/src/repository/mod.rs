//! # Repository Module
//!
//! Ledger store access, split by aggregate.
//!
//! ## Two Kinds of Access
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Pool-bound repositories            Transaction-bound components        │
//! │  (own a SqlitePool clone)           (take &mut SqliteConnection)        │
//! │  ────────────────────────           ─────────────────────────────       │
//! │  ProductRepository                  StockLedger                         │
//! │  CartRepository                     CartClearer                         │
//! │  OrderRepository (reads)            OrderRepository::insert_aggregate   │
//! │                                     OrderRepository::compare_and_set_…  │
//! │                                                                         │
//! │  Pool-bound calls each run in their own implicit transaction.           │
//! │  Transaction-bound calls run inside the caller's `Transaction`:         │
//! │                                                                         │
//! │      let mut tx = db.begin().await?;                                    │
//! │      ledger.reserve_and_decrement(&mut tx, ..).await?;                  │
//! │      clearer.clear(&mut tx, user_id).await?;                            │
//! │      tx.commit().await?;                                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod order;
pub mod product;
pub mod stock;
