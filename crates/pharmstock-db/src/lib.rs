//! # pharmstock-db: Record Store for PharmStock
//!
//! This crate provides the inventory record store: an async trait and two
//! engines behind it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PharmStock Data Flow                             │
//! │                                                                         │
//! │  InventoryService (api)          ScanCorrelator (scan)                 │
//! │       │  validated mutations          │  read-only lookups              │
//! │       ▼                               ▼                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  pharmstock-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌─────────────┐ │   │
//! │  │   │   Database    │    │  InventoryStore    │  │ Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │  (store.rs)        │  │ (embedded)  │ │   │
//! │  │   │               │    │                    │  │             │ │   │
//! │  │   │ SqlitePool    │◄───│ SqliteInventory-   │  │ 001_create_ │ │   │
//! │  │   │ WAL, busy     │    │   Store            │  │ inventory   │ │   │
//! │  │   │ timeout       │    │ MemoryInventory-   │  │             │ │   │
//! │  │   │               │    │   Store            │  │             │ │   │
//! │  │   └───────────────┘    └────────────────────┘  └─────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (default ./app.db)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `InventoryStore` trait and its contract
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - SQLite store implementation
//! - [`memory`] - In-memory store implementation
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pharmstock_db::{Database, DbConfig, InventoryStore};
//!
//! let db = Database::new(DbConfig::from_url("sqlite:./app.db")).await?;
//! let store: Arc<dyn InventoryStore> = Arc::new(db.inventory());
//!
//! let record = store.get_by_barcode("8901234567890").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use memory::MemoryInventoryStore;
pub use pool::{Database, DbConfig};
pub use repository::inventory::SqliteInventoryStore;
pub use store::InventoryStore;
