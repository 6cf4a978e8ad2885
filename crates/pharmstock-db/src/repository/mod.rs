//! # Repository Module
//!
//! SQL-backed implementations of the store traits.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  InventoryService                                                       │
//! │       │                                                                 │
//! │       │  store.patch(7, InventoryPatch { price: Some(9.99), .. })       │
//! │       ▼                                                                 │
//! │  SqliteInventoryStore                                                   │
//! │  ├── create / update / patch  → one statement with RETURNING            │
//! │  ├── delete                   → one DELETE                              │
//! │  └── get / get_by_barcode / list / count                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (inventory table, UNIQUE(barcode))                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SqliteInventoryStore`](inventory::SqliteInventoryStore) - Inventory CRUD

pub mod inventory;
