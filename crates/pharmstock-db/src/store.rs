//! # Inventory Store Interface
//!
//! The one seam every caller goes through to read or mutate inventory.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Arc<dyn InventoryStore>                             │
//! │                                                                         │
//! │   InventoryService (api) ──┐                                           │
//! │                            ├──► InventoryStore                          │
//! │   ScanCorrelator (scan) ───┘        │                                   │
//! │                                     ├── SqliteInventoryStore (sqlx)     │
//! │                                     └── MemoryInventoryStore (RwLock)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//! - Every mutation is atomic: it fully applies or leaves the store as it was,
//!   including when the calling future is dropped mid-flight.
//! - Mutations on the same record are linearizable. Of two racing requests
//!   that would both claim a barcode, exactly one succeeds; the other sees
//!   `DbError::UniqueViolation`.
//! - Ids are assigned by the store, strictly increasing, never reused.
//! - Inputs are assumed validated; the store only enforces uniqueness and
//!   existence.

use async_trait::async_trait;
use pharmstock_core::{InventoryPatch, InventoryRecord, NewInventory, Pagination};

use crate::error::DbResult;

/// Entity name used in `DbError::NotFound`.
pub const INVENTORY_ENTITY: &str = "Inventory";

/// Async record store for inventory.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Short engine name for logs (`sqlite`, `memory`).
    fn engine(&self) -> &'static str;

    /// Inserts a new record and returns it with its assigned id.
    ///
    /// Fails with `UniqueViolation` when the barcode is taken.
    async fn create(&self, input: NewInventory) -> DbResult<InventoryRecord>;

    /// Fetches a record by id.
    async fn get(&self, id: i64) -> DbResult<InventoryRecord>;

    /// Fetches the record currently holding `barcode`.
    async fn get_by_barcode(&self, barcode: &str) -> DbResult<InventoryRecord>;

    /// Returns a page of records in ascending id order.
    async fn list(&self, page: Pagination) -> DbResult<Vec<InventoryRecord>>;

    /// Replaces every field except `id`.
    async fn update(&self, id: i64, input: NewInventory) -> DbResult<InventoryRecord>;

    /// Replaces only the fields present in `patch`.
    async fn patch(&self, id: i64, patch: InventoryPatch) -> DbResult<InventoryRecord>;

    /// Permanently removes a record.
    async fn delete(&self, id: i64) -> DbResult<()>;

    /// Number of live records.
    async fn count(&self) -> DbResult<u64>;

    /// True when the backing engine answers.
    async fn health_check(&self) -> bool;
}
