//! # In-Memory Inventory Store
//!
//! A process-local [`InventoryStore`] for tests and the `memory` storage
//! engine. Nothing survives a restart.
//!
//! ```text
//! ┌───────────────────────── RwLock<Inner> ─────────────────────────┐
//! │  records:    BTreeMap<id, InventoryRecord>   (ordered by id)    │
//! │  by_barcode: HashMap<barcode, id>            (uniqueness index) │
//! │  next_id:    i64                             (never decreases)  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation takes the write lock, checks and applies without awaiting
//! anything else, then releases. A dropped future either never got the lock
//! or already finished the mutation.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::store::{InventoryStore, INVENTORY_ENTITY};
use pharmstock_core::{InventoryPatch, InventoryRecord, NewInventory, Pagination};

#[derive(Debug)]
struct Inner {
    records: BTreeMap<i64, InventoryRecord>,
    by_barcode: HashMap<String, i64>,
    next_id: i64,
}

impl Inner {
    /// Errors if `barcode` belongs to a record other than `owner`.
    fn check_barcode(&self, barcode: &str, owner: Option<i64>) -> DbResult<()> {
        match self.by_barcode.get(barcode) {
            Some(&holder) if Some(holder) != owner => Err(DbError::duplicate("barcode", barcode)),
            _ => Ok(()),
        }
    }

    /// Stores `next` over the record with the same id, keeping the index in step.
    fn replace(&mut self, next: InventoryRecord) -> DbResult<InventoryRecord> {
        let previous = self
            .records
            .get(&next.id)
            .ok_or_else(|| DbError::not_found(INVENTORY_ENTITY, next.id))?;

        self.check_barcode(&next.barcode, Some(next.id))?;

        if previous.barcode != next.barcode {
            let old = previous.barcode.clone();
            self.by_barcode.remove(&old);
            self.by_barcode.insert(next.barcode.clone(), next.id);
        }

        self.records.insert(next.id, next.clone());
        Ok(next)
    }
}

/// Inventory store held entirely in memory.
#[derive(Debug)]
pub struct MemoryInventoryStore {
    inner: RwLock<Inner>,
}

impl MemoryInventoryStore {
    /// Creates an empty store. The first record gets id 1.
    pub fn new() -> Self {
        MemoryInventoryStore {
            inner: RwLock::new(Inner {
                records: BTreeMap::new(),
                by_barcode: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryInventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, input: NewInventory) -> DbResult<InventoryRecord> {
        let mut inner = self.inner.write().await;

        inner.check_barcode(&input.barcode, None)?;

        let id = inner.next_id;
        inner.next_id += 1;

        let record = input.into_record(id);
        inner.by_barcode.insert(record.barcode.clone(), id);
        inner.records.insert(id, record.clone());

        debug!(id, barcode = %record.barcode, "Inventory record created");
        Ok(record)
    }

    async fn get(&self, id: i64) -> DbResult<InventoryRecord> {
        self.inner
            .read()
            .await
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found(INVENTORY_ENTITY, id))
    }

    async fn get_by_barcode(&self, barcode: &str) -> DbResult<InventoryRecord> {
        let inner = self.inner.read().await;
        inner
            .by_barcode
            .get(barcode)
            .and_then(|id| inner.records.get(id))
            .cloned()
            .ok_or_else(|| DbError::not_found(INVENTORY_ENTITY, barcode))
    }

    async fn list(&self, page: Pagination) -> DbResult<Vec<InventoryRecord>> {
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);

        let inner = self.inner.read().await;
        Ok(inner.records.values().skip(skip).take(take).cloned().collect())
    }

    async fn update(&self, id: i64, input: NewInventory) -> DbResult<InventoryRecord> {
        debug!(id, barcode = %input.barcode, "Replacing inventory record");
        self.inner.write().await.replace(input.into_record(id))
    }

    async fn patch(&self, id: i64, patch: InventoryPatch) -> DbResult<InventoryRecord> {
        debug!(id, "Patching inventory record");

        let mut inner = self.inner.write().await;
        let mut next = inner
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found(INVENTORY_ENTITY, id))?;
        patch.apply_to(&mut next);
        inner.replace(next)
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let removed = inner
            .records
            .remove(&id)
            .ok_or_else(|| DbError::not_found(INVENTORY_ENTITY, id))?;
        inner.by_barcode.remove(&removed.barcode);

        debug!(id, "Inventory record deleted");
        Ok(())
    }

    async fn count(&self) -> DbResult<u64> {
        Ok(self.inner.read().await.records.len() as u64)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
