//! # Inventory Repository
//!
//! SQLite implementation of [`InventoryStore`].
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                One request = one SQL statement                          │
//! │                                                                         │
//! │  create  → INSERT ... RETURNING *                                      │
//! │  update  → UPDATE ... SET every column ... WHERE id = ? RETURNING *    │
//! │  patch   → UPDATE ... SET col = COALESCE(?, col) ... RETURNING *       │
//! │  delete  → DELETE FROM inventory WHERE id = ?                          │
//! │                                                                         │
//! │  SQLite runs each statement in its own implicit transaction under the  │
//! │  database write lock, so:                                              │
//! │  • check (UNIQUE index) and write happen together                      │
//! │  • two writers never interleave                                        │
//! │  • a dropped future leaves either the old row or the new row           │
//! │                                                                         │
//! │  No row returned from UPDATE/DELETE  → NotFound                        │
//! │  UNIQUE(barcode) fired               → UniqueViolation                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::store::{InventoryStore, INVENTORY_ENTITY};
use pharmstock_core::{InventoryPatch, InventoryRecord, NewInventory, Pagination};

const COLUMNS: &str =
    "id, barcode, drug_name, manufacturer, units, price, stock_quantity, stocked_date, expiry_date";

/// SQLite-backed inventory store.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.inventory();
///
/// let record = store.create(input).await?;
/// let same = store.get_by_barcode(&record.barcode).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteInventoryStore {
    pool: SqlitePool,
}

impl SqliteInventoryStore {
    /// Creates a new store over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteInventoryStore { pool }
    }
}

/// Fills in the conflicting barcode, which SQLite's error text omits.
fn barcode_conflict(err: sqlx::Error, barcode: Option<&str>) -> DbError {
    match (DbError::from(err), barcode) {
        (DbError::UniqueViolation { field, .. }, Some(value)) => DbError::UniqueViolation {
            field,
            value: value.to_string(),
        },
        (other, _) => other,
    }
}

/// Converts a page bound to SQLite's signed integer.
fn sql_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl InventoryStore for SqliteInventoryStore {
    fn engine(&self) -> &'static str {
        "sqlite"
    }

    async fn create(&self, input: NewInventory) -> DbResult<InventoryRecord> {
        debug!(barcode = %input.barcode, "Creating inventory record");

        let sql = format!(
            r#"
            INSERT INTO inventory (
                barcode, drug_name, manufacturer, units,
                price, stock_quantity, stocked_date, expiry_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING {COLUMNS}
            "#
        );

        let record = sqlx::query_as::<_, InventoryRecord>(&sql)
            .bind(&input.barcode)
            .bind(&input.drug_name)
            .bind(&input.manufacturer)
            .bind(&input.units)
            .bind(input.price)
            .bind(input.stock_quantity)
            .bind(input.stocked_date)
            .bind(input.expiry_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| barcode_conflict(e, Some(&input.barcode)))?;

        debug!(id = record.id, "Inventory record created");
        Ok(record)
    }

    async fn get(&self, id: i64) -> DbResult<InventoryRecord> {
        let sql = format!("SELECT {COLUMNS} FROM inventory WHERE id = ?1");

        sqlx::query_as::<_, InventoryRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found(INVENTORY_ENTITY, id))
    }

    async fn get_by_barcode(&self, barcode: &str) -> DbResult<InventoryRecord> {
        let sql = format!("SELECT {COLUMNS} FROM inventory WHERE barcode = ?1");

        sqlx::query_as::<_, InventoryRecord>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found(INVENTORY_ENTITY, barcode))
    }

    async fn list(&self, page: Pagination) -> DbResult<Vec<InventoryRecord>> {
        debug!(limit = page.limit(), offset = page.offset(), "Listing inventory");

        let sql = format!("SELECT {COLUMNS} FROM inventory ORDER BY id ASC LIMIT ?1 OFFSET ?2");

        let records = sqlx::query_as::<_, InventoryRecord>(&sql)
            .bind(sql_bound(page.limit()))
            .bind(sql_bound(page.offset()))
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn update(&self, id: i64, input: NewInventory) -> DbResult<InventoryRecord> {
        debug!(id, barcode = %input.barcode, "Replacing inventory record");

        let sql = format!(
            r#"
            UPDATE inventory SET
                barcode = ?2,
                drug_name = ?3,
                manufacturer = ?4,
                units = ?5,
                price = ?6,
                stock_quantity = ?7,
                stocked_date = ?8,
                expiry_date = ?9
            WHERE id = ?1
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, InventoryRecord>(&sql)
            .bind(id)
            .bind(&input.barcode)
            .bind(&input.drug_name)
            .bind(&input.manufacturer)
            .bind(&input.units)
            .bind(input.price)
            .bind(input.stock_quantity)
            .bind(input.stocked_date)
            .bind(input.expiry_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| barcode_conflict(e, Some(&input.barcode)))?
            .ok_or_else(|| DbError::not_found(INVENTORY_ENTITY, id))
    }

    async fn patch(&self, id: i64, patch: InventoryPatch) -> DbResult<InventoryRecord> {
        debug!(id, "Patching inventory record");

        // NULL parameters keep the stored column value
        let sql = format!(
            r#"
            UPDATE inventory SET
                barcode = COALESCE(?2, barcode),
                drug_name = COALESCE(?3, drug_name),
                manufacturer = COALESCE(?4, manufacturer),
                units = COALESCE(?5, units),
                price = COALESCE(?6, price),
                stock_quantity = COALESCE(?7, stock_quantity),
                stocked_date = COALESCE(?8, stocked_date),
                expiry_date = COALESCE(?9, expiry_date)
            WHERE id = ?1
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, InventoryRecord>(&sql)
            .bind(id)
            .bind(patch.barcode.as_deref())
            .bind(patch.drug_name.as_deref())
            .bind(patch.manufacturer.as_deref())
            .bind(patch.units.as_deref())
            .bind(patch.price)
            .bind(patch.stock_quantity)
            .bind(patch.stocked_date)
            .bind(patch.expiry_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| barcode_conflict(e, patch.barcode.as_deref()))?
            .ok_or_else(|| DbError::not_found(INVENTORY_ENTITY, id))
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting inventory record");

        let result = sqlx::query("DELETE FROM inventory WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(INVENTORY_ENTITY, id));
        }

        Ok(())
    }

    async fn count(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
