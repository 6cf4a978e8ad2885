//! # Domain Types
//!
//! Core domain types used throughout PharmStock.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryRecord │   │  NewInventory   │   │ InventoryPatch  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (store)     │   │  every field    │   │  every field    │       │
//! │  │  barcode (uniq) │   │  except id      │   │  optional       │       │
//! │  │  drug_name ...  │   │  create/update  │   │  partial update │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   ScanEvent     │   │   Pagination    │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  raw_barcode    │   │  limit  (50)    │                             │
//! │  │  resolved?      │   │  offset (0)     │                             │
//! │  │  timestamp      │   └─────────────────┘                             │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! - `id`: integer surrogate key assigned by the store, never reused
//! - `barcode`: business key printed on the package, unique among live records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::{DEFAULT_PAGE_LIMIT, DEFAULT_PAGE_OFFSET};

// =============================================================================
// Inventory Record
// =============================================================================

/// One product batch held in stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryRecord {
    /// Surrogate key assigned by the store at creation.
    pub id: i64,

    /// Scanned product code. Unique across live records.
    pub barcode: String,

    pub drug_name: String,

    pub manufacturer: String,

    /// Unit of measure, e.g. `tablets` or `ml`.
    pub units: String,

    /// Unit price.
    pub price: f64,

    pub stock_quantity: i64,

    /// Date the batch entered stock.
    #[ts(as = "String")]
    pub stocked_date: NaiveDate,

    /// Date the batch expires. Not required to follow `stocked_date`.
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
}

// =============================================================================
// Create / Update Payload
// =============================================================================

/// Full set of client-supplied fields for create and full-replace update.
///
/// A client-supplied `id` in the JSON body is ignored; serde drops unknown
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewInventory {
    pub barcode: String,
    pub drug_name: String,
    pub manufacturer: String,
    pub units: String,
    pub price: f64,
    pub stock_quantity: i64,
    #[ts(as = "String")]
    pub stocked_date: NaiveDate,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
}

impl NewInventory {
    /// Builds the stored record once the store has assigned an id.
    pub fn into_record(self, id: i64) -> InventoryRecord {
        InventoryRecord {
            id,
            barcode: self.barcode,
            drug_name: self.drug_name,
            manufacturer: self.manufacturer,
            units: self.units,
            price: self.price,
            stock_quantity: self.stock_quantity,
            stocked_date: self.stocked_date,
            expiry_date: self.expiry_date,
        }
    }
}

// =============================================================================
// Partial Update Payload
// =============================================================================

/// Fields to replace on a partial update.
///
/// `None` leaves the stored value unchanged. On the wire an absent field and
/// an explicit `null` both deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct InventoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub drug_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub stock_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    #[ts(as = "Option<String>")]
    pub stocked_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
}

impl InventoryPatch {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.barcode.is_none()
            && self.drug_name.is_none()
            && self.manufacturer.is_none()
            && self.units.is_none()
            && self.price.is_none()
            && self.stock_quantity.is_none()
            && self.stocked_date.is_none()
            && self.expiry_date.is_none()
    }

    /// Writes every present field onto `record`. `id` is never touched.
    pub fn apply_to(&self, record: &mut InventoryRecord) {
        if let Some(barcode) = &self.barcode {
            record.barcode.clone_from(barcode);
        }
        if let Some(name) = &self.drug_name {
            record.drug_name.clone_from(name);
        }
        if let Some(manufacturer) = &self.manufacturer {
            record.manufacturer.clone_from(manufacturer);
        }
        if let Some(units) = &self.units {
            record.units.clone_from(units);
        }
        if let Some(price) = self.price {
            record.price = price;
        }
        if let Some(quantity) = self.stock_quantity {
            record.stock_quantity = quantity;
        }
        if let Some(date) = self.stocked_date {
            record.stocked_date = date;
        }
        if let Some(date) = self.expiry_date {
            record.expiry_date = date;
        }
    }
}

// =============================================================================
// Scan Event
// =============================================================================

/// Result of correlating one scanned line against the store.
///
/// Ephemeral: handed to observers, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScanEvent {
    /// Scanned code with surrounding whitespace removed.
    pub raw_barcode: String,

    /// Matching record, or `None` for an unknown barcode.
    pub resolved_record: Option<InventoryRecord>,

    /// When the line was correlated.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl ScanEvent {
    /// Creates an event stamped with the current time.
    pub fn new(raw_barcode: impl Into<String>, resolved_record: Option<InventoryRecord>) -> Self {
        ScanEvent {
            raw_barcode: raw_barcode.into(),
            resolved_record,
            timestamp: Utc::now(),
        }
    }

    /// True when the barcode matched a stored record.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.resolved_record.is_some()
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Window over the id-ordered record listing.
///
/// ## Example
/// ```rust
/// use pharmstock_core::Pagination;
///
/// let page = Pagination::new(None, None).unwrap();
/// assert_eq!((page.limit(), page.offset()), (50, 0));
///
/// assert!(Pagination::new(Some(-1), None).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: u64,
    offset: u64,
}

impl Pagination {
    /// Builds a window from optional client values, applying the 50/0 defaults.
    ///
    /// Negative values are rejected as `InvalidArgument`.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> CoreResult<Self> {
        let limit = match limit {
            Some(v) => u64::try_from(v)
                .map_err(|_| CoreError::invalid_argument("limit", "must not be negative"))?,
            None => DEFAULT_PAGE_LIMIT,
        };
        let offset = match offset {
            Some(v) => u64::try_from(v)
                .map_err(|_| CoreError::invalid_argument("offset", "must not be negative"))?,
            None => DEFAULT_PAGE_OFFSET,
        };
        Ok(Pagination { limit, offset })
    }

    /// Maximum number of records to return.
    #[inline]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of records to skip.
    #[inline]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            limit: DEFAULT_PAGE_LIMIT,
            offset: DEFAULT_PAGE_OFFSET,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
