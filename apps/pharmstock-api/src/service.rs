//! # Inventory Service
//!
//! The façade every external surface goes through.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     InventoryService::update                            │
//! │                                                                         │
//! │  NewInventory ──► validate_new_inventory ──► store.update(id, input)   │
//! │                         │                          │                    │
//! │                         ▼                          ▼                    │
//! │                  ValidationError            NotFound / Duplicate        │
//! │                  (store untouched)          (row untouched)             │
//! │                         │                          │                    │
//! │                         └───────────┬──────────────┘                    │
//! │                                     ▼                                   │
//! │                                 ApiError                                │
//! │                                                                         │
//! │  success ──► Outcome::Accepted(record)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Operation | Success | Failures |
//! |---|---|---|
//! | `create` | `Created` | CONFLICT, VALIDATION_ERROR |
//! | `get` | `Ok` | NOT_FOUND |
//! | `list` | `Ok` | INVALID_ARGUMENT |
//! | `update` | `Accepted` | NOT_FOUND, CONFLICT, VALIDATION_ERROR |
//! | `patch` | `Accepted` | NOT_FOUND, CONFLICT, VALIDATION_ERROR |
//! | `delete` | `NoContent` | NOT_FOUND |
//! | `lookup_barcode` | `Ok` | NOT_FOUND |
//!
//! Every operation may also fail with STORE_UNAVAILABLE or INTERNAL.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, info};

use pharmstock_core::validation::{validate_new_inventory, validate_patch};
use pharmstock_core::{InventoryPatch, InventoryRecord, NewInventory, Pagination};
use pharmstock_db::InventoryStore;

use crate::error::ApiError;

// =============================================================================
// Outcome
// =============================================================================

/// Success value tagged with its response kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// 201 with the new resource.
    Created(T),
    /// 200 with the resource.
    Ok(T),
    /// 202 with the modified resource.
    Accepted(T),
    /// 204, no body.
    NoContent,
}

impl<T> Outcome<T> {
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Created(_) => StatusCode::CREATED,
            Outcome::Ok(_) => StatusCode::OK,
            Outcome::Accepted(_) => StatusCode::ACCEPTED,
            Outcome::NoContent => StatusCode::NO_CONTENT,
        }
    }

    /// Returns the carried value, if any.
    pub fn into_inner(self) -> Option<T> {
        match self {
            Outcome::Created(v) | Outcome::Ok(v) | Outcome::Accepted(v) => Some(v),
            Outcome::NoContent => None,
        }
    }
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.into_inner() {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}

/// Result of a façade operation.
pub type ServiceResult<T> = Result<Outcome<T>, ApiError>;

// =============================================================================
// Service
// =============================================================================

/// Inventory operations over a shared record store.
///
/// Cheap to clone; every clone talks to the same store.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        InventoryService { store }
    }

    /// The backing store (shared with the scan correlator).
    pub fn store(&self) -> &Arc<dyn InventoryStore> {
        &self.store
    }

    /// Validates and inserts a new record.
    pub async fn create(&self, input: NewInventory) -> ServiceResult<InventoryRecord> {
        validate_new_inventory(&input)?;

        let record = self.store.create(input).await?;
        info!(id = record.id, barcode = %record.barcode, "Inventory created");
        Ok(Outcome::Created(record))
    }

    pub async fn get(&self, id: i64) -> ServiceResult<InventoryRecord> {
        debug!(id, "Fetching inventory");
        Ok(Outcome::Ok(self.store.get(id).await?))
    }

    /// Lists records in ascending id order. `None` takes the default.
    pub async fn list(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ServiceResult<Vec<InventoryRecord>> {
        let page = Pagination::new(limit, offset)?;
        debug!(limit = page.limit(), offset = page.offset(), "Listing inventory");
        Ok(Outcome::Ok(self.store.list(page).await?))
    }

    /// Replaces every field except `id`.
    pub async fn update(&self, id: i64, input: NewInventory) -> ServiceResult<InventoryRecord> {
        validate_new_inventory(&input)?;

        let record = self.store.update(id, input).await?;
        info!(id, barcode = %record.barcode, "Inventory updated");
        Ok(Outcome::Accepted(record))
    }

    /// Replaces only the fields present in `patch`.
    pub async fn patch(&self, id: i64, patch: InventoryPatch) -> ServiceResult<InventoryRecord> {
        validate_patch(&patch)?;

        let record = self.store.patch(id, patch).await?;
        info!(id, "Inventory patched");
        Ok(Outcome::Accepted(record))
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.store.delete(id).await?;
        info!(id, "Inventory deleted");
        Ok(Outcome::NoContent)
    }

    /// Resolves a barcode the same way a scan does (surrounding whitespace
    /// ignored).
    pub async fn lookup_barcode(&self, barcode: &str) -> ServiceResult<InventoryRecord> {
        let code = barcode.trim();
        debug!(barcode = %code, "Looking up barcode");
        Ok(Outcome::Ok(self.store.get_by_barcode(code).await?))
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }

    pub fn engine(&self) -> &'static str {
        self.store.engine()
    }
}
