//! # Inventory Routes
//!
//! Thin adapters from HTTP extractors to [`InventoryService`](crate::service::InventoryService).
//!
//! Extractor rejections are taken as `Result` so a malformed body, path or
//! query string comes back in the same `{code, message}` shape as every other
//! error.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use pharmstock_core::{InventoryPatch, InventoryRecord, NewInventory};

use crate::error::ApiError;
use crate::service::Outcome;
use crate::AppState;

type Reply<T> = Result<Outcome<T>, ApiError>;

/// `?limit=&offset=` for the list route.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `POST /api/inventory`
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewInventory>, JsonRejection>,
) -> Reply<InventoryRecord> {
    let Json(input) = body?;
    state.service.create(input).await
}

/// `GET /api/inventory`
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Reply<Vec<InventoryRecord>> {
    let Query(params) = params?;
    state.service.list(params.limit, params.offset).await
}

/// `GET /api/inventory/{id}`
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Reply<InventoryRecord> {
    let Path(id) = id?;
    state.service.get(id).await
}

/// `PUT /api/inventory/{id}`
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<NewInventory>, JsonRejection>,
) -> Reply<InventoryRecord> {
    let Path(id) = id?;
    let Json(input) = body?;
    state.service.update(id, input).await
}

/// `PATCH /api/inventory/{id}`
pub async fn patch(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<InventoryPatch>, JsonRejection>,
) -> Reply<InventoryRecord> {
    let Path(id) = id?;
    let Json(patch) = body?;
    state.service.patch(id, patch).await
}

/// `DELETE /api/inventory/{id}`
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Reply<()> {
    let Path(id) = id?;
    state.service.delete(id).await
}

/// `GET /api/inventory/barcode/{barcode}`
pub async fn lookup_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Reply<InventoryRecord> {
    state.service.lookup_barcode(&barcode).await
}
