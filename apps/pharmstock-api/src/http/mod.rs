//! # HTTP Control Plane
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET    /health                           liveness (200 / 503)         │
//! │                                                                         │
//! │  POST   /api/inventory                    create          → 201        │
//! │  GET    /api/inventory?limit=&offset=     list            → 200        │
//! │  GET    /api/inventory/{id}               read            → 200        │
//! │  PUT    /api/inventory/{id}               full replace    → 202        │
//! │  PATCH  /api/inventory/{id}               partial update  → 202        │
//! │  DELETE /api/inventory/{id}               remove          → 204        │
//! │  GET    /api/inventory/barcode/{barcode}  resolve a code  → 200        │
//! │                                                                         │
//! │  GET    /api/scans                        recent scan events           │
//! │  GET    /api/scans/stats                  correlator counters          │
//! │                                                                         │
//! │  Every route is wrapped in tower-http's TraceLayer.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod health;
pub mod inventory;
pub mod scans;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Builds the router over shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/inventory",
            get(inventory::list).post(inventory::create),
        )
        .route(
            "/api/inventory/{id}",
            get(inventory::get)
                .put(inventory::update)
                .patch(inventory::patch)
                .delete(inventory::delete),
        )
        .route(
            "/api/inventory/barcode/{barcode}",
            get(inventory::lookup_barcode),
        )
        .route("/api/scans", get(scans::recent))
        .route("/api/scans/stats", get(scans::stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scans::RecentScans;
    use crate::service::InventoryService;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use pharmstock_db::{Database, DbConfig, InventoryStore, MemoryInventoryStore};
    use pharmstock_scan::{CorrelatorConfig, ScanCorrelator};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state_over(store: Arc<dyn InventoryStore>) -> AppState {
        AppState::new(InventoryService::new(store), Arc::new(RecentScans::new(10)))
    }

    fn app() -> Router {
        build_router(state_over(Arc::new(MemoryInventoryStore::new())))
    }

    fn paracetamol(barcode: &str) -> Value {
        json!({
            "barcode": barcode,
            "drug_name": "Paracetamol 500mg",
            "manufacturer": "GSK",
            "units": "tablets",
            "price": 1.25,
            "stock_quantity": 200,
            "stocked_date": "2025-01-10",
            "expiry_date": "2027-01-10"
        })
    }

    async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(text) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(text)
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send_raw(app, method, uri, body.map(|v| v.to_string())).await
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_crud_lifecycle() {
        let app = app();

        let mut payload = paracetamol("ABC123");
        // Client ids are ignored
        payload["id"] = json!(999);
        let (status, created) = send(&app, Method::POST, "/api/inventory", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();
        assert_ne!(id, 999);
        assert_eq!(created["stocked_date"], "2025-01-10");

        let (status, fetched) = send(&app, Method::GET, &format!("/api/inventory/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let mut replacement = paracetamol("ABC124");
        replacement["stock_quantity"] = json!(12);
        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/inventory/{id}"),
            Some(replacement),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(updated["barcode"], "ABC124");
        assert_eq!(updated["stock_quantity"], 12);

        let (status, patched) = send(
            &app,
            Method::PATCH,
            &format!("/api/inventory/{id}"),
            Some(json!({ "price": 9.99, "units": null })),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(patched["price"], 9.99);
        assert_eq!(patched["units"], "tablets");
        assert_eq!(patched["stock_quantity"], 12);

        let (status, by_code) =
            send(&app, Method::GET, "/api/inventory/barcode/ABC124", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_code["id"], id);

        let (status, body) = send(&app, Method::DELETE, &format!("/api/inventory/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = send(&app, Method::GET, &format!("/api/inventory/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_conflict_and_validation() {
        let app = app();
        send(&app, Method::POST, "/api/inventory", Some(paracetamol("ABC123"))).await;

        let (status, body) =
            send(&app, Method::POST, "/api/inventory", Some(paracetamol("ABC123"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(body["field"], "barcode");

        let mut negative = paracetamol("ABC999");
        negative["price"] = json!(-1);
        let (status, body) = send(&app, Method::POST, "/api/inventory", Some(negative)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field"], "price");

        let (_, list) = send(&app, Method::GET, "/api/inventory", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_requests_are_bad_input() {
        let app = app();

        let (status, body) = send_raw(
            &app,
            Method::POST,
            "/api/inventory",
            Some("{\"barcode\": ".to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        // Missing required field
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/inventory",
            Some(json!({ "barcode": "ABC123" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field"], "drug_name");
        assert_eq!(body["message"], "drug_name is required");

        let mut wrong_type = paracetamol("ABC123");
        wrong_type["price"] = json!("cheap");
        let (status, body) = send(&app, Method::POST, "/api/inventory", Some(wrong_type)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field"], "price");

        let (status, body) = send(&app, Method::GET, "/api/inventory/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");

        let (status, body) = send(&app, Method::GET, "/api/inventory?limit=-1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");
        assert_eq!(body["field"], "limit");

        let (status, body) = send(&app, Method::GET, "/api/inventory?offset=many", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_list_paging() {
        let app = app();
        for code in ["A1", "A2", "A3"] {
            send(&app, Method::POST, "/api/inventory", Some(paracetamol(code))).await;
        }

        let (status, page) = send(&app, Method::GET, "/api/inventory?limit=2&offset=0", None).await;
        assert_eq!(status, StatusCode::OK);
        let codes: Vec<&str> = page
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["barcode"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["A1", "A2"]);

        let (_, page) = send(&app, Method::GET, "/api/inventory?limit=2&offset=2", None).await;
        assert_eq!(page.as_array().unwrap().len(), 1);
        assert_eq!(page[0]["barcode"], "A3");
    }

    #[tokio::test]
    async fn test_store_down_is_unavailable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store: Arc<dyn InventoryStore> = Arc::new(db.inventory());
        db.close().await;
        let app = build_router(state_over(store));

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "status": "unavailable" }));

        let (status, body) = send(&app, Method::GET, "/api/inventory/1", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "STORE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_scans_reflect_correlator() {
        let store: Arc<dyn InventoryStore> = Arc::new(MemoryInventoryStore::new());
        let recent = Arc::new(RecentScans::new(10));
        let app = build_router(state_over(store.clone()).with_recent_scans(recent.clone()));

        send(&app, Method::POST, "/api/inventory", Some(paracetamol("ABC123"))).await;

        let device: &[u8] = b"  ABC123  \n\nZZZ999\n";
        let (correlator, _handle) =
            ScanCorrelator::new(device, store, recent, CorrelatorConfig::default());
        correlator.run().await;

        let (status, scans) = send(&app, Method::GET, "/api/scans", None).await;
        assert_eq!(status, StatusCode::OK);
        let scans = scans.as_array().unwrap();
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0]["raw_barcode"], "ABC123");
        assert_eq!(scans[0]["resolved_record"]["drug_name"], "Paracetamol 500mg");
        assert_eq!(scans[1]["raw_barcode"], "ZZZ999");
        assert_eq!(scans[1]["resolved_record"], Value::Null);

        let (status, stats) = send(&app, Method::GET, "/api/scans/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["active"], false);
        assert_eq!(stats["lines_read"], 0);
    }
}
