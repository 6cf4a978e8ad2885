//! # Scan Routes
//!
//! Read-only view of the scan correlator.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use pharmstock_core::ScanEvent;
use pharmstock_scan::ScanStats;

use crate::AppState;

/// Correlator status for `GET /api/scans/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct ScannerStatus {
    /// False when no scan device is configured.
    pub active: bool,
    #[serde(flatten)]
    pub stats: ScanStats,
}

/// `GET /api/scans`: recent events, newest last.
pub async fn recent(State(state): State<AppState>) -> Json<Vec<ScanEvent>> {
    Json(state.recent_scans.snapshot())
}

/// `GET /api/scans/stats`
pub async fn stats(State(state): State<AppState>) -> Json<ScannerStatus> {
    let status = match &state.scanner {
        Some(handle) => ScannerStatus {
            active: true,
            stats: handle.stats(),
        },
        None => ScannerStatus {
            active: false,
            stats: ScanStats::default(),
        },
    };
    Json(status)
}
