//! # PharmStock API Library
//!
//! Service façade, HTTP control plane and process wiring.
//!
//! ## Module Organization
//! ```text
//! pharmstock_api/
//! ├── lib.rs          ◄─── You are here (AppState, store selection)
//! ├── main.rs         ◄─── Binary: logging, startup, shutdown
//! ├── config.rs       ◄─── ApiConfig (defaults → TOML → env)
//! ├── error.rs        ◄─── ApiError / ErrorCode
//! ├── service.rs      ◄─── InventoryService + Outcome
//! ├── scans.rs        ◄─── RecentScans observer
//! └── http/
//!     ├── mod.rs      ◄─── Router
//!     ├── inventory.rs
//!     ├── health.rs
//!     └── scans.rs
//! ```
//!
//! ## Shared State
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          AppState (Clone)                               │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐   │
//! │  │ InventoryService │ │   RecentScans    │ │ ScanCorrelatorHandle │   │
//! │  │                  │ │                  │ │     (optional)       │   │
//! │  │ Arc<dyn Store> ──┼─┼──── shared with the correlator ──────────┤   │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod scans;
pub mod service;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use pharmstock_db::{Database, DbConfig, DbResult, InventoryStore, MemoryInventoryStore};
use pharmstock_scan::ScanCorrelatorHandle;

pub use config::{ApiConfig, ConfigError, StorageEngine, StorageSettings};
pub use error::{ApiError, ErrorCode};
pub use http::build_router;
pub use scans::RecentScans;
pub use service::{InventoryService, Outcome, ServiceResult};

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub service: InventoryService,
    pub recent_scans: Arc<RecentScans>,
    pub scanner: Option<ScanCorrelatorHandle>,
}

impl AppState {
    pub fn new(service: InventoryService, recent_scans: Arc<RecentScans>) -> Self {
        AppState {
            service,
            recent_scans,
            scanner: None,
        }
    }

    /// Replaces the recent-scan buffer.
    pub fn with_recent_scans(mut self, recent_scans: Arc<RecentScans>) -> Self {
        self.recent_scans = recent_scans;
        self
    }

    /// Attaches a running correlator for `/api/scans/stats`.
    pub fn with_scanner(mut self, handle: ScanCorrelatorHandle) -> Self {
        self.scanner = Some(handle);
        self
    }
}

/// Opened record store plus the pool to close at shutdown (SQLite only).
pub struct OpenedStore {
    pub store: Arc<dyn InventoryStore>,
    pub database: Option<Database>,
}

/// Opens the configured store engine.
///
/// For SQLite this creates the database file if needed and applies
/// migrations.
pub async fn open_store(settings: &StorageSettings) -> DbResult<OpenedStore> {
    match settings.engine {
        StorageEngine::Memory => {
            info!("Using in-memory record store");
            Ok(OpenedStore {
                store: Arc::new(MemoryInventoryStore::new()),
                database: None,
            })
        }
        StorageEngine::Sqlite => {
            let mut config = DbConfig::from_url(&settings.database_url)
                .connect_timeout(Duration::from_millis(settings.connect_timeout_ms));
            // `:memory:` stays on its single connection
            if !config.is_in_memory() {
                config = config.max_connections(settings.max_connections);
            }
            let database = Database::new(config).await?;
            Ok(OpenedStore {
                store: Arc::new(database.inventory()),
                database: Some(database),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_store() {
        let settings = StorageSettings {
            engine: StorageEngine::Memory,
            ..Default::default()
        };
        let opened = open_store(&settings).await.unwrap();
        assert_eq!(opened.store.engine(), "memory");
        assert!(opened.database.is_none());
    }

    #[tokio::test]
    async fn test_open_sqlite_store() {
        let dir = tempfile::tempdir().unwrap();
        let settings = StorageSettings {
            engine: StorageEngine::Sqlite,
            database_url: format!("sqlite:{}", dir.path().join("app.db").display()),
            max_connections: 2,
            connect_timeout_ms: 2_000,
        };

        let opened = open_store(&settings).await.unwrap();
        assert_eq!(opened.store.engine(), "sqlite");
        assert!(opened.store.health_check().await);
        assert_eq!(opened.store.count().await.unwrap(), 0);

        let options = opened.database.as_ref().unwrap().pool().options();
        assert_eq!(options.get_max_connections(), 2);
        assert_eq!(options.get_acquire_timeout(), Duration::from_millis(2_000));

        if let Some(db) = opened.database {
            db.close().await;
        }
    }
}
