//! # PharmStock API Entry Point
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Process Startup                                   │
//! │                                                                         │
//! │  1. Load Configuration ───────────────────────────────────────────────► │
//! │     • defaults → pharmstock.toml → environment                          │
//! │                                                                         │
//! │  2. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default from [logging] level, overridden with RUST_LOG            │
//! │                                                                         │
//! │  3. Open Record Store ────────────────────────────────────────────────► │
//! │     • SQLite (WAL, migrations) or in-memory                             │
//! │                                                                         │
//! │  4. Start Scan Correlator (if a device is configured) ────────────────► │
//! │     • observers: LoggingObserver + RecentScans                          │
//! │                                                                         │
//! │  5. Serve HTTP until Ctrl-C / SIGTERM ────────────────────────────────► │
//! │                                                                         │
//! │  6. Shutdown ─────────────────────────────────────────────────────────► │
//! │     • stop correlator → close pool                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure before step 5 exits the process with an error.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pharmstock_api::{build_router, open_store, ApiConfig, AppState, InventoryService, RecentScans};
use pharmstock_scan::{open_device, LoggingObserver, ObserverSet, ScanCorrelator};

/// How long runtime shutdown waits for blocking reads (stdin) to return.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load(None).context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let result = runtime.block_on(run(config));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
    result
}

async fn run(config: ApiConfig) -> anyhow::Result<()> {
    match &config.source {
        Some(path) => info!(path = %path.display(), "Loaded config file"),
        None => info!("No config file, using defaults and environment"),
    }
    info!(
        engine = %config.storage.engine,
        scanner = config.scanner.device.as_deref().unwrap_or("disabled"),
        "Starting PharmStock"
    );

    let opened = open_store(&config.storage)
        .await
        .context("Failed to open record store")?;
    let store = opened.store;

    let recent = Arc::new(RecentScans::new(config.scanner.recent_capacity));
    let mut state = AppState::new(InventoryService::new(store.clone()), recent.clone());

    let scanner = match &config.scanner.device {
        Some(device) => {
            let reader = open_device(device)
                .await
                .context("Failed to open scan device")?;
            let observers = ObserverSet::new()
                .with(Arc::new(LoggingObserver))
                .with(recent);
            let (handle, task) = ScanCorrelator::spawn(
                reader,
                store,
                Arc::new(observers),
                config.scanner.correlator_config(),
            );
            state = state.with_scanner(handle.clone());
            Some((handle, task))
        }
        None => None,
    };

    let bind_addr = config.server.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!(addr = %listener.local_addr()?, "HTTP control plane listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    if let Some((handle, task)) = scanner {
        if handle.shutdown().await.is_err() {
            // Already stopped (device closed its stream)
            info!("Scan correlator was not running");
        }
        if let Err(e) = task.await {
            warn!(error = %e, "Scan correlator task ended abnormally");
        }
    }

    if let Some(database) = opened.database {
        database.close().await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pharmstock_scan=trace` - Show idle read timeouts
/// - Default: `[logging] level` from configuration
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn,tower_http=debug", level)));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
