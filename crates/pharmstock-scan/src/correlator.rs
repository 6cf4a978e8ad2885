//! # Scan Correlator
//!
//! Long-lived task that resolves scanned barcodes against the record store.
//!
//! ## Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ScanCorrelator::run                                 │
//! │                                                                         │
//! │  loop select! {                                                        │
//! │    shutdown_rx.recv()            → stop                                │
//! │    timeout(read_timeout, line)   →                                     │
//! │       ├── elapsed                → idle, poll again                    │
//! │       ├── Some(line)             → trim                                │
//! │       │     ├── empty            → discard                             │
//! │       │     └── code             → store.get_by_barcode(code)          │
//! │       │            ├── Ok(rec)   → ScanEvent { resolved: Some(rec) }   │
//! │       │            ├── NotFound  → ScanEvent { resolved: None }        │
//! │       │            └── other err → warn, ScanEvent { resolved: None }  │
//! │       │          observer.on_scan(&event)                              │
//! │       ├── None (EOF)             → stop                                │
//! │       └── io error → DeviceRead  → warn, sleep(retry_delay), continue  │
//! │  }                                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events are emitted strictly in read order: each line is fully resolved
//! and observed before the next read starts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use pharmstock_core::ScanEvent;
use pharmstock_db::{DbError, InventoryStore};

use crate::error::{ScanError, ScanResult};
use crate::observer::ScanObserver;
use crate::source::LineSource;

// =============================================================================
// Configuration
// =============================================================================

/// Correlator timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelatorConfig {
    /// How long one read may wait before the loop counts as idle.
    /// Default: 1 second
    pub read_timeout: Duration,

    /// Pause after a device read error before reading again.
    /// Default: 1 second
    pub retry_delay: Duration,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        CorrelatorConfig {
            read_timeout: Duration::from_secs(1),
            retry_delay: Duration::from_secs(1),
        }
    }
}

// =============================================================================
// Stats
// =============================================================================

/// Snapshot of correlator counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Lines read from the device, including empty ones.
    pub lines_read: u64,
    /// Events handed to the observer.
    pub events_emitted: u64,
    /// Events whose barcode did not resolve.
    pub unresolved: u64,
    /// Device read errors.
    pub read_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    lines_read: AtomicU64,
    events_emitted: AtomicU64,
    unresolved: AtomicU64,
    read_errors: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ScanStats {
        ScanStats {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// Line Correlation
// =============================================================================

/// Resolves one scanned line.
///
/// Returns `None` for a line that is empty after trimming. Lookup failures of
/// any kind produce an event without a resolved record.
pub async fn correlate_line(store: &dyn InventoryStore, line: &str) -> Option<ScanEvent> {
    let code = line.trim();
    if code.is_empty() {
        return None;
    }

    let resolved = match store.get_by_barcode(code).await {
        Ok(record) => Some(record),
        Err(DbError::NotFound { .. }) => None,
        Err(e) => {
            warn!(barcode = %code, error = %e, "Barcode lookup failed");
            None
        }
    };

    Some(ScanEvent::new(code, resolved))
}

/// Correlates one line, counts it and hands the event to the observer.
async fn handle_line(
    store: &dyn InventoryStore,
    observer: &dyn ScanObserver,
    counters: &Counters,
    line: &str,
) {
    let Some(event) = correlate_line(store, line).await else {
        debug!("Empty scan line discarded");
        return;
    };

    if !event.is_resolved() {
        counters.unresolved.fetch_add(1, Ordering::Relaxed);
    }
    observer.on_scan(&event);
    counters.events_emitted.fetch_add(1, Ordering::Relaxed);
}

// =============================================================================
// Correlator
// =============================================================================

/// Reads scans from a device and emits one event per non-empty line.
pub struct ScanCorrelator<R> {
    source: LineSource<R>,
    store: Arc<dyn InventoryStore>,
    observer: Arc<dyn ScanObserver>,
    config: CorrelatorConfig,
    counters: Arc<Counters>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling a running correlator.
#[derive(Clone)]
pub struct ScanCorrelatorHandle {
    shutdown_tx: mpsc::Sender<()>,
    counters: Arc<Counters>,
}

impl ScanCorrelatorHandle {
    /// Signals the correlator to stop. An in-flight read is abandoned.
    pub async fn shutdown(&self) -> ScanResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| ScanError::ShuttingDown)
    }

    /// Current counter values.
    pub fn stats(&self) -> ScanStats {
        self.counters.snapshot()
    }
}

impl<R> ScanCorrelator<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    /// Creates a correlator over `reader` and returns its handle.
    pub fn new(
        reader: R,
        store: Arc<dyn InventoryStore>,
        observer: Arc<dyn ScanObserver>,
        config: CorrelatorConfig,
    ) -> (Self, ScanCorrelatorHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let counters = Arc::new(Counters::default());

        let correlator = ScanCorrelator {
            source: LineSource::new(reader),
            store,
            observer,
            config,
            counters: counters.clone(),
            shutdown_rx,
        };

        let handle = ScanCorrelatorHandle {
            shutdown_tx,
            counters,
        };

        (correlator, handle)
    }

    /// Creates a correlator and spawns it on the current runtime.
    pub fn spawn(
        reader: R,
        store: Arc<dyn InventoryStore>,
        observer: Arc<dyn ScanObserver>,
        config: CorrelatorConfig,
    ) -> (ScanCorrelatorHandle, JoinHandle<()>) {
        let (correlator, handle) = Self::new(reader, store, observer, config);
        (handle, tokio::spawn(correlator.run()))
    }

    /// Runs until shutdown is signalled, every handle is dropped, or the
    /// device closes its stream.
    pub async fn run(mut self) {
        info!(
            engine = self.store.engine(),
            read_timeout_ms = self.config.read_timeout.as_millis() as u64,
            "Scan correlator starting"
        );

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.recv() => {
                    info!("Scan correlator received shutdown");
                    break;
                }

                read = tokio::time::timeout(self.config.read_timeout, self.source.next_line()) => {
                    match read {
                        Err(_) => {
                            trace!("No scan within read timeout");
                        }
                        Ok(Ok(Some(line))) => {
                            self.counters.lines_read.fetch_add(1, Ordering::Relaxed);
                            handle_line(
                                self.store.as_ref(),
                                self.observer.as_ref(),
                                &self.counters,
                                &line,
                            )
                            .await;
                        }
                        Ok(Ok(None)) => {
                            info!("Scan device closed its stream");
                            break;
                        }
                        Ok(Err(e)) => {
                            let err = ScanError::from(e);
                            self.counters.read_errors.fetch_add(1, Ordering::Relaxed);
                            if !err.is_retryable() {
                                error!(error = %err, "Scan device failed");
                                break;
                            }
                            warn!(
                                error = %err,
                                retry_ms = self.config.retry_delay.as_millis() as u64,
                                "Scan device read failed"
                            );
                            if self.wait_retry().await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }

        let stats = self.counters.snapshot();
        info!(
            lines = stats.lines_read,
            events = stats.events_emitted,
            unresolved = stats.unresolved,
            read_errors = stats.read_errors,
            "Scan correlator stopped"
        );
    }

    /// Sleeps for the retry delay; returns `Err` if shutdown arrives first.
    async fn wait_retry(&mut self) -> ScanResult<()> {
        tokio::select! {
            _ = self.shutdown_rx.recv() => {
                info!("Scan correlator received shutdown");
                Err(ScanError::ShuttingDown)
            }
            _ = tokio::time::sleep(self.config.retry_delay) => Ok(()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{ChannelObserver, NoOpObserver};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pharmstock_core::{InventoryPatch, InventoryRecord, NewInventory, Pagination};
    use pharmstock_db::{DbResult, MemoryInventoryStore};
    use std::collections::VecDeque;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    fn input(barcode: &str) -> NewInventory {
        NewInventory {
            barcode: barcode.to_string(),
            drug_name: "Omeprazole 20mg".to_string(),
            manufacturer: "AstraZeneca".to_string(),
            units: "capsules".to_string(),
            price: 6.4,
            stock_quantity: 30,
            stocked_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
        }
    }

    async fn store_with(barcodes: &[&str]) -> Arc<dyn InventoryStore> {
        let store = MemoryInventoryStore::new();
        for code in barcodes {
            store.create(input(code)).await.unwrap();
        }
        Arc::new(store)
    }

    fn drain(rx: &mut mpsc::Receiver<ScanEvent>) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Store whose backing engine is always down.
    struct UnavailableStore;

    #[async_trait]
    impl InventoryStore for UnavailableStore {
        fn engine(&self) -> &'static str {
            "unavailable"
        }
        async fn create(&self, _input: NewInventory) -> DbResult<InventoryRecord> {
            Err(DbError::PoolExhausted)
        }
        async fn get(&self, _id: i64) -> DbResult<InventoryRecord> {
            Err(DbError::PoolExhausted)
        }
        async fn get_by_barcode(&self, _barcode: &str) -> DbResult<InventoryRecord> {
            Err(DbError::ConnectionFailed("database is locked".into()))
        }
        async fn list(&self, _page: Pagination) -> DbResult<Vec<InventoryRecord>> {
            Err(DbError::PoolExhausted)
        }
        async fn update(&self, _id: i64, _input: NewInventory) -> DbResult<InventoryRecord> {
            Err(DbError::PoolExhausted)
        }
        async fn patch(&self, _id: i64, _patch: InventoryPatch) -> DbResult<InventoryRecord> {
            Err(DbError::PoolExhausted)
        }
        async fn delete(&self, _id: i64) -> DbResult<()> {
            Err(DbError::PoolExhausted)
        }
        async fn count(&self) -> DbResult<u64> {
            Err(DbError::PoolExhausted)
        }
        async fn health_check(&self) -> bool {
            false
        }
    }

    /// Device that yields a scripted sequence of chunks and errors, then EOF.
    struct ScriptedDevice {
        script: VecDeque<io::Result<Vec<u8>>>,
    }

    impl AsyncRead for ScriptedDevice {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.script.pop_front() {
                Some(Ok(bytes)) => {
                    buf.put_slice(&bytes);
                    Poll::Ready(Ok(()))
                }
                Some(Err(e)) => Poll::Ready(Err(e)),
                None => Poll::Ready(Ok(())),
            }
        }
    }

    #[tokio::test]
    async fn test_blank_lines_skipped_unknown_reported() {
        let store = store_with(&["ABC123"]).await;
        let (tx, mut rx) = mpsc::channel(16);
        let device: &[u8] = b"\n  ABC123  \nZZZ999\n";

        let (correlator, handle) = ScanCorrelator::new(
            device,
            store,
            Arc::new(ChannelObserver::new(tx)),
            CorrelatorConfig::default(),
        );
        correlator.run().await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].raw_barcode, "ABC123");
        assert_eq!(
            events[0].resolved_record.as_ref().map(|r| r.barcode.as_str()),
            Some("ABC123")
        );
        assert_eq!(events[1].raw_barcode, "ZZZ999");
        assert!(events[1].resolved_record.is_none());

        assert_eq!(
            handle.stats(),
            ScanStats {
                lines_read: 3,
                events_emitted: 2,
                unresolved: 1,
                read_errors: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_events_follow_read_order() {
        let store = store_with(&["A", "B", "C"]).await;
        let (tx, mut rx) = mpsc::channel(16);
        let device: &[u8] = b"C\r\nA\r\nB\r\nA\r\n";

        let (correlator, _handle) = ScanCorrelator::new(
            device,
            store,
            Arc::new(ChannelObserver::new(tx)),
            CorrelatorConfig::default(),
        );
        correlator.run().await;

        let codes: Vec<String> = drain(&mut rx).into_iter().map(|e| e.raw_barcode).collect();
        assert_eq!(codes, vec!["C", "A", "B", "A"]);
    }

    #[tokio::test]
    async fn test_store_failure_yields_unresolved_event() {
        let (tx, mut rx) = mpsc::channel(16);
        let device: &[u8] = b"ABC123\nABC124\n";

        let (correlator, handle) = ScanCorrelator::new(
            device,
            Arc::new(UnavailableStore),
            Arc::new(ChannelObserver::new(tx)),
            CorrelatorConfig::default(),
        );
        correlator.run().await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| !e.is_resolved()));
        assert_eq!(handle.stats().unresolved, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_error_is_retried() {
        let store = store_with(&["ABC123"]).await;
        let (tx, mut rx) = mpsc::channel(16);
        let device = ScriptedDevice {
            script: VecDeque::from(vec![
                Ok(b"ABC".to_vec()),
                Err(io::Error::new(io::ErrorKind::Other, "framing error")),
                Ok(b"123\n".to_vec()),
            ]),
        };

        let (correlator, handle) = ScanCorrelator::new(
            device,
            store,
            Arc::new(ChannelObserver::new(tx)),
            CorrelatorConfig::default(),
        );
        correlator.run().await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].raw_barcode, "ABC123");
        assert!(events[0].is_resolved());
        assert_eq!(handle.stats().read_errors, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_read_errors_keep_loop_alive() {
        let store = store_with(&["A1", "B2"]).await;
        let (tx, mut rx) = mpsc::channel(16);
        let device = ScriptedDevice {
            script: VecDeque::from(vec![
                Ok(b"A1\n".to_vec()),
                Err(io::Error::new(io::ErrorKind::Other, "parity error")),
                Err(io::Error::new(io::ErrorKind::TimedOut, "no carrier")),
                Err(io::Error::new(io::ErrorKind::Other, "overrun")),
                Ok(b"B2\n".to_vec()),
            ]),
        };

        let started = tokio::time::Instant::now();
        let (correlator, handle) = ScanCorrelator::new(
            device,
            store,
            Arc::new(ChannelObserver::new(tx)),
            CorrelatorConfig::default(),
        );
        correlator.run().await;

        let codes: Vec<String> = drain(&mut rx).into_iter().map(|e| e.raw_barcode).collect();
        assert_eq!(codes, vec!["A1", "B2"]);
        assert_eq!(handle.stats().read_errors, 3);
        // Each failure waits out the retry delay
        assert!(started.elapsed() >= CorrelatorConfig::default().retry_delay * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_device_runs_until_shutdown() {
        let store = store_with(&[]).await;
        let (_device, reader) = tokio::io::duplex(64);

        let (handle, task) = ScanCorrelator::spawn(
            reader,
            store,
            Arc::new(NoOpObserver),
            CorrelatorConfig::default(),
        );

        // Several read timeouts pass without ending the loop
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!task.is_finished());
        assert_eq!(handle.stats(), ScanStats::default());

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        // Already stopped
        assert!(matches!(
            handle.shutdown().await,
            Err(ScanError::ShuttingDown)
        ));
    }

    #[tokio::test]
    async fn test_lines_arriving_over_time() {
        use tokio::io::AsyncWriteExt;

        let store = store_with(&["ABC123"]).await;
        let (tx, mut rx) = mpsc::channel(16);
        let (mut device, reader) = tokio::io::duplex(64);

        let (handle, task) = ScanCorrelator::spawn(
            reader,
            store,
            Arc::new(ChannelObserver::new(tx)),
            CorrelatorConfig {
                read_timeout: Duration::from_millis(10),
                retry_delay: Duration::from_millis(10),
            },
        );

        device.write_all(b"ABC1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        device.write_all(b"23\n").await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.raw_barcode, "ABC123");
        assert!(event.is_resolved());

        // Closing the device ends the run
        drop(device);
        task.await.unwrap();
        assert_eq!(handle.stats().events_emitted, 1);
    }

    #[tokio::test]
    async fn test_correlate_line() {
        let store = store_with(&["ABC123"]).await;

        assert!(correlate_line(store.as_ref(), "   \r").await.is_none());

        let event = correlate_line(store.as_ref(), "\tABC123\r").await.unwrap();
        assert_eq!(event.raw_barcode, "ABC123");
        assert!(event.is_resolved());
    }
}
