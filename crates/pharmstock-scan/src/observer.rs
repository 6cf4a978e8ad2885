//! # Scan Observers
//!
//! Where correlated [`ScanEvent`]s go.
//!
//! ```text
//! ScanCorrelator ──► Arc<dyn ScanObserver>
//!                        ├── LoggingObserver   info / warn per event
//!                        ├── ChannelObserver   try_send into an mpsc
//!                        ├── NoOpObserver      tests
//!                        └── ObserverSet       fan-out to several
//! ```
//!
//! Observers are called inline on the correlator task, so `on_scan` must not
//! block.

use std::sync::Arc;

use pharmstock_core::ScanEvent;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Receives every scan event in read order.
pub trait ScanObserver: Send + Sync {
    /// Called once per non-empty scanned line.
    fn on_scan(&self, event: &ScanEvent);
}

/// Drops every event.
pub struct NoOpObserver;

impl ScanObserver for NoOpObserver {
    fn on_scan(&self, _event: &ScanEvent) {}
}

/// Logs recognized scans at info and unknown barcodes at warn.
pub struct LoggingObserver;

impl ScanObserver for LoggingObserver {
    fn on_scan(&self, event: &ScanEvent) {
        match &event.resolved_record {
            Some(record) => info!(
                barcode = %event.raw_barcode,
                id = record.id,
                drug = %record.drug_name,
                stock = record.stock_quantity,
                "Barcode scanned"
            ),
            None => warn!(barcode = %event.raw_barcode, "Unknown barcode scanned"),
        }
    }
}

/// Forwards events into a bounded channel without waiting.
///
/// A full or closed channel drops the event with a warning.
pub struct ChannelObserver {
    tx: mpsc::Sender<ScanEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::Sender<ScanEvent>) -> Self {
        ChannelObserver { tx }
    }
}

impl ScanObserver for ChannelObserver {
    fn on_scan(&self, event: &ScanEvent) {
        match self.tx.try_send(event.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(barcode = %dropped.raw_barcode, "Scan channel full, event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                warn!(barcode = %dropped.raw_barcode, "Scan channel closed, event dropped");
            }
        }
    }
}

/// Fans each event out to several observers in registration order.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn ScanObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer (builder style).
    pub fn with(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl ScanObserver for ObserverSet {
    fn on_scan(&self, event: &ScanEvent) {
        for observer in &self.observers {
            observer.on_scan(event);
        }
    }
}
