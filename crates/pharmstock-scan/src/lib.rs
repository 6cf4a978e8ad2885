//! # pharmstock-scan: Barcode Scan Correlator
//!
//! Reads barcodes from a scanning device and resolves each against the
//! record store, emitting one [`ScanEvent`](pharmstock_core::ScanEvent) per
//! non-empty line.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Scan Ingestion Path                                │
//! │                                                                         │
//! │   ┌──────────────┐   lines   ┌──────────────────┐   lookup   ┌───────┐ │
//! │   │ LineSource   │ ────────► │  ScanCorrelator  │ ─────────► │ Store │ │
//! │   │ tty/FIFO/    │           │  (tokio task)    │ ◄───────── │       │ │
//! │   │ file/stdin   │           └────────┬─────────┘   record?  └───────┘ │
//! │   └──────────────┘                    │                                 │
//! │                                       ▼ ScanEvent                       │
//! │                            ┌──────────────────────┐                     │
//! │                            │    ScanObserver      │                     │
//! │                            │ log / channel / set  │                     │
//! │                            └──────────────────────┘                     │
//! │                                                                         │
//! │   ScanCorrelatorHandle: shutdown(), stats()                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`correlator`] - The long-lived correlation task and its handle
//! - [`source`] - Device opening and line splitting
//! - [`observer`] - Event sinks
//! - [`error`] - Scan error types
//!
//! ## Usage
//! ```rust,ignore
//! let reader = open_device(&config.scanner.device).await?;
//! let (handle, task) = ScanCorrelator::spawn(
//!     reader,
//!     store.clone(),
//!     Arc::new(LoggingObserver),
//!     CorrelatorConfig::default(),
//! );
//!
//! // ... at shutdown
//! handle.shutdown().await.ok();
//! task.await.ok();
//! ```

pub mod correlator;
pub mod error;
pub mod observer;
pub mod source;

pub use correlator::{
    correlate_line, CorrelatorConfig, ScanCorrelator, ScanCorrelatorHandle, ScanStats,
};
pub use error::{ScanError, ScanResult};
pub use observer::{ChannelObserver, LoggingObserver, NoOpObserver, ObserverSet, ScanObserver};
pub use source::{open_device, DeviceReader, LineSource, STDIN_DEVICE};
