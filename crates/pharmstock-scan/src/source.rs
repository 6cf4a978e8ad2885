//! # Scan Line Source
//!
//! Turns a byte stream from a scanner into lines.
//!
//! The scanner is an opaque byte source: a serial tty configured by the OS
//! driver, a FIFO, a plain file, or standard input. Each scan ends with `\n`
//! (a trailing `\r` is left for the correlator's trim).

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Split};
use tracing::info;

use crate::error::{ScanError, ScanResult};

/// Device path meaning "read from standard input".
pub const STDIN_DEVICE: &str = "-";

/// Boxed device stream.
pub type DeviceReader = Box<dyn AsyncRead + Send + Unpin>;

/// Opens the configured scan device read-only.
///
/// ## Example
/// ```rust,ignore
/// let reader = open_device("/dev/ttyACM0").await?;
/// let reader = open_device("-").await?; // stdin
/// ```
pub async fn open_device(path: &str) -> ScanResult<DeviceReader> {
    if path == STDIN_DEVICE {
        info!("Reading scans from standard input");
        return Ok(Box::new(tokio::io::stdin()));
    }

    let file = tokio::fs::OpenOptions::new()
        .read(true)
        .open(path)
        .await
        .map_err(|e| ScanError::DeviceOpen {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    info!(device = %path, "Scan device opened");
    Ok(Box::new(file))
}

/// Newline-delimited reader over a device stream.
pub struct LineSource<R> {
    segments: Split<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> LineSource<R> {
    /// Wraps a raw device stream.
    pub fn new(reader: R) -> Self {
        LineSource {
            segments: BufReader::new(reader).split(b'\n'),
        }
    }

    /// Reads the next line, or `None` once the device closes its stream.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Cancel safe: dropping
    /// the future (e.g. on a read timeout) loses no buffered bytes.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        let segment = self.segments.next_segment().await?;
        Ok(segment.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}
