//! # Scan Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Scan Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Startup      │  │   Device I/O    │  │      Control            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  DeviceOpen     │  │  DeviceRead     │  │  ShuttingDown           │ │
//! │  │  (fatal)        │  │  (retried)      │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store lookup failures are not scan errors: they turn into unresolved
//! events and the correlator keeps going.

use thiserror::Error;

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Scan correlator errors.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The configured device could not be opened.
    #[error("Failed to open scan device {path}: {reason}")]
    DeviceOpen { path: String, reason: String },

    /// Reading from an open device failed.
    #[error("Scan device read failed: {0}")]
    DeviceRead(String),

    /// Correlator has already stopped.
    #[error("Scan correlator is shutting down")]
    ShuttingDown,
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::DeviceRead(err.to_string())
    }
}

impl ScanError {
    /// Returns true if the correlator should wait and read again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScanError::DeviceRead(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ScanError::DeviceRead("EIO".into()).is_retryable());

        assert!(!ScanError::DeviceOpen {
            path: "/dev/ttyUSB0".into(),
            reason: "No such file or directory".into(),
        }
        .is_retryable());
        assert!(!ScanError::ShuttingDown.is_retryable());
    }

    #[test]
    fn test_io_error_is_read_error() {
        let err: ScanError = std::io::Error::new(std::io::ErrorKind::Other, "framing").into();
        assert!(matches!(err, ScanError::DeviceRead(_)));
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Scan device read failed: framing");
    }
}
