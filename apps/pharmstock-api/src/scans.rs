//! # Recent Scans
//!
//! Bounded buffer of the latest scan events, served by `GET /api/scans`.
//!
//! ```text
//! capacity = 3
//!
//!   on_scan(D)   [A, B, C] ──► [B, C, D]
//!                 oldest          newest-last
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use pharmstock_core::ScanEvent;
use pharmstock_scan::ScanObserver;

/// Keeps the last `capacity` scan events in arrival order.
#[derive(Debug)]
pub struct RecentScans {
    capacity: usize,
    events: Mutex<VecDeque<ScanEvent>>,
}

impl RecentScans {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        RecentScans {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copies the buffered events, oldest first.
    pub fn snapshot(&self) -> Vec<ScanEvent> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ScanEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScanObserver for RecentScans {
    fn on_scan(&self, event: &ScanEvent) {
        let mut events = self.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(scans: &RecentScans) -> Vec<String> {
        scans.snapshot().into_iter().map(|e| e.raw_barcode).collect()
    }

    #[test]
    fn test_keeps_newest_last() {
        let scans = RecentScans::new(3);
        assert!(scans.is_empty());

        for code in ["A", "B", "C", "D"] {
            scans.on_scan(&ScanEvent::new(code, None));
        }

        assert_eq!(scans.len(), 3);
        assert_eq!(codes(&scans), vec!["B", "C", "D"]);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let scans = RecentScans::new(0);
        assert_eq!(scans.capacity(), 1);

        scans.on_scan(&ScanEvent::new("A", None));
        scans.on_scan(&ScanEvent::new("B", None));
        assert_eq!(codes(&scans), vec!["B"]);
    }
}
