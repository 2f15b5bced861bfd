//! Telemetry row buffer
//!
//! Ordered, append-only sequence for the currently active ride. `append` and
//! `drain` are mutually atomic: no row is ever visible half-written. Appends
//! write through to the durable journal before returning.

use std::sync::{Arc, Mutex};

use contracts::{RideId, TelemetryRow};
use tracing::{debug, error};

use crate::journal::RideJournal;

/// Shared row buffer for the active ride
///
/// `append` when no ride is active is a silent no-op: late-arriving samples
/// after a stop are expected and harmless.
#[derive(Debug, Default)]
pub struct TelemetryBuffer {
    inner: Mutex<Inner>,
    journal: Option<Arc<RideJournal>>,
}

#[derive(Debug, Default)]
struct Inner {
    active_ride: Option<RideId>,
    rows: Vec<TelemetryRow>,
}

impl TelemetryBuffer {
    /// In-memory buffer without durability (tests)
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer with write-through journal
    pub fn with_journal(journal: Arc<RideJournal>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            journal: Some(journal),
        }
    }

    /// Start accumulating for a ride (clears any leftover rows)
    pub fn begin(&self, ride_id: RideId) {
        let mut inner = self.lock();
        inner.active_ride = Some(ride_id);
        inner.rows.clear();
        debug!(ride_id, "buffer accumulating");
    }

    /// Stop accepting rows (drain still returns what was collected)
    pub fn end(&self) {
        let mut inner = self.lock();
        if let Some(ride_id) = inner.active_ride.take() {
            debug!(ride_id, rows = inner.rows.len(), "buffer closed");
        }
    }

    /// Append one row; returns whether it was accepted
    ///
    /// Rows are kept in strict insertion order, never re-sorted by timestamp.
    pub fn append(&self, row: TelemetryRow) -> bool {
        let mut inner = self.lock();
        let Some(ride_id) = inner.active_ride else {
            return false;
        };

        if let Some(journal) = &self.journal {
            // Journal write failure degrades durability, not collection
            if let Err(e) = journal.append(ride_id, &row) {
                error!(ride_id, error = %e, "journal append failed");
                metrics::counter!("ride_syncer_journal_failures_total").increment(1);
            }
        }

        inner.rows.push(row);
        metrics::counter!("ride_syncer_rows_buffered_total").increment(1);
        true
    }

    /// Atomically return and clear the buffered rows
    ///
    /// Repeated calls before new appends return an empty sequence.
    pub fn drain(&self) -> Vec<TelemetryRow> {
        std::mem::take(&mut self.lock().rows)
    }

    /// Ride currently accumulating, if any
    pub fn active_ride(&self) -> Option<RideId> {
        self.lock().active_ride
    }

    /// Buffered row count
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    /// Whether the buffer holds no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned buffer mutex means a panic mid-append on another
        // thread; the row data itself is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
