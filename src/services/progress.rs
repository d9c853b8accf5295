//! Unit-count based progress reporting for import runs.

use crate::ProgressNotifier;
use crate::models::{ProgressPhase, ProgressSnapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Emits a snapshot every `every` processed units, plus start and finish.
///
/// Safe to share between worker threads: the counter is atomic and emitted
/// snapshots never go backwards.
pub struct ProgressReporter {
    every: u64,
    total_units: u64,
    processed: AtomicU64,
    last_emitted: Mutex<u64>,
    events: Mutex<Vec<ProgressSnapshot>>,
    notifier: Option<ProgressNotifier>,
    start_instant: Instant,
}

impl ProgressReporter {
    #[must_use]
    pub fn new(total_units: u64, every: u64, notifier: Option<ProgressNotifier>) -> Self {
        Self {
            every: every.max(1),
            total_units,
            processed: AtomicU64::new(0),
            last_emitted: Mutex::new(0),
            events: Mutex::new(Vec::new()),
            notifier,
            start_instant: Instant::now(),
        }
    }

    /// Announce the run before the first unit is processed.
    pub fn start(&self) {
        self.emit(self.snapshot(ProgressPhase::Started, 0));
    }

    /// Count one processed unit and emit a snapshot on cadence boundaries.
    pub fn unit_done(&self) {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if processed % self.every != 0 {
            return;
        }

        let mut last = self.last_emitted.lock().unwrap_or_else(PoisonError::into_inner);
        if processed <= *last {
            return;
        }
        *last = processed;
        self.emit(self.snapshot(ProgressPhase::Running, processed));
    }

    /// Emit the final summary snapshot. Always emitted, even for zero units.
    pub fn finish(&self) -> ProgressSnapshot {
        let processed = self.processed.load(Ordering::Relaxed);
        let snapshot = self.snapshot(ProgressPhase::Finished, processed);
        self.emit(snapshot.clone());
        snapshot
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        let millis = self.start_instant.elapsed().as_millis();
        u64::try_from(millis).unwrap_or(u64::MAX)
    }

    /// Every snapshot emitted so far, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressSnapshot> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn snapshot(&self, phase: ProgressPhase, processed_units: u64) -> ProgressSnapshot {
        ProgressSnapshot {
            phase,
            processed_units,
            total_units: self.total_units,
            elapsed_ms: self.elapsed_ms(),
        }
    }

    fn emit(&self, snapshot: ProgressSnapshot) {
        log::debug!(
            "progress {:?}: {}/{} units after {} ms",
            snapshot.phase,
            snapshot.processed_units,
            snapshot.total_units,
            snapshot.elapsed_ms
        );

        if let Some(notifier) = &self.notifier {
            notifier(&snapshot);
        }

        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot);
    }
}
