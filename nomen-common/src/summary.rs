//! Per-run outcome counters

use serde::Serialize;
use std::fmt;

/// Counts reported at the end of every pipeline pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Records written (patched or created)
    pub updated: usize,
    /// Records that would have been written in dry-run mode
    pub would_update: usize,
    /// Predictions below the decision threshold
    pub weak: usize,
    /// Records protected by a lock flag
    pub locked: usize,
    /// Records with nothing to score or malformed data
    pub skipped: usize,
    /// Writes or units of work that failed after retries
    pub failed: usize,
}

impl RunSummary {
    pub fn merge(&mut self, other: RunSummary) {
        self.updated += other.updated;
        self.would_update += other.would_update;
        self.weak += other.weak;
        self.locked += other.locked;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    /// Log the summary under `stage`
    pub fn log(&self, stage: &str) {
        tracing::info!(
            stage,
            updated = self.updated,
            would_update = self.would_update,
            weak = self.weak,
            locked = self.locked,
            skipped = self.skipped,
            failed = self.failed,
            "Run complete"
        );
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "updated={} would={} weak={} locked={} skipped={} failed={}",
            self.updated, self.would_update, self.weak, self.locked, self.skipped, self.failed
        )
    }
}
