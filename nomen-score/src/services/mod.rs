//! Table passes
//!
//! Each pass reads every record once, computes, and patches its own output
//! columns back one record at a time. A failed patch is counted and the pass
//! moves on.

pub mod aligner;
pub mod analyzer;
pub mod enricher;
pub mod fields;

pub use aligner::{run_align, AlignOptions};
pub use analyzer::{run_analyze, AnalyzeOptions, LabelSource};
pub use enricher::{run_enrich, EnrichOptions};

use nomen_common::airtable::{Fields, RecordStore};
use nomen_common::RunSummary;
use std::time::Duration;
use tracing::{debug, warn};

/// What became of one record write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteOutcome {
    /// Nothing to write
    Empty,
    /// Dry run, nothing sent
    DryRun,
    Written,
    Failed,
}

/// Patch `fields` into record `id` and pause for `write_delay` after a
/// successful write; dry runs only log
pub(crate) async fn patch_paced(
    store: &dyn RecordStore,
    id: &str,
    fields: Fields,
    dry_run: bool,
    write_delay: Duration,
) -> WriteOutcome {
    if fields.is_empty() {
        return WriteOutcome::Empty;
    }

    if dry_run {
        debug!(record = id, fields = ?fields.keys().collect::<Vec<_>>(), "Dry run: would patch");
        return WriteOutcome::DryRun;
    }

    match store.patch_record(id, fields).await {
        Ok(()) => {
            if !write_delay.is_zero() {
                tokio::time::sleep(write_delay).await;
            }
            WriteOutcome::Written
        }
        Err(e) => {
            warn!(record = id, error = %e, "Patch failed");
            WriteOutcome::Failed
        }
    }
}

/// Patch `fields` into record `id`, or only count it in dry-run mode
pub(crate) async fn write_record(
    store: &dyn RecordStore,
    id: &str,
    fields: Fields,
    dry_run: bool,
    write_delay: Duration,
    summary: &mut RunSummary,
) {
    match patch_paced(store, id, fields, dry_run, write_delay).await {
        WriteOutcome::Empty => summary.skipped += 1,
        WriteOutcome::DryRun => summary.would_update += 1,
        WriteOutcome::Written => summary.updated += 1,
        WriteOutcome::Failed => summary.failed += 1,
    }
}
