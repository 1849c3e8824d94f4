//! Orphaned Media Sweeper
//!
//! Retries object deletions that failed while a story was being deleted.
//! Each ledger entry is either resolved (object gone) or has its attempt
//! counter bumped so operators can spot keys that keep failing.

use crate::db::OrphanedMediaRepository;
use crate::error::Result;
use crate::metrics::stories as metrics;
use crate::storage::MediaStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Outcome of a single sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: usize,
    pub failed: usize,
}

pub struct OrphanSweeper {
    orphans: Arc<dyn OrphanedMediaRepository>,
    media: Arc<dyn MediaStore>,
    interval: Duration,
    batch_size: i64,
}

impl OrphanSweeper {
    pub fn new(
        orphans: Arc<dyn OrphanedMediaRepository>,
        media: Arc<dyn MediaStore>,
        interval: Duration,
        batch_size: i64,
    ) -> Self {
        Self {
            orphans,
            media,
            interval,
            batch_size,
        }
    }

    /// Runs until the task is dropped
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            batch_size = self.batch_size,
            "Starting orphaned media sweeper"
        );

        loop {
            sleep(self.interval).await;

            let started = Instant::now();
            match self.sweep_once().await {
                Ok(report) => {
                    metrics::record_orphan_sweep("success", started.elapsed());
                    if report.deleted > 0 || report.failed > 0 {
                        tracing::info!(
                            deleted = report.deleted,
                            failed = report.failed,
                            duration_ms = started.elapsed().as_millis(),
                            "Orphaned media sweep completed"
                        );
                    }
                }
                Err(e) => {
                    metrics::record_orphan_sweep("error", started.elapsed());
                    tracing::error!(error = %e, "Orphaned media sweep failed");
                }
            }
        }
    }

    /// One pass over the oldest pending batch. Only a failure to read the
    /// ledger aborts the pass; per-entry errors are logged and counted.
    pub async fn sweep_once(&self) -> Result<SweepReport> {
        let pending = self.orphans.list_pending(self.batch_size).await?;
        let mut report = SweepReport::default();

        for entry in pending {
            match self.media.delete_object(&entry.object_key).await {
                Ok(()) => match self.orphans.resolve(entry.id).await {
                    Ok(()) => {
                        report.deleted += 1;
                        tracing::debug!(key = %entry.object_key, "orphaned media removed");
                    }
                    Err(e) => {
                        // The object is gone; the entry is retried and resolved next pass
                        report.failed += 1;
                        tracing::error!(
                            key = %entry.object_key,
                            error = %e,
                            "failed to resolve orphaned media entry"
                        );
                    }
                },
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        key = %entry.object_key,
                        attempts = entry.attempts + 1,
                        error = %e,
                        "orphaned media still not deletable"
                    );

                    if let Err(ledger_err) =
                        self.orphans.mark_failed(entry.id, &e.to_string()).await
                    {
                        tracing::error!(
                            key = %entry.object_key,
                            error = %ledger_err,
                            "failed to record orphaned media attempt"
                        );
                    }
                }
            }
        }

        Ok(report)
    }
}
