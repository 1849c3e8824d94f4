//! Story lifecycle and media cleanup collectors

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};
use std::time::Duration;

static STORIES_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("stories_created_total", "Total number of stories created")
        .expect("failed to register stories_created_total")
});

static STORIES_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("stories_deleted_total", "Total number of story records deleted")
        .expect("failed to register stories_deleted_total")
});

/// Media object deletions by outcome (deleted/failed/skipped)
static MEDIA_DELETIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "story_media_deletions_total",
        "Media object deletions attempted while deleting stories",
        &["outcome"]
    )
    .expect("failed to register story_media_deletions_total")
});

static ORPHAN_SWEEP_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "story_orphan_sweep_runs_total",
        "Total number of orphaned media sweeps (success/error)",
        &["status"]
    )
    .expect("failed to register story_orphan_sweep_runs_total")
});

static ORPHAN_SWEEP_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "story_orphan_sweep_duration_seconds",
        "Duration of orphaned media sweeps",
        &["status"],
        vec![0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("failed to register story_orphan_sweep_duration_seconds")
});

pub fn record_story_created() {
    STORIES_CREATED_TOTAL.inc();
}

pub fn record_story_deleted() {
    STORIES_DELETED_TOTAL.inc();
}

pub fn record_media_deletion(outcome: &str) {
    MEDIA_DELETIONS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_orphan_sweep(status: &str, duration: Duration) {
    ORPHAN_SWEEP_RUNS_TOTAL.with_label_values(&[status]).inc();
    ORPHAN_SWEEP_DURATION_SECONDS
        .with_label_values(&[status])
        .observe(duration.as_secs_f64());
}
