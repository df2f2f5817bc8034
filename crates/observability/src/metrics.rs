//! Sync loop metrics
//!
//! Thin wrappers over the `metrics` facade; a no-op unless a recorder (the
//! Prometheus exporter) is installed.

use metrics::{counter, gauge};

/// Outcome label of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcomeLabel {
    Complete,
    Partial,
    Empty,
}

impl TickOutcomeLabel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partial => "partial",
            Self::Empty => "empty",
        }
    }
}

/// Record the outcome of one tick
pub fn record_tick(outcome: TickOutcomeLabel, cameras_read: usize) {
    counter!("camsync_ticks_total", "outcome" => outcome.as_str()).increment(1);
    gauge!("camsync_last_tick_cameras_read").set(cameras_read as f64);
}

/// Record a per-camera read timeout
pub fn record_read_timeout(camera: usize) {
    counter!("camsync_read_timeouts_total", "camera" => camera.to_string()).increment(1);
}

/// Publish one FPS window
pub fn record_fps(counts: &[u32]) {
    for (camera, count) in counts.iter().enumerate() {
        gauge!("camsync_fps", "camera" => camera.to_string()).set(f64::from(*count));
    }
}

/// Record a manual or startup flush
pub fn record_flush() {
    counter!("camsync_flushes_total").increment(1);
}

/// Current number of buffered frame sets
pub fn record_buffered_sets(count: usize) {
    gauge!("camsync_buffered_frame_sets").set(count as f64);
}

/// Record one exported batch and its failed images
pub fn record_export_batch(failed_images: usize) {
    counter!("camsync_batches_exported_total").increment(1);
    if failed_images > 0 {
        counter!("camsync_export_failures_total").increment(failed_images as u64);
    }
}
